/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::catalogue::Catalogue;
use crate::custom_error::Result;
use crate::inspector::Inspector;
use crate::parser::{build_canonical_plan, parse_query};
use crate::planner::{CardinalityEstimator, Optimiser, OptimiserConfig, PlanNode};
use log::{debug, info};
use shared::Relation;

pub struct QueryEngine {
    catalogue: Catalogue,
    optimiser: Optimiser,
    estimator: CardinalityEstimator,
}

impl QueryEngine {
    /// Create a new query engine over the given statistics
    pub fn new(catalogue: Catalogue) -> Self {
        Self {
            catalogue,
            optimiser: Optimiser::new(),
            estimator: CardinalityEstimator::new(),
        }
    }

    pub fn with_config(catalogue: Catalogue, config: OptimiserConfig) -> Self {
        Self {
            catalogue,
            optimiser: Optimiser::with_config(config),
            estimator: CardinalityEstimator::new(),
        }
    }

    /// Parse a query and build its canonical plan
    pub fn canonical_plan(&self, query: &str) -> Result<PlanNode> {
        let parsed = parse_query(query)?;
        build_canonical_plan(&parsed, &self.catalogue)
    }

    /// Annotate every node of the plan with its estimated output
    pub fn estimate<'p>(&self, plan: &'p mut PlanNode) -> Result<&'p Relation> {
        self.estimator.estimate(plan)
    }

    /// Rewrite a plan; the result is left unannotated
    pub fn optimise(&self, plan: &PlanNode) -> Result<PlanNode> {
        self.optimiser.optimise(plan)
    }

    /// Build, optimise and estimate both plans for a query
    pub fn explain(&self, query: &str) -> Result<QueryExplanation> {
        let mut canonical = self.canonical_plan(query)?;
        let mut optimised = self.optimise(&canonical)?;

        self.estimate(&mut canonical)?;
        self.estimate(&mut optimised)?;

        let explanation = QueryExplanation {
            canonical,
            optimised,
        };
        info!(
            "estimated cost {} -> {} over {} relations, plan depth {} -> {}",
            explanation.canonical_cost(),
            explanation.optimised_cost(),
            explanation.optimised.scans().len(),
            explanation.canonical.depth(),
            explanation.optimised.depth()
        );
        if !explanation.optimised.contains_join() && explanation.optimised.scans().len() > 1 {
            debug!("no equi-join predicate links the relations, products are kept");
        }
        Ok(explanation)
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn config(&self) -> OptimiserConfig {
        *self.optimiser.config()
    }
}

/// The canonical and optimised plans of one query, both annotated with estimates
#[derive(Debug, Clone)]
pub struct QueryExplanation {
    pub canonical: PlanNode,
    pub optimised: PlanNode,
}

impl QueryExplanation {
    pub fn canonical_cost(&self) -> u64 {
        self.canonical.output().map_or(0, |r| r.tuple_count)
    }

    pub fn optimised_cost(&self) -> u64 {
        self.optimised.output().map_or(0, |r| r.tuple_count)
    }

    /// Both plans as indented trees, separated by a rule line
    pub fn render(&self, inspector: &Inspector) -> String {
        format!(
            "{}{}\n{}",
            inspector.render(&self.canonical),
            "-".repeat(40),
            inspector.render(&self.optimised)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> Catalogue {
        let mut catalogue = Catalogue::new();
        catalogue.create_relation("R", 100).unwrap();
        catalogue.create_attribute("R", "a", 10).unwrap();
        catalogue.create_attribute("R", "c", 20).unwrap();
        catalogue.create_relation("S", 50).unwrap();
        catalogue.create_attribute("S", "b", 25).unwrap();
        catalogue
    }

    #[test]
    fn test_canonical_plan_shape() {
        let engine = QueryEngine::new(catalogue());
        let plan = engine
            .canonical_plan("SELECT c FROM R, S WHERE a = b")
            .unwrap();
        assert_eq!(
            plan.to_string(),
            "PROJECT [c] (SELECT [a=b] (PRODUCT (SCAN [R],SCAN [S])))"
        );
    }

    #[test]
    fn test_explain_annotates_both_plans() {
        let engine = QueryEngine::new(catalogue());
        let explanation = engine.explain("SELECT * FROM R, S WHERE a = b").unwrap();
        assert_eq!(explanation.canonical_cost(), 200);
        assert_eq!(explanation.optimised_cost(), 200);
        assert!(explanation.optimised.contains_join());

        let rendered = explanation.render(&Inspector::new());
        assert!(rendered.contains("PRODUCT  T=5000"));
        assert!(rendered.contains(&"-".repeat(40)));
    }

    #[test]
    fn test_unknown_relation_is_reported() {
        let engine = QueryEngine::new(catalogue());
        assert!(matches!(
            engine.explain("SELECT * FROM Nope"),
            Err(crate::custom_error::PlanError::UnknownRelation(name)) if name == "Nope"
        ));
    }

    #[test]
    fn test_config_is_forwarded() {
        let config = OptimiserConfig {
            push_selections: false,
            push_projections: true,
        };
        let engine = QueryEngine::with_config(catalogue(), config);
        assert_eq!(engine.config(), config);
    }
}
