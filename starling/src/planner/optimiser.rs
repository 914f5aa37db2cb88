/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::cost::CardinalityEstimator;
use super::operators::PlanNode;
use super::types::{Candidate, OptimiserConfig};
use super::utils::{flatten, predicate_spans, predicate_within, required_attributes, FlattenedPlan};
use crate::custom_error::{PlanError, Result};
use log::{debug, trace, warn};
use shared::{Attribute, NamedRelation, Predicate, Relation};

/// Greedy, cost-based rewriter for canonical Scan/Select/Project/Product plans.
///
/// Selections on a single relation are pushed onto their scans, join order is
/// chosen left-deep by repeatedly committing the cheapest next step, products
/// become joins wherever an `A = B` predicate spans both inputs, and join inputs
/// are narrowed to the attributes still needed above them. The original
/// projections are re-applied on top.
#[derive(Debug, Default, Clone)]
pub struct Optimiser {
    config: OptimiserConfig,
    estimator: CardinalityEstimator,
}

/// Inputs shared by every candidate of one greedy step
struct StepContext<'a> {
    pending: &'a [Predicate],
    required: &'a [Attribute],
    has_projections: bool,
}

impl Optimiser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OptimiserConfig) -> Self {
        Self {
            config,
            estimator: CardinalityEstimator::new(),
        }
    }

    pub fn config(&self) -> &OptimiserConfig {
        &self.config
    }

    /// Rewrites `plan` into an equivalent plan that is estimated no dearer.
    ///
    /// The input is only read, and is returned unchanged when the greedy rewrite
    /// estimates higher. The returned plan carries no cached outputs; run
    /// the estimator over it to inspect its statistics.
    pub fn optimise(&self, plan: &PlanNode) -> Result<PlanNode> {
        let FlattenedPlan {
            scans,
            products,
            predicates: mut pending,
            mut projections,
            inner_projections,
        } = flatten(plan);

        let mut original = plan.clone();
        original.clear_outputs();
        let original_output = self.estimator.estimate(&mut original)?.clone();

        if projections.is_empty() && inner_projections > 0 {
            // Keep the narrowed output schema the inner projections produced
            projections.push(original_output.attributes.clone());
        }

        let mut pool = self.push_down_selections(scans, &mut pending);
        let mut accumulated: Option<PlanNode> = None;

        for step in 0..products {
            let required = required_attributes(&projections, &pending);
            let context = StepContext {
                pending: &pending,
                required: &required,
                has_projections: !projections.is_empty(),
            };

            let (mut best, used) = match accumulated.take() {
                None => self.seed_join(&pool, &context)?,
                Some(plan) => self.grow_join(plan, &pool, &context)?,
            };

            debug!(
                "join step {}: committed {} at {} tuples",
                step + 1,
                best.plan,
                best.cost
            );

            for index in used.into_iter().rev() {
                pool.remove(index);
            }
            best.applied.sort_unstable();
            for index in best.applied.into_iter().rev() {
                pending.remove(index);
            }

            best.plan.clear_outputs();
            accumulated = Some(best.plan);
        }

        let mut optimised = match accumulated {
            Some(plan) => plan,
            None => pool.into_iter().next().ok_or(PlanError::EmptyPlan)?,
        };

        for predicate in pending {
            warn!(
                "predicate {} was not placed during join ordering; applying it above the joins",
                predicate
            );
            optimised = PlanNode::selection(optimised, predicate);
        }

        for attributes in projections {
            optimised = PlanNode::projection(optimised, attributes);
        }

        // Fails fast on a predicate or projection naming an unknown attribute
        let cost = self.estimator.estimate(&mut optimised)?.tuple_count;
        debug!("optimised plan {} estimated at {} tuples", optimised, cost);

        // Per-step rounding can make the rewrite dearer than its input
        if original_output.tuple_count < cost {
            debug!(
                "keeping input plan {} at {} tuples over rewrite at {} tuples",
                original, original_output.tuple_count, cost
            );
            original.clear_outputs();
            return Ok(original);
        }

        optimised.clear_outputs();
        Ok(optimised)
    }

    /// Wraps every scan in the selections that only reference its own attributes
    fn push_down_selections(
        &self,
        scans: Vec<NamedRelation>,
        pending: &mut Vec<Predicate>,
    ) -> Vec<PlanNode> {
        let mut pushed = vec![false; pending.len()];
        let mut pool = Vec::with_capacity(scans.len());

        for relation in scans {
            let eligible: Vec<usize> = if self.config.push_selections {
                pending
                    .iter()
                    .enumerate()
                    .filter(|(_, predicate)| predicate_within(predicate, &relation.relation))
                    .map(|(index, _)| index)
                    .collect()
            } else {
                Vec::new()
            };

            let mut plan = PlanNode::scan(relation);
            for index in eligible {
                debug!("pushed {} onto {}", pending[index], plan);
                plan = PlanNode::selection(plan, pending[index].clone());
                pushed[index] = true;
            }
            pool.push(plan);
        }

        let mut flags = pushed.into_iter();
        pending.retain(|_| !flags.next().unwrap_or(false));
        pool
    }

    /// Picks the cheapest pair of scan-level plans
    fn seed_join(
        &self,
        pool: &[PlanNode],
        context: &StepContext<'_>,
    ) -> Result<(Candidate, Vec<usize>)> {
        let mut best: Option<(Candidate, Vec<usize>)> = None;

        for i in 0..pool.len() {
            for j in (i + 1)..pool.len() {
                let candidate = self.build_candidate(pool[i].clone(), pool[j].clone(), context)?;
                if candidate.beats(best.as_ref().map(|(current, _)| current)) {
                    best = Some((candidate, vec![i, j]));
                }
            }
        }

        best.ok_or(PlanError::EmptyPlan)
    }

    /// Picks the cheapest scan-level plan to join onto the accumulated plan
    fn grow_join(
        &self,
        accumulated: PlanNode,
        pool: &[PlanNode],
        context: &StepContext<'_>,
    ) -> Result<(Candidate, Vec<usize>)> {
        let mut best: Option<(Candidate, Vec<usize>)> = None;

        for (index, input) in pool.iter().enumerate() {
            let candidate = self.build_candidate(accumulated.clone(), input.clone(), context)?;
            if candidate.beats(best.as_ref().map(|(current, _)| current)) {
                best = Some((candidate, vec![index]));
            }
        }

        best.ok_or(PlanError::EmptyPlan)
    }

    /// Combines two inputs into one costed candidate.
    ///
    /// The first pending `A = B` predicate with one attribute on each side turns
    /// the product into a join; every other pending predicate that becomes
    /// evaluable is stacked on top as a selection.
    fn build_candidate(
        &self,
        left: PlanNode,
        right: PlanNode,
        context: &StepContext<'_>,
    ) -> Result<Candidate> {
        let (left, left_schema) = self.restrict(left, context)?;
        let (right, right_schema) = self.restrict(right, context)?;

        let mut combined = left_schema.clone();
        combined
            .attributes
            .extend(right_schema.attributes.iter().cloned());

        let mut join_predicate: Option<Predicate> = None;
        let mut layered = Vec::new();
        let mut applied = Vec::new();

        for (index, predicate) in context.pending.iter().enumerate() {
            if join_predicate.is_none() && predicate_spans(predicate, &left_schema, &right_schema) {
                let oriented = if left_schema.contains(predicate.left_attribute().name()) {
                    predicate.clone()
                } else {
                    predicate.reversed()
                };
                join_predicate = Some(oriented);
                applied.push(index);
            } else if predicate_within(predicate, &combined) {
                layered.push(predicate.clone());
                applied.push(index);
            }
        }

        let mut plan = match join_predicate {
            Some(predicate) => PlanNode::join(left, right, predicate),
            None => PlanNode::product(left, right),
        };
        for predicate in layered {
            plan = PlanNode::selection(plan, predicate);
        }

        let cost = self.estimator.estimate(&mut plan)?.tuple_count;
        trace!("candidate {} costs {} tuples", plan, cost);

        Ok(Candidate {
            plan,
            cost,
            applied,
        })
    }

    /// Narrows an input to the attributes still required above it, when that
    /// actually drops something and the query projects at all
    fn restrict(
        &self,
        mut side: PlanNode,
        context: &StepContext<'_>,
    ) -> Result<(PlanNode, Relation)> {
        side.clear_outputs();
        let schema = self.estimator.estimate(&mut side)?.clone();

        if !self.config.push_projections || !context.has_projections {
            return Ok((side, schema));
        }

        let retained: Vec<Attribute> = schema
            .attributes
            .iter()
            .filter(|attr| context.required.contains(attr))
            .cloned()
            .collect();

        if retained.is_empty() || retained.len() == schema.width() {
            return Ok((side, schema));
        }

        let mut projected = PlanNode::projection(side, retained);
        let narrowed = self.estimator.estimate(&mut projected)?.clone();
        Ok((projected, narrowed))
    }
}
