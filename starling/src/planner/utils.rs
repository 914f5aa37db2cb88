/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::operators::{LogicalOperator, PlanNode};
use shared::{Attribute, NamedRelation, Predicate, Relation};

/// The operators of a plan, pulled apart by kind in post-order
#[derive(Debug, Clone, Default)]
pub struct FlattenedPlan {
    pub scans: Vec<NamedRelation>,
    pub products: usize,
    pub predicates: Vec<Predicate>,
    /// Projections on the path from the root down to the first product or join
    pub projections: Vec<Vec<Attribute>>,
    /// Projections found below a product or join
    pub inner_projections: usize,
}

/// Decomposes a plan into scans, products, selection predicates and projections.
///
/// A join counts as a product plus its predicate, so an optimised plan can be
/// flattened and rewritten again. Projections below a product or join are only
/// counted: the rewrite narrows join inputs on its own.
pub fn flatten(plan: &PlanNode) -> FlattenedPlan {
    let mut flattened = FlattenedPlan::default();
    collect_operators(plan, true, &mut flattened);
    flattened
}

fn collect_operators(plan: &PlanNode, on_root_path: bool, flattened: &mut FlattenedPlan) {
    match &plan.operator {
        LogicalOperator::Scan { relation } => {
            flattened.scans.push(relation.clone());
        }
        LogicalOperator::Selection { input, predicate } => {
            collect_operators(input, on_root_path, flattened);
            flattened.predicates.push(predicate.clone());
        }
        LogicalOperator::Projection { input, attributes } => {
            collect_operators(input, on_root_path, flattened);
            if on_root_path {
                flattened.projections.push(attributes.clone());
            } else {
                flattened.inner_projections += 1;
            }
        }
        LogicalOperator::Product { left, right } => {
            collect_operators(left, false, flattened);
            collect_operators(right, false, flattened);
            flattened.products += 1;
        }
        LogicalOperator::Join {
            left,
            right,
            predicate,
        } => {
            collect_operators(left, false, flattened);
            collect_operators(right, false, flattened);
            flattened.products += 1;
            flattened.predicates.push(predicate.clone());
        }
    }
}

/// Attributes a rewrite must keep visible: everything a projection names plus
/// every attribute of a predicate that has not been applied yet
pub fn required_attributes(
    projections: &[Vec<Attribute>],
    pending: &[Predicate],
) -> Vec<Attribute> {
    let mut required: Vec<Attribute> = Vec::new();

    let predicate_attributes = pending.iter().flat_map(|p| p.attributes());
    let projected_attributes = projections.iter().flatten();

    for attr in predicate_attributes.chain(projected_attributes) {
        if !required.contains(attr) {
            required.push(attr.clone());
        }
    }
    required
}

/// True when every attribute of `predicate` is in `schema`
pub fn predicate_within(predicate: &Predicate, schema: &Relation) -> bool {
    predicate
        .attributes()
        .iter()
        .all(|attr| schema.contains(attr.name()))
}

/// True for an `A = B` predicate with one attribute in each schema
pub fn predicate_spans(predicate: &Predicate, left: &Relation, right: &Relation) -> bool {
    let (a, b) = match predicate.right_attribute() {
        Some(b) => (predicate.left_attribute(), b),
        None => return false,
    };
    (left.contains(a.name()) && right.contains(b.name()))
        || (left.contains(b.name()) && right.contains(a.name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(name: &str, attrs: &[&str]) -> PlanNode {
        let mut relation = NamedRelation::new(name, 10);
        for attr in attrs {
            relation.relation.add_attribute(Attribute::new(*attr, 5));
        }
        PlanNode::scan(relation)
    }

    #[test]
    fn test_flatten_canonical_plan() {
        let plan = PlanNode::projection(
            PlanNode::selection(
                PlanNode::selection(
                    PlanNode::product(
                        PlanNode::product(scan("R", &["a"]), scan("S", &["b"])),
                        scan("T", &["c"]),
                    ),
                    Predicate::equals_attribute(Attribute::new("a", 5), Attribute::new("b", 5)),
                ),
                Predicate::equals_value(Attribute::new("c", 5), "x"),
            ),
            vec![Attribute::new("a", 5)],
        );

        let flattened = flatten(&plan);
        let names: Vec<&str> = flattened.scans.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["R", "S", "T"]);
        assert_eq!(flattened.products, 2);
        assert_eq!(flattened.predicates.len(), 2);
        assert!(matches!(flattened.predicates[0], Predicate::EqualsAttribute { .. }));
        assert_eq!(flattened.projections, vec![vec![Attribute::new("a", 5)]]);
    }

    #[test]
    fn test_flatten_decomposes_join() {
        let predicate = Predicate::equals_attribute(Attribute::new("a", 5), Attribute::new("b", 5));
        let plan = PlanNode::join(scan("R", &["a"]), scan("S", &["b"]), predicate.clone());
        let flattened = flatten(&plan);
        assert_eq!(flattened.products, 1);
        assert_eq!(flattened.predicates, vec![predicate]);
    }

    #[test]
    fn test_flatten_separates_inner_projections() {
        let plan = PlanNode::projection(
            PlanNode::product(
                PlanNode::projection(scan("R", &["a", "x"]), vec![Attribute::new("x", 5)]),
                scan("S", &["b"]),
            ),
            vec![Attribute::new("x", 5)],
        );
        let flattened = flatten(&plan);
        assert_eq!(flattened.projections, vec![vec![Attribute::new("x", 5)]]);
        assert_eq!(flattened.inner_projections, 1);
    }

    #[test]
    fn test_required_attributes_deduplicates() {
        let pending = vec![Predicate::equals_attribute(
            Attribute::new("a", 5),
            Attribute::new("b", 5),
        )];
        let projections = vec![vec![Attribute::new("b", 5), Attribute::new("c", 5)]];
        let required = required_attributes(&projections, &pending);
        let names: Vec<&str> = required.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_predicate_spans_either_orientation() {
        let left = Relation::with_attributes(1, vec![Attribute::new("b", 1)]);
        let right = Relation::with_attributes(1, vec![Attribute::new("a", 1)]);
        let predicate = Predicate::equals_attribute(Attribute::new("a", 1), Attribute::new("b", 1));
        assert!(predicate_spans(&predicate, &left, &right));
        assert!(!predicate_spans(&predicate, &left, &left));
        assert!(!predicate_within(&predicate, &left));

        let literal = Predicate::equals_value(Attribute::new("b", 1), "x");
        assert!(!predicate_spans(&literal, &left, &right));
    }
}
