/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::super::operators::{LogicalOperator, PlanNode};
use crate::custom_error::{PlanError, Result};
use log::trace;
use shared::{Attribute, NamedRelation, Predicate, Relation};

/// Propagates tuple counts and per-attribute value counts through a plan.
///
/// Each operator's output is a pure function of its inputs' outputs:
///
/// - Scan: copy of the base relation
/// - Projection: input tuple count, input schema filtered to the requested attributes
/// - Selection `A = v`: `ceil(T / V(A))`, with `V(A)` set to 1
/// - Selection `A = B`: `ceil(T / max(V(A), V(B)))`, with both set to `min(V(A), V(B))`
/// - Product: `T(L) * T(R)`, schemas concatenated
/// - Join on `A = B`: `ceil(T(L) * T(R) / max(V(A), V(B)))`, right attributes already on
///   the left dropped, and both join attributes set to `min(V(A), V(B))` as for Selection
#[derive(Debug, Default, Clone, Copy)]
pub struct CardinalityEstimator;

impl CardinalityEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Estimates every node of `plan` bottom-up and returns the root's output
    pub fn estimate<'p>(&self, plan: &'p mut PlanNode) -> Result<&'p Relation> {
        for input in plan.inputs_mut() {
            self.estimate(input)?;
        }
        self.estimate_node(plan)?;

        let name = plan.name();
        plan.output().ok_or(PlanError::MissingInput(name))
    }

    /// Estimates a single node whose inputs already carry an output
    pub fn estimate_node(&self, node: &mut PlanNode) -> Result<()> {
        let output = match &node.operator {
            LogicalOperator::Scan { relation } => scan_output(relation),
            LogicalOperator::Selection { input, predicate } => {
                selection_output(input_output(input, "SELECT")?, predicate)?
            }
            LogicalOperator::Projection { input, attributes } => {
                projection_output(input_output(input, "PROJECT")?, attributes)?
            }
            LogicalOperator::Product { left, right } => product_output(
                input_output(left, "PRODUCT")?,
                input_output(right, "PRODUCT")?,
            ),
            LogicalOperator::Join {
                left,
                right,
                predicate,
            } => join_output(
                input_output(left, "JOIN")?,
                input_output(right, "JOIN")?,
                predicate,
            )?,
        };

        trace!(
            "{} estimated at {} tuples over {} attributes",
            node.name(),
            output.tuple_count,
            output.width()
        );
        node.set_output(output);
        Ok(())
    }
}

fn input_output<'a>(input: &'a PlanNode, operator: &'static str) -> Result<&'a Relation> {
    input.output().ok_or(PlanError::MissingInput(operator))
}

fn lookup<'a>(relation: &'a Relation, attribute: &Attribute) -> Result<&'a Attribute> {
    relation
        .attribute(attribute.name())
        .ok_or_else(|| PlanError::AttributeNotFound(attribute.name().to_string()))
}

/// Integer division rounding up; a zero denominator is treated as 1
pub fn ceil_div(numerator: u64, denominator: u64) -> u64 {
    numerator.div_ceil(denominator.max(1))
}

pub fn scan_output(relation: &NamedRelation) -> Relation {
    Relation::with_attributes(
        relation.relation.tuple_count,
        relation.relation.attributes.to_vec(),
    )
}

/// Projection never removes duplicates, so the tuple count is unchanged
pub fn projection_output(input: &Relation, attributes: &[Attribute]) -> Result<Relation> {
    for attribute in attributes {
        lookup(input, attribute)?;
    }

    let kept = input
        .attributes
        .iter()
        .filter(|attr| attributes.contains(attr))
        .cloned()
        .collect();

    Ok(Relation::with_attributes(input.tuple_count, kept))
}

pub fn selection_output(input: &Relation, predicate: &Predicate) -> Result<Relation> {
    match predicate {
        Predicate::EqualsValue { left, .. } => {
            let attr = lookup(input, left)?;
            let tuple_count = ceil_div(input.tuple_count, attr.value_count);

            let attributes = input
                .attributes
                .iter()
                .map(|a| if a == attr { a.with_value_count(1) } else { a.clone() })
                .collect();

            Ok(Relation::with_attributes(tuple_count, attributes))
        }
        Predicate::EqualsAttribute { left, right } => {
            let left_attr = lookup(input, left)?;
            let right_attr = lookup(input, right)?;
            let max_count = left_attr.value_count.max(right_attr.value_count);
            let min_count = left_attr.value_count.min(right_attr.value_count);

            let attributes = input
                .attributes
                .iter()
                .map(|a| {
                    if a == left_attr || a == right_attr {
                        a.with_value_count(min_count)
                    } else {
                        a.clone()
                    }
                })
                .collect();

            Ok(Relation::with_attributes(
                ceil_div(input.tuple_count, max_count),
                attributes,
            ))
        }
    }
}

pub fn product_output(left: &Relation, right: &Relation) -> Relation {
    let attributes = left
        .attributes
        .iter()
        .chain(right.attributes.iter())
        .cloned()
        .collect();

    Relation::with_attributes(left.tuple_count.saturating_mul(right.tuple_count), attributes)
}

/// Join output; `predicate.left` is looked up in `left`, `predicate.right` in `right`
pub fn join_output(left: &Relation, right: &Relation, predicate: &Predicate) -> Result<Relation> {
    let (left_key, right_key) = match predicate {
        Predicate::EqualsAttribute { left, right } => (left, right),
        Predicate::EqualsValue { .. } => {
            return Err(PlanError::InvalidPredicate {
                operator: "JOIN",
                predicate: predicate.to_string(),
            })
        }
    };

    let left_attr = lookup(left, left_key)?;
    let right_attr = lookup(right, right_key)?;
    let max_count = left_attr.value_count.max(right_attr.value_count);
    let min_count = left_attr.value_count.min(right_attr.value_count);

    let narrow = |a: &Attribute| {
        if a == left_attr || a == right_attr {
            a.with_value_count(min_count)
        } else {
            a.clone()
        }
    };

    let mut attributes: Vec<Attribute> = left.attributes.iter().map(narrow).collect();
    for attr in &right.attributes {
        if !left.attributes.contains(attr) {
            attributes.push(narrow(attr));
        }
    }

    let tuple_count = ceil_div(left.tuple_count.saturating_mul(right.tuple_count), max_count);
    Ok(Relation::with_attributes(tuple_count, attributes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, tuple_count: u64, attrs: &[(&str, u64)]) -> NamedRelation {
        let mut relation = NamedRelation::new(name, tuple_count);
        for (attr, count) in attrs {
            relation.relation.add_attribute(Attribute::new(*attr, *count));
        }
        relation
    }

    fn statistics(relation: &Relation) -> (u64, Vec<(&str, u64)>) {
        let attributes = relation
            .attributes
            .iter()
            .map(|attr| (attr.name(), attr.value_count))
            .collect();
        (relation.tuple_count, attributes)
    }

    fn value_count(relation: &Relation, name: &str) -> u64 {
        relation.attribute(name).map(|a| a.value_count).unwrap()
    }

    #[test]
    fn test_scan_copies_base_statistics() {
        let base = named("R", 40, &[("a", 4), ("b", 10)]);
        let mut plan = PlanNode::scan(base.clone());
        let output = CardinalityEstimator::new().estimate(&mut plan).unwrap();
        assert_eq!(statistics(output), (40, vec![("a", 4), ("b", 10)]));
    }

    #[test]
    fn test_projection_keeps_input_order_and_count() {
        let input = Relation::with_attributes(
            12,
            vec![Attribute::new("a", 1), Attribute::new("b", 2), Attribute::new("c", 3)],
        );
        let requested = vec![Attribute::new("c", 3), Attribute::new("a", 1)];
        let output = projection_output(&input, &requested).unwrap();
        assert_eq!(output.tuple_count, 12);
        assert_eq!(output.attribute_names(), vec!["a", "c"]);
    }

    #[test]
    fn test_projection_of_unknown_attribute_fails() {
        let input = Relation::with_attributes(5, vec![Attribute::new("a", 1)]);
        let err = projection_output(&input, &[Attribute::new("z", 1)]).unwrap_err();
        assert!(matches!(err, PlanError::AttributeNotFound(name) if name == "z"));
    }

    #[test]
    fn test_selection_equals_value() {
        let input =
            Relation::with_attributes(100, vec![Attribute::new("a", 7), Attribute::new("b", 2)]);
        let predicate = Predicate::equals_value(Attribute::new("a", 7), "x");
        let output = selection_output(&input, &predicate).unwrap();
        assert_eq!(output.tuple_count, 15);
        assert_eq!(value_count(&output, "a"), 1);
        assert_eq!(value_count(&output, "b"), 2);
    }

    #[test]
    fn test_selection_equals_attribute() {
        let input = Relation::with_attributes(
            100,
            vec![Attribute::new("a", 3), Attribute::new("b", 5), Attribute::new("c", 9)],
        );
        let predicate = Predicate::equals_attribute(Attribute::new("a", 3), Attribute::new("b", 5));
        let output = selection_output(&input, &predicate).unwrap();
        assert_eq!(output.tuple_count, 20);
        assert_eq!(value_count(&output, "a"), 3);
        assert_eq!(value_count(&output, "b"), 3);
        assert_eq!(value_count(&output, "c"), 9);
    }

    #[test]
    fn test_product_concatenates() {
        let left = Relation::with_attributes(10, vec![Attribute::new("a", 1)]);
        let right =
            Relation::with_attributes(7, vec![Attribute::new("b", 1), Attribute::new("c", 1)]);
        let output = product_output(&left, &right);
        assert_eq!(output.tuple_count, 70);
        assert_eq!(output.attribute_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_join_cardinality_and_schema() {
        let left =
            Relation::with_attributes(50, vec![Attribute::new("a", 3), Attribute::new("k", 8)]);
        let right = Relation::with_attributes(
            20,
            vec![Attribute::new("b", 4), Attribute::new("k", 8), Attribute::new("d", 2)],
        );
        let predicate = Predicate::equals_attribute(Attribute::new("a", 3), Attribute::new("b", 4));
        let output = join_output(&left, &right, &predicate).unwrap();
        assert_eq!(output.tuple_count, 250);
        assert_eq!(output.attribute_names(), vec!["a", "k", "b", "d"]);
        assert_eq!(value_count(&output, "a"), 3);
        assert_eq!(value_count(&output, "b"), 3);
    }

    #[test]
    fn test_join_rejects_equals_value_predicate() {
        let left = Relation::with_attributes(1, vec![Attribute::new("a", 1)]);
        let right = Relation::with_attributes(1, vec![Attribute::new("b", 1)]);
        let predicate = Predicate::equals_value(Attribute::new("a", 1), "x");
        assert!(matches!(
            join_output(&left, &right, &predicate),
            Err(PlanError::InvalidPredicate { operator: "JOIN", .. })
        ));
    }

    #[test]
    fn test_zero_tuples_propagate() {
        let mut plan = PlanNode::selection(
            PlanNode::product(
                PlanNode::scan(named("R", 0, &[("a", 5)])),
                PlanNode::scan(named("S", 30, &[("b", 6)])),
            ),
            Predicate::equals_attribute(Attribute::new("a", 5), Attribute::new("b", 6)),
        );
        let output = CardinalityEstimator::new().estimate(&mut plan).unwrap();
        assert_eq!(output.tuple_count, 0);
    }

    #[test]
    fn test_estimate_node_requires_estimated_inputs() {
        let mut plan = PlanNode::projection(
            PlanNode::scan(named("R", 5, &[("a", 5)])),
            vec![Attribute::new("a", 5)],
        );
        let err = CardinalityEstimator::new().estimate_node(&mut plan).unwrap_err();
        assert!(matches!(err, PlanError::MissingInput("PROJECT")));
    }

    #[test]
    fn test_reestimation_is_idempotent() {
        let mut plan = PlanNode::selection(
            PlanNode::product(
                PlanNode::scan(named("R", 30, &[("a", 5)])),
                PlanNode::scan(named("S", 12, &[("b", 6)])),
            ),
            Predicate::equals_attribute(Attribute::new("a", 5), Attribute::new("b", 6)),
        );
        let estimator = CardinalityEstimator::new();
        let first = estimator.estimate(&mut plan).unwrap().clone();
        let second = estimator.estimate(&mut plan).unwrap().clone();
        assert_eq!(statistics(&first), statistics(&second));
        assert_eq!(statistics(&first), (60, vec![("a", 5), ("b", 5)]));
    }
}
