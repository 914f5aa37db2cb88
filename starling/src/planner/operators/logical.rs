/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use shared::{Attribute, NamedRelation, Predicate, Relation};
use std::fmt;

/// Logical operators of the relational algebra a plan is built from
#[derive(Debug, Clone)]
pub enum LogicalOperator {
    Scan {
        relation: NamedRelation,
    },
    Selection {
        input: Box<PlanNode>,
        predicate: Predicate,
    },
    Projection {
        input: Box<PlanNode>,
        attributes: Vec<Attribute>,
    },
    Product {
        left: Box<PlanNode>,
        right: Box<PlanNode>,
    },
    Join {
        left: Box<PlanNode>,
        right: Box<PlanNode>,
        predicate: Predicate,
    },
}

/// One node of an operator tree plus its cached output statistics.
///
/// `output` is written by the estimator and stays `None` until the node has
/// been estimated. A node reused in a different candidate plan must have its
/// cache cleared before it is estimated again.
#[derive(Debug, Clone)]
pub struct PlanNode {
    pub operator: LogicalOperator,
    output: Option<Relation>,
}

impl LogicalOperator {
    /// Short upper-case operator name used in plan renderings and errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scan { .. } => "SCAN",
            Self::Selection { .. } => "SELECT",
            Self::Projection { .. } => "PROJECT",
            Self::Product { .. } => "PRODUCT",
            Self::Join { .. } => "JOIN",
        }
    }
}

impl PlanNode {
    fn new(operator: LogicalOperator) -> Self {
        Self {
            operator,
            output: None,
        }
    }

    /// Creates a new scan over a base relation
    pub fn scan(relation: NamedRelation) -> Self {
        Self::new(LogicalOperator::Scan { relation })
    }

    /// Creates a new selection over `input`
    pub fn selection(input: PlanNode, predicate: Predicate) -> Self {
        Self::new(LogicalOperator::Selection {
            input: Box::new(input),
            predicate,
        })
    }

    /// Creates a new projection of `input` onto `attributes`
    pub fn projection(input: PlanNode, attributes: Vec<Attribute>) -> Self {
        Self::new(LogicalOperator::Projection {
            input: Box::new(input),
            attributes,
        })
    }

    /// Creates a new cross product
    pub fn product(left: PlanNode, right: PlanNode) -> Self {
        Self::new(LogicalOperator::Product {
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Creates a new equi-join; the predicate's left attribute must come from `left`
    pub fn join(left: PlanNode, right: PlanNode, predicate: Predicate) -> Self {
        Self::new(LogicalOperator::Join {
            left: Box::new(left),
            right: Box::new(right),
            predicate,
        })
    }

    pub fn output(&self) -> Option<&Relation> {
        self.output.as_ref()
    }

    pub fn set_output(&mut self, output: Relation) {
        self.output = Some(output);
    }

    pub fn clear_output(&mut self) {
        self.output = None;
    }

    /// Clears the cached output of this node and of every node below it
    pub fn clear_outputs(&mut self) {
        self.clear_output();
        for input in self.inputs_mut() {
            input.clear_outputs();
        }
    }

    pub fn name(&self) -> &'static str {
        self.operator.name()
    }

    /// Child nodes, left before right
    pub fn inputs(&self) -> Vec<&PlanNode> {
        match &self.operator {
            LogicalOperator::Scan { .. } => Vec::new(),
            LogicalOperator::Selection { input, .. }
            | LogicalOperator::Projection { input, .. } => vec![input.as_ref()],
            LogicalOperator::Product { left, right }
            | LogicalOperator::Join { left, right, .. } => vec![left.as_ref(), right.as_ref()],
        }
    }

    pub fn inputs_mut(&mut self) -> Vec<&mut PlanNode> {
        match &mut self.operator {
            LogicalOperator::Scan { .. } => Vec::new(),
            LogicalOperator::Selection { input, .. }
            | LogicalOperator::Projection { input, .. } => vec![input.as_mut()],
            LogicalOperator::Product { left, right }
            | LogicalOperator::Join { left, right, .. } => vec![left.as_mut(), right.as_mut()],
        }
    }

    /// Base relations scanned by this plan, in left-to-right order
    pub fn scans(&self) -> Vec<&NamedRelation> {
        let mut scans = Vec::new();
        self.collect_scans(&mut scans);
        scans
    }

    fn collect_scans<'a>(&'a self, scans: &mut Vec<&'a NamedRelation>) {
        if let LogicalOperator::Scan { relation } = &self.operator {
            scans.push(relation);
        }
        for input in self.inputs() {
            input.collect_scans(scans);
        }
    }

    pub fn contains_join(&self) -> bool {
        matches!(self.operator, LogicalOperator::Join { .. })
            || self.inputs().iter().any(|input| input.contains_join())
    }

    /// Number of operators on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        1 + self
            .inputs()
            .iter()
            .map(|input| input.depth())
            .max()
            .unwrap_or(0)
    }
}

fn write_attribute_list(f: &mut fmt::Formatter<'_>, attributes: &[Attribute]) -> fmt::Result {
    let names: Vec<&str> = attributes.iter().map(|attr| attr.name()).collect();
    write!(f, "[{}]", names.join(","))
}

impl fmt::Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operator {
            LogicalOperator::Scan { relation } => write!(f, "SCAN [{}]", relation.name()),
            LogicalOperator::Selection { input, predicate } => {
                write!(f, "SELECT [{}] ({})", predicate, input)
            }
            LogicalOperator::Projection { input, attributes } => {
                write!(f, "PROJECT ")?;
                write_attribute_list(f, attributes)?;
                write!(f, " ({})", input)
            }
            LogicalOperator::Product { left, right } => {
                write!(f, "PRODUCT ({},{})", left, right)
            }
            LogicalOperator::Join {
                left,
                right,
                predicate,
            } => write!(f, "JOIN [{}] ({},{})", predicate, left, right),
        }
    }
}
