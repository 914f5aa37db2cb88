/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::planner::{LogicalOperator, PlanNode};
use shared::Relation;

/// Renders plans as an indented tree, one operator per line.
///
/// Nodes that carry estimates are suffixed with their tuple count and
/// `name:value_count` schema.
#[derive(Debug, Clone)]
pub struct Inspector {
    indent: usize,
}

impl Default for Inspector {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl Inspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(indent: usize) -> Self {
        Self { indent }
    }

    pub fn render(&self, plan: &PlanNode) -> String {
        let mut out = String::new();
        self.render_node(plan, 0, &mut out);
        out
    }

    fn render_node(&self, node: &PlanNode, depth: usize, out: &mut String) {
        out.push_str(&" ".repeat(depth * self.indent));
        out.push_str(&label(node));
        if let Some(output) = node.output() {
            out.push_str("  ");
            out.push_str(&annotation(output));
        }
        out.push('\n');

        for input in node.inputs() {
            self.render_node(input, depth + 1, out);
        }
    }
}

fn label(node: &PlanNode) -> String {
    match &node.operator {
        LogicalOperator::Scan { relation } => format!("SCAN [{}]", relation.name()),
        LogicalOperator::Selection { predicate, .. } => format!("SELECT [{}]", predicate),
        LogicalOperator::Projection { attributes, .. } => {
            let names: Vec<&str> = attributes.iter().map(|attr| attr.name()).collect();
            format!("PROJECT [{}]", names.join(","))
        }
        LogicalOperator::Product { .. } => "PRODUCT".to_string(),
        LogicalOperator::Join { predicate, .. } => format!("JOIN [{}]", predicate),
    }
}

fn annotation(output: &Relation) -> String {
    let mut text = format!("T={}", output.tuple_count);
    if !output.attributes.is_empty() {
        let schema: Vec<String> = output
            .attributes
            .iter()
            .map(|attr| format!("{}:{}", attr.name(), attr.value_count()))
            .collect();
        text.push_str(&format!(" {{{}}}", schema.join(", ")));
    }
    text
}
