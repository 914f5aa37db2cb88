/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::operators::PlanNode;
use serde::{Deserialize, Serialize};

/// Configuration for the rewrite passes of the optimiser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimiserConfig {
    /// Move `attr = literal` selections (and single-relation `attr = attr` ones) onto their scans
    pub push_selections: bool,
    /// Narrow join inputs to the attributes still needed above them
    pub push_projections: bool,
}

impl Default for OptimiserConfig {
    fn default() -> Self {
        Self {
            push_selections: true,
            push_projections: true,
        }
    }
}

/// One costed join step considered by the greedy search
#[derive(Debug, Clone)]
pub struct Candidate {
    pub plan: PlanNode,
    /// Estimated output tuple count of `plan`
    pub cost: u64,
    /// Indices into the pending predicate list consumed by `plan`
    pub applied: Vec<usize>,
}

impl Candidate {
    /// True when this candidate should replace `best`; ties keep the earlier one
    pub fn beats(&self, best: Option<&Candidate>) -> bool {
        best.map_or(true, |best| self.cost < best.cost)
    }
}
