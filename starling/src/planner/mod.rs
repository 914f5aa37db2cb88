/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Cardinality estimation and greedy rewriting of relational algebra plans
//!
//! This module holds the two passes a plan goes through:
//!
//! - Estimation: tuple counts and per-attribute value counts are propagated
//!   bottom-up and cached on every node
//! - Optimisation: selections move onto scans, join order is chosen greedily by
//!   estimated output size, products become joins, and projections narrow
//!   join inputs
//!
//! ## Architecture
//!
//! - `operators`: the plan tree (`PlanNode`, `LogicalOperator`)
//! - `cost`: the cardinality estimator
//! - `optimiser`: the greedy join-order search and pushdown rules
//! - `types`: optimiser configuration and search candidates
//! - `utils`: plan flattening and attribute bookkeeping
//!
//! ## Usage
//!
//! ```rust
//! use shared::{Attribute, NamedRelation, Predicate};
//! use starling::planner::{CardinalityEstimator, Optimiser, PlanNode};
//!
//! let mut r = NamedRelation::new("R", 100);
//! r.relation.add_attribute(Attribute::new("a", 10));
//! let mut s = NamedRelation::new("S", 50);
//! s.relation.add_attribute(Attribute::new("b", 25));
//!
//! let canonical = PlanNode::selection(
//!     PlanNode::product(PlanNode::scan(r), PlanNode::scan(s)),
//!     Predicate::equals_attribute(Attribute::new("a", 10), Attribute::new("b", 25)),
//! );
//!
//! let mut optimised = Optimiser::new().optimise(&canonical).unwrap();
//! let output = CardinalityEstimator::new().estimate(&mut optimised).unwrap();
//! assert_eq!(output.tuple_count, 200);
//! ```

pub mod cost;
pub mod operators;
pub mod optimiser;
pub mod types;
pub mod utils;

pub use cost::CardinalityEstimator;
pub use operators::{LogicalOperator, PlanNode};
pub use optimiser::Optimiser;
pub use types::{Candidate, OptimiserConfig};
pub use utils::{flatten, required_attributes, FlattenedPlan};
