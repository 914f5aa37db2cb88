/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub mod catalogue;
pub mod custom_error;
pub mod inspector;
pub mod parser;
pub mod planner;
pub mod query_engine;

pub use catalogue::Catalogue;
pub use custom_error::{PlanError, Result};
pub use inspector::Inspector;
pub use query_engine::{QueryEngine, QueryExplanation};
