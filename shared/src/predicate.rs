/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::attribute::Attribute;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An equality condition, either `attr = literal` or `attr = attr`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Predicate {
    EqualsValue { left: Attribute, value: String },
    EqualsAttribute { left: Attribute, right: Attribute },
}

impl Predicate {
    pub fn equals_value(left: Attribute, value: impl Into<String>) -> Self {
        Self::EqualsValue {
            left,
            value: value.into(),
        }
    }

    pub fn equals_attribute(left: Attribute, right: Attribute) -> Self {
        Self::EqualsAttribute { left, right }
    }

    pub fn left_attribute(&self) -> &Attribute {
        match self {
            Self::EqualsValue { left, .. } | Self::EqualsAttribute { left, .. } => left,
        }
    }

    pub fn right_attribute(&self) -> Option<&Attribute> {
        match self {
            Self::EqualsValue { .. } => None,
            Self::EqualsAttribute { right, .. } => Some(right),
        }
    }

    /// Every attribute the predicate references, left first
    pub fn attributes(&self) -> Vec<&Attribute> {
        match self {
            Self::EqualsValue { left, .. } => vec![left],
            Self::EqualsAttribute { left, right } => vec![left, right],
        }
    }

    /// Swaps the sides of an `attr = attr` predicate
    pub fn reversed(&self) -> Self {
        match self {
            Self::EqualsValue { .. } => self.clone(),
            Self::EqualsAttribute { left, right } => Self::EqualsAttribute {
                left: right.clone(),
                right: left.clone(),
            },
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EqualsValue { left, value } => write!(f, "{}=\"{}\"", left, value),
            Self::EqualsAttribute { left, right } => write!(f, "{}={}", left, right),
        }
    }
}
