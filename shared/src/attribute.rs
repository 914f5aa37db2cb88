/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A named column together with its estimated number of distinct values.
///
/// Two attributes are the same attribute when their names match; the value
/// count is a statistic carried along, not part of the identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value_count: u64,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value_count: u64) -> Self {
        Self {
            name: name.into(),
            value_count,
        }
    }

    /// Fresh copy of this attribute with a different value count
    pub fn with_value_count(&self, value_count: u64) -> Self {
        Self {
            name: self.name.clone(),
            value_count,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_count(&self) -> u64 {
        self.value_count
    }
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Attribute {}

impl Hash for Attribute {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity_ignores_value_count() {
        let a = Attribute::new("persid", 400);
        let b = Attribute::new("persid", 1);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_with_value_count_copies() {
        let a = Attribute::new("age", 47);
        let b = a.with_value_count(1);
        assert_eq!(a.value_count(), 47);
        assert_eq!(b.value_count(), 1);
        assert_eq!(b.name(), "age");
    }
}
