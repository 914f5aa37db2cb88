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

/// Output statistics of a (sub)plan: an estimated tuple count and an ordered schema.
///
/// Equality compares the tuple count and the attribute names only, since
/// `Attribute` equality ignores value counts. Compare `value_count`s
/// explicitly when the statistics themselves matter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub tuple_count: u64,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl Relation {
    pub fn new(tuple_count: u64) -> Self {
        Self {
            tuple_count,
            attributes: Vec::new(),
        }
    }

    pub fn with_attributes(tuple_count: u64, attributes: Vec<Attribute>) -> Self {
        Self {
            tuple_count,
            attributes,
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// Looks up an attribute of this schema by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|attr| attr.name.as_str()).collect()
    }

    /// Number of attributes in the schema
    pub fn width(&self) -> usize {
        self.attributes.len()
    }
}

/// A base relation as registered in the catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRelation {
    pub name: String,
    #[serde(flatten)]
    pub relation: Relation,
}

impl NamedRelation {
    pub fn new(name: impl Into<String>, tuple_count: u64) -> Self {
        Self {
            name: name.into(),
            relation: Relation::new(tuple_count),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
