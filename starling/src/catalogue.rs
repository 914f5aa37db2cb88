/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::custom_error::{PlanError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use shared::{Attribute, NamedRelation};
use std::path::Path;

/// Base relations and their statistics, keyed by relation name.
///
/// Attribute names are unique across the whole catalogue, so a bare attribute
/// name in a query resolves to exactly one relation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalogue {
    relations: Vec<NamedRelation>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a JSON catalogue
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: Catalogue = serde_json::from_str(json)?;

        let mut catalogue = Catalogue::new();
        for named in parsed.relations {
            let name = named.name.as_str();
            catalogue.create_relation(name, named.relation.tuple_count)?;
            for attr in &named.relation.attributes {
                catalogue.create_attribute(name, &attr.name, attr.value_count)?;
            }
            debug!(
                "relation {} with {} tuples over ({})",
                name,
                named.relation.tuple_count,
                named.relation.attribute_names().join(", ")
            );
        }

        debug!("loaded catalogue with {} relations", catalogue.relations.len());
        Ok(catalogue)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Registers a new, empty base relation
    pub fn create_relation(
        &mut self,
        name: &str,
        tuple_count: u64,
    ) -> Result<&mut NamedRelation> {
        if self.relation(name).is_some() {
            return Err(PlanError::DuplicateRelation(name.to_string()));
        }
        self.relations.push(NamedRelation::new(name, tuple_count));
        let index = self.relations.len() - 1;
        Ok(&mut self.relations[index])
    }

    /// Adds an attribute to an already registered relation
    pub fn create_attribute(
        &mut self,
        relation: &str,
        name: &str,
        value_count: u64,
    ) -> Result<()> {
        if value_count == 0 {
            return Err(PlanError::InvalidStatistics(format!(
                "attribute {} must have a positive value count",
                name
            )));
        }
        if self.attribute(name).is_some() {
            return Err(PlanError::DuplicateAttribute(name.to_string()));
        }

        let target = self
            .relations
            .iter_mut()
            .find(|named| named.name == relation)
            .ok_or_else(|| PlanError::UnknownRelation(relation.to_string()))?;
        target.relation.add_attribute(Attribute::new(name, value_count));
        Ok(())
    }

    pub fn relation(&self, name: &str) -> Option<&NamedRelation> {
        self.relations.iter().find(|named| named.name == name)
    }

    /// Finds an attribute by name in any relation
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.relations
            .iter()
            .find_map(|named| named.relation.attribute(name))
    }

    pub fn relations(&self) -> &[NamedRelation] {
        &self.relations
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}
