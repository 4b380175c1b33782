//! Variable entities

use serde::{Deserialize, Serialize};
use std::fmt;

/// The thing a row of a value table describes: an entity type plus an identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariableEntity {
    #[serde(rename = "type")]
    entity_type: String,
    identifier: String,
}

impl VariableEntity {
    pub fn new(entity_type: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            identifier: identifier.into(),
        }
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl fmt::Display for VariableEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.identifier)
    }
}
