//! Entities as returned by the MusicBrainz internal JSON API (`/ws/js`)

use serde::{Deserialize, Serialize};

/// A canonical rights holder (label, artist, ...) or a placeholder for one
///
/// Placeholders carry only a name and type; they are never cached and are
/// replaced by the entity the operator confirms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// MBID, absent for placeholders
    #[serde(rename = "gid", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Entity name
    pub name: String,

    /// Entity type, e.g. `label`, `release`, `recording`
    #[serde(rename = "entityType", default)]
    pub entity_type: String,
}

impl Entity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            entity_type: entity_type.into(),
        }
    }

    /// Name-only entity awaiting confirmation
    pub fn placeholder(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            entity_type: entity_type.into(),
        }
    }

    /// Whether the entity has an identity
    pub fn is_resolved(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }
}
