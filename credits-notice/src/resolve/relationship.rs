//! Relationships and the editor they are handed to

use crate::entity::Entity;
use crate::link_types::is_backward;
use crate::notice::StatementType;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

/// A new relationship between two entities
///
/// `entity0`/`entity1` follow the MusicBrainz entity type order, so the
/// source may end up as either of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Negative id, unique within the session
    pub id: i64,
    pub entity0: Entity,
    pub entity1: Entity,
    pub link_type_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_year: Option<String>,
}

impl Relationship {
    /// Relationship from `source` to `target`, dated to `year` if known
    pub fn between(id: i64, source: Entity, target: Entity, link_type_id: u32, year: Option<String>) -> Self {
        let (entity0, entity1) = if is_backward(&source.entity_type, &target.entity_type) {
            (target, source)
        } else {
            (source, target)
        };
        Self {
            id,
            entity0,
            entity1,
            link_type_id,
            begin_year: year.clone(),
            end_year: year,
        }
    }
}

/// Pre-filled relationship(s) awaiting a target
///
/// One draft covers a single source (the release) or a batch of sources
/// (the selected recordings) that all link to the same target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDraft {
    pub sources: Vec<Entity>,
    /// Resolved entity or name-only placeholder
    pub target: Entity,
    pub link_type_id: u32,
    pub statement_type: StatementType,
    /// Owner name as written in the credits
    pub name: String,
    pub year: Option<String>,
}

impl RelationshipDraft {
    /// One relationship per source, each taking the next id
    pub fn into_relationships(self, target: &Entity, ids: &dyn IdGenerator) -> Vec<Relationship> {
        let link_type_id = self.link_type_id;
        let year = self.year;
        self.sources
            .into_iter()
            .map(|source| Relationship::between(ids.next_id(), source, target.clone(), link_type_id, year.clone()))
            .collect()
    }
}

/// Receiver of new relationships
#[async_trait]
pub trait RelationshipEditor: Send + Sync {
    async fn create_relationship(&self, relationship: Relationship) -> Result<()>;

    /// Adds a batch, stopping at the first rejected relationship
    async fn create_relationships(&self, relationships: Vec<Relationship>) -> Result<()> {
        for relationship in relationships {
            self.create_relationship(relationship).await?;
        }
        Ok(())
    }
}

/// Source of relationship ids
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> i64;
}

/// Ids counting up from `i64::MIN`
///
/// Stays clear of the ids the server hands out, which count down from -1.
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicI64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::starting_at(i64::MIN)
    }

    pub fn starting_at(first: i64) -> Self {
        Self {
            next: AtomicI64::new(first),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> i64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}
