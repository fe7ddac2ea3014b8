//! Resolution of copyright statements to relationships
//!
//! For every statement the owner name is mapped to a label:
//! 1. learned MBID from the name cache, entity fetched via the entity cache;
//! 2. otherwise the batch's [`ResolutionStrategy`] supplies the target
//!    (first search result, or a placeholder for the operator to complete).
//!
//! Each statement type then becomes one relationship from the edited release.
//! Identities the operator confirms are learned for the next time the name
//! shows up. Statements are handled strictly one after another; a failing
//! statement is logged and skipped.

mod relationship;
mod strategy;

pub use relationship::{IdGenerator, Relationship, RelationshipDraft, RelationshipEditor, SequentialIds};
pub use strategy::{AutomaticResolution, ConfirmationSurface, ManualResolution, ResolutionStrategy};

use crate::cache::MemoCache;
use crate::entity::Entity;
use crate::link_types::link_type_id;
use crate::notice::{CopyrightStatement, StatementType};
use crate::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Entity type all owner names are resolved to
pub const TARGET_ENTITY_TYPE: &str = "label";

/// Drives cache lookups, confirmations and relationship creation
pub struct Orchestrator {
    /// Entity the relationships are added to (the edited release)
    source: Entity,
    /// Recordings that also receive ℗ relationships
    recordings: Vec<Entity>,
    entity_cache: Arc<MemoCache<String, Entity>>,
    name_cache: Arc<MemoCache<(String, String), String>>,
    editor: Arc<dyn RelationshipEditor>,
    ids: Arc<dyn IdGenerator>,
}

impl Orchestrator {
    pub fn new(
        source: Entity,
        entity_cache: Arc<MemoCache<String, Entity>>,
        name_cache: Arc<MemoCache<(String, String), String>>,
        editor: Arc<dyn RelationshipEditor>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            source,
            recordings: Vec::new(),
            entity_cache,
            name_cache,
            editor,
            ids,
        }
    }

    /// Selected recordings for the ℗ batch
    pub fn with_recordings(mut self, recordings: Vec<Entity>) -> Self {
        self.recordings = recordings;
        self
    }

    pub fn name_cache(&self) -> &MemoCache<(String, String), String> {
        &self.name_cache
    }

    /// Creates relationships for all `statements`, in order
    ///
    /// Returns whether at least one relationship was created.
    pub async fn resolve_and_create(
        &self,
        statements: &[CopyrightStatement],
        strategy: &dyn ResolutionStrategy,
    ) -> bool {
        let mut created = 0;

        for statement in statements {
            if let Err(e) = self.process_statement(statement, strategy, &mut created).await {
                warn!(
                    name = %statement.name,
                    error = %e,
                    "Skipping copyright statement"
                );
            }
        }

        info!(
            statements = statements.len(),
            relationships = created,
            "Copyright statements processed"
        );
        created > 0
    }

    async fn process_statement(
        &self,
        statement: &CopyrightStatement,
        strategy: &dyn ResolutionStrategy,
        created: &mut usize,
    ) -> Result<()> {
        let mut target = self.initial_target(statement, strategy).await?;

        for statement_type in &statement.types {
            let Some(release_link) = link_type_id(
                &self.source.entity_type,
                &target.entity_type,
                statement_type,
                statement.license_direction,
            ) else {
                warn!(
                    name = %statement.name,
                    statement_type = %statement_type,
                    "No relationship type for statement, skipping"
                );
                continue;
            };

            let draft = self.draft(vec![self.source.clone()], &target, release_link, statement, statement_type);
            target = self.settle(draft, strategy, created).await?;

            if *statement_type == StatementType::Phonographic && !self.recordings.is_empty() {
                self.add_recording_batch(&target, statement, created).await?;
            }
        }
        Ok(())
    }

    /// Learned entity for the statement's name, else the strategy's choice
    async fn initial_target(
        &self,
        statement: &CopyrightStatement,
        strategy: &dyn ResolutionStrategy,
    ) -> Result<Entity> {
        let key = (TARGET_ENTITY_TYPE.to_string(), statement.name.clone());
        if let Some(mbid) = self.name_cache.get(key).await? {
            if let Some(entity) = self.entity_cache.get(mbid.clone()).await? {
                debug!(name = %statement.name, mbid = %mbid, "Name resolved from cache");
                return Ok(entity);
            }
        }
        strategy.unresolved_target(TARGET_ENTITY_TYPE, &statement.name).await
    }

    /// Creates the draft's relationships, asking for confirmation if needed
    ///
    /// Returns the entity later types of the same statement should use: the
    /// confirmed one, or the unchanged placeholder after a dismissal.
    async fn settle(
        &self,
        draft: RelationshipDraft,
        strategy: &dyn ResolutionStrategy,
        created: &mut usize,
    ) -> Result<Entity> {
        if draft.target.is_resolved() {
            let target = draft.target.clone();
            self.create(draft, &target, created).await?;
            return Ok(target);
        }

        let placeholder = draft.target.clone();
        match strategy.confirm(&draft).await? {
            Some(entity) if entity.is_resolved() => {
                self.learn(&draft.name, &entity);
                self.create(draft, &entity, created).await?;
                Ok(entity)
            }
            _ => {
                debug!(name = %draft.name, link_type_id = draft.link_type_id, "Relationship dismissed");
                Ok(placeholder)
            }
        }
    }

    /// ℗ relationships from every selected recording to the statement's owner
    async fn add_recording_batch(
        &self,
        target: &Entity,
        statement: &CopyrightStatement,
        created: &mut usize,
    ) -> Result<()> {
        if !target.is_resolved() {
            debug!(name = %statement.name, "Owner unresolved, skipping recording relationships");
            return Ok(());
        }
        let Some(recording_link) = link_type_id(
            "recording",
            &target.entity_type,
            &StatementType::Phonographic,
            None,
        ) else {
            return Ok(());
        };

        let draft = self.draft(
            self.recordings.clone(),
            target,
            recording_link,
            statement,
            &StatementType::Phonographic,
        );
        self.create(draft, target, created).await
    }

    fn draft(
        &self,
        sources: Vec<Entity>,
        target: &Entity,
        link_type_id: u32,
        statement: &CopyrightStatement,
        statement_type: &StatementType,
    ) -> RelationshipDraft {
        RelationshipDraft {
            sources,
            target: target.clone(),
            link_type_id,
            statement_type: statement_type.clone(),
            name: statement.name.clone(),
            year: statement.year.clone(),
        }
    }

    async fn create(&self, draft: RelationshipDraft, target: &Entity, created: &mut usize) -> Result<()> {
        let relationships = draft.into_relationships(target, self.ids.as_ref());
        let count = relationships.len();

        if count == 1 {
            if let Some(relationship) = relationships.into_iter().next() {
                self.editor.create_relationship(relationship).await?;
            }
        } else {
            self.editor.create_relationships(relationships).await?;
        }

        *created += count;
        debug!(target = %target.name, relationships = count, "Relationships created");
        Ok(())
    }

    /// Remembers the operator's choice for `name`
    fn learn(&self, name: &str, entity: &Entity) {
        if let Some(mbid) = &entity.id {
            self.name_cache
                .set(vec![entity.entity_type.clone(), name.to_string()], mbid.clone());
            self.entity_cache.set(vec![mbid.clone()], entity.clone());
            info!(name = %name, mbid = %mbid, "Learned name mapping");
        }
    }
}
