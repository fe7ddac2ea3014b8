//! How names without a learned MBID get their target entity

use super::relationship::RelationshipDraft;
use crate::client::EntityProvider;
use crate::entity::Entity;
use crate::{ResolveError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Human confirmation step
///
/// Shows a pre-filled draft and waits until it is closed. Returns the
/// selected entity, or `None` if the draft was dismissed.
#[async_trait]
pub trait ConfirmationSurface: Send + Sync {
    async fn confirm(&self, draft: &RelationshipDraft) -> Result<Option<Entity>>;
}

/// Resolution mode, chosen once per batch
#[async_trait]
pub trait ResolutionStrategy: Send + Sync {
    /// Target for a name the name cache does not know
    async fn unresolved_target(&self, entity_type: &str, name: &str) -> Result<Entity>;

    /// Completes a draft whose target is still a placeholder
    async fn confirm(&self, draft: &RelationshipDraft) -> Result<Option<Entity>>;
}

/// Takes the first search result, never asks
pub struct AutomaticResolution {
    provider: Arc<dyn EntityProvider>,
}

impl AutomaticResolution {
    pub fn new(provider: Arc<dyn EntityProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ResolutionStrategy for AutomaticResolution {
    async fn unresolved_target(&self, entity_type: &str, name: &str) -> Result<Entity> {
        let results = self.provider.search_entity(entity_type, name).await?;
        let first = results.into_iter().next().ok_or_else(|| ResolveError::NoMatch {
            entity_type: entity_type.to_string(),
            name: name.to_string(),
        })?;
        debug!(name = %name, mbid = ?first.id, "Using first search result");
        Ok(first)
    }

    async fn confirm(&self, _draft: &RelationshipDraft) -> Result<Option<Entity>> {
        Ok(None)
    }
}

/// Leaves the choice to an operator
pub struct ManualResolution {
    surface: Arc<dyn ConfirmationSurface>,
}

impl ManualResolution {
    pub fn new(surface: Arc<dyn ConfirmationSurface>) -> Self {
        Self { surface }
    }
}

#[async_trait]
impl ResolutionStrategy for ManualResolution {
    async fn unresolved_target(&self, entity_type: &str, name: &str) -> Result<Entity> {
        Ok(Entity::placeholder(name, entity_type))
    }

    async fn confirm(&self, draft: &RelationshipDraft) -> Result<Option<Entity>> {
        self.surface.confirm(draft).await
    }
}
