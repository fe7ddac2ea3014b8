//! Test doubles for the resolution workflow

#![allow(dead_code)]

use async_trait::async_trait;
use credits_notice::cache::{entity_cache, name_cache, MemoCache};
use credits_notice::client::{EntityProvider, MBError};
use credits_notice::resolve::{
    ConfirmationSurface, Orchestrator, Relationship, RelationshipDraft, RelationshipEditor, SequentialIds,
};
use credits_notice::{Entity, ResolveError, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const RELEASE_ID: &str = "release-1";

pub fn release() -> Entity {
    Entity::new(RELEASE_ID, "Some Album", "release")
}

pub fn label(id: &str, name: &str) -> Entity {
    Entity::new(id, name, "label")
}

pub fn recording(id: &str) -> Entity {
    Entity::new(id, format!("Track {}", id), "recording")
}

/// Provider backed by fixed lookup and search tables
#[derive(Default)]
pub struct FakeProvider {
    entities: HashMap<String, Entity>,
    searches: HashMap<String, Vec<Entity>>,
    pub fetch_count: AtomicUsize,
    pub search_count: AtomicUsize,
}

impl FakeProvider {
    pub fn with_entity(mut self, entity: Entity) -> Self {
        if let Some(id) = &entity.id {
            self.entities.insert(id.clone(), entity.clone());
        }
        self
    }

    pub fn with_search(mut self, query: &str, results: Vec<Entity>) -> Self {
        for entity in &results {
            if let Some(id) = &entity.id {
                self.entities.insert(id.clone(), entity.clone());
            }
        }
        self.searches.insert(query.to_string(), results);
        self
    }
}

#[async_trait]
impl EntityProvider for FakeProvider {
    async fn fetch_entity(&self, id: &str) -> std::result::Result<Entity, MBError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.entities
            .get(id)
            .cloned()
            .ok_or_else(|| MBError::EntityNotFound(id.to_string()))
    }

    async fn search_entity(&self, _entity_type: &str, query: &str) -> std::result::Result<Vec<Entity>, MBError> {
        self.search_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.searches.get(query).cloned().unwrap_or_default())
    }
}

/// Editor collecting relationships, optionally rejecting one link type
#[derive(Default)]
pub struct CollectingEditor {
    relationships: Mutex<Vec<Relationship>>,
    reject_link_type: Option<u32>,
}

impl CollectingEditor {
    pub fn rejecting(link_type_id: u32) -> Self {
        Self {
            relationships: Mutex::new(Vec::new()),
            reject_link_type: Some(link_type_id),
        }
    }

    pub fn relationships(&self) -> Vec<Relationship> {
        self.relationships.lock().unwrap().clone()
    }

    pub fn link_types(&self) -> Vec<u32> {
        self.relationships().iter().map(|r| r.link_type_id).collect()
    }
}

#[async_trait]
impl RelationshipEditor for CollectingEditor {
    async fn create_relationship(&self, relationship: Relationship) -> Result<()> {
        if Some(relationship.link_type_id) == self.reject_link_type {
            return Err(ResolveError::Editor("link type not allowed".to_string()));
        }
        self.relationships.lock().unwrap().push(relationship);
        Ok(())
    }
}

/// Surface answering from a script, recording every draft it is shown
///
/// Runs out of answers by dismissing.
#[derive(Default)]
pub struct ScriptedSurface {
    answers: Mutex<VecDeque<Option<Entity>>>,
    drafts: Mutex<Vec<RelationshipDraft>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ScriptedSurface {
    pub fn answering(answers: Vec<Option<Entity>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            ..Self::default()
        }
    }

    pub fn drafts(&self) -> Vec<RelationshipDraft> {
        self.drafts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConfirmationSurface for ScriptedSurface {
    async fn confirm(&self, draft: &RelationshipDraft) -> Result<Option<Entity>> {
        let open = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(open, Ordering::SeqCst);

        // Operator takes a moment
        tokio::time::sleep(Duration::from_millis(5)).await;

        self.drafts.lock().unwrap().push(draft.clone());
        let answer = self.answers.lock().unwrap().pop_front().flatten();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(answer)
    }
}

pub struct Harness {
    pub orchestrator: Orchestrator,
    pub provider: Arc<FakeProvider>,
    pub editor: Arc<CollectingEditor>,
    pub names: Arc<MemoCache<(String, String), String>>,
}

pub fn harness(provider: FakeProvider, editor: CollectingEditor, recordings: Vec<Entity>) -> Harness {
    let provider = Arc::new(provider);
    let editor = Arc::new(editor);
    let names = Arc::new(name_cache(None));

    let orchestrator = Orchestrator::new(
        release(),
        Arc::new(entity_cache(provider.clone())),
        Arc::clone(&names),
        editor.clone(),
        Arc::new(SequentialIds::new()),
    )
    .with_recordings(recordings);

    Harness {
        orchestrator,
        provider,
        editor,
        names,
    }
}

pub fn learn(names: &MemoCache<(String, String), String>, name: &str, id: &str) {
    names.set(vec!["label".to_string(), name.to_string()], id.to_string());
}
