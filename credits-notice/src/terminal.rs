//! Terminal implementations of the confirmation step and relationship editor
//!
//! Prompts go to one stream (stderr in the binary), relationships are printed
//! as JSON lines to another (stdout), so the output can be piped.

use crate::cache::MemoCache;
use crate::client::EntityProvider;
use crate::entity::Entity;
use crate::resolve::{ConfirmationSurface, Relationship, RelationshipDraft, RelationshipEditor};
use crate::{ResolveError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

/// Search results offered as numbered choices
const MAX_CANDIDATES: usize = 5;

struct Console<R, W> {
    input: R,
    output: W,
}

/// Asks the operator for the MBID of each unresolved owner
///
/// The operator answers with an MBID, the number of a listed search result,
/// or an empty line to skip the relationship. End of input also skips.
pub struct TerminalConfirmation<R, W> {
    console: Mutex<Console<R, W>>,
    entity_cache: Arc<MemoCache<String, Entity>>,
    provider: Option<Arc<dyn EntityProvider>>,
}

impl<R, W> TerminalConfirmation<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(input: R, output: W, entity_cache: Arc<MemoCache<String, Entity>>) -> Self {
        Self {
            console: Mutex::new(Console { input, output }),
            entity_cache,
            provider: None,
        }
    }

    /// Offer search results for the owner name as choices
    pub fn with_suggestions(mut self, provider: Arc<dyn EntityProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    async fn candidates(&self, draft: &RelationshipDraft) -> Vec<Entity> {
        let Some(provider) = &self.provider else {
            return Vec::new();
        };
        match provider.search_entity(&draft.target.entity_type, &draft.name).await {
            Ok(mut results) => {
                results.truncate(MAX_CANDIDATES);
                results
            }
            Err(e) => {
                warn!(name = %draft.name, error = %e, "Search for suggestions failed");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl<R, W> ConfirmationSurface for TerminalConfirmation<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn confirm(&self, draft: &RelationshipDraft) -> Result<Option<Entity>> {
        let candidates = self.candidates(draft).await;
        let mut console = self.console.lock().await;

        let mut prompt = format!(
            "\n{} {} '{}'{} for {} source(s)\n",
            draft.statement_type,
            draft.target.entity_type,
            draft.name,
            draft.year.as_deref().map(|y| format!(" ({})", y)).unwrap_or_default(),
            draft.sources.len(),
        );
        for (i, candidate) in candidates.iter().enumerate() {
            prompt.push_str(&format!(
                "  [{}] {} {}\n",
                i + 1,
                candidate.name,
                candidate.id.as_deref().unwrap_or_default()
            ));
        }
        console.print(&prompt).await?;

        loop {
            console.print("MBID, number or empty to skip: ").await?;
            let Some(answer) = console.read_answer().await? else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(None);
            }

            if let Some(candidate) = answer
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| candidates.get(i))
            {
                return Ok(Some(candidate.clone()));
            }

            let Ok(mbid) = Uuid::parse_str(&answer) else {
                console.print("Not an MBID\n").await?;
                continue;
            };

            // The prompt stays locked while fetching, so answers stay in order
            match self.entity_cache.get(mbid.to_string()).await {
                Ok(Some(entity)) => return Ok(Some(entity)),
                Ok(None) => console.print("Entity not found\n").await?,
                Err(e) => console.print(&format!("Lookup failed: {}\n", e)).await?,
            }
        }
    }
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn print(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).await.map_err(console_error)?;
        self.output.flush().await.map_err(console_error)
    }

    /// Trimmed next line, `None` at end of input
    async fn read_answer(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line).await.map_err(console_error)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

fn console_error(e: std::io::Error) -> ResolveError {
    ResolveError::Confirmation(e.to_string())
}

/// Prints each relationship as one JSON line
pub struct JsonLinesEditor<W> {
    output: Mutex<W>,
}

impl<W> JsonLinesEditor<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(output: W) -> Self {
        Self {
            output: Mutex::new(output),
        }
    }

    pub fn into_inner(self) -> W {
        self.output.into_inner()
    }
}

#[async_trait]
impl<W> RelationshipEditor for JsonLinesEditor<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn create_relationship(&self, relationship: Relationship) -> Result<()> {
        let mut line = serde_json::to_string(&relationship).map_err(|e| ResolveError::Editor(e.to_string()))?;
        line.push('\n');

        let mut output = self.output.lock().await;
        output
            .write_all(line.as_bytes())
            .await
            .map_err(|e| ResolveError::Editor(e.to_string()))?;
        output.flush().await.map_err(|e| ResolveError::Editor(e.to_string()))
    }
}
