//! MusicBrainz internal API client
//!
//! Entity lookups by MBID (`/ws/js/entity/{gid}`) and entity searches
//! (`/ws/js/{entity_type}?q=`), as used by the relationship editor.
//!
//! All requests of one client share a single rate limiter (1 request per
//! second by default, per MusicBrainz policy); callers wait for their turn.

use crate::entity::Entity;
use async_trait::async_trait;
use credits_common::config::MusicBrainzConfig;
use governor::{Quota, RateLimiter};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// MusicBrainz client errors
#[derive(Debug, Error)]
pub enum MBError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid MBID: {0}")]
    InvalidId(String),
}

/// Remote entity source
#[async_trait]
pub trait EntityProvider: Send + Sync {
    /// Fetches the entity with the given MBID
    async fn fetch_entity(&self, id: &str) -> Result<Entity, MBError>;

    /// Searches entities of `entity_type` by name, best match first
    async fn search_entity(&self, entity_type: &str, query: &str) -> Result<Vec<Entity>, MBError>;
}

/// MusicBrainz API client
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
    rate_limiter: RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl MusicBrainzClient {
    pub fn new(config: &MusicBrainzConfig) -> Result<Self, MBError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| MBError::NetworkError(e.to_string()))?;

        let period = Duration::from_millis(config.rate_limit_ms);
        let quota = Quota::with_period(period)
            .ok_or_else(|| MBError::NetworkError("rate limit interval must be non-zero".to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::direct(quota),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        missing: &str,
    ) -> Result<T, MBError> {
        // Wait for rate limiter permit
        self.rate_limiter.until_ready().await;

        tracing::debug!(url = %url, "Querying MusicBrainz API");

        let response = self
            .http_client
            .get(url)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| MBError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 404 {
            return Err(MBError::EntityNotFound(missing.to_string()));
        }

        if status == 503 {
            return Err(MBError::RateLimitExceeded);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MBError::ApiError(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| MBError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl EntityProvider for MusicBrainzClient {
    async fn fetch_entity(&self, id: &str) -> Result<Entity, MBError> {
        let mbid = Uuid::parse_str(id).map_err(|_| MBError::InvalidId(id.to_string()))?;
        let url = format!("{}/ws/js/entity/{}", self.base_url, mbid);

        let entity: Entity = self.get_json(&url, &[], id).await?;

        tracing::info!(
            mbid = %mbid,
            name = %entity.name,
            entity_type = %entity.entity_type,
            "Retrieved entity from MusicBrainz"
        );

        Ok(entity)
    }

    async fn search_entity(&self, entity_type: &str, query: &str) -> Result<Vec<Entity>, MBError> {
        if entity_type.is_empty() || !entity_type.chars().all(|c| c.is_ascii_lowercase() || c == '_') {
            return Err(MBError::ApiError(400, format!("invalid entity type '{}'", entity_type)));
        }
        let url = format!("{}/ws/js/{}", self.base_url, entity_type);

        let mut results: Vec<Entity> = self.get_json(&url, &[("q", query)], query).await?;

        // Search results do not always repeat the type that was searched
        for entity in &mut results {
            if entity.entity_type.is_empty() {
                entity.entity_type = entity_type.to_string();
            }
        }

        tracing::debug!(
            entity_type = %entity_type,
            query = %query,
            results = results.len(),
            "MusicBrainz search complete"
        );

        Ok(results)
    }
}
