//! Error types for credits-notice
//!
//! Remote failures keep their [`MBError`] detail so the orchestrator can log
//! them before skipping the affected statement.

use crate::client::MBError;
use thiserror::Error;

/// Resolution error type
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Remote lookup failed (network, status, decoding)
    #[error("MusicBrainz error: {0}")]
    Remote(#[from] MBError),

    /// Cache persistence failed
    #[error("Storage error: {0}")]
    Storage(#[from] credits_common::Error),

    /// Search returned nothing usable
    #[error("No {entity_type} found for '{name}'")]
    NoMatch { entity_type: String, name: String },

    /// The relationship editor refused a relationship
    #[error("Relationship editor error: {0}")]
    Editor(String),

    /// The confirmation surface failed (not a dismissal)
    #[error("Confirmation failed: {0}")]
    Confirmation(String),
}

/// Result type for resolution operations
pub type Result<T> = std::result::Result<T, ResolveError>;
