//! credits-notice library interface
//!
//! Extracts copyright and legal statements from pasted credit text and
//! resolves the named rights holders to MusicBrainz entities.
//!
//! Data flows one way:
//! text → [`transform`] → [`notice::parse_copyright_notice`] → statements →
//! [`resolve::Orchestrator`] (backed by two [`cache::MemoCache`]s) → relationships.

pub mod boundary;
pub mod cache;
pub mod client;
pub mod entity;
pub mod error;
pub mod link_types;
pub mod notice;
pub mod resolve;
pub mod session;
pub mod terminal;
pub mod transform;

pub use crate::entity::Entity;
pub use crate::error::{ResolveError, Result};
pub use crate::notice::{parse_copyright_notice, CopyrightStatement, LicenseDirection, StatementType};
