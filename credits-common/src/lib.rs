//! # credits-common
//!
//! Shared code for the credits-notice tools:
//! - Error type used across crates
//! - Configuration loading (TOML → ENV → CLI priority)
//! - Key-value string storage used to persist caches

pub mod config;
pub mod error;
pub mod storage;

pub use error::{Error, Result};
