//! Shared utilities, configuration, and error handling for Bouquet
//!
//! This crate provides common functionality used across the Bouquet workspace:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - Out-of-band user notices
//! - Slug validation and content digests

pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod notice;
pub mod slug;
pub mod state;

pub use config::Config;
pub use crypto::{compute_hash_prefix, content_digest};
pub use db::RepositoryError;
pub use error::{Error, Result};
pub use notice::{Notice, NoticeBus, NoticeLevel};
pub use slug::validate_slug;
pub use state::StateError;
