//! Core types and shared functionality for vidshell.
//!
//! This crate provides:
//! - Versioned cache stores with a SQLite backend
//! - Unified error types
//! - Layered configuration

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, CacheStorage, CachedResponse, EntryMeta, RequestKey};
pub use config::{AppConfig, ConfigError, NotificationConfig, RouterConfig, SyncConfig, SyncFailurePolicy};
pub use error::Error;
