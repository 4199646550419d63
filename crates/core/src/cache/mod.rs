//! SQLite-backed versioned cache stores.
//!
//! This module provides named cache generations holding captured HTTP
//! responses, stored in SQLite with async access via tokio-rusqlite.
//! It supports:
//!
//! - Request identity keys (method + normalized URL) hashed with SHA-256
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Whole-store eviction when the cache version changes

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod storage;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{CachedResponse, EntryMeta, RequestKey};
pub use storage::CacheStorage;
