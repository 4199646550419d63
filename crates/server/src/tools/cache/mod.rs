//! Cache inspection MCP tools.
//!
//! These read and prune the cache stores directly, without going through
//! the worker.

pub mod delete;
pub mod keys;
pub mod matches;

pub use delete::{CacheDeleteParams, delete_impl};
pub use keys::{CacheKeysParams, keys_impl};
pub use matches::{CacheMatchParams, match_impl};
