//! cache_delete tool implementation.
//!
//! Deletes a whole cache store and its entries.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use vidshell_core::{CacheDb, Error};

use crate::tools::json_result;

/// Parameters for the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteParams {
    /// Name of the store to delete.
    pub store: String,
}

/// Output from the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteOutput {
    pub store: String,
    /// False when no store of that name existed.
    pub deleted: bool,
}

/// Implementation of the cache_delete tool.
pub async fn delete_impl(cache: &CacheDb, params: CacheDeleteParams) -> Result<CallToolResult, McpError> {
    let store = params.store.trim().to_string();
    if store.is_empty() {
        return Err(Error::InvalidInput("store name must not be empty".to_string()).into());
    }

    let deleted = cache.delete_store(&store).await?;
    if deleted {
        tracing::info!(store = %store, "cache store deleted");
    }

    json_result(&CacheDeleteOutput { store, deleted })
}
