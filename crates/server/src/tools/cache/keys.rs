//! cache_keys tool implementation.
//!
//! Lists store names, or the entries of one store.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use vidshell_core::{CacheDb, EntryMeta, Error};

use crate::tools::json_result;

/// Parameters for the cache_keys tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysParams {
    /// Store to list entries of. Omit to list store names only.
    pub store: Option<String>,
}

/// Output from the cache_keys tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysOutput {
    pub stores: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<EntryMeta>>,
}

/// Implementation of the cache_keys tool.
pub async fn keys_impl(cache: &CacheDb, params: CacheKeysParams) -> Result<CallToolResult, McpError> {
    let stores = cache.store_names().await?;

    let entries = match params.store {
        Some(store) => {
            if !stores.contains(&store) {
                return Err(Error::CacheMiss(format!("no such store: {store}")).into());
            }
            Some(cache.list_entries(&store).await?)
        }
        None => None,
    };

    json_result(&CacheKeysOutput { stores, entries })
}
