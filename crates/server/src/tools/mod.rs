//! MCP tool implementations.
//!
//! Each tool delivers one host event to the worker, or inspects the
//! cache stores it manages.

pub mod cache;
pub mod lifecycle;
pub mod request;
pub mod signals;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::HostError;

pub use cache::{CacheDeleteParams, CacheKeysParams, CacheMatchParams};
pub use request::FetchParams;
pub use signals::{ClickParams, ClientOpenParams, PushParams, SyncParams};

/// Wrap a serializable output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| HostError::Serialize(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Parse the JSON text of a tool result back into a value.
#[cfg(test)]
pub(crate) fn output_json(result: &CallToolResult) -> serde_json::Value {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    let text = content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
