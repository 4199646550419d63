//! sw_fetch tool implementation.
//!
//! Simulates a page request intercepted by the worker and reports where the
//! response came from.

use std::collections::BTreeMap;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use vidshell_client::{Method, Request, ResponseSource};
use vidshell_core::Error;

use super::json_result;
use crate::error::HostError;
use crate::state::HostState;

fn default_method() -> String {
    "GET".to_string()
}

fn default_max_body_chars() -> usize {
    4_000
}

/// Parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchParams {
    /// Absolute URL, or a path resolved against the app origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Value of the Accept header. Use `text/html` to simulate a navigation.
    pub accept: Option<String>,

    /// Additional request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Truncate the returned body text to this many characters (default: 4000).
    #[serde(default = "default_max_body_chars")]
    pub max_body_chars: usize,
}

/// Output from the sw_fetch tool.
#[derive(Debug, Clone, Serialize)]
pub struct FetchOutput {
    pub url: String,
    pub status: u16,
    pub source: ResponseSource,
    pub content_type: Option<String>,
    pub body_bytes: usize,
    pub body: String,
    pub truncated: bool,
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl(state: &HostState, params: FetchParams) -> Result<CallToolResult, McpError> {
    let method = Method::from_bytes(params.method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| HostError::InvalidInput(format!("invalid HTTP method: {}", params.method)))?;

    let url = state
        .origin
        .join(params.url.trim())
        .map_err(|e| Error::InvalidUrl(format!("{}: {e}", params.url)))?;

    let mut request = Request::new(method, url)?;
    if let Some(accept) = &params.accept {
        request = request.with_header("accept", accept)?;
    }
    for (name, value) in &params.headers {
        request = request.with_header(name, value)?;
    }

    let request_url = request.url.to_string();
    let outcome = state.manager.handle_fetch(request).await?;
    let response = outcome.response;

    let text = String::from_utf8_lossy(&response.body);
    let truncated = text.chars().count() > params.max_body_chars;
    let body = if truncated { text.chars().take(params.max_body_chars).collect() } else { text.into_owned() };

    let output = FetchOutput {
        url: request_url,
        status: response.status.as_u16(),
        source: outcome.source,
        content_type: response.content_type().map(str::to_string),
        body_bytes: response.body.len(),
        body,
        truncated,
    };

    json_result(&output)
}
