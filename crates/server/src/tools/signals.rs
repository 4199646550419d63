//! sw_sync, sw_push, sw_notification_click and client_open tool
//! implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use vidshell_client::NotificationClick;
use vidshell_core::Error;

use super::json_result;
use crate::state::HostState;

/// Parameters for the sw_sync tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SyncParams {
    /// Sync tag. Defaults to the configured background sync tag.
    pub tag: Option<String>,
}

/// Parameters for the sw_push tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PushParams {
    /// Text payload of the push message. Empty or missing uses the default body.
    pub payload: Option<String>,
}

/// Parameters for the sw_notification_click tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ClickParams {
    /// Tag of the clicked notification.
    pub tag: Option<String>,

    /// Action button that was clicked (`explore` or `close`); omit for the body.
    pub action: Option<String>,
}

/// Parameters for the client_open tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClientOpenParams {
    /// Page URL, absolute or relative to the app origin.
    pub url: String,
}

/// Implementation of the sw_sync tool.
pub async fn sync_impl(state: &HostState, params: SyncParams) -> Result<CallToolResult, McpError> {
    let tag = params.tag.unwrap_or_else(|| state.config.sync.tag.clone());
    let report = state.manager.handle_sync(&tag).await?;
    json_result(&report)
}

/// Implementation of the sw_push tool.
pub async fn push_impl(state: &HostState, params: PushParams) -> Result<CallToolResult, McpError> {
    let outcome = state.manager.handle_push(params.payload.as_deref()).await;
    json_result(&outcome)
}

/// Implementation of the sw_notification_click tool.
pub async fn click_impl(state: &HostState, params: ClickParams) -> Result<CallToolResult, McpError> {
    let click = NotificationClick { tag: params.tag, action: params.action };
    let outcome = state.manager.handle_notification_click(&click).await;
    json_result(&outcome)
}

/// Implementation of the client_open tool: register a page as an open client.
pub async fn client_open_impl(state: &HostState, params: ClientOpenParams) -> Result<CallToolResult, McpError> {
    let url = state
        .origin
        .join(params.url.trim())
        .map_err(|e| Error::InvalidUrl(format!("{}: {e}", params.url)))?;

    let client = state.platform.open_page(&url).await;
    json_result(&client)
}
