//! MCP server handler implementation.
//!
//! This module defines the main server handler that routes tool calls to
//! the worker running inside the host.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

use crate::state::HostState;
use crate::tools::{
    CacheDeleteParams, CacheKeysParams, CacheMatchParams, ClickParams, ClientOpenParams, FetchParams, PushParams,
    SyncParams, cache, lifecycle, request, signals,
};

/// The MCP server handler for the vidshell host.
#[derive(Clone)]
pub struct VidshellHost {
    tool_router: ToolRouter<Self>,
    state: Arc<HostState>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl VidshellHost {
    /// Create a new server handler.
    pub fn new(state: Arc<HostState>) -> Self {
        Self { tool_router: Self::tool_router(), state }
    }

    #[tool(description = "Run the install event: pre-cache every core asset into the current cache store, all or nothing.")]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        lifecycle::install_impl(&self.state).await
    }

    #[tool(description = "Run the activate event: delete cache stores of other versions and claim open pages.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        lifecycle::activate_impl(&self.state).await
    }

    #[tool(description = "Report worker state, cache stores with entry counts, open pages and displayed notifications.")]
    async fn sw_status(&self) -> Result<CallToolResult, McpError> {
        lifecycle::status_impl(&self.state).await
    }

    /// Send a request through the worker.
    ///
    /// Streaming media and non-GET requests go straight to the network; other
    /// requests are network-first with cache, app shell and 408 fallbacks.
    #[tool(
        description = "Send a page request through the worker. Returns status, body and where the response came from (network, cache, shell, synthetic, streaming, passthrough)."
    )]
    async fn sw_fetch(&self, params: Parameters<FetchParams>) -> Result<CallToolResult, McpError> {
        request::fetch_impl(&self.state, params.0).await
    }

    #[tool(description = "Fire a background sync event. The configured tag refreshes the core assets in the current store.")]
    async fn sw_sync(&self, params: Parameters<SyncParams>) -> Result<CallToolResult, McpError> {
        signals::sync_impl(&self.state, params.0).await
    }

    #[tool(description = "Deliver a push message. Shows a notification with the payload text or a default body.")]
    async fn sw_push(&self, params: Parameters<PushParams>) -> Result<CallToolResult, McpError> {
        signals::push_impl(&self.state, params.0).await
    }

    #[tool(description = "Click a notification or one of its actions. Focuses the app page or opens a new one.")]
    async fn sw_notification_click(&self, params: Parameters<ClickParams>) -> Result<CallToolResult, McpError> {
        signals::click_impl(&self.state, params.0).await
    }

    #[tool(description = "Open a page of the app as a client the worker can see, focus and claim.")]
    async fn client_open(&self, params: Parameters<ClientOpenParams>) -> Result<CallToolResult, McpError> {
        signals::client_open_impl(&self.state, params.0).await
    }

    #[tool(description = "List cache store names, or the entries of one store.")]
    async fn cache_keys(&self, params: Parameters<CacheKeysParams>) -> Result<CallToolResult, McpError> {
        cache::keys_impl(&self.state.db, params.0).await
    }

    #[tool(description = "Look up the stored response for a request in one store or in any store.")]
    async fn cache_match(&self, params: Parameters<CacheMatchParams>) -> Result<CallToolResult, McpError> {
        cache::match_impl(&self.state.db, &self.state.origin, params.0).await
    }

    #[tool(description = "Delete a cache store and all its entries.")]
    async fn cache_delete(&self, params: Parameters<CacheDeleteParams>) -> Result<CallToolResult, McpError> {
        cache::delete_impl(&self.state.db, params.0).await
    }
}

impl ServerHandler for VidshellHost {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "vidshell".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(format!(
                "Offline cache worker for {} (cache {}). Use sw_* tools to deliver lifecycle events and cache_* tools to inspect stores.",
                self.state.origin,
                self.state.manager.cache_name()
            )),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
