//! sw_install, sw_activate and sw_status tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::Serialize;
use vidshell_client::{ClientInfo, WorkerState};

use super::json_result;
use crate::state::HostState;

/// Output from the sw_status tool.
#[derive(Debug, Clone, Serialize)]
pub struct StatusOutput {
    pub state: WorkerState,
    pub cache_name: String,
    pub stores: Vec<StoreSummary>,
    pub skipped_waiting: bool,
    pub controlling: bool,
    pub clients: Vec<ClientInfo>,
    pub notifications: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreSummary {
    pub name: String,
    pub entries: u64,
    pub current: bool,
}

/// Implementation of the sw_install tool.
pub async fn install_impl(state: &HostState) -> Result<CallToolResult, McpError> {
    let report = state.manager.install().await?;
    json_result(&report)
}

/// Implementation of the sw_activate tool.
pub async fn activate_impl(state: &HostState) -> Result<CallToolResult, McpError> {
    let report = state.manager.activate().await?;
    json_result(&report)
}

/// Implementation of the sw_status tool.
pub async fn status_impl(state: &HostState) -> Result<CallToolResult, McpError> {
    let mut stores = Vec::new();
    for name in state.db.store_names().await? {
        let entries = state.db.entry_count(&name).await?;
        let current = name == state.manager.cache_name();
        stores.push(StoreSummary { name, entries, current });
    }

    let output = StatusOutput {
        state: state.manager.state().await,
        cache_name: state.manager.cache_name().to_string(),
        stores,
        skipped_waiting: state.platform.skipped_waiting(),
        controlling: state.platform.is_controlling(),
        clients: state.platform.clients().await,
        notifications: state.platform.notifications().await.len(),
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::offline_state;
    use crate::tools::output_json;

    #[tokio::test]
    async fn test_install_offline_fails() {
        let state = offline_state().await;
        let result = install_impl(&state).await;

        let err = result.unwrap_err();
        assert_eq!(err.code.0, -32007);
    }

    #[tokio::test]
    async fn test_activate_evicts_old_stores() {
        let state = offline_state().await;
        state.db.open_store("video-player-pwa-v1").await.unwrap();

        let result = activate_impl(&state).await.unwrap();
        let output = output_json(&result);

        assert_eq!(output["deleted"][0], "video-player-pwa-v1");
        assert!(state.platform.is_controlling());
    }

    #[tokio::test]
    async fn test_status_reports_stores() {
        let state = offline_state().await;
        state.db.open_store("video-player-pwa-v1").await.unwrap();
        state.db.open_store("video-player-pwa-v2").await.unwrap();

        let output = output_json(&status_impl(&state).await.unwrap());

        assert_eq!(output["state"], "parsed");
        assert_eq!(output["cache_name"], "video-player-pwa-v2");
        assert_eq!(output["stores"].as_array().unwrap().len(), 2);
        assert_eq!(output["stores"][0]["current"], false);
        assert_eq!(output["stores"][1]["current"], true);
    }
}
