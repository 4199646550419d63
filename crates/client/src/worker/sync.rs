//! Background sync.
//!
//! The configured tag triggers a best-effort refresh of the core assets in
//! the current store, once a complete shell has been installed there. There is no retry or backoff; what happens to a failed
//! run is decided by [`SyncFailurePolicy`].

use reqwest::StatusCode;
use serde::Serialize;
use vidshell_core::{Error, SyncFailurePolicy};

use super::CacheManager;
use crate::fetch::Request;

/// Result of a sync event.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub tag: String,
    /// False when the tag is not ours or no shell is installed yet.
    pub handled: bool,
    pub refreshed: usize,
    pub failures: Vec<String>,
}

impl CacheManager {
    /// Handle a background sync trigger.
    ///
    /// # Errors
    ///
    /// Returns `Error::SyncFailed` only under `SyncFailurePolicy::Report`.
    pub async fn handle_sync(&self, tag: &str) -> Result<SyncReport, Error> {
        let mut report = SyncReport { tag: tag.to_string(), ..Default::default() };

        if tag != self.sync.tag {
            tracing::debug!(tag, "ignoring unknown sync tag");
            return Ok(report);
        }
        if !self.is_installed().await {
            tracing::debug!(tag, "no installed shell, skipping sync");
            return Ok(report);
        }
        report.handled = true;

        for url in &self.assets {
            let request = Request::get(url.clone())?;
            let result = match self.network.fetch(&request).await {
                Ok(response) if response.status == StatusCode::OK => {
                    self.storage.put(&self.cache_name, &request.key(), &response.to_cached()).await
                }
                Ok(response) => Err(Error::Network(format!("status {}", response.status.as_u16()))),
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => report.refreshed += 1,
                Err(e) => report.failures.push(format!("{url}: {e}")),
            }
        }

        if report.failures.is_empty() {
            tracing::info!(tag, refreshed = report.refreshed, "background sync complete");
            return Ok(report);
        }

        match self.sync.failure_policy {
            SyncFailurePolicy::Swallow => {
                tracing::warn!(
                    tag,
                    refreshed = report.refreshed,
                    failed = report.failures.len(),
                    "background sync incomplete"
                );
                Ok(report)
            }
            SyncFailurePolicy::Report => Err(Error::SyncFailed(report.failures.join("; "))),
        }
    }
}
