//! Host platform surface consumed by the worker.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;
use vidshell_core::Error;

use super::notification::Notification;

/// An open page controlled (or controllable) by the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub id: String,
    pub url: String,
    pub focused: bool,
}

/// Operations the host exposes to the worker.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Activate as soon as install finishes instead of waiting for old pages to close.
    async fn skip_waiting(&self) -> Result<(), Error>;

    /// Take control of every open page. Returns how many were claimed.
    async fn claim_clients(&self) -> Result<usize, Error>;

    async fn match_clients(&self) -> Result<Vec<ClientInfo>, Error>;

    async fn focus_client(&self, id: &str) -> Result<ClientInfo, Error>;

    async fn open_window(&self, url: &Url) -> Result<ClientInfo, Error>;

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error>;

    async fn close_notification(&self, tag: &str) -> Result<(), Error>;
}
