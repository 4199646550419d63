//! In-process host platform.
//!
//! Keeps a registry of open pages and a notification tray in memory and
//! reports what the worker asks of it through tracing.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use url::Url;
use vidshell_client::{ClientInfo, Notification, Platform};
use vidshell_core::Error;

/// Host-side state of pages and notifications.
#[derive(Debug, Default)]
pub struct HostPlatform {
    clients: RwLock<Vec<ClientInfo>>,
    notifications: RwLock<Vec<Notification>>,
    next_id: AtomicU64,
    skipped_waiting: AtomicBool,
    controlling: AtomicBool,
}

impl HostPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn client_id(&self) -> String {
        format!("client-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Register a page opened outside the worker (e.g. by the user).
    pub async fn open_page(&self, url: &Url) -> ClientInfo {
        let client = ClientInfo { id: self.client_id(), url: url.to_string(), focused: false };
        self.clients.write().await.push(client.clone());
        tracing::debug!(client = %client.id, url = %client.url, "page opened");
        client
    }

    pub async fn clients(&self) -> Vec<ClientInfo> {
        self.clients.read().await.clone()
    }

    /// Notifications currently displayed.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.notifications.read().await.clone()
    }

    /// Whether the worker has claimed the open pages.
    pub fn is_controlling(&self) -> bool {
        self.controlling.load(Ordering::SeqCst)
    }

    pub fn skipped_waiting(&self) -> bool {
        self.skipped_waiting.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Platform for HostPlatform {
    async fn skip_waiting(&self) -> Result<(), Error> {
        self.skipped_waiting.store(true, Ordering::SeqCst);
        tracing::info!("worker will activate without waiting");
        Ok(())
    }

    async fn claim_clients(&self) -> Result<usize, Error> {
        self.controlling.store(true, Ordering::SeqCst);
        let claimed = self.clients.read().await.len();
        tracing::info!(claimed, "worker controls open pages");
        Ok(claimed)
    }

    async fn match_clients(&self) -> Result<Vec<ClientInfo>, Error> {
        Ok(self.clients().await)
    }

    async fn focus_client(&self, id: &str) -> Result<ClientInfo, Error> {
        let mut clients = self.clients.write().await;
        if !clients.iter().any(|c| c.id == id) {
            return Err(Error::Platform(format!("unknown client: {id}")));
        }

        let mut focused = None;
        for client in clients.iter_mut() {
            client.focused = client.id == id;
            if client.focused {
                focused = Some(client.clone());
            }
        }

        focused.ok_or_else(|| Error::Platform(format!("unknown client: {id}")))
    }

    async fn open_window(&self, url: &Url) -> Result<ClientInfo, Error> {
        let client = ClientInfo { id: self.client_id(), url: url.to_string(), focused: true };

        let mut clients = self.clients.write().await;
        for other in clients.iter_mut() {
            other.focused = false;
        }
        clients.push(client.clone());

        tracing::info!(client = %client.id, url = %client.url, "window opened");
        Ok(client)
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        tracing::info!(tag = %notification.tag, title = %notification.title, body = %notification.body, "notification");
        self.notifications.write().await.push(notification.clone());
        Ok(())
    }

    async fn close_notification(&self, tag: &str) -> Result<(), Error> {
        self.notifications.write().await.retain(|n| n.tag != tag);
        Ok(())
    }
}
