//! Push notifications and notification clicks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vidshell_core::NotificationConfig;

use super::CacheManager;
use super::platform::ClientInfo;

/// Action id that dismisses the notification without opening the app.
pub const CLOSE_ACTION: &str = "close";

/// Action id that brings the app to the front.
pub const EXPLORE_ACTION: &str = "explore";

/// Payload handed to the host notification surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub tag: String,
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    /// Milliseconds since the Unix epoch.
    pub date_of_arrival: i64,
    pub primary_key: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

/// Build the notification shown for a push.
///
/// The body is the push text, or the configured default when the push
/// carries no text (absent or blank).
pub fn build_notification(config: &NotificationConfig, payload: Option<&str>, now: DateTime<Utc>) -> Notification {
    let body = payload
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(config.default_body.as_str())
        .to_string();
    let arrival = now.timestamp_millis();

    Notification {
        tag: format!("push-{arrival}"),
        title: config.title.clone(),
        body,
        icon: config.icon.clone(),
        badge: config.badge.clone(),
        vibrate: config.vibrate.clone(),
        data: NotificationData { date_of_arrival: arrival, primary_key: 1 },
        actions: vec![
            NotificationAction { action: EXPLORE_ACTION.into(), title: "Watch now".into(), icon: config.icon.clone() },
            NotificationAction { action: CLOSE_ACTION.into(), title: "Close".into(), icon: config.icon.clone() },
        ],
    }
}

/// Result of a push event.
#[derive(Debug, Clone, Serialize)]
pub struct PushOutcome {
    pub notification: Notification,
    /// False when the host refused to display it.
    pub shown: bool,
}

/// A click on a displayed notification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationClick {
    pub tag: Option<String>,
    /// Action button id, or `None` for a click on the notification body.
    pub action: Option<String>,
}

/// What a notification click ended up doing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClickOutcome {
    Dismissed,
    Focused { client: ClientInfo },
    Opened { client: ClientInfo },
    Failed { reason: String },
}

impl CacheManager {
    /// Show a notification for an incoming push. Host failures are logged only.
    pub async fn handle_push(&self, payload: Option<&str>) -> PushOutcome {
        let notification = build_notification(&self.notification, payload, Utc::now());

        let shown = match self.platform.show_notification(&notification).await {
            Ok(()) => {
                tracing::info!(tag = %notification.tag, "notification shown");
                true
            }
            Err(e) => {
                tracing::warn!("failed to show notification: {}", e);
                false
            }
        };

        PushOutcome { notification, shown }
    }

    /// Close the notification, then focus the app window or open a new one.
    pub async fn handle_notification_click(&self, click: &NotificationClick) -> ClickOutcome {
        if let Some(tag) = &click.tag
            && let Err(e) = self.platform.close_notification(tag).await
        {
            tracing::warn!("failed to close notification {}: {}", tag, e);
        }

        if click.action.as_deref() == Some(CLOSE_ACTION) {
            return ClickOutcome::Dismissed;
        }

        let clients = match self.platform.match_clients().await {
            Ok(clients) => clients,
            Err(e) => {
                tracing::warn!("failed to list clients: {}", e);
                Vec::new()
            }
        };

        if let Some(existing) = clients.iter().find(|c| c.url == self.root_url.as_str()) {
            return match self.platform.focus_client(&existing.id).await {
                Ok(client) => ClickOutcome::Focused { client },
                Err(e) => {
                    tracing::warn!("failed to focus client {}: {}", existing.id, e);
                    ClickOutcome::Failed { reason: e.to_string() }
                }
            };
        }

        match self.platform.open_window(&self.root_url).await {
            Ok(client) => ClickOutcome::Opened { client },
            Err(e) => {
                tracing::warn!("failed to open {}: {}", self.root_url, e);
                ClickOutcome::Failed { reason: e.to_string() }
            }
        }
    }
}
