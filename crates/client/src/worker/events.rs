//! Lifecycle event dispatch.
//!
//! The host delivers one of a closed set of events; each maps onto one
//! handler of [`CacheManager`].

use vidshell_core::Error;

use super::notification::{ClickOutcome, NotificationClick, PushOutcome};
use super::sync::SyncReport;
use super::{ActivateReport, CacheManager, FetchOutcome, InstallReport};
use crate::fetch::Request;

/// Event delivered by the host.
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    Install,
    Activate,
    Fetch(Request),
    Sync { tag: String },
    Push { payload: Option<String> },
    NotificationClick(NotificationClick),
}

impl LifecycleEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            LifecycleEvent::Install => "install",
            LifecycleEvent::Activate => "activate",
            LifecycleEvent::Fetch(_) => "fetch",
            LifecycleEvent::Sync { .. } => "sync",
            LifecycleEvent::Push { .. } => "push",
            LifecycleEvent::NotificationClick(_) => "notificationclick",
        }
    }
}

/// Result of a dispatched event, one variant per event kind.
#[derive(Debug, Clone)]
pub enum EventOutcome {
    Installed(InstallReport),
    Activated(ActivateReport),
    Fetched(FetchOutcome),
    Synced(SyncReport),
    Pushed(PushOutcome),
    Clicked(ClickOutcome),
}

impl CacheManager {
    /// Route an event to its handler.
    pub async fn dispatch(&self, event: LifecycleEvent) -> Result<EventOutcome, Error> {
        tracing::debug!(event = event.kind(), "dispatching");

        match event {
            LifecycleEvent::Install => self.install().await.map(EventOutcome::Installed),
            LifecycleEvent::Activate => self.activate().await.map(EventOutcome::Activated),
            LifecycleEvent::Fetch(request) => self.handle_fetch(request).await.map(EventOutcome::Fetched),
            LifecycleEvent::Sync { tag } => self.handle_sync(&tag).await.map(EventOutcome::Synced),
            LifecycleEvent::Push { payload } => Ok(EventOutcome::Pushed(self.handle_push(payload.as_deref()).await)),
            LifecycleEvent::NotificationClick(click) => {
                Ok(EventOutcome::Clicked(self.handle_notification_click(&click).await))
            }
        }
    }
}
