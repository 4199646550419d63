//! Shared host state.

use std::sync::Arc;

use url::Url;
use vidshell_client::CacheManager;
use vidshell_core::{AppConfig, CacheDb, Error};

use crate::platform::HostPlatform;

/// Everything the tools need: configuration, store, platform and worker.
pub struct HostState {
    pub config: AppConfig,
    pub origin: Url,
    pub db: CacheDb,
    pub platform: Arc<HostPlatform>,
    pub manager: CacheManager,
}

impl HostState {
    pub fn new(
        config: AppConfig, db: CacheDb, platform: Arc<HostPlatform>, manager: CacheManager,
    ) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.origin)))?;
        Ok(Self { config, origin, db, platform, manager })
    }

    /// Register the worker: install, then activate if install succeeded.
    ///
    /// A failed install leaves the host running without offline support.
    pub async fn boot(&self) {
        match self.manager.install().await {
            Ok(report) => {
                if let Err(e) = self.manager.activate().await {
                    tracing::error!(cache = %report.cache_name, "activation failed: {}", e);
                }
            }
            Err(e) => tracing::error!("worker install failed, serving without offline support: {}", e),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use vidshell_client::{Network, Request, Response};

    /// Network double with no connectivity at all.
    pub struct Offline;

    #[async_trait]
    impl Network for Offline {
        async fn fetch(&self, request: &Request) -> Result<Response, Error> {
            Err(Error::Network(format!("offline: {}", request.url)))
        }
    }

    /// Host state over an in-memory store and an offline network.
    pub async fn offline_state() -> HostState {
        let config = AppConfig::default();
        let db = CacheDb::open_in_memory().await.unwrap();
        let platform = Arc::new(HostPlatform::new());
        let manager = CacheManager::new(&config, Arc::new(db.clone()), Arc::new(Offline), platform.clone()).unwrap();
        HostState::new(config, db, platform, manager).unwrap()
    }
}
