//! Offline cache worker.
//!
//! The worker keeps exactly one current cache store, named after the
//! configured cache version, and reacts to host lifecycle events:
//!
//! - **install**: pre-cache the core asset manifest, all or nothing
//! - **activate**: delete every store of another version, claim open pages
//! - **fetch**: route the request and apply network-first caching
//! - **sync / push / notificationclick**: see [`sync`] and [`notification`]

pub mod events;
pub mod lifetime;
pub mod notification;
pub mod platform;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use reqwest::StatusCode;
use serde::Serialize;
use tokio::sync::RwLock;
use url::Url;
use vidshell_core::{AppConfig, CacheStorage, Error, NotificationConfig, SyncConfig};

use crate::fetch::{Network, Request, Response, resolve, resolve_http};
use crate::router::{RequestClass, RequestRouter};

pub use events::{EventOutcome, LifecycleEvent};
pub use lifetime::WaitUntil;
pub use notification::{ClickOutcome, Notification, NotificationClick, PushOutcome};
pub use platform::{ClientInfo, Platform};
pub use sync::SyncReport;

/// Lifecycle state of the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed; the worker must not take control.
    Redundant,
}

/// Where a fetch response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// Forwarded without touching the cache (non-GET, extension).
    Passthrough,
    /// Streaming media, network only.
    Streaming,
    /// Live network response of a cacheable request.
    Network,
    /// Stored copy served after a network failure.
    Cache,
    /// App shell served to an uncached navigation.
    Shell,
    /// Locally generated error response.
    Synthetic,
}

/// Response to an intercepted request.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub response: Response,
    pub source: ResponseSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub cache_name: String,
    pub cached: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivateReport {
    pub cache_name: String,
    pub deleted: Vec<String>,
    pub claimed: usize,
}

/// Network-first offline cache manager.
pub struct CacheManager {
    cache_name: String,
    assets: Vec<Url>,
    shell_url: Url,
    root_url: Url,
    router: RequestRouter,
    notification: NotificationConfig,
    sync: SyncConfig,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    platform: Arc<dyn Platform>,
    state: RwLock<WorkerState>,
    lifetime: WaitUntil,
}

fn url_error(input: &str, err: impl std::fmt::Display) -> Error {
    Error::InvalidUrl(format!("{input}: {err}"))
}

impl CacheManager {
    /// Create a manager for the cache version named in `config`.
    ///
    /// Asset, shell and root paths are resolved against `config.origin` up front.
    pub fn new(
        config: &AppConfig, storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>, platform: Arc<dyn Platform>,
    ) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| url_error(&config.origin, e))?;

        let assets = config
            .core_assets
            .iter()
            .map(|asset| resolve_http(&origin, asset).map_err(|e| url_error(asset, e)))
            .collect::<Result<Vec<_>, _>>()?;
        let shell_url = resolve(&origin, &config.shell_path).map_err(|e| url_error(&config.shell_path, e))?;
        let root_url = resolve(&origin, &config.root_path).map_err(|e| url_error(&config.root_path, e))?;

        Ok(Self {
            cache_name: config.cache_name(),
            assets,
            shell_url,
            root_url,
            router: RequestRouter::new(&config.router)?,
            notification: config.notification.clone(),
            sync: config.sync.clone(),
            storage,
            network,
            platform,
            state: RwLock::new(WorkerState::Parsed),
            lifetime: WaitUntil::new(),
        })
    }

    /// Name of the current store.
    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn root_url(&self) -> &Url {
        &self.root_url
    }

    pub fn router(&self) -> &RequestRouter {
        &self.router
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Whether a complete shell has been installed into the current store.
    async fn is_installed(&self) -> bool {
        matches!(self.state().await, WorkerState::Installed | WorkerState::Activated)
    }

    async fn set_state(&self, state: WorkerState) {
        *self.state.write().await = state;
        tracing::debug!(?state, "worker state changed");
    }

    /// Wait for background cache writes started by earlier fetches.
    pub async fn settle(&self) {
        self.lifetime.settle().await;
    }

    /// Pre-cache the core asset manifest into the current store.
    ///
    /// Every asset is fetched before anything is written, and the batch is
    /// written in one transaction, so a failure leaves no partial shell.
    /// A store created by a failed attempt is removed again.
    ///
    /// On a worker that is already installed or active this is a refresh:
    /// the state is left alone whether or not the refresh succeeds.
    ///
    /// # Errors
    ///
    /// Returns `Error::InstallFailed` naming the first asset that could not
    /// be fetched or did not answer with a 200.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        let refresh = self.is_installed().await;
        if !refresh {
            self.set_state(WorkerState::Installing).await;
        }

        let existed = self.storage.has(&self.cache_name).await?;
        self.storage.open(&self.cache_name).await?;
        tracing::info!(cache = %self.cache_name, "opened cache");

        let result = self.add_all(&self.assets).await;

        let cached = match result {
            Ok(cached) => cached,
            Err(e) => {
                if !existed && let Err(cleanup) = self.storage.delete(&self.cache_name).await {
                    tracing::warn!("failed to remove cache after failed install: {}", cleanup);
                }
                if refresh {
                    tracing::warn!(cache = %self.cache_name, "refresh install failed, keeping current shell: {}", e);
                } else {
                    self.set_state(WorkerState::Redundant).await;
                    tracing::error!(cache = %self.cache_name, "install failed: {}", e);
                }
                return Err(e);
            }
        };

        if !refresh {
            self.set_state(WorkerState::Installed).await;
        }

        if let Err(e) = self.platform.skip_waiting().await {
            tracing::warn!("skip_waiting rejected: {}", e);
        }

        tracing::info!(cache = %self.cache_name, cached, "install complete");
        Ok(InstallReport { cache_name: self.cache_name.clone(), cached })
    }

    /// Fetch `urls` and store them in the current store, all or nothing.
    pub async fn add_all(&self, urls: &[Url]) -> Result<usize, Error> {
        let mut entries = Vec::with_capacity(urls.len());

        for url in urls {
            let request = Request::get(url.clone())?;
            let response = self.network.fetch(&request).await.map_err(|e| Error::InstallFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

            if response.status != StatusCode::OK {
                return Err(Error::InstallFailed {
                    url: url.to_string(),
                    reason: format!("status {}", response.status.as_u16()),
                });
            }

            entries.push((request.key(), response.to_cached()));
        }

        self.storage.put_all(&self.cache_name, &entries).await?;
        Ok(entries.len())
    }

    /// Delete every store except the current one, then claim open pages.
    ///
    /// # Errors
    ///
    /// Fails if the worker is redundant or the stores cannot be listed or deleted.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        if self.state().await == WorkerState::Redundant {
            return Err(Error::InvalidInput("cannot activate a redundant worker".into()));
        }
        self.set_state(WorkerState::Activating).await;

        let mut deleted = Vec::new();
        for name in self.storage.keys().await? {
            if name != self.cache_name {
                self.storage.delete(&name).await?;
                tracing::info!(cache = %name, "deleted stale cache");
                deleted.push(name);
            }
        }

        let claimed = match self.platform.claim_clients().await {
            Ok(claimed) => claimed,
            Err(e) => {
                tracing::warn!("failed to claim clients: {}", e);
                0
            }
        };

        self.set_state(WorkerState::Activated).await;
        tracing::info!(cache = %self.cache_name, deleted = deleted.len(), claimed, "activated");

        Ok(ActivateReport { cache_name: self.cache_name.clone(), deleted, claimed })
    }

    /// Answer an intercepted request according to its class.
    ///
    /// # Errors
    ///
    /// Passthrough and streaming requests surface network errors unchanged.
    /// Cacheable requests only fail on local errors that are not network
    /// failures; network failures always produce a response.
    pub async fn handle_fetch(&self, request: Request) -> Result<FetchOutcome, Error> {
        match self.router.classify(&request) {
            RequestClass::Passthrough => {
                let response = self.network.fetch(&request).await?;
                Ok(FetchOutcome { response, source: ResponseSource::Passthrough })
            }
            RequestClass::Streaming => {
                let response = self.network.fetch(&request).await?;
                Ok(FetchOutcome { response, source: ResponseSource::Streaming })
            }
            RequestClass::Cacheable => self.network_first(request).await,
        }
    }

    async fn network_first(&self, request: Request) -> Result<FetchOutcome, Error> {
        match self.network.fetch(&request).await {
            Ok(response) => {
                if response.status == StatusCode::OK {
                    self.cache_in_background(&request, &response).await;
                }
                Ok(FetchOutcome { response, source: ResponseSource::Network })
            }
            Err(e) if e.is_network() => {
                tracing::debug!("network failed for {}: {}", request.url, e);
                Ok(self.offline_fallback(&request).await)
            }
            Err(e) => Err(e),
        }
    }

    async fn cache_in_background(&self, request: &Request, response: &Response) {
        let storage = Arc::clone(&self.storage);
        let cache_name = self.cache_name.clone();
        let key = request.key();
        let cached = response.to_cached();

        self.lifetime
            .wait_until(async move {
                match storage.put(&cache_name, &key, &cached).await {
                    Ok(()) => tracing::debug!("cached {}", key),
                    Err(e) => tracing::warn!("failed to cache {}: {}", key, e),
                }
            })
            .await;
    }

    async fn offline_fallback(&self, request: &Request) -> FetchOutcome {
        if let Some(response) = self.lookup(request).await {
            tracing::debug!("cache hit for {}", request.url);
            return FetchOutcome { response, source: ResponseSource::Cache };
        }

        if request.accepts_html() {
            match Request::get(self.shell_url.clone()) {
                Ok(shell) => {
                    if let Some(response) = self.lookup(&shell).await {
                        tracing::debug!("serving app shell for {}", request.url);
                        return FetchOutcome { response, source: ResponseSource::Shell };
                    }
                }
                Err(e) => tracing::warn!("invalid shell url: {}", e),
            }
        }

        tracing::debug!("cache miss for {}", request.url);
        FetchOutcome {
            response: Response::synthetic(
                StatusCode::REQUEST_TIMEOUT,
                format!("Network error: {} is unavailable offline and not cached", request.url),
            ),
            source: ResponseSource::Synthetic,
        }
    }

    /// Stored response for `request`; read errors count as a miss.
    async fn lookup(&self, request: &Request) -> Option<Response> {
        let cached = match self.storage.match_any(&request.key()).await {
            Ok(cached) => cached?,
            Err(e) => {
                tracing::warn!("cache read failed for {}: {}", request.url, e);
                return None;
            }
        };

        match Response::from_cached(&request.url, cached) {
            Ok(response) => Some(response),
            Err(e) => {
                tracing::warn!("discarding unreadable cache entry for {}: {}", request.url, e);
                None
            }
        }
    }
}
