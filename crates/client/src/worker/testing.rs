//! Test doubles for the worker: scripted network, counting store, recording host.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderValue};
use url::Url;
use vidshell_core::{AppConfig, CacheDb, CacheStorage, CachedResponse, Error, RequestKey};

use super::CacheManager;
use super::notification::Notification;
use super::platform::{ClientInfo, Platform};
use crate::fetch::{Network, Request, Response, resolve_http};

/// Network double answering from a route table; unknown URLs fail as offline.
#[derive(Default)]
pub struct MockNetwork {
    routes: Mutex<HashMap<String, (u16, String, String)>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<Request>>,
}

impl MockNetwork {
    pub fn serve(&self, url: &str, status: u16, content_type: &str, body: &str) {
        self.failing.lock().unwrap().remove(url);
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), (status, content_type.to_string(), body.to_string()));
    }

    pub fn fail(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    /// Serve every core asset of `config` with a 200.
    pub fn serve_shell(&self, config: &AppConfig) {
        let origin = Url::parse(&config.origin).unwrap();
        for asset in &config.core_assets {
            let url = resolve_http(&origin, asset).unwrap();
            self.serve(url.as_str(), 200, "text/html", &format!("asset {asset}"));
        }
    }

    pub fn calls(&self) -> Vec<Request> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.calls.lock().unwrap().push(request.clone());
        let url = request.url.as_str();

        if self.failing.lock().unwrap().contains(url) {
            return Err(Error::Network(format!("connection reset: {url}")));
        }

        let route = self.routes.lock().unwrap().get(url).cloned();
        let Some((status, content_type, body)) = route else {
            return Err(Error::Network(format!("offline: {url}")));
        };

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(&content_type).unwrap());
        Ok(Response {
            url: Some(request.url.clone()),
            status: StatusCode::from_u16(status).unwrap(),
            headers,
            body: Bytes::from(body),
        })
    }
}

/// Store double that counts entry reads and writes on top of a real database.
pub struct CountingStorage {
    inner: CacheDb,
    reads: AtomicUsize,
    writes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl CountingStorage {
    pub fn new(inner: CacheDb) -> Self {
        Self {
            inner,
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    fn read(&self) -> Result<(), Error> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::MigrationFailed("store unavailable".into()));
        }
        Ok(())
    }

    fn write(&self) -> Result<(), Error> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::MigrationFailed("quota exceeded".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStorage for CountingStorage {
    async fn open(&self, name: &str) -> Result<(), Error> {
        self.inner.open_store(name).await
    }

    async fn has(&self, name: &str) -> Result<bool, Error> {
        self.inner.has_store(name).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.inner.store_names().await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        self.inner.delete_store(name).await
    }

    async fn match_entry(&self, name: &str, key: &RequestKey) -> Result<Option<CachedResponse>, Error> {
        self.read()?;
        self.inner.get_entry(name, key).await
    }

    async fn match_any(&self, key: &RequestKey) -> Result<Option<CachedResponse>, Error> {
        self.read()?;
        self.inner.find_entry(key).await
    }

    async fn put(&self, name: &str, key: &RequestKey, response: &CachedResponse) -> Result<(), Error> {
        self.write()?;
        self.inner.put_entry(name, key, response).await
    }

    async fn put_all(&self, name: &str, entries: &[(RequestKey, CachedResponse)]) -> Result<(), Error> {
        self.write()?;
        self.inner.put_entries(name, entries).await
    }
}

/// Host double recording every platform call.
#[derive(Default)]
pub struct RecordingPlatform {
    clients: Mutex<Vec<ClientInfo>>,
    notifications: Mutex<Vec<Notification>>,
    closed: Mutex<Vec<String>>,
    opened: Mutex<Vec<String>>,
    skipped: AtomicBool,
    claimed: AtomicBool,
    fail_notifications: AtomicBool,
}

impl RecordingPlatform {
    pub fn add_client(&self, id: &str, url: &str) {
        self.clients
            .lock()
            .unwrap()
            .push(ClientInfo { id: id.into(), url: url.into(), focused: false });
    }

    pub fn fail_notifications(&self) {
        self.fail_notifications.store(true, Ordering::SeqCst);
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn closed(&self) -> Vec<String> {
        self.closed.lock().unwrap().clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn skipped_waiting(&self) -> bool {
        self.skipped.load(Ordering::SeqCst)
    }

    pub fn claimed(&self) -> bool {
        self.claimed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Platform for RecordingPlatform {
    async fn skip_waiting(&self) -> Result<(), Error> {
        self.skipped.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn claim_clients(&self) -> Result<usize, Error> {
        self.claimed.store(true, Ordering::SeqCst);
        Ok(self.clients.lock().unwrap().len())
    }

    async fn match_clients(&self) -> Result<Vec<ClientInfo>, Error> {
        Ok(self.clients.lock().unwrap().clone())
    }

    async fn focus_client(&self, id: &str) -> Result<ClientInfo, Error> {
        let mut clients = self.clients.lock().unwrap();
        let client = clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::Platform(format!("no client {id}")))?;
        client.focused = true;
        Ok(client.clone())
    }

    async fn open_window(&self, url: &Url) -> Result<ClientInfo, Error> {
        self.opened.lock().unwrap().push(url.to_string());
        let mut clients = self.clients.lock().unwrap();
        let client = ClientInfo { id: format!("window-{}", clients.len() + 1), url: url.to_string(), focused: true };
        clients.push(client.clone());
        Ok(client)
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        if self.fail_notifications.load(Ordering::SeqCst) {
            return Err(Error::Platform("notifications denied".into()));
        }
        self.notifications.lock().unwrap().push(notification.clone());
        Ok(())
    }

    async fn close_notification(&self, tag: &str) -> Result<(), Error> {
        self.closed.lock().unwrap().push(tag.to_string());
        Ok(())
    }
}

/// A manager wired to in-memory doubles.
pub struct Harness {
    pub config: AppConfig,
    pub db: CacheDb,
    pub storage: Arc<CountingStorage>,
    pub network: Arc<MockNetwork>,
    pub platform: Arc<RecordingPlatform>,
    pub manager: CacheManager,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let db = CacheDb::open_in_memory().await.unwrap();
        let storage = Arc::new(CountingStorage::new(db.clone()));
        let network = Arc::new(MockNetwork::default());
        let platform = Arc::new(RecordingPlatform::default());
        let manager = CacheManager::new(&config, storage.clone(), network.clone(), platform.clone()).unwrap();

        Self { config, db, storage, network, platform, manager }
    }
}
