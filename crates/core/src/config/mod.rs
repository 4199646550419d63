//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (VIDSHELL_*)
//! 2. TOML config file (if VIDSHELL_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (VIDSHELL_*)
/// 2. TOML config file (if VIDSHELL_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via VIDSHELL_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Fixed part of every cache store name.
    ///
    /// Set via VIDSHELL_CACHE_PREFIX environment variable.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Cache generation. Bumping it invalidates every previously cached entry
    /// at the next activation.
    ///
    /// Set via VIDSHELL_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Origin the worker is registered for; relative asset paths resolve against it.
    ///
    /// Set via VIDSHELL_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Application root path, focused or opened on notification click.
    #[serde(default = "default_root_path")]
    pub root_path: String,

    /// Offline page served to HTML navigations that miss the cache.
    #[serde(default = "default_shell_path")]
    pub shell_path: String,

    /// Ordered manifest of assets pre-cached at install.
    #[serde(default = "default_core_assets")]
    pub core_assets: Vec<String>,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via VIDSHELL_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via VIDSHELL_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub router: RouterConfig,

    #[serde(default)]
    pub notification: NotificationConfig,

    #[serde(default)]
    pub sync: SyncConfig,
}

/// Request classification inputs.
///
/// Set via VIDSHELL_ROUTER__* environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// File extensions (without dot) that mark streaming media.
    #[serde(default = "default_streaming_extensions")]
    pub streaming_extensions: Vec<String>,

    /// Path fragments that mark streaming media regardless of extension.
    #[serde(default = "default_streaming_path_segments")]
    pub streaming_path_segments: Vec<String>,

    /// URL schemes that are never intercepted (browser extensions).
    #[serde(default = "default_passthrough_schemes")]
    pub passthrough_schemes: Vec<String>,
}

/// Fixed visual assets of push notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_notification_title")]
    pub title: String,

    /// Body used when a push carries no payload.
    #[serde(default = "default_notification_body")]
    pub default_body: String,

    #[serde(default = "default_notification_icon")]
    pub icon: String,

    #[serde(default = "default_notification_badge")]
    pub badge: String,

    /// Vibration pattern in milliseconds.
    #[serde(default = "default_vibrate")]
    pub vibrate: Vec<u32>,
}

/// What happens when a background sync run fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncFailurePolicy {
    /// Log the failure and report success to the host.
    #[default]
    Swallow,
    /// Return the failure to the host.
    Report,
}

/// Background sync settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Tag that triggers the shell refresh; other tags are ignored.
    #[serde(default = "default_sync_tag")]
    pub tag: String,

    #[serde(default)]
    pub failure_policy: SyncFailurePolicy,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./vidshell-cache.sqlite")
}

fn default_cache_prefix() -> String {
    "video-player-pwa".into()
}

fn default_cache_version() -> String {
    "v2".into()
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_root_path() -> String {
    "/".into()
}

fn default_shell_path() -> String {
    "/index.html".into()
}

fn default_core_assets() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/styles.css",
        "/app.js",
        "/manifest.json",
        "https://unpkg.com/cloudinary-video-player@1.9.5/dist/cld-video-player.min.css",
        "https://unpkg.com/cloudinary-video-player@1.9.5/dist/cld-video-player.min.js",
        "https://unpkg.com/cloudinary-core@2.13.0/cloudinary-core-shrinkwrap.min.js",
        "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_user_agent() -> String {
    "vidshell/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_streaming_extensions() -> Vec<String> {
    ["mp4", "webm", "m3u8", "mpd"].into_iter().map(String::from).collect()
}

fn default_streaming_path_segments() -> Vec<String> {
    vec!["/video/upload/".into()]
}

fn default_passthrough_schemes() -> Vec<String> {
    ["chrome-extension", "moz-extension", "safari-extension", "safari-web-extension"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_notification_title() -> String {
    "Video Player".into()
}

fn default_notification_body() -> String {
    "New video available!".into()
}

fn default_notification_icon() -> String {
    "/icon-192.png".into()
}

fn default_notification_badge() -> String {
    "/icon-72.png".into()
}

fn default_vibrate() -> Vec<u32> {
    vec![100, 50, 100]
}

fn default_sync_tag() -> String {
    "background-sync".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            cache_prefix: default_cache_prefix(),
            cache_version: default_cache_version(),
            origin: default_origin(),
            root_path: default_root_path(),
            shell_path: default_shell_path(),
            core_assets: default_core_assets(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            router: RouterConfig::default(),
            notification: NotificationConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            streaming_extensions: default_streaming_extensions(),
            streaming_path_segments: default_streaming_path_segments(),
            passthrough_schemes: default_passthrough_schemes(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: default_notification_title(),
            default_body: default_notification_body(),
            icon: default_notification_icon(),
            badge: default_notification_badge(),
            vibrate: default_vibrate(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { tag: default_sync_tag(), failure_policy: SyncFailurePolicy::default() }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Name of the current cache store, e.g. `video-player-pwa-v2`.
    pub fn cache_name(&self) -> String {
        format!("{}-{}", self.cache_prefix, self.cache_version)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `VIDSHELL_`
    /// 2. TOML file from `VIDSHELL_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("VIDSHELL_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("VIDSHELL_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
