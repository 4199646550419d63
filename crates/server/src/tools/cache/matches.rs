//! cache_match tool implementation.
//!
//! Looks up the stored response for a request, in one store or in any.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;
use vidshell_core::{CacheDb, Error, RequestKey};

use crate::tools::json_result;

fn default_method() -> String {
    "GET".to_string()
}

/// Parameters for the cache_match tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheMatchParams {
    /// Absolute URL, or a path resolved against the app origin.
    pub url: String,

    /// HTTP method of the stored request (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Store to search. Omit to search every store, oldest first.
    pub store: Option<String>,
}

/// Output from the cache_match tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheMatchOutput {
    pub key: String,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body_bytes: usize,
    /// Body as text when it is valid UTF-8.
    pub body: Option<String>,
}

/// Implementation of the cache_match tool.
pub async fn match_impl(cache: &CacheDb, origin: &Url, params: CacheMatchParams) -> Result<CallToolResult, McpError> {
    let mut url = origin
        .join(params.url.trim())
        .map_err(|e| Error::InvalidUrl(format!("{}: {e}", params.url)))?;
    url.set_fragment(None);

    let key = RequestKey::new(&params.method, url.as_str());
    let found = match &params.store {
        Some(store) => cache.get_entry(store, &key).await?,
        None => cache.find_entry(&key).await?,
    };
    let response = found.ok_or_else(|| Error::CacheMiss(key.to_string()))?;

    let output = CacheMatchOutput {
        key: key.to_string(),
        status: response.status,
        body_bytes: response.body.len(),
        body: String::from_utf8(response.body).ok(),
        status_text: response.status_text,
        headers: response.headers,
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::output_json;
    use vidshell_core::CachedResponse;

    fn origin() -> Url {
        Url::parse("http://localhost:8080/").unwrap()
    }

    fn shell() -> CachedResponse {
        CachedResponse {
            status: 200,
            status_text: "OK".into(),
            headers: vec![("content-type".into(), "text/html".into())],
            body: b"<!doctype html>".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_match_any_store() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        cache
            .put_entry("video-player-pwa-v2", &RequestKey::get("http://localhost:8080/index.html"), &shell())
            .await
            .unwrap();

        let params = CacheMatchParams { url: "/index.html".into(), method: default_method(), store: None };
        let output = output_json(&match_impl(&cache, &origin(), params).await.unwrap());

        assert_eq!(output["key"], "GET http://localhost:8080/index.html");
        assert_eq!(output["status"], 200);
        assert_eq!(output["body"], "<!doctype html>");
    }

    #[tokio::test]
    async fn test_match_wrong_store_misses() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        cache
            .put_entry("video-player-pwa-v1", &RequestKey::get("http://localhost:8080/index.html"), &shell())
            .await
            .unwrap();

        let params = CacheMatchParams {
            url: "/index.html".into(),
            method: default_method(),
            store: Some("video-player-pwa-v2".into()),
        };
        let err = match_impl(&cache, &origin(), params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_match_method_is_part_of_identity() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        cache
            .put_entry("v2", &RequestKey::get("http://localhost:8080/index.html"), &shell())
            .await
            .unwrap();

        let params = CacheMatchParams { url: "/index.html".into(), method: "post".into(), store: None };
        assert!(match_impl(&cache, &origin(), params).await.is_err());
    }
}
