//! Cached entry CRUD operations.
//!
//! Entries are captured responses keyed by request identity inside a store.
//! They never expire individually; only whole-store eviction removes them.

use super::connection::CacheDb;
use super::hash::compute_cache_key;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Normalized request identity: upper-cased method plus absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl RequestKey {
    pub fn new(method: &str, url: impl Into<String>) -> Self {
        Self { method: method.to_ascii_uppercase(), url: url.into() }
    }

    /// Shorthand for the identity of a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// SHA-256 storage key of this identity.
    pub fn hash(&self) -> String {
        compute_cache_key(&self.method, &self.url)
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A captured response as held by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CachedResponse {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Listing view of a stored entry, without its body.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct EntryMeta {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub size: usize,
    pub stored_at: String,
}

fn row_to_response(row: &rusqlite::Row<'_>) -> rusqlite::Result<(u16, String, String, Vec<u8>)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode(raw: Option<(u16, String, String, Vec<u8>)>) -> Result<Option<CachedResponse>, Error> {
    let Some((status, status_text, headers_json, body)) = raw else {
        return Ok(None);
    };
    let headers = serde_json::from_str(&headers_json)?;
    Ok(Some(CachedResponse { status, status_text, headers, body }))
}

fn insert_entry(
    conn: &rusqlite::Connection, store: &str, key: &RequestKey, response: &CachedResponse, headers_json: &str,
    stored_at: &str,
) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO cache_entries (
            store, key_hash, method, url, status, status_text, headers_json, body, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(store, key_hash) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            status_text = excluded.status_text,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            store,
            key.hash(),
            &key.method,
            &key.url,
            response.status,
            &response.status_text,
            headers_json,
            &response.body,
            stored_at,
        ],
    )
}

impl CacheDb {
    /// Insert or overwrite an entry, creating the store if needed.
    pub async fn put_entry(&self, store: &str, key: &RequestKey, response: &CachedResponse) -> Result<(), Error> {
        self.put_entries(store, &[(key.clone(), response.clone())]).await
    }

    /// Insert or overwrite several entries in a single transaction.
    ///
    /// Either every entry is written or none is.
    pub async fn put_entries(&self, store: &str, entries: &[(RequestKey, CachedResponse)]) -> Result<(), Error> {
        let store = store.to_string();
        let entries = entries
            .iter()
            .map(|(key, response)| Ok((key.clone(), response.clone(), serde_json::to_string(&response.headers)?)))
            .collect::<Result<Vec<_>, Error>>()?;
        let stored_at = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
                    params![&store, &stored_at],
                )?;
                for (key, response, headers_json) in &entries {
                    insert_entry(&tx, &store, key, response, headers_json, &stored_at)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up an entry in one store.
    pub async fn get_entry(&self, store: &str, key: &RequestKey) -> Result<Option<CachedResponse>, Error> {
        let store = store.to_string();
        let key_hash = key.hash();
        let raw = self
            .conn
            .call(move |conn| -> Result<_, Error> {
                let result = conn.query_row(
                    "SELECT status, status_text, headers_json, body
                     FROM cache_entries WHERE store = ?1 AND key_hash = ?2",
                    params![store, key_hash],
                    row_to_response,
                );

                match result {
                    Ok(raw) => Ok(Some(raw)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        decode(raw)
    }

    /// Look up an entry across all stores, oldest store first.
    pub async fn find_entry(&self, key: &RequestKey) -> Result<Option<CachedResponse>, Error> {
        let key_hash = key.hash();
        let raw = self
            .conn
            .call(move |conn| -> Result<_, Error> {
                let result = conn.query_row(
                    "SELECT e.status, e.status_text, e.headers_json, e.body
                     FROM cache_entries e JOIN cache_stores s ON s.name = e.store
                     WHERE e.key_hash = ?1
                     ORDER BY s.rowid LIMIT 1",
                    params![key_hash],
                    row_to_response,
                );

                match result {
                    Ok(raw) => Ok(Some(raw)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        decode(raw)
    }

    /// List entries of a store in URL order.
    pub async fn list_entries(&self, store: &str) -> Result<Vec<EntryMeta>, Error> {
        let store = store.to_string();
        let rows = self
            .conn
            .call(move |conn| -> Result<Vec<(String, String, u16, String, i64, String)>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url, status, headers_json, length(body), stored_at
                     FROM cache_entries WHERE store = ?1 ORDER BY url, method",
                )?;
                let rows = stmt
                    .query_map(params![store], |row| {
                        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)?;

        rows.into_iter()
            .map(|(method, url, status, headers_json, size, stored_at)| {
                let headers: Vec<(String, String)> = serde_json::from_str(&headers_json)?;
                let content_type = headers
                    .into_iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
                    .map(|(_, v)| v);
                Ok(EntryMeta { method, url, status, content_type, size: size as usize, stored_at })
            })
            .collect()
    }

    /// Number of entries held by a store.
    pub async fn entry_count(&self, store: &str) -> Result<u64, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM cache_entries WHERE store = ?1", params![store], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(body: &str) -> CachedResponse {
        CachedResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: vec![("content-type".to_string(), "text/css".to_string())],
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_request_key_uppercases_method() {
        let key = RequestKey::new("get", "https://example.com/");
        assert_eq!(key.method, "GET");
        assert_eq!(key, RequestKey::get("https://example.com/"));
        assert_eq!(key.to_string(), "GET https://example.com/");
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let response = make_response("x");
        assert_eq!(response.header("Content-Type"), Some("text/css"));
        assert_eq!(response.header("etag"), None);
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let key = RequestKey::get("https://example.com/styles.css");
        let response = make_response("body { color: red }");

        db.put_entry("app-v1", &key, &response).await.unwrap();

        let retrieved = db.get_entry("app-v1", &key).await.unwrap().unwrap();
        assert_eq!(retrieved, response);
        assert!(db.has_store("app-v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_store("app-v1").await.unwrap();
        let result = db.get_entry("app-v1", &RequestKey::get("https://example.com/none")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let key = RequestKey::get("https://example.com/app.js");

        db.put_entry("app-v1", &key, &make_response("old")).await.unwrap();
        db.put_entry("app-v1", &key, &make_response("new")).await.unwrap();

        let retrieved = db.get_entry("app-v1", &key).await.unwrap().unwrap();
        assert_eq!(retrieved.body, b"new");
        assert_eq!(db.entry_count("app-v1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_entries_isolated_per_store() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let key = RequestKey::get("https://example.com/app.js");
        db.put_entry("app-v1", &key, &make_response("v1")).await.unwrap();

        assert!(db.get_entry("app-v2", &key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_entry_prefers_oldest_store() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let key = RequestKey::get("https://example.com/app.js");
        db.put_entry("app-v1", &key, &make_response("v1")).await.unwrap();
        db.put_entry("app-v2", &key, &make_response("v2")).await.unwrap();

        let found = db.find_entry(&key).await.unwrap().unwrap();
        assert_eq!(found.body, b"v1");
    }

    #[tokio::test]
    async fn test_delete_store_removes_entries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let key = RequestKey::get("https://example.com/app.js");
        db.put_entry("app-v1", &key, &make_response("v1")).await.unwrap();

        db.delete_store("app-v1").await.unwrap();

        assert!(db.find_entry(&key).await.unwrap().is_none());
        assert_eq!(db.entry_count("app-v1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_entries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entries = vec![
            (RequestKey::get("https://example.com/b.css"), make_response("bb")),
            (RequestKey::get("https://example.com/a.css"), make_response("a")),
        ];
        db.put_entries("app-v1", &entries).await.unwrap();

        let listed = db.list_entries("app-v1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].url, "https://example.com/a.css");
        assert_eq!(listed[0].size, 1);
        assert_eq!(listed[1].size, 2);
        assert_eq!(listed[1].content_type.as_deref(), Some("text/css"));
    }
}
