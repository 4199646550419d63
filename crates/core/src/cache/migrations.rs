//! Schema migrations for the cache store database.
//!
//! Applied versions are recorded in `_migrations`; opening a database
//! applies whatever is newer than the highest recorded version.

use super::Error;
use tokio_rusqlite::{Connection, params};

/// Schema versions in ascending order, each with the SQL batch that
/// brings the previous version up to it.
const MIGRATIONS: &[(i64, &str)] = &[
    (1, include_str!("../../migrations/001_cache_stores.sql")),
    (2, include_str!("../../migrations/002_cache_entries.sql")),
];

/// Bring the schema up to the newest version.
///
/// Each version is applied in its own transaction together with its
/// `_migrations` row, so a failed batch leaves the previous version intact.
///
/// # Errors
///
/// Returns `Error::MigrationFailed` naming the version whose SQL failed.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(Error::from)?;

        let current: i64 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| {
                row.get(0)
            })
            .map_err(Error::from)?;

        for &(version, sql) in MIGRATIONS.iter().filter(|(version, _)| *version > current) {
            let tx = conn.transaction().map_err(Error::from)?;
            tx.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("version {version}: {e}")))?;
            tx.execute(
                "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                params![version, chrono::Utc::now().to_rfc3339()],
            )
            .map_err(Error::from)?;
            tx.commit().map_err(Error::from)?;
            tracing::debug!(version, "applied schema migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}
