//! SQLite-backed store implementation.
//!
//! Uses `rusqlite` (with bundled SQLite) wrapped in an `Arc<Mutex<Connection>>`
//! to satisfy the `Send + Sync` requirements. All blocking calls are offloaded
//! to a thread-pool via `tokio::task::spawn_blocking`.
//!
//! # Schema
//!
//! - `cookies`: one row per (domain, name) with its attributes and expiry
//!   as Unix milliseconds.
//! - `local_storage`: unscoped key/value pairs.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};

use super::{CookieAttributes, SessionStore, StoreError};

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS cookies (
    domain      TEXT NOT NULL,
    name        TEXT NOT NULL,
    value       TEXT NOT NULL,
    secure      INTEGER NOT NULL,
    same_site   TEXT NOT NULL,
    expires_at  INTEGER NOT NULL,
    PRIMARY KEY (domain, name)
);

CREATE TABLE IF NOT EXISTS local_storage (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

/// SQLite-backed implementation of [`SessionStore`].
///
/// Holds a single database connection protected by a `Mutex`. All operations
/// run inside `spawn_blocking` to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `path` and apply the schema.
    pub fn open(path: &str) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database (data is lost when dropped).
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn)?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Internal(format!("task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, StoreError> {
    conn.lock()
        .map_err(|_| StoreError::Internal("connection lock poisoned".into()))
}

fn map_err(e: rusqlite::Error) -> StoreError {
    StoreError::Internal(e.to_string())
}

fn optional<T>(result: rusqlite::Result<T>) -> Result<Option<T>, StoreError> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(map_err(e)),
    }
}

// ---------------------------------------------------------------------------
// SessionStore impl
// ---------------------------------------------------------------------------

#[async_trait]
impl SessionStore for SqliteStore {
    // --- Cookies -------------------------------------------------------------

    async fn get_cookie(&self, domain: &str, name: &str) -> Result<Option<String>, StoreError> {
        let domain = domain.to_string();
        let name = name.to_string();
        let now = Utc::now().timestamp_millis();

        self.with_conn(move |conn| {
            optional(conn.query_row(
                "SELECT value FROM cookies
                 WHERE domain = ?1 AND name = ?2 AND expires_at > ?3",
                params![domain, name, now],
                |row| row.get::<_, String>(0),
            ))
        })
        .await
    }

    async fn set_cookie(
        &self,
        name: &str,
        value: &str,
        attrs: &CookieAttributes,
    ) -> Result<(), StoreError> {
        let name = name.to_string();
        let value = value.to_string();
        let domain = attrs.domain.clone();
        let secure = attrs.secure;
        let same_site = attrs.same_site.as_str();
        let expires_at = attrs.expires_at().timestamp_millis();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO cookies (domain, name, value, secure, same_site, expires_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(domain, name) DO UPDATE SET
                    value = excluded.value,
                    secure = excluded.secure,
                    same_site = excluded.same_site,
                    expires_at = excluded.expires_at",
                params![domain, name, value, secure, same_site, expires_at],
            )
            .map_err(map_err)?;
            Ok(())
        })
        .await
    }

    async fn remove_cookie(&self, name: &str, attrs: &CookieAttributes) -> Result<(), StoreError> {
        let name = name.to_string();
        let domain = attrs.domain.clone();

        self.with_conn(move |conn| {
            conn.execute(
                "DELETE FROM cookies WHERE domain = ?1 AND name = ?2",
                params![domain, name],
            )
            .map_err(map_err)?;
            Ok(())
        })
        .await
    }

    // --- Local storage -------------------------------------------------------

    async fn get_local(&self, key: &str) -> Result<Option<String>, StoreError> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            optional(conn.query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            ))
        })
        .await
    }

    async fn set_local(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let key = key.to_string();
        let value = value.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO local_storage (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(map_err)?;
            Ok(())
        })
        .await
    }

    async fn remove_local(&self, key: &str) -> Result<(), StoreError> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM local_storage WHERE key = ?1", params![key])
                .map_err(map_err)?;
            Ok(())
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
