//! Persistence for the session record.
//!
//! The [`SessionStore`] trait models the two places a browser front end keeps
//! state between visits: domain-scoped cookies (with expiry and security
//! attributes) and unscoped local storage. The session manager only ever
//! writes cookies; local storage is read once to migrate a legacy record.
//!
//! # Implementations
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`MemoryStore`] | Tests, ephemeral processes |
//! | [`SqliteStore`] | CLI and long-lived hosts; durable single-file database |
//!
//! [`MemoryStore`]: memory::MemoryStore
//! [`SqliteStore`]: sqlite::SqliteStore

pub mod memory;
pub mod record;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use record::{SessionRecord, SessionRecordStore};

/// Cookie holding the connect method (`metamask` / `walletConnect`).
pub const METHOD_KEY: &str = "RSS3BioConnectMethod";
/// Cookie holding the checksummed address.
pub const ADDRESS_KEY: &str = "RSS3BioConnectAddress";
/// Legacy local-storage key for the connect method.
pub const LEGACY_METHOD_KEY: &str = "lastConnect";
/// Legacy local-storage key for the address.
pub const LEGACY_ADDRESS_KEY: &str = "lastAddress";

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Errors that store operations can return.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An unexpected error in the underlying backend.
    #[error("internal store error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// Cookie attributes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Attributes applied when a cookie is written or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieAttributes {
    /// Scope, e.g. `.rss3.bio`.
    pub domain: String,
    pub secure: bool,
    pub same_site: SameSite,
    /// Lifetime from the moment of writing. A non-positive value writes an
    /// already-expired cookie.
    pub expires_in: chrono::Duration,
}

impl CookieAttributes {
    /// Absolute expiry for a cookie written now.
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc::now()
            .checked_add_signed(self.expires_in)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

// ---------------------------------------------------------------------------
// SessionStore trait
// ---------------------------------------------------------------------------

/// The persistence contract for session state.
///
/// Implementations must be `Send + Sync + 'static` so they can be held in an
/// `Arc<dyn SessionStore>`.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    // --- Cookies -------------------------------------------------------------

    /// Read a cookie visible in `domain`. Expired cookies read as `None`.
    async fn get_cookie(&self, domain: &str, name: &str) -> Result<Option<String>, StoreError>;

    /// Write (or overwrite) a cookie under `attrs.domain`.
    async fn set_cookie(
        &self,
        name: &str,
        value: &str,
        attrs: &CookieAttributes,
    ) -> Result<(), StoreError>;

    /// Remove a cookie from `attrs.domain`. No-op if it does not exist.
    async fn remove_cookie(&self, name: &str, attrs: &CookieAttributes) -> Result<(), StoreError>;

    // --- Local storage -------------------------------------------------------

    async fn get_local(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set_local(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a local entry. No-op if it does not exist.
    async fn remove_local(&self, key: &str) -> Result<(), StoreError>;
}
