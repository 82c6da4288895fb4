//! In-memory store implementation.
//!
//! All data is held in RAM behind a [`RwLock`] and is lost when the process
//! exits. Use this for tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{CookieAttributes, SessionStore, StoreError};

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Cookie {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    /// (domain, name) → cookie.
    cookies: HashMap<(String, String), Cookie>,
    local: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Thread-safe, in-memory implementation of [`SessionStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Internal("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Internal("memory store lock poisoned".into()))
    }
}

// ---------------------------------------------------------------------------
// SessionStore impl
// ---------------------------------------------------------------------------

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get_cookie(&self, domain: &str, name: &str) -> Result<Option<String>, StoreError> {
        let inner = self.read()?;
        let now = Utc::now();
        Ok(inner
            .cookies
            .get(&(domain.to_string(), name.to_string()))
            .filter(|c| c.expires_at > now)
            .map(|c| c.value.clone()))
    }

    async fn set_cookie(
        &self,
        name: &str,
        value: &str,
        attrs: &CookieAttributes,
    ) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        inner.cookies.insert(
            (attrs.domain.clone(), name.to_string()),
            Cookie {
                value: value.to_string(),
                expires_at: attrs.expires_at(),
            },
        );
        Ok(())
    }

    async fn remove_cookie(&self, name: &str, attrs: &CookieAttributes) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        inner
            .cookies
            .remove(&(attrs.domain.clone(), name.to_string()));
        Ok(())
    }

    async fn get_local(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.local.get(key).cloned())
    }

    async fn set_local(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.write()?.local.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_local(&self, key: &str) -> Result<(), StoreError> {
        self.write()?.local.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SameSite;

    fn attrs(domain: &str) -> CookieAttributes {
        CookieAttributes {
            domain: domain.into(),
            secure: true,
            same_site: SameSite::Strict,
            expires_in: chrono::Duration::days(1),
        }
    }

    #[tokio::test]
    async fn cookie_roundtrip() {
        let s = MemoryStore::new();
        s.set_cookie("k", "v", &attrs(".example.com")).await.unwrap();
        assert_eq!(
            s.get_cookie(".example.com", "k").await.unwrap().as_deref(),
            Some("v")
        );
    }

    #[tokio::test]
    async fn cookie_is_domain_scoped() {
        let s = MemoryStore::new();
        s.set_cookie("k", "v", &attrs(".example.com")).await.unwrap();
        assert!(s.get_cookie(".other.com", "k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_cookie_reads_as_absent() {
        let s = MemoryStore::new();
        let mut expired = attrs(".example.com");
        expired.expires_in = chrono::Duration::seconds(-1);
        s.set_cookie("k", "v", &expired).await.unwrap();
        assert!(s.get_cookie(".example.com", "k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let s = MemoryStore::new();
        let a = attrs(".example.com");
        s.set_cookie("k", "v", &a).await.unwrap();
        s.remove_cookie("k", &a).await.unwrap();
        s.remove_cookie("k", &a).await.unwrap();
        assert!(s.get_cookie(".example.com", "k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn local_roundtrip() {
        let s = MemoryStore::new();
        s.set_local("lastConnect", "metamask").await.unwrap();
        assert_eq!(
            s.get_local("lastConnect").await.unwrap().as_deref(),
            Some("metamask")
        );
        s.remove_local("lastConnect").await.unwrap();
        assert!(s.get_local("lastConnect").await.unwrap().is_none());
    }
}
