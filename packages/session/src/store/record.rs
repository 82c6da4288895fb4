//! The persisted session record: connect method + address cookies.

use std::sync::Arc;

use tracing::info;

use super::{
    CookieAttributes, SessionStore, StoreError, ADDRESS_KEY, LEGACY_ADDRESS_KEY,
    LEGACY_METHOD_KEY, METHOD_KEY,
};

/// What the cookie pair currently says. Either field may be missing when
/// the record was written by a legacy migration or partially expired.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRecord {
    /// Raw connect method string; parsed by the caller.
    pub method: Option<String>,
    pub address: Option<String>,
}

/// Reads and writes the session record with fixed cookie attributes.
#[derive(Clone)]
pub struct SessionRecordStore {
    store: Arc<dyn SessionStore>,
    attrs: CookieAttributes,
}

impl SessionRecordStore {
    pub fn new(store: Arc<dyn SessionStore>, attrs: CookieAttributes) -> Self {
        Self { store, attrs }
    }

    pub fn attributes(&self) -> &CookieAttributes {
        &self.attrs
    }

    pub async fn read(&self) -> Result<SessionRecord, StoreError> {
        Ok(SessionRecord {
            method: self.store.get_cookie(&self.attrs.domain, METHOD_KEY).await?,
            address: self
                .store
                .get_cookie(&self.attrs.domain, ADDRESS_KEY)
                .await?,
        })
    }

    pub async fn write(&self, method: &str, address: &str) -> Result<(), StoreError> {
        self.store.set_cookie(METHOD_KEY, method, &self.attrs).await?;
        self.store.set_cookie(ADDRESS_KEY, address, &self.attrs).await
    }

    /// Remove both cookies. Safe to call when nothing is stored.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.remove_cookie(METHOD_KEY, &self.attrs).await?;
        self.store.remove_cookie(ADDRESS_KEY, &self.attrs).await
    }

    /// Move any legacy local-storage entries into the cookie record and
    /// delete them. Each key is migrated independently; a cookie that is
    /// already set is kept. Returns `true` if any legacy key was consumed.
    pub async fn migrate_legacy(&self) -> Result<bool, StoreError> {
        let mut migrated = false;
        for (legacy, cookie) in [
            (LEGACY_METHOD_KEY, METHOD_KEY),
            (LEGACY_ADDRESS_KEY, ADDRESS_KEY),
        ] {
            let Some(value) = self.store.get_local(legacy).await? else {
                continue;
            };
            // An existing cookie wins over the legacy copy.
            if self.store.get_cookie(&self.attrs.domain, cookie).await?.is_some() {
                info!("store: dropped legacy {legacy}, {cookie} is already set");
            } else {
                self.store.set_cookie(cookie, &value, &self.attrs).await?;
                info!("store: migrated legacy {legacy} into {cookie}");
            }
            self.store.remove_local(legacy).await?;
            migrated = true;
        }
        Ok(migrated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{memory::MemoryStore, SameSite};

    fn record_store() -> (Arc<MemoryStore>, SessionRecordStore) {
        let mem = Arc::new(MemoryStore::new());
        let attrs = CookieAttributes {
            domain: ".example.com".into(),
            secure: true,
            same_site: SameSite::Strict,
            expires_in: chrono::Duration::days(1),
        };
        let records = SessionRecordStore::new(Arc::clone(&mem) as Arc<dyn SessionStore>, attrs);
        (mem, records)
    }

    #[tokio::test]
    async fn write_read_clear() {
        let (_, records) = record_store();
        records.write("metamask", "0xAbC").await.unwrap();
        assert_eq!(
            records.read().await.unwrap(),
            SessionRecord {
                method: Some("metamask".into()),
                address: Some("0xAbC".into()),
            }
        );
        records.clear().await.unwrap();
        assert_eq!(records.read().await.unwrap(), SessionRecord::default());
    }

    #[tokio::test]
    async fn migration_runs_once() {
        let (mem, records) = record_store();
        mem.set_local(LEGACY_METHOD_KEY, "walletConnect").await.unwrap();
        mem.set_local(LEGACY_ADDRESS_KEY, "0xAbC").await.unwrap();

        assert!(records.migrate_legacy().await.unwrap());
        assert!(mem.get_local(LEGACY_METHOD_KEY).await.unwrap().is_none());
        assert!(mem.get_local(LEGACY_ADDRESS_KEY).await.unwrap().is_none());
        assert_eq!(
            records.read().await.unwrap().method.as_deref(),
            Some("walletConnect")
        );

        assert!(!records.migrate_legacy().await.unwrap());
    }

    #[tokio::test]
    async fn existing_cookie_wins_over_legacy_key() {
        let (mem, records) = record_store();
        records.write("metamask", "0xOld").await.unwrap();
        mem.set_local(LEGACY_ADDRESS_KEY, "0xNew").await.unwrap();

        assert!(records.migrate_legacy().await.unwrap());
        let rec = records.read().await.unwrap();
        assert_eq!(rec.method.as_deref(), Some("metamask"));
        assert_eq!(rec.address.as_deref(), Some("0xOld"));
        assert!(mem.get_local(LEGACY_ADDRESS_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn legacy_key_fills_missing_cookie() {
        let (mem, records) = record_store();
        mem.set_local(LEGACY_ADDRESS_KEY, "0xNew").await.unwrap();

        assert!(records.migrate_legacy().await.unwrap());
        let rec = records.read().await.unwrap();
        assert!(rec.method.is_none());
        assert_eq!(rec.address.as_deref(), Some("0xNew"));
    }
}
