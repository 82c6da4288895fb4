//! The session manager.
//!
//! [`SessionManager`] owns the single active [`Session`], the persisted
//! session record and the asset-profile cache. It is a cheaply cloneable
//! handle; every clone sees the same state.
//!
//! # Lifecycle
//!
//! ```text
//! Disconnected ──connect_*──▶ Connecting ──initial sync ok──▶ Connected
//!      ▲                          │                              │
//!      └───────── failure ────────┘◀──── disconnect / remote ────┘
//! ```
//!
//! A connect in progress never exposes a partial session: the slot is only
//! written once the session is complete. When two connects race, the one
//! that finishes last wins both the slot and the persisted record.
//!
//! # Failure handling
//!
//! Declined prompts, provider faults and hub read failures are logged and
//! reported as `None`/`false`. Only account linking returns a typed error.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use biolink::{
    available_themes, link_message, AccountLink, Address, Asset, AssetKind, AssetProfile,
    ConnectMethod, Theme,
};
use biolink_hub_api::{DetailQuery, FootprintResponse, GitcoinResponse, NftResponse};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{ConnectError, HubError, LinkError};
use crate::hub::HubClient;
use crate::provider::{
    first_account, DisconnectEvent, DisconnectListener, ListenerFactory, LiveProvider, UserPrompt,
    Wallets,
};
use crate::session::Session;
use crate::signer::Signer;
use crate::store::{SessionRecord, SessionRecordStore, SessionStore};

#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    config: SessionConfig,
    hub: HubClient,
    wallets: Wallets,
    records: SessionRecordStore,
    prompt: Arc<dyn UserPrompt>,
    slot: RwLock<Option<Session>>,
    generation: AtomicU64,
    assets: RwLock<HashMap<String, AssetProfile>>,
}

impl SessionManager {
    /// Build a manager. No I/O happens until the first operation.
    pub fn init(
        config: SessionConfig,
        wallets: Wallets,
        store: Arc<dyn SessionStore>,
        prompt: Arc<dyn UserPrompt>,
    ) -> Self {
        let hub = HubClient::new(config.http_client(), &config.hub_endpoint);
        let records = SessionRecordStore::new(store, config.cookie_attributes());
        info!(hub = %config.hub_endpoint, "session manager initialised");
        Self {
            inner: Arc::new(Inner {
                config,
                hub,
                wallets,
                records,
                prompt,
                slot: RwLock::new(None),
                generation: AtomicU64::new(0),
                assets: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Drop the in-memory session and the asset-profile cache.
    ///
    /// The persisted record is kept, so a later [`reconnect`](Self::reconnect)
    /// restores the session.
    pub fn teardown(&self) {
        self.inner.slot_mut().take();
        self.inner.assets_mut().clear();
        info!("session manager torn down");
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn hub(&self) -> &HubClient {
        &self.inner.hub
    }

    // ── Connect / disconnect ──────────────────────────────────────────────────

    /// Connect through the injected browser wallet.
    ///
    /// A persisted browser-wallet address is reused without asking for
    /// accounts again.
    pub async fn connect_browser_wallet(&self) -> Option<Session> {
        self.connect_logged(ConnectMethod::BrowserWallet, true).await
    }

    /// Pair a remote signer and connect through it.
    pub async fn connect_remote_bridge(&self) -> Option<Session> {
        self.connect_logged(ConnectMethod::RemoteBridge, true).await
    }

    /// End the session and forget the persisted record. Safe to call when
    /// nothing is connected.
    pub async fn disconnect(&self) {
        let previous = self.inner.slot_mut().take();

        if let Some(live) = previous.as_ref().and_then(|s| s.signer()).and_then(|s| s.live()) {
            live.disconnect().await;
        }

        if let Err(e) = self.inner.records.clear().await {
            warn!("session: could not clear the persisted record: {e}");
        }

        match previous.as_ref().and_then(Session::address) {
            Some(address) => info!(%address, "session: disconnected"),
            None => debug!("session: disconnect with no active session"),
        }
    }

    /// Restore the session from the persisted record.
    ///
    /// Legacy local-storage keys are migrated first. A persisted address
    /// yields a session whose signer connects on first use; a persisted
    /// method alone triggers a connect through that method without the
    /// initial sync. Returns whether a session is active afterwards.
    pub async fn reconnect(&self) -> bool {
        match self.inner.records.migrate_legacy().await {
            Ok(true) => info!("session: migrated legacy session record"),
            Ok(false) => {}
            Err(e) => warn!("session: legacy migration failed: {e}"),
        }

        let record = self.inner.records.read().await.unwrap_or_else(|e| {
            warn!("session: could not read the persisted record: {e}");
            SessionRecord::default()
        });
        let method = match record.method.as_deref().map(str::parse::<ConnectMethod>) {
            Some(Ok(method)) => Some(method),
            Some(Err(e)) => {
                warn!("session: {e}");
                None
            }
            None => None,
        };

        match (record.address, method) {
            (Some(address), Some(method)) => self.restore(method, &address).await,
            (Some(_), None) => debug!("session: persisted address without a usable method"),
            (None, _) if self.is_active() => return true,
            (None, Some(method)) => {
                self.connect_logged(method, false).await;
            }
            (None, None) => debug!("session: nothing to reconnect"),
        }

        self.is_active()
    }

    /// The active session, or a read-only one.
    pub fn visitor_session(&self) -> Session {
        self.current()
            .unwrap_or_else(|| Session::visitor(self.inner.hub.clone()))
    }

    pub fn current(&self) -> Option<Session> {
        self.inner.slot().clone()
    }

    pub fn is_active(&self) -> bool {
        self.inner.slot().is_some()
    }

    // ── Hub reads ─────────────────────────────────────────────────────────────

    /// The asset profile of `address` for `kind`.
    ///
    /// Served from the cache unless `force_refresh` is set or nothing is
    /// cached. A failed fetch returns `None` and leaves any cached entry in
    /// place.
    pub async fn get_asset_profile(
        &self,
        address: &str,
        kind: &AssetKind,
        force_refresh: bool,
    ) -> Option<AssetProfile> {
        let key = cache_key(address, kind);
        if !force_refresh {
            if let Some(profile) = self.inner.assets().get(&key) {
                debug!("session: asset profile cache hit for {key}");
                return Some(profile.clone());
            }
        }

        match self.inner.hub.asset_profile(address, kind).await {
            Ok(Some(profile)) => {
                self.inner.assets_mut().insert(key, profile.clone());
                Some(profile)
            }
            Ok(None) => {
                debug!("session: empty asset profile for {key}");
                None
            }
            Err(e) => {
                warn!("session: asset profile fetch for {key} failed: {e}");
                None
            }
        }
    }

    /// The cached asset profile, without touching the network.
    pub fn cached_asset_profile(&self, address: &str, kind: &AssetKind) -> Option<AssetProfile> {
        self.inner.assets().get(&cache_key(address, kind)).cloned()
    }

    pub async fn get_nft_detail(
        &self,
        address: &str,
        platform: &str,
        identity: &str,
        id: &str,
    ) -> Option<NftResponse> {
        let query = DetailQuery::new(platform, identity, id);
        soft("NFT detail", self.inner.hub.nft_detail(address, &query).await)
    }

    pub async fn get_gitcoin_donation(
        &self,
        address: &str,
        platform: &str,
        identity: &str,
        id: &str,
    ) -> Option<GitcoinResponse> {
        let query = DetailQuery::new(platform, identity, id);
        soft(
            "donation detail",
            self.inner.hub.gitcoin_donation(address, &query).await,
        )
    }

    pub async fn get_footprint_detail(
        &self,
        address: &str,
        platform: &str,
        identity: &str,
        id: &str,
    ) -> Option<FootprintResponse> {
        let query = DetailQuery::new(platform, identity, id);
        soft(
            "footprint detail",
            self.inner.hub.footprint_detail(address, &query).await,
        )
    }

    // ── Linking & themes ──────────────────────────────────────────────────────

    /// Prove control of an account in the browser wallet and link it to the
    /// active session.
    ///
    /// The browser wallet is used even when the session itself runs over a
    /// remote bridge. Without an active session no provider is contacted.
    pub async fn link_additional_account(&self, platform: &str) -> Result<AccountLink, LinkError> {
        let owner = self
            .current()
            .and_then(|s| s.address().map(str::to_string))
            .ok_or(LinkError::NotLoggedIn)?;

        let provider = self.inner.wallets.injected()?;
        let identity = first_account(&provider.request_accounts().await?)?;
        let message = link_message(&owner, platform, &identity);
        let signature = provider.personal_sign(&message, &identity).await?;

        info!(%owner, %platform, %identity, "session: linked additional account");
        Ok(AccountLink {
            platform: platform.to_string(),
            identity,
            signature,
        })
    }

    /// Themes unlocked by `assets`, in configured order.
    pub fn available_themes(&self, assets: &[Asset]) -> Vec<Theme> {
        available_themes(&self.inner.config.themes, assets)
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    async fn connect_logged(&self, method: ConnectMethod, initial_sync: bool) -> Option<Session> {
        match self.connect(method, initial_sync).await {
            Ok(session) => Some(session),
            Err(ConnectError::Provider(e)) if e.is_user_declined() => {
                info!(%method, "session: connect declined: {e}");
                None
            }
            Err(e) => {
                warn!(%method, "session: connect failed: {e}");
                None
            }
        }
    }

    async fn connect(
        &self,
        method: ConnectMethod,
        initial_sync: bool,
    ) -> Result<Session, ConnectError> {
        let generation = self.inner.next_generation();
        info!(%method, generation, "session: connecting");

        let (live, address) = match method {
            ConnectMethod::BrowserWallet => {
                let provider = self.inner.wallets.injected()?;
                let address = match self.persisted_address(method).await {
                    Some(address) => address,
                    None => first_account(&provider.request_accounts().await?)?,
                };
                (LiveProvider::BrowserWallet(provider), address)
            }
            ConnectMethod::RemoteBridge => {
                let listener = listener_for(Arc::downgrade(&self.inner), generation);
                let (live, accounts) = self.inner.wallets.establish(method, Some(listener)).await?;
                match first_account(&accounts) {
                    Ok(address) => (live, address),
                    Err(e) => {
                        live.disconnect().await;
                        return Err(e.into());
                    }
                }
            }
        };

        let signer = Arc::new(Signer::ready(
            live.clone(),
            address.clone(),
            Arc::clone(&self.inner.prompt),
        ));
        let session = Session::authenticated(self.inner.hub.clone(), signer, generation);

        if initial_sync {
            if let Err(e) = initial_sync_of(&session, &address).await {
                live.disconnect().await;
                return Err(e.into());
            }
        }

        self.install(session.clone(), method, &address).await;
        info!(%method, %address, "session: connected");
        Ok(session)
    }

    /// Rebuild a session from a persisted `(method, address)` pair without
    /// contacting the wallet.
    async fn restore(&self, method: ConnectMethod, address: &str) {
        let address = match Address::parse(address) {
            Ok(address) => address.into_string(),
            Err(e) => {
                warn!("session: persisted address is unusable: {e}");
                return;
            }
        };

        let generation = self.inner.next_generation();
        let listener = match method {
            ConnectMethod::RemoteBridge => {
                let weak = Arc::downgrade(&self.inner);
                let factory: ListenerFactory =
                    Arc::new(move || listener_for(weak.clone(), generation));
                Some(factory)
            }
            ConnectMethod::BrowserWallet => None,
        };
        let signer = Arc::new(Signer::deferred(
            method,
            address.clone(),
            self.inner.wallets.clone(),
            Arc::clone(&self.inner.prompt),
            listener,
        ));
        let session = Session::authenticated(self.inner.hub.clone(), signer, generation);

        if let Err(e) = session.files().get(&address).await {
            warn!(%address, "session: could not load the hub file: {e}");
        }

        self.replace(session).await;
        info!(%method, %address, "session: restored from persisted record");
    }

    async fn persisted_address(&self, method: ConnectMethod) -> Option<String> {
        let record = match self.inner.records.read().await {
            Ok(record) => record,
            Err(e) => {
                warn!("session: could not read the persisted record: {e}");
                return None;
            }
        };
        match (record.method, record.address) {
            (Some(m), Some(address)) if m == method.as_str() => {
                debug!(%address, "session: reusing persisted address");
                Some(address)
            }
            _ => None,
        }
    }

    async fn install(&self, session: Session, method: ConnectMethod, address: &str) {
        self.replace(session).await;
        if let Err(e) = self.inner.records.write(method.as_str(), address).await {
            warn!("session: could not persist the session record: {e}");
        }
    }

    /// Put `session` in the slot. A bridge pairing held by the session it
    /// replaces is closed unless the new session reuses it.
    async fn replace(&self, session: Session) {
        let incoming = session.signer().and_then(|s| s.live()).cloned();
        let previous = self.inner.slot_mut().replace(session);

        let Some(live) = previous.as_ref().and_then(|s| s.signer()).and_then(|s| s.live()) else {
            return;
        };
        if !matches!(live, LiveProvider::RemoteBridge(_)) {
            return;
        }
        if incoming.as_ref().is_some_and(|new| new.same_connection(live)) {
            return;
        }
        info!("session: closing the bridge of the replaced session");
        live.disconnect().await;
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("hub", &self.inner.config.hub_endpoint)
            .field("session", &*self.inner.slot())
            .finish()
    }
}

impl Inner {
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Clear the slot if it still holds the session of `generation`.
    fn clear_generation(&self, generation: u64) -> bool {
        let mut slot = self.slot_mut();
        if slot.as_ref().is_some_and(|s| s.generation() == generation) {
            *slot = None;
            true
        } else {
            false
        }
    }

    fn slot(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.slot.read().unwrap_or_else(|e| e.into_inner())
    }

    fn slot_mut(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.slot.write().unwrap_or_else(|e| e.into_inner())
    }

    fn assets(&self) -> RwLockReadGuard<'_, HashMap<String, AssetProfile>> {
        self.assets.read().unwrap_or_else(|e| e.into_inner())
    }

    fn assets_mut(&self) -> RwLockWriteGuard<'_, HashMap<String, AssetProfile>> {
        self.assets.write().unwrap_or_else(|e| e.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn cache_key(address: &str, kind: &AssetKind) -> String {
    format!("{address}{kind}")
}

/// Disconnect listener for the bridge session of `generation`. Holds the
/// manager weakly so a dropped manager is never kept alive by a bridge.
fn listener_for(inner: Weak<Inner>, generation: u64) -> DisconnectListener {
    Box::new(move |event: DisconnectEvent| {
        let Some(inner) = inner.upgrade() else {
            return;
        };
        if inner.clear_generation(generation) {
            info!(code = event.code, reason = %event.reason, "session: remote bridge disconnected");
        } else {
            debug!(generation, "session: stale bridge disconnect ignored");
        }
    })
}

async fn initial_sync_of(session: &Session, address: &str) -> Result<(), HubError> {
    let files = session.files();
    let file = files.get(address).await?;
    files.set(file)?;
    files.sync().await
}

fn soft<T>(what: &str, result: Result<Option<T>, HubError>) -> Option<T> {
    result.unwrap_or_else(|e| {
        warn!("session: {what} fetch failed: {e}");
        None
    })
}
