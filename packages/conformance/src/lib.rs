//! Shared helpers for the biolink end-to-end test suite.
//!
//! - [`spawn_mock_hub`] binds an in-process axum server on an ephemeral port
//!   that speaks the hub API (asset profiles, details, files) and the
//!   activity claim endpoint, counting every request it serves.
//! - [`FakeInjected`], [`FakeBridgeConnector`] and [`RecordingPrompt`] are
//!   scripted stand-ins for the wallet seams of `biolink-session`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use biolink_session::{
    BridgeConnector, DisconnectEvent, DisconnectListener, InjectedProvider, ProviderError,
    RemoteBridge, UserPrompt,
};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Mock hub
// ---------------------------------------------------------------------------

/// Everything the mock hub stores and counts. Tests seed and inspect it
/// directly.
#[derive(Default)]
pub struct HubState {
    /// `(address, lowercased kind)` → response body.
    pub profiles: Mutex<HashMap<(String, String), Value>>,
    /// Hub files by id.
    pub files: Mutex<HashMap<String, Value>>,
    pub claims: Mutex<Vec<Value>>,

    pub profile_fetches: AtomicUsize,
    pub detail_fetches: AtomicUsize,
    pub file_gets: AtomicUsize,
    pub file_puts: AtomicUsize,

    /// When set, asset-profile and detail reads answer 500.
    pub fail_reads: AtomicBool,
    /// When set, `PUT /` answers 500.
    pub fail_puts: AtomicBool,
}

impl HubState {
    pub fn set_profile(&self, address: &str, kind: &str, body: Value) {
        lock(&self.profiles).insert((address.to_string(), kind.to_lowercase()), body);
    }

    pub fn file(&self, id: &str) -> Option<Value> {
        lock(&self.files).get(id).cloned()
    }

    pub fn profile_fetches(&self) -> usize {
        self.profile_fetches.load(Ordering::SeqCst)
    }

    pub fn file_puts(&self) -> usize {
        self.file_puts.load(Ordering::SeqCst)
    }
}

/// A running mock hub.
pub struct MockHub {
    /// e.g. `http://127.0.0.1:51234`
    pub base_url: String,
    pub state: Arc<HubState>,
}

/// Start an ephemeral in-process hub on `127.0.0.1`.
///
/// # Panics
///
/// Panics if the TCP listener cannot be bound.
pub async fn spawn_mock_hub() -> MockHub {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");
    let state = Arc::new(HubState::default());

    let router = Router::new()
        .route("/", put(put_files))
        .route("/{id}", get(get_file))
        .route("/asset-profile/{address}/{kind}/", get(asset_profile))
        .route("/poap/claim", post(claim))
        .with_state(Arc::clone(&state));

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock hub error");
    });

    MockHub {
        base_url: format!("http://{addr}"),
        state,
    }
}

async fn asset_profile(
    State(state): State<Arc<HubState>>,
    Path((address, kind)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if params.contains_key("platform") {
        state.detail_fetches.fetch_add(1, Ordering::SeqCst);
        if state.fail_reads.load(Ordering::SeqCst) {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
        return Json(detail_body(&kind, &address, &params)).into_response();
    }

    state.profile_fetches.fetch_add(1, Ordering::SeqCst);
    if state.fail_reads.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    match lock(&state.profiles).get(&(address, kind)) {
        Some(body) => Json(body.clone()).into_response(),
        None => "".into_response(),
    }
}

/// Detail payloads echo the query so tests can check what was sent.
fn detail_body(kind: &str, address: &str, params: &HashMap<String, String>) -> Value {
    let param = |k: &str| params.get(k).cloned().unwrap_or_default();
    let data = match kind {
        "nft" => json!({
            "chain": param("platform"),
            "token_id": param("id"),
            "name": param("identity"),
        }),
        "gitcoin-donation" => json!({
            "grant": { "active": true, "title": param("id") },
            "txs": [{
                "donor": param("identity"),
                "amount": "1000",
                "symbol": "DAI",
                "txHash": "0xd0",
            }],
        }),
        "poap" => json!({
            "event": { "id": 1, "name": param("platform") },
            "tokenId": param("id"),
            "owner": address,
        }),
        _ => Value::Null,
    };
    json!({ "status": true, "data": data })
}

async fn get_file(State(state): State<Arc<HubState>>, Path(id): Path<String>) -> Response {
    state.file_gets.fetch_add(1, Ordering::SeqCst);
    match state.file(&id) {
        Some(file) => Json(file).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn put_files(State(state): State<Arc<HubState>>, Json(body): Json<Value>) -> StatusCode {
    state.file_puts.fetch_add(1, Ordering::SeqCst);
    if state.fail_puts.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    let mut files = lock(&state.files);
    for file in body["contents"].as_array().into_iter().flatten() {
        if let Some(id) = file["id"].as_str() {
            files.insert(id.to_string(), file.clone());
        }
    }
    StatusCode::OK
}

/// Claims from [`EMPTY_CLAIM_ADDRESS`] get an empty body; all others a
/// pending transaction.
async fn claim(State(state): State<Arc<HubState>>, Json(body): Json<Value>) -> Response {
    lock(&state.claims).push(body.clone());
    if body["address"] == EMPTY_CLAIM_ADDRESS {
        return "".into_response();
    }
    Json(json!({ "data": { "tx_hash": "0x1", "tx_status": "pending" } })).into_response()
}

pub const EMPTY_CLAIM_ADDRESS: &str = "0xEMPTY";

// ---------------------------------------------------------------------------
// Fake wallets
// ---------------------------------------------------------------------------

/// The signature every fake wallet returns for `message` signed by `address`.
pub fn fake_signature(address: &str, message: &str) -> String {
    format!("0xsig:{address}:{}", message.len())
}

/// Scripted browser wallet.
pub struct FakeInjected {
    account: String,
    pub deny_accounts: AtomicBool,
    pub deny_signatures: AtomicBool,
    pub account_requests: AtomicUsize,
    pub signed: Mutex<Vec<String>>,
}

impl FakeInjected {
    /// A wallet exposing `account` (any case).
    pub fn new(account: &str) -> Arc<Self> {
        Arc::new(Self {
            account: account.to_string(),
            deny_accounts: AtomicBool::new(false),
            deny_signatures: AtomicBool::new(false),
            account_requests: AtomicUsize::new(0),
            signed: Mutex::new(Vec::new()),
        })
    }

    pub fn account_requests(&self) -> usize {
        self.account_requests.load(Ordering::SeqCst)
    }

    pub fn signed(&self) -> Vec<String> {
        lock(&self.signed).clone()
    }

    /// Number of provider calls of any kind.
    pub fn calls(&self) -> usize {
        self.account_requests() + lock(&self.signed).len()
    }
}

#[async_trait]
impl InjectedProvider for FakeInjected {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.account_requests.fetch_add(1, Ordering::SeqCst);
        if self.deny_accounts.load(Ordering::SeqCst) {
            return Err(ProviderError::Denied);
        }
        Ok(vec![self.account.clone()])
    }

    async fn personal_sign(&self, message: &str, address: &str) -> Result<String, ProviderError> {
        if self.deny_signatures.load(Ordering::SeqCst) {
            return Err(ProviderError::Denied);
        }
        lock(&self.signed).push(message.to_string());
        Ok(fake_signature(address, message))
    }
}

/// One scripted pairing.
pub struct FakeBridge {
    account: String,
    cancel: bool,
    listener: Mutex<Option<DisconnectListener>>,
    pub enables: AtomicUsize,
    pub disconnects: AtomicUsize,
    pub signed: Mutex<Vec<String>>,
}

impl FakeBridge {
    /// Simulate the remote side ending the pairing.
    pub fn remote_disconnect(&self, code: u16, reason: &str) {
        if let Some(listener) = lock(&self.listener).as_ref() {
            listener(DisconnectEvent {
                code,
                reason: reason.to_string(),
            });
        }
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub fn signed(&self) -> Vec<String> {
        lock(&self.signed).clone()
    }
}

#[async_trait]
impl RemoteBridge for FakeBridge {
    async fn enable(&self) -> Result<Vec<String>, ProviderError> {
        self.enables.fetch_add(1, Ordering::SeqCst);
        if self.cancel {
            return Err(ProviderError::Cancelled);
        }
        Ok(vec![self.account.clone()])
    }

    async fn personal_sign(&self, message: &str, address: &str) -> Result<String, ProviderError> {
        lock(&self.signed).push(message.to_string());
        Ok(fake_signature(address, message))
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_disconnect(&self, listener: DisconnectListener) {
        *lock(&self.listener) = Some(listener);
    }
}

/// Opens [`FakeBridge`]s and remembers every one of them.
pub struct FakeBridgeConnector {
    account: String,
    pub cancel: AtomicBool,
    opened: Mutex<Vec<Arc<FakeBridge>>>,
}

impl FakeBridgeConnector {
    pub fn new(account: &str) -> Arc<Self> {
        Arc::new(Self {
            account: account.to_string(),
            cancel: AtomicBool::new(false),
            opened: Mutex::new(Vec::new()),
        })
    }

    pub fn opened(&self) -> usize {
        lock(&self.opened).len()
    }

    /// The most recently opened pairing.
    pub fn last(&self) -> Option<Arc<FakeBridge>> {
        lock(&self.opened).last().cloned()
    }
}

impl BridgeConnector for FakeBridgeConnector {
    fn open(&self) -> Arc<dyn RemoteBridge> {
        let bridge = Arc::new(FakeBridge {
            account: self.account.clone(),
            cancel: self.cancel.load(Ordering::SeqCst),
            listener: Mutex::new(None),
            enables: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
            signed: Mutex::new(Vec::new()),
        });
        lock(&self.opened).push(Arc::clone(&bridge));
        bridge
    }
}

/// A [`UserPrompt`] that records every alert.
#[derive(Default)]
pub struct RecordingPrompt {
    alerts: Mutex<Vec<String>>,
}

impl RecordingPrompt {
    pub fn alerts(&self) -> Vec<String> {
        lock(&self.alerts).clone()
    }
}

impl UserPrompt for RecordingPrompt {
    fn alert(&self, message: &str) {
        lock(&self.alerts).push(message.to_string());
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}
