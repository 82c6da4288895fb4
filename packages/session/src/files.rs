//! Per-session hub file cache.
//!
//! Files fetched from the hub are cached locally. [`HubFiles::set`] marks a
//! file dirty; [`HubFiles::sync`] signs every dirty file and uploads them in
//! one `PUT`. Files that were only read are never signed, so a restored
//! session can browse without prompting the wallet.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use biolink::{file_sign_message, MessageError, SIGNATURE_FIELD};
use biolink_hub_api::file::{file_id, new_index_file, touch};
use chrono::Utc;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::HubError;
use crate::hub::HubClient;
use crate::signer::Signer;

#[derive(Default)]
struct FileState {
    files: HashMap<String, Value>,
    dirty: BTreeSet<String>,
}

pub struct HubFiles {
    hub: HubClient,
    signer: Option<Arc<Signer>>,
    state: RwLock<FileState>,
    // Serializes uploads so two syncs never sign the same file twice.
    sync_lock: Mutex<()>,
}

impl HubFiles {
    /// A file cache that can upload through `signer`.
    pub fn new(hub: HubClient, signer: Arc<Signer>) -> Self {
        Self::build(hub, Some(signer))
    }

    /// A read-only file cache.
    pub fn read_only(hub: HubClient) -> Self {
        Self::build(hub, None)
    }

    fn build(hub: HubClient, signer: Option<Arc<Signer>>) -> Self {
        Self {
            hub,
            signer,
            state: RwLock::new(FileState::default()),
            sync_lock: Mutex::new(()),
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.signer.is_none()
    }

    /// The file `id`: from the local cache, else from the hub, else a fresh
    /// index file. Fetched files are cached but not marked dirty.
    pub async fn get(&self, id: &str) -> Result<Value, HubError> {
        if let Some(file) = self.read().files.get(id) {
            debug!("files: cache hit for {id}");
            return Ok(file.clone());
        }

        let file = match self.hub.get_file(id).await? {
            Some(file) => file,
            None => {
                debug!("files: {id} not on hub, starting a new file");
                new_index_file(id, Utc::now())
            }
        };

        // A concurrent `set` may have landed while we were fetching; keep it.
        let mut state = self.write();
        Ok(state.files.entry(id.to_string()).or_insert(file).clone())
    }

    /// Store `file` locally, bump its `date_updated` and mark it for upload.
    pub fn set(&self, mut file: Value) -> Result<(), HubError> {
        let id = file_id(&file).ok_or(MessageError::MissingId)?.to_string();
        touch(&mut file, Utc::now());

        let mut state = self.write();
        state.files.insert(id.clone(), file);
        state.dirty.insert(id);
        Ok(())
    }

    /// Store `file` locally without marking it for upload.
    pub fn load(&self, file: Value) -> Result<(), HubError> {
        let id = file_id(&file).ok_or(MessageError::MissingId)?.to_string();
        self.write().files.insert(id, file);
        Ok(())
    }

    /// Ids of files changed since the last successful sync.
    pub fn pending(&self) -> Vec<String> {
        self.read().dirty.iter().cloned().collect()
    }

    /// Sign every dirty file and upload them.
    ///
    /// Nothing is sent when no file is dirty. On failure the files stay
    /// dirty and nothing in the cache changes.
    pub async fn sync(&self) -> Result<(), HubError> {
        let signer = self.signer.as_ref().ok_or(HubError::ReadOnly)?;
        let _guard = self.sync_lock.lock().await;

        let snapshot: Vec<(String, Value)> = {
            let state = self.read();
            state
                .dirty
                .iter()
                .filter_map(|id| state.files.get(id).map(|f| (id.clone(), f.clone())))
                .collect()
        };
        if snapshot.is_empty() {
            debug!("files: nothing to sync");
            return Ok(());
        }

        let mut signed = Vec::with_capacity(snapshot.len());
        for (_, file) in &snapshot {
            let message = file_sign_message(file)?;
            let signature = signer.sign(&message).await?;
            let mut file = file.clone();
            if let Some(obj) = file.as_object_mut() {
                obj.insert(SIGNATURE_FIELD.into(), Value::String(signature));
            }
            signed.push(file);
        }

        self.hub.put_files(signed.clone()).await?;

        let uploaded = signed.len();
        let mut state = self.write();
        for ((id, sent), file) in snapshot.into_iter().zip(signed) {
            // Only settle files that were not changed again during the upload.
            if state.files.get(&id) == Some(&sent) {
                state.files.insert(id.clone(), file);
                state.dirty.remove(&id);
            }
        }
        info!("files: synced {uploaded} file(s) for {}", signer.address());
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, FileState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, FileState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for HubFiles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("HubFiles")
            .field("files", &state.files.len())
            .field("dirty", &state.dirty)
            .field("read_only", &self.is_read_only())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::{
        extract::{Path, State},
        routing::{get, put},
        Json, Router,
    };
    use reqwest::Client;
    use serde_json::json;
    use tokio::net::TcpListener;

    use crate::error::ProviderError;
    use crate::provider::{InjectedProvider, LiveProvider, TracingPrompt};

    const ADDR: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[derive(Default)]
    struct Hits {
        gets: AtomicUsize,
        puts: AtomicUsize,
        last_put: std::sync::Mutex<Option<Value>>,
    }

    async fn spawn_mock_hub(hits: Arc<Hits>) -> String {
        async fn get_file(State(hits): State<Arc<Hits>>, Path(id): Path<String>) -> Json<Value> {
            hits.gets.fetch_add(1, Ordering::SeqCst);
            Json(json!({ "id": id, "version": "v0", "profile": { "name": "alice" } }))
        }
        async fn put_files(State(hits): State<Arc<Hits>>, Json(body): Json<Value>) {
            hits.puts.fetch_add(1, Ordering::SeqCst);
            *hits.last_put.lock().unwrap() = Some(body);
        }

        let app = Router::new()
            .route("/", put(put_files))
            .route("/{id}", get(get_file))
            .with_state(hits);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    struct EchoWallet;

    #[async_trait]
    impl InjectedProvider for EchoWallet {
        async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
            Ok(vec![ADDR.into()])
        }

        async fn personal_sign(&self, message: &str, _address: &str) -> Result<String, ProviderError> {
            Ok(format!("0xsig{}", message.len()))
        }
    }

    fn signer() -> Arc<Signer> {
        Arc::new(Signer::ready(
            LiveProvider::BrowserWallet(Arc::new(EchoWallet)),
            ADDR,
            Arc::new(TracingPrompt),
        ))
    }

    #[tokio::test]
    async fn get_caches_without_dirtying() {
        let hits = Arc::new(Hits::default());
        let base = spawn_mock_hub(hits.clone()).await;
        let files = HubFiles::new(HubClient::new(Client::new(), &base), signer());

        let first = files.get(ADDR).await.unwrap();
        let second = files.get(ADDR).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(hits.gets.load(Ordering::SeqCst), 1);
        assert!(files.pending().is_empty());

        files.sync().await.unwrap();
        assert_eq!(hits.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sync_signs_and_uploads_dirty_files() {
        let hits = Arc::new(Hits::default());
        let base = spawn_mock_hub(hits.clone()).await;
        let files = HubFiles::new(HubClient::new(Client::new(), &base), signer());

        let file = files.get(ADDR).await.unwrap();
        files.set(file).unwrap();
        assert_eq!(files.pending(), vec![ADDR.to_string()]);

        files.sync().await.unwrap();
        assert!(files.pending().is_empty());
        assert_eq!(hits.puts.load(Ordering::SeqCst), 1);

        let body = hits.last_put.lock().unwrap().clone().unwrap();
        let uploaded = &body["contents"][0];
        assert_eq!(uploaded["id"], ADDR);
        let expected = file_sign_message(uploaded).unwrap();
        assert_eq!(uploaded["signature"], format!("0xsig{}", expected.len()));
        assert!(uploaded["date_updated"].is_string());

        let cached = files.get(ADDR).await.unwrap();
        assert_eq!(&cached, uploaded);
    }

    #[tokio::test]
    async fn read_only_sync_fails() {
        let files = HubFiles::read_only(HubClient::new(Client::new(), "http://127.0.0.1:9"));
        files.load(json!({ "id": ADDR })).unwrap();
        assert!(files.is_read_only());
        assert!(matches!(files.sync().await, Err(HubError::ReadOnly)));
    }

    #[test]
    fn set_requires_an_id() {
        let files = HubFiles::new(HubClient::new(Client::new(), "http://127.0.0.1:9"), signer());
        let err = files.set(json!({ "profile": {} })).unwrap_err();
        assert!(matches!(err, HubError::InvalidFile(MessageError::MissingId)));
        assert!(files.pending().is_empty());
    }
}
