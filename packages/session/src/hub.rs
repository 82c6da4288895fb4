//! HTTP client for the hub.
//!
//! [`HubClient`] owns a cloneable [`reqwest::Client`] (which pools
//! connections internally) and the hub's [`HubEndpoints`]. Every method maps
//! one hub call to a typed result; caching and fail-soft behaviour live in
//! the [`SessionManager`](crate::SessionManager).
//!
//! An empty (or `null`) 2xx body is reported as `Ok(None)`.

use biolink::{AssetKind, AssetProfile, DetailKind, HubEndpoints};
use biolink_hub_api::{
    DetailQuery, FootprintResponse, GitcoinResponse, NftResponse, PutFilesRequest,
};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::HubError;

#[derive(Debug, Clone)]
pub struct HubClient {
    client: Client,
    endpoints: HubEndpoints,
}

impl HubClient {
    /// Create a client for the hub at `base_url`.
    ///
    /// `client` should be pre-configured (e.g. with a timeout).
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoints: HubEndpoints::new(base_url),
        }
    }

    pub fn endpoints(&self) -> &HubEndpoints {
        &self.endpoints
    }

    // ── Asset profile ─────────────────────────────────────────────────────────

    /// `GET /asset-profile/{address}/{kind}/`
    pub async fn asset_profile(
        &self,
        address: &str,
        kind: &AssetKind,
    ) -> Result<Option<AssetProfile>, HubError> {
        let url = self.endpoints.asset_profile_url(address, kind);
        debug!("hub: GET {url}");
        let response = self.client.get(&url).send().await?;
        read_json(check(response)?).await
    }

    // ── Details ───────────────────────────────────────────────────────────────

    pub async fn nft_detail(
        &self,
        address: &str,
        query: &DetailQuery,
    ) -> Result<Option<NftResponse>, HubError> {
        self.detail(address, DetailKind::Nft, query).await
    }

    pub async fn gitcoin_donation(
        &self,
        address: &str,
        query: &DetailQuery,
    ) -> Result<Option<GitcoinResponse>, HubError> {
        self.detail(address, DetailKind::GitcoinDonation, query).await
    }

    pub async fn footprint_detail(
        &self,
        address: &str,
        query: &DetailQuery,
    ) -> Result<Option<FootprintResponse>, HubError> {
        self.detail(address, DetailKind::Footprint, query).await
    }

    async fn detail<T: DeserializeOwned>(
        &self,
        address: &str,
        kind: DetailKind,
        query: &DetailQuery,
    ) -> Result<Option<T>, HubError> {
        let url = self.endpoints.detail_url(address, kind);
        debug!("hub: GET {url} ({}/{}/{})", query.platform, query.identity, query.id);
        let response = self.client.get(&url).query(query).send().await?;
        read_json(check(response)?).await
    }

    // ── Files ─────────────────────────────────────────────────────────────────

    /// `GET /{file_id}`. A 404 means the hub has never stored the file.
    pub async fn get_file(&self, file_id: &str) -> Result<Option<Value>, HubError> {
        let url = self.endpoints.file_url(file_id);
        debug!("hub: GET {url}");
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(check(response)?).await
    }

    /// `PUT /` with every changed file.
    pub async fn put_files(&self, contents: Vec<Value>) -> Result<(), HubError> {
        let url = self.endpoints.files_url();
        debug!("hub: PUT {url} ({} files)", contents.len());
        let response = self
            .client
            .put(&url)
            .json(&PutFilesRequest { contents })
            .send()
            .await?;
        check(response)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn check(response: Response) -> Result<Response, HubError> {
    let status = response.status();
    if !status.is_success() {
        return Err(HubError::BadStatus(status.as_u16()));
    }
    Ok(response)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<Option<T>, HubError> {
    let body = response.bytes().await?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(serde_json::from_slice::<Option<T>>(&body)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::{
        extract::{Path, Query},
        http::StatusCode as AxumStatus,
        routing::get,
        Json, Router,
    };
    use serde_json::json;
    use tokio::net::TcpListener;

    /// Spawn a loopback axum server and return its base URL.
    async fn spawn_mock_hub(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn nft_profile(Path(address): Path<String>) -> Json<Value> {
        Json(json!({
            "assets": [{
                "platform": "Ethereum",
                "identity": address,
                "id": "0xff9c-1",
                "type": "NFT",
                "info": {}
            }],
            "status": true
        }))
    }

    #[tokio::test]
    async fn asset_profile_hits_lowercased_path() {
        let app = Router::new().route("/asset-profile/{address}/nft/", get(nft_profile));
        let base = spawn_mock_hub(app).await;
        let hub = HubClient::new(Client::new(), &base);

        let profile = hub
            .asset_profile("0xABC", &AssetKind::Nft)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.status, Some(true));
        assert_eq!(profile.assets[0].identity, "0xABC");
    }

    #[tokio::test]
    async fn empty_body_is_none() {
        let app = Router::new().route("/asset-profile/{address}/poap/", get(|| async { "" }));
        let base = spawn_mock_hub(app).await;
        let hub = HubClient::new(Client::new(), &base);

        let profile = hub.asset_profile("0xABC", &AssetKind::Poap).await.unwrap();
        assert!(profile.is_none());
    }

    #[tokio::test]
    async fn server_error_is_bad_status() {
        let app = Router::new().route(
            "/asset-profile/{address}/nft/",
            get(|| async { AxumStatus::INTERNAL_SERVER_ERROR }),
        );
        let base = spawn_mock_hub(app).await;
        let hub = HubClient::new(Client::new(), &base);

        let err = hub.asset_profile("0xABC", &AssetKind::Nft).await.unwrap_err();
        assert!(matches!(err, HubError::BadStatus(500)));
    }

    #[tokio::test]
    async fn detail_sends_query_parameters() {
        async fn echo(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
            Json(json!({
                "status": true,
                "data": {
                    "chain": params.get("platform").cloned().unwrap_or_default(),
                    "token_id": params.get("id").cloned(),
                    "name": params.get("identity").cloned(),
                }
            }))
        }
        let app = Router::new().route("/asset-profile/{address}/nft/", get(echo));
        let base = spawn_mock_hub(app).await;
        let hub = HubClient::new(Client::new(), &base);

        let query = DetailQuery::new("Ethereum", "0xIdentity", "42");
        let nft = hub.nft_detail("0xABC", &query).await.unwrap().unwrap();
        let data = nft.data.unwrap();
        assert_eq!(data.chain, "Ethereum");
        assert_eq!(data.token_id.as_deref(), Some("42"));
        assert_eq!(data.name.as_deref(), Some("0xIdentity"));
    }

    #[tokio::test]
    async fn missing_file_is_none() {
        let app = Router::new();
        let base = spawn_mock_hub(app).await;
        let hub = HubClient::new(Client::new(), &base);

        assert!(hub.get_file("0xABC").await.unwrap().is_none());
    }
}
