//! Claim client for the activity service.
//!
//! A single stateless call: `POST {activity}/poap/claim` with the claiming
//! address and a captcha token. The service answers rejections in the body
//! (`errno`/`errmsg`), so a 2xx response is returned as-is for the caller to
//! inspect. Nothing is retried.

use biolink::claim_url;
use biolink_hub_api::{ClaimRequest, ClaimResponse};
use reqwest::Client;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("activity service returned status {0}")]
    BadStatus(u16),

    #[error("activity service returned malformed JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ClaimClient {
    client: Client,
    url: String,
}

impl ClaimClient {
    /// A client for the activity service at `activity_base`.
    pub fn new(client: Client, activity_base: &str) -> Self {
        Self {
            client,
            url: claim_url(activity_base),
        }
    }

    /// Ask the service to mint the activity token for `address`.
    ///
    /// Returns `Ok(None)` when the service answers with an empty body.
    pub async fn mint(
        &self,
        address: &str,
        captcha_token: &str,
    ) -> Result<Option<ClaimResponse>, ClaimError> {
        let body = ClaimRequest {
            address: address.to_string(),
            recaptcha: captcha_token.to_string(),
        };

        debug!("claim: POST {}", self.url);
        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClaimError::BadStatus(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            debug!("claim: empty response for {address}");
            return Ok(None);
        }
        let parsed: Option<ClaimResponse> = serde_json::from_slice(&bytes)?;
        if let Some(res) = &parsed {
            info!(
                %address,
                errno = ?res.errno,
                tx = ?res.data.as_ref().map(|d| &d.tx_hash),
                "claim: submitted"
            );
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use biolink_hub_api::TxStatus;
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    async fn spawn(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn mint_returns_pending_transaction() {
        let seen: Arc<Mutex<Option<Value>>> = Arc::default();
        async fn claim(
            State(seen): State<Arc<Mutex<Option<Value>>>>,
            Json(body): Json<Value>,
        ) -> Json<Value> {
            *seen.lock().unwrap() = Some(body);
            Json(json!({ "data": { "tx_hash": "0x1", "tx_status": "pending" } }))
        }
        let app = Router::new()
            .route("/poap/claim", post(claim))
            .with_state(seen.clone());
        let base = spawn(app).await;

        let client = ClaimClient::new(Client::new(), &base);
        let res = client.mint("0xABC", "token123").await.unwrap().unwrap();
        let data = res.data.unwrap();
        assert_eq!(data.tx_hash, "0x1");
        assert_eq!(data.tx_status, TxStatus::Pending);
        assert!(res.errno.is_none());

        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body, json!({ "address": "0xABC", "reCaptcha": "token123" }));
    }

    #[tokio::test]
    async fn empty_body_is_none() {
        let app = Router::new().route("/poap/claim", post(|| async { "" }));
        let base = spawn(app).await;

        let client = ClaimClient::new(Client::new(), &format!("{base}/"));
        assert!(client.mint("0xABC", "token123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn service_rejection_is_returned() {
        let app = Router::new().route(
            "/poap/claim",
            post(|| async { Json(json!({ "errno": 4001, "errmsg": "already claimed" })) }),
        );
        let base = spawn(app).await;

        let client = ClaimClient::new(Client::new(), &base);
        let res = client.mint("0xABC", "token123").await.unwrap().unwrap();
        assert_eq!(res.errno, Some(4001));
        assert_eq!(res.errmsg.as_deref(), Some("already claimed"));
    }

    #[tokio::test]
    async fn server_error_is_err() {
        let app = Router::new().route(
            "/poap/claim",
            post(|| async { StatusCode::BAD_GATEWAY }),
        );
        let base = spawn(app).await;

        let client = ClaimClient::new(Client::new(), &base);
        let err = client.mint("0xABC", "token123").await.unwrap_err();
        assert!(matches!(err, ClaimError::BadStatus(502)));
    }
}
