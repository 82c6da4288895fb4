//! Activity claim types: `POST /poap/claim`.

use serde::{Deserialize, Serialize};

/// Request body for `POST /poap/claim`.
///
/// ```json
/// { "address": "0x…", "reCaptcha": "03AGdBq2…" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimRequest {
    pub address: String,

    #[serde(rename = "reCaptcha")]
    pub recaptcha: String,
}

/// Lifecycle of the minting transaction the activity service submits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Passed,
    Failed,
    /// Re-submitted with a higher fee.
    Bumped,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimData {
    pub tx_hash: String,
    pub tx_status: TxStatus,
}

/// Response body for `POST /poap/claim`.
///
/// The service reports rejections (bad captcha, already claimed) through
/// `errno`/`errmsg` with a 2xx status, so all fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errno: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errmsg: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ClaimData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_recaptcha_key() {
        let req = ClaimRequest {
            address: "0xABC".into(),
            recaptcha: "token123".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["reCaptcha"], "token123");
        assert_eq!(json["address"], "0xABC");
    }

    #[test]
    fn response_with_data() {
        let res: ClaimResponse =
            serde_json::from_str(r#"{"data":{"tx_hash":"0x1","tx_status":"bumped"}}"#).unwrap();
        let data = res.data.unwrap();
        assert_eq!(data.tx_hash, "0x1");
        assert_eq!(data.tx_status, TxStatus::Bumped);
        assert!(res.errno.is_none());
    }

    #[test]
    fn response_with_error_only() {
        let res: ClaimResponse =
            serde_json::from_str(r#"{"errno":4001,"errmsg":"already claimed"}"#).unwrap();
        assert_eq!(res.errno, Some(4001));
        assert!(res.data.is_none());
    }
}
