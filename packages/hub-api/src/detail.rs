//! Per-asset detail lookups: `GET /asset-profile/{address}/{nft|gitcoin-donation|poap}/`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Query parameters shared by the three detail endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetailQuery {
    pub platform: String,
    pub id: String,
    pub identity: String,
}

impl DetailQuery {
    pub fn new(
        platform: impl Into<String>,
        identity: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            platform: platform.into(),
            id: id.into(),
            identity: identity.into(),
        }
    }
}

/// Envelope every detail endpoint wraps its payload in.
///
/// ```json
/// { "status": true, "data": { ... } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetailResponse<T> {
    #[serde(default)]
    pub status: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// `GET …/nft/` response.
pub type NftResponse = DetailResponse<NftDetail>;
/// `GET …/gitcoin-donation/` response.
pub type GitcoinResponse = DetailResponse<DonationDetail>;
/// `GET …/poap/` response.
pub type FootprintResponse = DetailResponse<FootprintDetail>;

// ---------------------------------------------------------------------------
// NFT
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NftTrait {
    pub trait_type: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NftDetail {
    /// `"Ethereum"`, `"BSC"`, `"Polygon"`.
    pub chain: String,

    #[serde(default)]
    pub token_id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub image_preview_url: Option<String>,

    #[serde(default)]
    pub animation_url: Option<String>,

    #[serde(default)]
    pub external_link: Option<String>,

    #[serde(default)]
    pub traits: Vec<NftTrait>,

    /// Contract metadata and any other fields the hub adds.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Gitcoin donation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrantInfo {
    #[serde(default)]
    pub active: bool,
    pub title: String,

    #[serde(default)]
    pub slug: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub reference_url: Option<String>,

    #[serde(default)]
    pub logo: Option<String>,

    #[serde(default)]
    pub admin_address: Option<String>,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// One donation transaction towards a grant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DonationTx {
    pub donor: String,

    #[serde(default)]
    pub admin_address: Option<String>,

    pub amount: String,

    #[serde(default)]
    pub decimals: Option<u32>,

    pub symbol: String,

    #[serde(default)]
    pub time_stamp: Option<String>,

    pub tx_hash: String,

    #[serde(default)]
    pub formated_amount: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DonationDetail {
    pub grant: GrantInfo,

    #[serde(default)]
    pub txs: Vec<DonationTx>,
}

// ---------------------------------------------------------------------------
// Footprint (POAP)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoapEvent {
    pub id: u64,
    pub name: String,

    #[serde(default)]
    pub fancy_id: Option<String>,

    #[serde(default)]
    pub event_url: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub start_date: Option<String>,

    #[serde(default)]
    pub end_date: Option<String>,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FootprintDetail {
    pub event: PoapEvent,
    pub token_id: String,
    pub owner: String,

    #[serde(default)]
    pub chain: Option<String>,

    #[serde(default)]
    pub created: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nft_response_keeps_contract_fields() {
        let json = r#"{
            "status": true,
            "data": {
                "chain": "Ethereum",
                "token_id": "7536",
                "name": "Bag #7536",
                "traits": [{ "trait_type": "weapon", "value": "Katana" }],
                "asset_contract": { "address": "0xff9c", "name": "Loot" }
            }
        }"#;
        let res: NftResponse = serde_json::from_str(json).unwrap();
        let nft = res.data.unwrap();
        assert_eq!(nft.token_id.as_deref(), Some("7536"));
        assert_eq!(nft.traits.len(), 1);
        assert!(nft.extra.contains_key("asset_contract"));
    }

    #[test]
    fn footprint_uses_camel_case_token_id() {
        let json = r#"{
            "status": true,
            "data": {
                "event": { "id": 1234, "name": "ETHDenver" },
                "tokenId": "99",
                "owner": "0xabc",
                "chain": "xdai"
            }
        }"#;
        let res: FootprintResponse = serde_json::from_str(json).unwrap();
        let poap = res.data.unwrap();
        assert_eq!(poap.token_id, "99");
        assert_eq!(poap.event.name, "ETHDenver");
    }

    #[test]
    fn missing_data_is_none() {
        let res: GitcoinResponse = serde_json::from_str(r#"{"status":false}"#).unwrap();
        assert!(!res.status);
        assert!(res.data.is_none());
    }

    #[test]
    fn missing_data_is_none_for_every_detail_kind() {
        let nft: NftResponse = serde_json::from_str(r#"{"status":false}"#).unwrap();
        let poap: FootprintResponse = serde_json::from_str(r#"{"status":true}"#).unwrap();
        assert!(nft.data.is_none());
        assert!(poap.data.is_none());
        assert_eq!(serde_json::to_string(&poap).unwrap(), r#"{"status":true}"#);
    }
}
