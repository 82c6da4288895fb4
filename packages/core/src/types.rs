//! Core data types shared by every biolink crate.
//!
//! These are the wire-format structures the hub and the front end exchange:
//! [`Asset`], [`GeneralAsset`], [`AssetKind`], [`Theme`], [`AccountLink`],
//! plus the [`ConnectMethod`] recorded in the persisted session.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Which wallet provider a session was established through.
///
/// Serialises to the values stored in the `RSS3BioConnectMethod` cookie
/// (`"metamask"`, `"walletConnect"`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ConnectMethod {
    /// A wallet injected into the same browser context.
    #[serde(rename = "metamask")]
    BrowserWallet,
    /// A QR-paired out-of-band signer.
    #[serde(rename = "walletConnect")]
    RemoteBridge,
}

impl ConnectMethod {
    /// The persisted wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectMethod::BrowserWallet => "metamask",
            ConnectMethod::RemoteBridge => "walletConnect",
        }
    }
}

impl std::fmt::Display for ConnectMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConnectMethod {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metamask" => Ok(ConnectMethod::BrowserWallet),
            "walletConnect" => Ok(ConnectMethod::RemoteBridge),
            _ => Err(format!(
                "unknown connect method {:?}; expected one of: metamask, walletConnect",
                s
            )),
        }
    }
}

/// The kind of an asset as reported by the hub.
///
/// Known kinds round-trip through their exact wire strings (`"NFT"`,
/// `"Gitcoin-Donation"`, `"POAP"`). Anything else is carried verbatim in
/// [`AssetKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssetKind {
    Nft,
    GitcoinDonation,
    Poap,
    Other(String),
}

impl AssetKind {
    /// The lowercase path segment used by `/asset-profile/{address}/{kind}/`.
    pub fn path_segment(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl From<String> for AssetKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "NFT" => AssetKind::Nft,
            "Gitcoin-Donation" => AssetKind::GitcoinDonation,
            "POAP" => AssetKind::Poap,
            _ => AssetKind::Other(s),
        }
    }
}

impl From<&str> for AssetKind {
    fn from(s: &str) -> Self {
        AssetKind::from(s.to_string())
    }
}

impl From<AssetKind> for String {
    fn from(k: AssetKind) -> Self {
        k.to_string()
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetKind::Nft => write!(f, "NFT"),
            AssetKind::GitcoinDonation => write!(f, "Gitcoin-Donation"),
            AssetKind::Poap => write!(f, "POAP"),
            AssetKind::Other(s) => write!(f, "{s}"),
        }
    }
}

/// An asset entry from a user's hub file.
///
/// The `id` is a dash-joined compound such as
/// `Ethereum-0xFF9C1b15B16263C61d017ee9F65C50e4AE0113D7-7536`, which is what
/// theme prefixes are matched against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: AssetKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Asset {
    pub fn new(id: impl Into<String>, kind: AssetKind) -> Self {
        Self {
            id: id.into(),
            kind,
            tags: None,
        }
    }

    /// `true` if `tag` is present in this asset's tag list.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags
            .as_ref()
            .is_some_and(|tags| tags.iter().any(|t| t == tag))
    }
}

/// Display metadata attached to a [`GeneralAsset`].
///
/// Only a handful of fields are interpreted; everything else the hub sends
/// is kept in `extra` so it survives a round trip.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AssetInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_preview_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_contribs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// One asset in an asset profile response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralAsset {
    pub platform: String,
    pub identity: String,
    pub id: String,

    #[serde(rename = "type")]
    pub kind: AssetKind,

    #[serde(default)]
    pub info: AssetInfo,
}

/// The assets of one kind the hub indexed for an address.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AssetProfile {
    #[serde(default)]
    pub assets: Vec<GeneralAsset>,

    /// `false` while the hub is still indexing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
}

/// A profile page theme unlocked by holding a matching NFT.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub name: String,
    /// CSS class the front end applies when the theme is active.
    pub class: String,
    pub nft_id_prefix: String,
}

impl Theme {
    pub fn new(
        name: impl Into<String>,
        class: impl Into<String>,
        nft_id_prefix: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            nft_id_prefix: nft_id_prefix.into(),
        }
    }
}

/// Proof that an additional identity belongs to the session holder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountLink {
    pub platform: String,
    pub identity: String,
    pub signature: String,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_method_wire_strings() {
        assert_eq!(
            serde_json::to_string(&ConnectMethod::BrowserWallet).unwrap(),
            "\"metamask\""
        );
        assert_eq!(
            "walletConnect".parse::<ConnectMethod>().unwrap(),
            ConnectMethod::RemoteBridge
        );
        assert!("ledger".parse::<ConnectMethod>().is_err());
    }

    #[test]
    fn asset_kind_known_and_other() {
        assert_eq!(AssetKind::from("NFT"), AssetKind::Nft);
        assert_eq!(
            AssetKind::from("Gitcoin-Donation").path_segment(),
            "gitcoin-donation"
        );
        let other = AssetKind::from("Twitter");
        assert_eq!(other, AssetKind::Other("Twitter".into()));
        assert_eq!(other.to_string(), "Twitter");
    }

    #[test]
    fn asset_deserialises_type_field() {
        let json = r#"{"id":"Ethereum-0xabc-1","type":"NFT","tags":["pass:hidden"]}"#;
        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.kind, AssetKind::Nft);
        assert!(asset.has_tag("pass:hidden"));
        assert!(!asset.has_tag("pass:order"));
    }

    #[test]
    fn asset_profile_keeps_unknown_info_fields() {
        let json = r#"{
            "assets": [{
                "platform": "Ethereum",
                "identity": "0xabc",
                "id": "0xdef-12",
                "type": "NFT",
                "info": { "title": "Bag #12", "token_contribs": [] }
            }],
            "status": true
        }"#;
        let profile: AssetProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.status, Some(true));
        let info = &profile.assets[0].info;
        assert_eq!(info.title.as_deref(), Some("Bag #12"));
        assert!(info.extra.contains_key("token_contribs"));
    }

    #[test]
    fn theme_uses_camel_case_prefix() {
        let theme: Theme = serde_json::from_str(
            r#"{"name":"loot","class":"loot-container","nftIdPrefix":"Ethereum-0x1-"}"#,
        )
        .unwrap();
        assert_eq!(theme.nft_id_prefix, "Ethereum-0x1-");
    }
}
