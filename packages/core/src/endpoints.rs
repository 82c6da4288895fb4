//! Hub and activity URL helpers.
//!
//! A [`HubEndpoints`] is built once from the configured hub base URL and
//! returns the URL for every hub call the session layer makes. There is no
//! I/O here: the caller makes the HTTP requests.
//!
//! ```text
//! let hub = HubEndpoints::new("https://hub.example.com/");
//! hub.asset_profile_url("0xAbC…", &AssetKind::Nft)
//!     // https://hub.example.com/asset-profile/0xAbC…/nft/
//! hub.detail_url("0xAbC…", DetailKind::GitcoinDonation)
//!     // https://hub.example.com/asset-profile/0xAbC…/gitcoin-donation/
//! ```

use urlencoding::encode;

use crate::types::AssetKind;

/// The three per-asset detail lookups the hub offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailKind {
    Nft,
    GitcoinDonation,
    /// POAP attendance badges, shown as "footprints".
    Footprint,
}

impl DetailKind {
    pub fn path_segment(&self) -> &'static str {
        match self {
            DetailKind::Nft => "nft",
            DetailKind::GitcoinDonation => "gitcoin-donation",
            DetailKind::Footprint => "poap",
        }
    }
}

/// URL builder for a hub deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubEndpoints {
    /// Base URL without a trailing slash.
    pub base: String,
}

impl HubEndpoints {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    // ── Asset profile ─────────────────────────────────────────────────────────

    /// `{base}/asset-profile/{address}/{kind}/` with `kind` lowercased.
    pub fn asset_profile_url(&self, address: &str, kind: &AssetKind) -> String {
        format!(
            "{}/asset-profile/{}/{}/",
            self.base,
            encode(address),
            encode(&kind.path_segment())
        )
    }

    /// `{base}/asset-profile/{address}/{detail}/`; the caller adds the
    /// `platform`, `id` and `identity` query parameters.
    pub fn detail_url(&self, address: &str, kind: DetailKind) -> String {
        format!(
            "{}/asset-profile/{}/{}/",
            self.base,
            encode(address),
            kind.path_segment()
        )
    }

    // ── Files ─────────────────────────────────────────────────────────────────

    /// `{base}/{file_id}`
    pub fn file_url(&self, file_id: &str) -> String {
        format!("{}/{}", self.base, encode(file_id))
    }

    /// `{base}/`, the target of the `PUT` that uploads changed files.
    pub fn files_url(&self) -> String {
        format!("{}/", self.base)
    }
}

/// `{activity_base}/poap/claim`
pub fn claim_url(activity_base: &str) -> String {
    format!("{}/poap/claim", activity_base.trim_end_matches('/'))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
