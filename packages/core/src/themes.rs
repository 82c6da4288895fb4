//! Theme selection from a user's asset list.

use crate::types::{Asset, AssetKind, Theme};

/// Assets carrying this tag are excluded from theme unlocking.
pub const HIDDEN_TAG: &str = "pass:hidden";

/// The default theme set: the Loot bag theme.
pub fn default_themes() -> Vec<Theme> {
    vec![Theme::new(
        "loot",
        "loot-container",
        "Ethereum-0xFF9C1b15B16263C61d017ee9F65C50e4AE0113D7-",
    )]
}

/// Return the configured themes the asset list unlocks.
///
/// A theme is unlocked when at least one asset is an NFT, is not tagged
/// [`HIDDEN_TAG`], and has an id starting with the theme's prefix. The
/// result keeps the order of `themes` and holds each theme at most once.
pub fn available_themes(themes: &[Theme], assets: &[Asset]) -> Vec<Theme> {
    themes
        .iter()
        .filter(|theme| assets.iter().any(|asset| unlocks(asset, theme)))
        .cloned()
        .collect()
}

fn unlocks(asset: &Asset, theme: &Theme) -> bool {
    asset.kind == AssetKind::Nft
        && !asset.has_tag(HIDDEN_TAG)
        && asset.id.starts_with(&theme.nft_id_prefix)
}
