//! Pure-logic core of the biolink session layer.
//!
//! This crate has **no I/O**: no networking, no storage, no async runtime.
//! It compiles to native Rust and to WebAssembly unchanged. The session
//! crate and the WASM bindings build on it.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`address`] | EIP-55 checksummed addresses via [`Address`] |
//! | [`types`] | Wire types: [`Asset`], [`GeneralAsset`], [`AssetProfile`], [`Theme`], [`AccountLink`], [`ConnectMethod`] |
//! | [`themes`] | Theme unlocking via [`available_themes`] |
//! | [`endpoints`] | Hub and activity URL builders |
//! | [`messages`] | Canonical messages handed to the wallet for signing |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use biolink::{available_themes, default_themes, Address, Asset, AssetKind};
//!
//! let owner = Address::parse("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed")?;
//! assert_eq!(owner.as_str(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
//!
//! let assets = vec![Asset::new(
//!     "Ethereum-0xFF9C1b15B16263C61d017ee9F65C50e4AE0113D7-42",
//!     AssetKind::Nft,
//! )];
//! let themes = available_themes(&default_themes(), &assets);
//! ```

pub mod address;
pub mod endpoints;
pub mod messages;
pub mod themes;
pub mod types;

pub use address::{is_checksummed, to_checksum_address, Address, AddressError};
pub use endpoints::{claim_url, DetailKind, HubEndpoints};
pub use messages::{
    canonical_unsigned, file_sign_message, link_message, MessageError, SIGNATURE_FIELD,
};
pub use themes::{available_themes, default_themes, HIDDEN_TAG};
pub use types::{
    AccountLink, Asset, AssetInfo, AssetKind, AssetProfile, ConnectMethod, GeneralAsset, Theme,
};
