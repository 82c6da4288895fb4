//! WebAssembly bindings for the biolink core library.
//!
//! Exposes the pure helpers the profile page needs in the browser via
//! `wasm-bindgen`. Compile with `wasm-pack build` to produce an npm-ready
//! package.
//!
//! ```js
//! import init, { checksum_address, available_themes, link_message } from './biolink_wasm.js';
//! await init();
//!
//! checksum_address('0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed');
//! // '0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed'
//!
//! const themes = JSON.parse(available_themes(JSON.stringify(assets)));
//! const message = link_message(owner, 'Ethereum', extraAddress);
//! ```

use biolink::{Asset, Theme};
use wasm_bindgen::prelude::*;

/// Installs the `console_error_panic_hook` when the feature is enabled so
/// that Rust panics reach the browser console.
fn setup() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// EIP-55 checksummed form of `address`.
///
/// Throws a descriptive string if `address` is not `0x` + 40 hex digits.
#[wasm_bindgen]
pub fn checksum_address(address: &str) -> Result<String, JsValue> {
    setup();
    biolink::to_checksum_address(address).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Themes unlocked by `assets_json` (a JSON array of assets), as a JSON
/// array in configured order.
///
/// `themes_json` overrides the built-in theme list when given.
#[wasm_bindgen]
pub fn available_themes(assets_json: &str, themes_json: Option<String>) -> Result<String, JsValue> {
    setup();
    let assets: Vec<Asset> = serde_json::from_str(assets_json)
        .map_err(|e| JsValue::from_str(&format!("assets parse error: {e}")))?;
    let themes: Vec<Theme> = match themes_json {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| JsValue::from_str(&format!("themes parse error: {e}")))?,
        None => biolink::default_themes(),
    };

    let unlocked = biolink::available_themes(&themes, &assets);
    serde_json::to_string(&unlocked).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The message the browser wallet signs to link `platform`/`identity` to
/// `owner`.
#[wasm_bindgen]
pub fn link_message(owner: &str, platform: &str, identity: &str) -> String {
    setup();
    biolink::link_message(owner, platform, identity)
}
