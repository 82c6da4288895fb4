//! wasm-bindgen-test integration tests for the biolink WASM bindings.
//!
//! Run with:
//!   wasm-pack test packages/wasm --node

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_node_experimental);

use biolink_wasm::{available_themes, checksum_address, link_message};

const LOOT: &str = "Ethereum-0xFF9C1b15B16263C61d017ee9F65C50e4AE0113D7-";

// ---------------------------------------------------------------------------
// checksum_address()
// ---------------------------------------------------------------------------

#[wasm_bindgen_test]
fn checksum_lowercase_address() {
    let out = checksum_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
    assert_eq!(out, "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
}

#[wasm_bindgen_test]
fn checksum_rejects_garbage() {
    assert!(checksum_address("hello").is_err());
    assert!(checksum_address("0x1234").is_err());
}

// ---------------------------------------------------------------------------
// available_themes()
// ---------------------------------------------------------------------------

#[wasm_bindgen_test]
fn loot_holder_unlocks_default_theme() {
    let assets = format!(r#"[{{"id":"{LOOT}7536","type":"NFT"}}]"#);
    let json = available_themes(&assets, None).unwrap();
    let themes: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(themes.as_array().unwrap().len(), 1);
    assert_eq!(themes[0]["name"], "loot");
}

#[wasm_bindgen_test]
fn hidden_asset_unlocks_nothing() {
    let assets = format!(r#"[{{"id":"{LOOT}1","type":"NFT","tags":["pass:hidden"]}}]"#);
    let json = available_themes(&assets, None).unwrap();
    assert_eq!(json, "[]");
}

#[wasm_bindgen_test]
fn custom_theme_list_is_honoured() {
    let themes = r#"[{"name":"a","class":"theme-a","nftIdPrefix":"Polygon-0x1-"}]"#;
    let assets = r#"[{"id":"Polygon-0x1-9","type":"NFT"}]"#;
    let json = available_themes(assets, Some(themes.to_string())).unwrap();
    let out: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(out[0]["class"], "theme-a");
}

#[wasm_bindgen_test]
fn malformed_assets_is_err() {
    assert!(available_themes("{", None).is_err());
}

// ---------------------------------------------------------------------------
// link_message()
// ---------------------------------------------------------------------------

#[wasm_bindgen_test]
fn link_message_format() {
    assert_eq!(
        link_message("0xOwner", "Ethereum", "0xExtra"),
        "[RSS3] I am adding account Ethereum-0xExtra to my RSS3 file 0xOwner"
    );
}
