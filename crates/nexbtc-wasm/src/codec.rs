//! Stateless codec functions exported to JS.

use js_sys::{Array, Uint8Array};
use wasm_bindgen::prelude::*;

use nexbtc_core::{
    btc_to_satoshi as parse_btc, codec, reverse_byte_order, BackendConfig, BlockHeader,
    DerivationPath, Deployment, SatoshiAmount,
};

use crate::state::{to_js, HeaderView};
use crate::to_js_error;

/// Decode hex text (optionally `0x`-prefixed) into bytes.
#[wasm_bindgen]
pub fn hex_to_bytes(text: &str) -> Result<Vec<u8>, JsValue> {
    codec::decode(text).map_err(to_js_error)
}

/// Encode bytes as lowercase hex.
#[wasm_bindgen]
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    codec::encode(bytes)
}

/// Reverse the byte order of hex text, e.g. wire hash to display hash.
#[wasm_bindgen]
pub fn reverse_hex(text: &str) -> Result<String, JsValue> {
    let bytes = codec::decode(text).map_err(to_js_error)?;
    Ok(codec::encode(&reverse_byte_order(&bytes)))
}

/// Decode a raw 80-byte block header.
///
/// `height` is attached as-is; the header itself does not carry it.
#[wasm_bindgen]
pub fn parse_block_header(bytes: &[u8], height: Option<u32>) -> Result<JsValue, JsValue> {
    let header = BlockHeader::parse(bytes).map_err(to_js_error)?;
    to_js(&HeaderView::new(&header, height))
}

/// Convert a BTC amount typed by the user to satoshis.
#[wasm_bindgen]
pub fn btc_to_satoshi(amount: &str) -> Result<u64, JsValue> {
    parse_btc(amount).map_err(to_js_error)
}

/// Format satoshis as BTC with eight decimals.
#[wasm_bindgen]
pub fn format_btc(satoshi: u64) -> String {
    SatoshiAmount::from_sat(satoshi).to_btc_string()
}

/// Parse a comma-separated hex derivation path into an array of byte arrays.
#[wasm_bindgen]
pub fn parse_derivation_path(text: &str) -> Result<Array, JsValue> {
    let path = DerivationPath::parse(text).map_err(to_js_error)?;
    Ok(path
        .segments()
        .iter()
        .map(|segment| Uint8Array::from(segment.as_slice()))
        .collect())
}

/// Resolve agent host and canister id for a dfx network name.
///
/// Returns `undefined` when no backend is deployed for the network.
#[wasm_bindgen]
pub fn backend_config(network: &str, canister_id: Option<String>) -> Result<JsValue, JsValue> {
    match BackendConfig::resolve(Deployment::from_name(network), canister_id.as_deref()) {
        Some(config) => to_js(&config),
        None => Ok(JsValue::UNDEFINED),
    }
}
