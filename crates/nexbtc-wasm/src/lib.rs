//! WebAssembly bindings for the NexBTC wallet.
//!
//! This crate provides JavaScript-accessible APIs for:
//! - Hex, byte-order, amount, and derivation path conversion
//! - Block header decoding for display
//! - Public queries and threshold signing through a canister actor
//! - Vault deposits and withdrawals through an authenticated actor

use wasm_bindgen::prelude::*;

pub mod api;
pub mod codec;
pub mod logger;
pub mod state;
pub mod wallet;

// Re-export main types for JS access
pub use api::CanisterActor;
pub use wallet::{PublicWallet, VaultSession};

/// Initialize the WASM module with better panic messages and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    logger::init(log::LevelFilter::Info);
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Convert a core error to a JS `Error` whose `name` is the error code.
pub(crate) fn to_js_error(err: nexbtc_core::Error) -> JsValue {
    let js = js_sys::Error::new(&err.to_string());
    js.set_name(err.code());
    js.into()
}
