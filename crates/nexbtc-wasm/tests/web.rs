//! Browser tests for the JS bindings. Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use js_sys::{BigInt, Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

use nexbtc_wasm::codec::{
    btc_to_satoshi, bytes_to_hex, format_btc, hex_to_bytes, parse_block_header,
    parse_derivation_path, reverse_hex,
};
use nexbtc_wasm::logger::set_log_level;
use nexbtc_wasm::{PublicWallet, VaultSession};

wasm_bindgen_test_configure!(run_in_browser);

fn error_name(err: JsValue) -> String {
    err.dyn_into::<js_sys::Error>()
        .map(|e| String::from(e.name()))
        .unwrap_or_default()
}

fn bigint_text(value: JsValue) -> String {
    value
        .dyn_into::<BigInt>()
        .ok()
        .and_then(|big| big.to_string(10).ok())
        .map(String::from)
        .unwrap_or_default()
}

/// Build an actor object whose methods run the given JS bodies.
fn actor(methods: &[(&str, &str)]) -> JsValue {
    let actor = Object::new();
    for (name, body) in methods {
        let func = Function::new_no_args(body);
        Reflect::set(&actor, &JsValue::from_str(name), &func).unwrap();
    }
    actor.into()
}

#[wasm_bindgen_test]
fn test_hex_bindings() {
    assert_eq!(hex_to_bytes("0xDEAD").unwrap(), vec![0xde, 0xad]);
    assert_eq!(bytes_to_hex(&[0xde, 0xad]), "dead");
    assert_eq!(reverse_hex("010203").unwrap(), "030201");
    assert_eq!(error_name(hex_to_bytes("abc").unwrap_err()), "MalformedHex");
}

#[wasm_bindgen_test]
fn test_header_binding() {
    let mut raw = [0u8; 80];
    raw[76] = 1;
    let view = parse_block_header(&raw, Some(10)).unwrap();
    let nonce = Reflect::get(&view, &JsValue::from_str("nonce")).unwrap();
    assert_eq!(nonce.as_f64(), Some(1.0));

    let err = parse_block_header(&raw[..79], None).unwrap_err();
    assert_eq!(error_name(err), "InvalidHeaderLength");
}

#[wasm_bindgen_test]
fn test_amount_and_path_bindings() {
    assert_eq!(btc_to_satoshi("0.00000001").unwrap(), 1);
    assert_eq!(error_name(btc_to_satoshi("0").unwrap_err()), "InvalidAmount");
    assert_eq!(format_btc(546), "0.00000546");

    assert_eq!(parse_derivation_path("01,02").unwrap().length(), 2);
    assert_eq!(parse_derivation_path("").unwrap().length(), 0);
    assert_eq!(error_name(parse_derivation_path("zz").unwrap_err()), "MalformedHex");
}

#[wasm_bindgen_test]
fn test_log_level_reinit() {
    set_log_level("debug").unwrap();
    set_log_level("warn").unwrap();
    assert_eq!(log::max_level(), log::LevelFilter::Warn);
    assert!(set_log_level("loud").is_err());
}

#[wasm_bindgen_test]
async fn test_balance_through_actor() {
    let wallet = PublicWallet::new(actor(&[("get_balance", "return Promise.resolve(150000000n);")])).unwrap();

    let view = wallet.get_balance("tb1qexample".into()).await.unwrap();
    let btc = Reflect::get(&view, &JsValue::from_str("btc")).unwrap();
    assert_eq!(btc.as_string().as_deref(), Some("1.50000000"));
}

#[wasm_bindgen_test]
async fn test_fee_percentiles_mixed_values() {
    let wallet = PublicWallet::new(actor(&[(
        "get_current_fee_percentiles",
        "return Promise.resolve([1000n, 2000, 3000n]);",
    )]))
    .unwrap();

    let view = wallet.get_fee_percentiles().await.unwrap();
    let rates: js_sys::Array = Reflect::get(&view, &JsValue::from_str("rates")).unwrap().unchecked_into();
    assert_eq!(rates.length(), 3);
    assert_eq!(bigint_text(rates.get(1)), "2000");
}

#[wasm_bindgen_test]
async fn test_fee_rate_above_safe_integer() {
    let wallet = PublicWallet::new(actor(&[(
        "get_current_fee_percentiles",
        "return Promise.resolve([9007199254740993n, 1000n]);",
    )]))
    .unwrap();

    let view = wallet.get_fee_percentiles().await.unwrap();
    let rates: js_sys::Array = Reflect::get(&view, &JsValue::from_str("rates")).unwrap().unchecked_into();
    assert_eq!(bigint_text(rates.get(0)), "9007199254740993");
    assert_eq!(bigint_text(rates.get(1)), "1000");
}

#[wasm_bindgen_test]
async fn test_backend_rejection_passes_through() {
    let session = VaultSession::new(actor(&[(
        "withdraw",
        "return Promise.reject(new Error('Insufficient vault balance'));",
    )]))
    .unwrap();

    let err = session
        .withdraw("tb1qdest".into(), "0.1".into())
        .await
        .unwrap_err()
        .dyn_into::<js_sys::Error>()
        .unwrap();
    assert_eq!(String::from(err.name()), "BackendRejected");
    assert_eq!(String::from(err.message()), "Insufficient vault balance");
}

#[wasm_bindgen_test]
async fn test_non_error_rejection_is_json() {
    let session = VaultSession::new(actor(&[(
        "get_my_deposit_address",
        "return Promise.reject({ InsufficientFunds: 7 });",
    )]))
    .unwrap();

    let err = session
        .get_deposit_address()
        .await
        .unwrap_err()
        .dyn_into::<js_sys::Error>()
        .unwrap();
    assert_eq!(String::from(err.name()), "BackendRejected");
    assert_eq!(String::from(err.message()), r#"{"InsufficientFunds":7}"#);
}

#[wasm_bindgen_test]
async fn test_unknown_send_source() {
    let wallet = PublicWallet::new(actor(&[])).unwrap();

    let err = wallet
        .send("p2wpkh".into(), "tb1qdest".into(), "0.1".into())
        .await
        .unwrap_err();
    assert_eq!(error_name(err), "UnknownSendSource");
}

#[wasm_bindgen_test]
async fn test_validation_before_call() {
    // The actor has no methods: reaching it would be a shape error, not a length error.
    let wallet = PublicWallet::new(actor(&[])).unwrap();

    let err = wallet
        .sign_with_ecdsa("00".repeat(31), String::new())
        .await
        .unwrap_err();
    assert_eq!(error_name(err), "InvalidLength");
}
