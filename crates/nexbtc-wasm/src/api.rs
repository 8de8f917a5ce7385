//! Bridge from the core client capabilities to a JS canister actor.
//!
//! The actor is whatever the page built with its agent library; every
//! backend method on it takes candid-encoded JS values and returns a promise.
//! Byte vectors go out as `Uint8Array`, `nat64` as `BigInt`, `opt T` as a
//! zero- or one-element array.

use js_sys::{Array, BigInt, Function, Object, Promise, Reflect, Uint8Array};
use serde_json::{Map, Number, Value};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use nexbtc_core::response::{RawOutpoint, RawUtxo};
use nexbtc_core::{
    AddressKind, AuthenticatedClient, BitcoinAddress, DerivationPath, Error, PublicClient,
    RawBlockHeadersResponse, RawUtxosResponse, Result, SchnorrAux, SendRequest, SendSource,
};

/// A backend canister actor living on the JS side.
#[derive(Clone)]
pub struct CanisterActor {
    actor: JsValue,
}

impl CanisterActor {
    /// Wrap an actor object.
    pub fn new(actor: JsValue) -> Result<Self> {
        if !actor.is_object() {
            return Err(Error::UnexpectedResponseShape(
                "backend actor must be an object".into(),
            ));
        }
        Ok(CanisterActor { actor })
    }

    /// Call `method` with `args` and await the returned promise.
    async fn call(&self, method: &str, args: Array) -> Result<JsValue> {
        let func = Reflect::get(&self.actor, &JsValue::from_str(method))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| {
                Error::UnexpectedResponseShape(format!("backend has no method {}", method))
            })?;

        log::debug!("calling backend method {}", method);

        let returned = func.apply(&self.actor, &args).map_err(rejected)?;
        JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(|e| {
                let err = rejected(e);
                log::error!("{} failed: {}", method, err);
                err
            })
    }
}

impl PublicClient for CanisterActor {
    async fn get_balance(&self, address: &BitcoinAddress) -> Result<u64> {
        let value = self.call("get_balance", Array::of1(&address.as_str().into())).await?;
        to_u64("balance", &value)
    }

    async fn get_utxos(&self, address: &BitcoinAddress) -> Result<RawUtxosResponse> {
        let value = self.call("get_utxos", Array::of1(&address.as_str().into())).await?;
        to_utxos_response(&value)
    }

    async fn get_current_fee_percentiles(&self) -> Result<Value> {
        let value = self.call("get_current_fee_percentiles", Array::new()).await?;
        Ok(to_json(&value))
    }

    async fn get_block_headers(&self, start: u32, end: Option<u32>) -> Result<RawBlockHeadersResponse> {
        let end = opt(end.map(JsValue::from));
        let value = self
            .call("get_block_headers", Array::of2(&JsValue::from(start), &end))
            .await?;

        let headers = field(&value, "block_headers")?;
        let headers = headers.dyn_ref::<Array>().ok_or_else(|| {
            Error::UnexpectedResponseShape("block_headers must be an array".into())
        })?;

        Ok(RawBlockHeadersResponse {
            tip_height: to_u32("tip_height", &field(&value, "tip_height")?)?,
            block_headers: headers
                .iter()
                .map(|header| to_bytes("block header", &header))
                .collect::<Result<Vec<_>>>()?,
        })
    }

    async fn sign_with_ecdsa(&self, message_hash: &[u8; 32], path: &DerivationPath) -> Result<Vec<u8>> {
        let args = Array::of2(&bytes(message_hash), &path_value(path));
        let value = self.call("sign_with_ecdsa", args).await?;
        to_bytes("signature", &value)
    }

    async fn get_ecdsa_public_key(&self, path: &DerivationPath) -> Result<Vec<u8>> {
        let value = self.call("get_ecdsa_public_key", Array::of1(&path_value(path))).await?;
        to_bytes("public key", &value)
    }

    async fn sign_with_schnorr(
        &self,
        message: &[u8; 32],
        path: &DerivationPath,
        aux: &SchnorrAux,
    ) -> Result<Vec<u8>> {
        let args = Array::of3(&bytes(message), &path_value(path), &aux_value(aux)?);
        let value = self.call("sign_with_schnorr", args).await?;
        to_bytes("signature", &value)
    }

    async fn get_schnorr_public_key(&self, path: &DerivationPath) -> Result<Vec<u8>> {
        let value = self.call("get_schnorr_public_key", Array::of1(&path_value(path))).await?;
        to_bytes("public key", &value)
    }

    async fn get_address(&self, kind: AddressKind) -> Result<String> {
        let value = self.call(kind.method(), Array::new()).await?;
        to_text("address", &value)
    }

    async fn send(&self, source: SendSource, request: &SendRequest) -> Result<String> {
        let arg = Object::new();
        set(&arg, "destination_address", &request.destination_address.as_str().into())?;
        set(&arg, "amount_in_satoshi", &BigInt::from(request.amount.to_sat()).into())?;

        let value = self.call(source.method(), Array::of1(&arg)).await?;
        to_text("transaction id", &value)
    }
}

impl AuthenticatedClient for CanisterActor {
    async fn get_my_deposit_address(&self) -> Result<String> {
        let value = self.call("get_my_deposit_address", Array::new()).await?;
        to_text("deposit address", &value)
    }

    async fn get_my_vault_balance(&self) -> Result<u64> {
        let value = self.call("get_my_vault_balance", Array::new()).await?;
        to_u64("vault balance", &value)
    }

    async fn get_my_vault_utxos(&self) -> Result<RawUtxosResponse> {
        let value = self.call("get_my_vault_utxos", Array::new()).await?;
        to_utxos_response(&value)
    }

    async fn withdraw(&self, destination: &BitcoinAddress, amount_sat: u64) -> Result<String> {
        let args = Array::of2(&destination.as_str().into(), &BigInt::from(amount_sat).into());
        let value = self.call("withdraw", args).await?;
        to_text("transaction id", &value)
    }
}

/// Turn a rejected promise or thrown value into `BackendRejected`,
/// keeping the message exactly as the backend produced it. Other payloads
/// are passed on as JSON.
fn rejected(err: JsValue) -> Error {
    let message = if let Some(e) = err.dyn_ref::<js_sys::Error>() {
        String::from(e.message())
    } else if let Some(s) = err.as_string() {
        s
    } else {
        js_sys::JSON::stringify(&err)
            .ok()
            .and_then(|text| text.as_string())
            .unwrap_or_else(|| format!("{:?}", err))
    };
    Error::BackendRejected(message)
}

// ============================================================================
// Outgoing values
// ============================================================================

fn bytes(data: &[u8]) -> JsValue {
    Uint8Array::from(data).into()
}

fn path_value(path: &DerivationPath) -> JsValue {
    path.segments()
        .iter()
        .map(|segment| bytes(segment))
        .collect::<Array>()
        .into()
}

fn opt(value: Option<JsValue>) -> JsValue {
    match value {
        Some(v) => Array::of1(&v).into(),
        None => Array::new().into(),
    }
}

fn aux_value(aux: &SchnorrAux) -> Result<JsValue> {
    let variant = match aux {
        SchnorrAux::None => return Ok(opt(None)),
        SchnorrAux::Bip341 { merkle_root_hash } => {
            let record = Object::new();
            set(&record, "merkle_root_hash", &bytes(merkle_root_hash))?;
            let variant = Object::new();
            set(&variant, "bip341", &record)?;
            variant
        }
    };
    Ok(opt(Some(variant.into())))
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<()> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|e| Error::UnexpectedResponseShape(format!("cannot set {}: {:?}", key, e)))
}

// ============================================================================
// Incoming values
// ============================================================================

fn shape(what: &str, expected: &str, value: &JsValue) -> Error {
    Error::UnexpectedResponseShape(format!(
        "{} must be {}, got {}",
        what,
        expected,
        value.js_typeof().as_string().unwrap_or_default()
    ))
}

fn field(value: &JsValue, key: &str) -> Result<JsValue> {
    if !value.is_object() {
        return Err(shape("response", "a record", value));
    }
    Reflect::get(value, &JsValue::from_str(key))
        .map_err(|_| Error::UnexpectedResponseShape(format!("missing field {}", key)))
}

fn to_text(what: &str, value: &JsValue) -> Result<String> {
    value.as_string().ok_or_else(|| shape(what, "text", value))
}

fn to_u64(what: &str, value: &JsValue) -> Result<u64> {
    if let Some(big) = value.dyn_ref::<BigInt>() {
        let text = big
            .to_string(10)
            .map(String::from)
            .map_err(|_| shape(what, "a nat64", value))?;
        return text.parse::<u64>().map_err(|_| shape(what, "a nat64", value));
    }
    match value.as_f64() {
        Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= 9_007_199_254_740_992.0 => Ok(n as u64),
        _ => Err(shape(what, "a nat64", value)),
    }
}

fn to_u32(what: &str, value: &JsValue) -> Result<u32> {
    match value.as_f64() {
        Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) => Ok(n as u32),
        _ => Err(shape(what, "a nat32", value)),
    }
}

/// Candid `blob` arrives as a `Uint8Array` or a plain array of numbers.
fn to_bytes(what: &str, value: &JsValue) -> Result<Vec<u8>> {
    if let Some(array) = value.dyn_ref::<Uint8Array>() {
        return Ok(array.to_vec());
    }
    let array = value
        .dyn_ref::<Array>()
        .ok_or_else(|| shape(what, "a byte array", value))?;

    array
        .iter()
        .map(|b| match b.as_f64() {
            Some(n) if (0.0..=255.0).contains(&n) && n.fract() == 0.0 => Ok(n as u8),
            _ => Err(shape(what, "a byte array", value)),
        })
        .collect()
}

fn to_opt_bytes(what: &str, value: &JsValue) -> Result<Option<Vec<u8>>> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    let array = value
        .dyn_ref::<Array>()
        .ok_or_else(|| shape(what, "an optional byte array", value))?;
    match array.length() {
        0 => Ok(None),
        1 => to_bytes(what, &array.get(0)).map(Some),
        _ => Err(shape(what, "an optional byte array", value)),
    }
}

fn to_utxos_response(value: &JsValue) -> Result<RawUtxosResponse> {
    let utxos = field(value, "utxos")?;
    let utxos = utxos
        .dyn_ref::<Array>()
        .ok_or_else(|| shape("utxos", "an array", &utxos))?;

    let utxos = utxos
        .iter()
        .map(|utxo| -> Result<RawUtxo> {
            let outpoint = field(&utxo, "outpoint")?;
            Ok(RawUtxo {
                outpoint: RawOutpoint {
                    txid: to_bytes("txid", &field(&outpoint, "txid")?)?,
                    vout: to_u32("vout", &field(&outpoint, "vout")?)?,
                },
                value: to_u64("value", &field(&utxo, "value")?)?,
                height: to_u32("height", &field(&utxo, "height")?)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RawUtxosResponse {
        tip_height: to_u32("tip_height", &field(value, "tip_height")?)?,
        tip_block_hash: to_bytes("tip_block_hash", &field(value, "tip_block_hash")?)?,
        utxos,
        next_page: to_opt_bytes("next_page", &field(value, "next_page")?)?,
    })
}

/// Mirror a JS value as JSON so the core can check its shape.
///
/// `BigInt`s become decimal strings; integral numbers become JSON integers.
pub(crate) fn to_json(value: &JsValue) -> Value {
    if let Some(big) = value.dyn_ref::<BigInt>() {
        return big
            .to_string(10)
            .map(|s| Value::String(s.into()))
            .unwrap_or(Value::Null);
    }
    if let Some(n) = value.as_f64() {
        if n >= 0.0 && n.fract() == 0.0 && n <= 9_007_199_254_740_992.0 {
            return Value::from(n as u64);
        }
        return Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null);
    }
    if let Some(s) = value.as_string() {
        return Value::String(s);
    }
    if let Some(b) = value.as_bool() {
        return Value::Bool(b);
    }
    if let Some(array) = value.dyn_ref::<Array>() {
        return Value::Array(array.iter().map(|v| to_json(&v)).collect());
    }
    if let Some(array) = value.dyn_ref::<Uint8Array>() {
        return Value::Array(array.to_vec().into_iter().map(Value::from).collect());
    }
    if value.is_object() {
        let mut map = Map::new();
        for entry in Object::entries(value.unchecked_ref::<Object>()).iter() {
            let pair: Array = entry.unchecked_into();
            if let Some(key) = pair.get(0).as_string() {
                map.insert(key, to_json(&pair.get(1)));
            }
        }
        return Value::Object(map);
    }
    Value::Null
}
