//! JS-facing wallet controllers.
//!
//! [`PublicWallet`] wraps an anonymous actor, [`VaultSession`] an actor
//! bound to the signed-in identity. The page constructs whichever it has and
//! hands it to the component that needs it.

use wasm_bindgen::prelude::*;

use nexbtc_core::{ops, SendSource};

use crate::api::CanisterActor;
use crate::state::{
    to_js, AddressesView, AmountView, BytesView, FeeSummaryView, HeaderBatchView, UtxoSetView,
};
use crate::to_js_error;

/// Queries and threshold signing through an anonymous actor.
#[wasm_bindgen]
pub struct PublicWallet {
    actor: CanisterActor,
}

#[wasm_bindgen]
impl PublicWallet {
    /// Wrap a backend actor created by the page.
    #[wasm_bindgen(constructor)]
    pub fn new(actor: JsValue) -> Result<PublicWallet, JsValue> {
        let actor = CanisterActor::new(actor).map_err(to_js_error)?;
        Ok(PublicWallet { actor })
    }

    /// Get the confirmed balance of an address.
    #[wasm_bindgen]
    pub async fn get_balance(&self, address: String) -> Result<JsValue, JsValue> {
        let balance = ops::get_balance(&self.actor, &address)
            .await
            .map_err(to_js_error)?;
        to_js(&AmountView::from(balance))
    }

    /// List the unspent outputs of an address.
    #[wasm_bindgen]
    pub async fn get_utxos(&self, address: String) -> Result<JsValue, JsValue> {
        let set = ops::get_utxos(&self.actor, &address)
            .await
            .map_err(to_js_error)?;
        to_js(&UtxoSetView::from(&set))
    }

    /// Load the fee percentiles and their summary.
    #[wasm_bindgen]
    pub async fn get_fee_percentiles(&self) -> Result<JsValue, JsValue> {
        let table = ops::get_fee_percentiles(&self.actor)
            .await
            .map_err(to_js_error)?;
        to_js(&FeeSummaryView::from(&table))
    }

    /// Fetch headers for `start..=end`. Leave `end` blank for one header.
    #[wasm_bindgen]
    pub async fn get_block_headers(&self, start: String, end: String) -> Result<JsValue, JsValue> {
        let batch = ops::get_block_headers(&self.actor, &start, &end)
            .await
            .map_err(to_js_error)?;
        to_js(&HeaderBatchView::from(&batch))
    }

    /// Sign a 32-byte hash with threshold ECDSA.
    ///
    /// # Arguments
    /// * `message_hash` - 32 bytes as hex, optionally `0x`-prefixed
    /// * `derivation_path` - comma-separated hex segments, or blank
    #[wasm_bindgen]
    pub async fn sign_with_ecdsa(&self, message_hash: String, derivation_path: String) -> Result<JsValue, JsValue> {
        let signature = ops::sign_with_ecdsa(&self.actor, &message_hash, &derivation_path)
            .await
            .map_err(to_js_error)?;
        to_js(&BytesView::from(signature.as_slice()))
    }

    #[wasm_bindgen]
    pub async fn get_ecdsa_public_key(&self, derivation_path: String) -> Result<JsValue, JsValue> {
        let key = ops::get_ecdsa_public_key(&self.actor, &derivation_path)
            .await
            .map_err(to_js_error)?;
        to_js(&BytesView::from(key.as_slice()))
    }

    /// Sign a 32-byte message with threshold Schnorr.
    ///
    /// # Arguments
    /// * `message` - 32 bytes as hex
    /// * `derivation_path` - comma-separated hex segments, or blank
    /// * `use_bip341` - apply the BIP-341 taproot tweak
    /// * `merkle_root_hash` - 32-byte script tree root, read only with `use_bip341`
    #[wasm_bindgen]
    pub async fn sign_with_schnorr(
        &self,
        message: String,
        derivation_path: String,
        use_bip341: bool,
        merkle_root_hash: String,
    ) -> Result<JsValue, JsValue> {
        let signature = ops::sign_with_schnorr(
            &self.actor,
            &message,
            &derivation_path,
            use_bip341,
            &merkle_root_hash,
        )
        .await
        .map_err(to_js_error)?;
        to_js(&BytesView::from(signature.as_slice()))
    }

    #[wasm_bindgen]
    pub async fn get_schnorr_public_key(&self, derivation_path: String) -> Result<JsValue, JsValue> {
        let key = ops::get_schnorr_public_key(&self.actor, &derivation_path)
            .await
            .map_err(to_js_error)?;
        to_js(&BytesView::from(key.as_slice()))
    }

    /// Load the backend's P2PKH and taproot addresses.
    #[wasm_bindgen]
    pub async fn get_addresses(&self) -> Result<JsValue, JsValue> {
        let addresses = ops::get_addresses(&self.actor)
            .await
            .map_err(to_js_error)?;
        to_js(&AddressesView::from(addresses))
    }

    /// Send from a backend-held address. Returns the transaction id.
    ///
    /// # Arguments
    /// * `source` - `p2pkh`, `p2tr_key_only`, `p2tr_key_path`, or `p2tr_script_path`
    /// * `destination` - destination address
    /// * `amount_btc` - amount in BTC as typed by the user
    #[wasm_bindgen]
    pub async fn send(&self, source: String, destination: String, amount_btc: String) -> Result<String, JsValue> {
        let source = SendSource::parse(&source).map_err(to_js_error)?;
        ops::send(&self.actor, source, &destination, &amount_btc)
            .await
            .map_err(to_js_error)
    }
}

/// Vault operations through an actor bound to the user's identity.
#[wasm_bindgen]
pub struct VaultSession {
    actor: CanisterActor,
}

#[wasm_bindgen]
impl VaultSession {
    /// Wrap an authenticated backend actor.
    #[wasm_bindgen(constructor)]
    pub fn new(actor: JsValue) -> Result<VaultSession, JsValue> {
        let actor = CanisterActor::new(actor).map_err(to_js_error)?;
        Ok(VaultSession { actor })
    }

    /// The caller's personal deposit address.
    #[wasm_bindgen]
    pub async fn get_deposit_address(&self) -> Result<String, JsValue> {
        ops::get_deposit_address(&self.actor)
            .await
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub async fn get_balance(&self) -> Result<JsValue, JsValue> {
        let balance = ops::get_vault_balance(&self.actor)
            .await
            .map_err(to_js_error)?;
        to_js(&AmountView::from(balance))
    }

    /// List the deposits held for the caller.
    #[wasm_bindgen]
    pub async fn get_utxos(&self) -> Result<JsValue, JsValue> {
        let set = ops::get_vault_utxos(&self.actor)
            .await
            .map_err(to_js_error)?;
        to_js(&UtxoSetView::from(&set))
    }

    /// Withdraw to an external address. Returns the transaction id.
    #[wasm_bindgen]
    pub async fn withdraw(&self, destination: String, amount_btc: String) -> Result<String, JsValue> {
        ops::withdraw(&self.actor, &destination, &amount_btc)
            .await
            .map_err(to_js_error)
    }
}
