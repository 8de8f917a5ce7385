//! Display records handed to JS.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use nexbtc_core::{
    AddressKind, BlockHeader, Error, FeePercentileTable, HeaderBatch, SatoshiAmount, UtxoSet,
};

use crate::to_js_error;

/// Convert any view to a JS value.
///
/// `u64` fields become `BigInt`s, matching how the agent hands candid
/// `nat64` values to the page.
pub fn to_js<T: Serialize>(view: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_large_number_types_as_bigints(true);
    view.serialize(&serializer).map_err(|e| {
        to_js_error(Error::UnexpectedResponseShape(format!(
            "cannot convert view: {}",
            e
        )))
    })
}

/// A satoshi amount in both units.
#[derive(Debug, Clone, Serialize)]
pub struct AmountView {
    /// Amount in satoshis.
    pub satoshi: u64,
    /// Amount in BTC with eight decimals.
    pub btc: String,
}

impl From<SatoshiAmount> for AmountView {
    fn from(amount: SatoshiAmount) -> Self {
        AmountView {
            satoshi: amount.to_sat(),
            btc: amount.to_btc_string(),
        }
    }
}

/// A decoded block header.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderView {
    /// Block height, when known.
    pub height: Option<u32>,
    /// Version bytes as hex.
    pub version: String,
    /// Previous block hash (display format).
    pub prev_block_hash: String,
    /// Merkle root (display format).
    pub merkle_root: String,
    /// Unix timestamp.
    pub timestamp: u32,
    /// Timestamp as RFC 3339.
    pub time: String,
    /// Bits bytes as hex.
    pub bits: String,
    pub nonce: u32,
    /// The full 80-byte header as hex.
    pub raw: String,
}

impl HeaderView {
    pub fn new(header: &BlockHeader, height: Option<u32>) -> Self {
        HeaderView {
            height,
            version: header.version_hex(),
            prev_block_hash: header.prev_block_hash_hex(),
            merkle_root: header.merkle_root_hex(),
            timestamp: header.timestamp,
            time: header.timestamp_rfc3339(),
            bits: header.bits_hex(),
            nonce: header.nonce,
            raw: header.raw_hex(),
        }
    }
}

/// Headers for a height range.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderBatchView {
    pub tip_height: u32,
    pub headers: Vec<HeaderView>,
}

impl From<&HeaderBatch> for HeaderBatchView {
    fn from(batch: &HeaderBatch) -> Self {
        HeaderBatchView {
            tip_height: batch.tip_height,
            headers: batch
                .headers
                .iter()
                .map(|h| HeaderView::new(&h.header, Some(h.height)))
                .collect(),
        }
    }
}

/// One unspent output.
#[derive(Debug, Clone, Serialize)]
pub struct UtxoView {
    /// Transaction id (display format).
    pub txid: String,
    pub vout: u32,
    pub value: AmountView,
    pub height: u32,
    pub confirmations: u32,
}

/// A UTXO listing.
#[derive(Debug, Clone, Serialize)]
pub struct UtxoSetView {
    pub tip_height: u32,
    /// Tip block hash (display format).
    pub tip_block_hash: String,
    pub utxos: Vec<UtxoView>,
    pub total: AmountView,
    pub has_next_page: bool,
}

impl From<&UtxoSet> for UtxoSetView {
    fn from(set: &UtxoSet) -> Self {
        UtxoSetView {
            tip_height: set.tip_height,
            tip_block_hash: set.tip_block_hash_hex(),
            utxos: set
                .utxos
                .iter()
                .map(|utxo| UtxoView {
                    txid: utxo.outpoint.txid_hex(),
                    vout: utxo.outpoint.vout,
                    value: utxo.value.into(),
                    height: utxo.height,
                    confirmations: set.confirmations(utxo),
                })
                .collect(),
            total: set.total().into(),
            has_next_page: set.next_page.is_some(),
        }
    }
}

/// One row of the fee summary.
#[derive(Debug, Clone, Serialize)]
pub struct FeeTierView {
    pub percentile: u32,
    /// Millisatoshi per vbyte.
    pub rate: Option<u64>,
    /// Satoshi per vbyte, two decimals.
    pub sat_per_vbyte: Option<String>,
    pub label: String,
}

/// Fee percentiles plus the summary tiers.
#[derive(Debug, Clone, Serialize)]
pub struct FeeSummaryView {
    /// All rates, indexed by percentile.
    pub rates: Vec<u64>,
    pub tiers: Vec<FeeTierView>,
    /// Elements that were replaced with zero, and why.
    pub anomalies: Vec<String>,
}

impl From<&FeePercentileTable> for FeeSummaryView {
    fn from(table: &FeePercentileTable) -> Self {
        FeeSummaryView {
            rates: table.rates().to_vec(),
            tiers: table
                .summary()
                .iter()
                .map(|tier| FeeTierView {
                    percentile: tier.percentile as u32,
                    rate: tier.rate,
                    sat_per_vbyte: tier.sat_per_vbyte(),
                    label: tier.priority.label().to_string(),
                })
                .collect(),
            anomalies: table
                .anomalies()
                .iter()
                .map(|a| format!("percentile {}: {}", a.index, a.reason))
                .collect(),
        }
    }
}

/// A signature or public key.
#[derive(Debug, Clone, Serialize)]
pub struct BytesView {
    pub hex: String,
    /// Length in bytes.
    pub length: u32,
}

impl From<&[u8]> for BytesView {
    fn from(bytes: &[u8]) -> Self {
        BytesView {
            hex: hex::encode(bytes),
            length: bytes.len() as u32,
        }
    }
}

/// The backend's own receiving addresses.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AddressesView {
    pub p2pkh: String,
    pub p2tr_key_only: String,
    pub p2tr: String,
}

impl From<Vec<(AddressKind, String)>> for AddressesView {
    fn from(addresses: Vec<(AddressKind, String)>) -> Self {
        let mut view = AddressesView::default();
        for (kind, address) in addresses {
            match kind {
                AddressKind::P2pkh => view.p2pkh = address,
                AddressKind::P2trKeyOnly => view.p2tr_key_only = address,
                AddressKind::P2tr => view.p2tr = address,
            }
        }
        view
    }
}
