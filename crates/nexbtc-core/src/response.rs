//! Backend response types and their checked decoding.
//!
//! `Raw*` types mirror the backend's wire records, where every hash is a
//! variable-length byte vector. They are converted into fixed-size types
//! before anything is displayed.

use serde::Deserialize;

use crate::amount::SatoshiAmount;
use crate::endian::to_display_hex;
use crate::error::{Error, Result};
use crate::network::{HASH_SIZE, MAX_MONEY};

/// `get_block_headers` response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RawBlockHeadersResponse {
    pub tip_height: u32,
    pub block_headers: Vec<Vec<u8>>,
}

/// Outpoint as sent by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawOutpoint {
    pub txid: Vec<u8>,
    pub vout: u32,
}

/// UTXO as sent by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawUtxo {
    pub outpoint: RawOutpoint,
    pub value: u64,
    pub height: u32,
}

/// `get_utxos` / `get_my_vault_utxos` response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RawUtxosResponse {
    pub tip_height: u32,
    pub tip_block_hash: Vec<u8>,
    pub utxos: Vec<RawUtxo>,
    #[serde(default)]
    pub next_page: Option<Vec<u8>>,
}

/// Reference to one output of a prior transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Outpoint {
    /// Transaction id (internal byte order).
    pub txid: [u8; HASH_SIZE],
    pub vout: u32,
}

impl Outpoint {
    /// Txid in the reversed order explorers display.
    pub fn txid_hex(&self) -> String {
        to_display_hex(&self.txid)
    }
}

impl core::fmt::Display for Outpoint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.txid_hex(), self.vout)
    }
}

/// An unspent output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utxo {
    pub outpoint: Outpoint,
    pub value: SatoshiAmount,
    /// Height of the block that confirmed the output.
    pub height: u32,
}

/// A checked UTXO listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtxoSet {
    pub tip_height: u32,
    /// Tip block hash (internal byte order).
    pub tip_block_hash: [u8; HASH_SIZE],
    pub utxos: Vec<Utxo>,
    /// Opaque continuation token when the backend paginates.
    pub next_page: Option<Vec<u8>>,
}

impl UtxoSet {
    /// Convert a raw response, checking every hash is 32 bytes and every
    /// value is within the total money supply.
    pub fn from_raw(raw: RawUtxosResponse) -> Result<Self> {
        let tip_block_hash = hash32("tip_block_hash", &raw.tip_block_hash)?;

        let utxos = raw
            .utxos
            .into_iter()
            .enumerate()
            .map(|(i, utxo)| -> Result<Utxo> {
                let txid = hash32("txid", &utxo.outpoint.txid).map_err(|e| match e {
                    Error::UnexpectedResponseShape(reason) => {
                        Error::UnexpectedResponseShape(format!("utxo {}: {}", i, reason))
                    }
                    other => other,
                })?;
                if utxo.value > MAX_MONEY {
                    return Err(Error::UnexpectedResponseShape(format!(
                        "utxo {}: value {} exceeds the money supply",
                        i, utxo.value
                    )));
                }
                Ok(Utxo {
                    outpoint: Outpoint {
                        txid,
                        vout: utxo.outpoint.vout,
                    },
                    value: SatoshiAmount::from_sat(utxo.value),
                    height: utxo.height,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(UtxoSet {
            tip_height: raw.tip_height,
            tip_block_hash,
            utxos,
            next_page: raw.next_page,
        })
    }

    /// Sum of all output values, saturating at `u64::MAX`.
    pub fn total(&self) -> SatoshiAmount {
        SatoshiAmount::from_sat(
            self.utxos
                .iter()
                .fold(0u64, |sum, u| sum.saturating_add(u.value.to_sat())),
        )
    }

    pub fn tip_block_hash_hex(&self) -> String {
        to_display_hex(&self.tip_block_hash)
    }

    /// Confirmations of `utxo` relative to the reported tip.
    pub fn confirmations(&self, utxo: &Utxo) -> u32 {
        let confirmations = (u64::from(self.tip_height) + 1).saturating_sub(u64::from(utxo.height));
        u32::try_from(confirmations).unwrap_or(u32::MAX)
    }
}

fn hash32(field: &str, bytes: &[u8]) -> Result<[u8; HASH_SIZE]> {
    bytes.try_into().map_err(|_| {
        Error::UnexpectedResponseShape(format!(
            "{} must be {} bytes, got {}",
            field,
            HASH_SIZE,
            bytes.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_utxos() -> RawUtxosResponse {
        serde_json::from_value(serde_json::json!({
            "tip_height": 120,
            "tip_block_hash": vec![0xaa; 32],
            "utxos": [
                {
                    "outpoint": { "txid": (0u8..32).collect::<Vec<u8>>(), "vout": 1 },
                    "value": 150_000_000u64,
                    "height": 100
                },
                {
                    "outpoint": { "txid": vec![0x01; 32], "vout": 0 },
                    "value": 546,
                    "height": 120
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_utxo_set() {
        let set = UtxoSet::from_raw(raw_utxos()).unwrap();

        assert_eq!(set.tip_height, 120);
        assert_eq!(set.tip_block_hash_hex(), "aa".repeat(32));
        assert_eq!(set.utxos.len(), 2);
        assert_eq!(set.next_page, None);
        assert_eq!(set.total().to_sat(), 150_000_546);

        let first = &set.utxos[0];
        assert_eq!(first.outpoint.vout, 1);
        assert!(first.outpoint.txid_hex().starts_with("1f1e1d"));
        assert!(first.outpoint.to_string().ends_with("0100:1"));
        assert_eq!(set.confirmations(first), 21);
        assert_eq!(set.confirmations(&set.utxos[1]), 1);
    }

    #[test]
    fn test_rejects_short_txid() {
        let mut raw = raw_utxos();
        raw.utxos[1].outpoint.txid.pop();

        let err = UtxoSet::from_raw(raw).unwrap_err();
        assert_eq!(err.code(), "UnexpectedResponseShape");
        assert!(err.to_string().contains("utxo 1"));
    }

    #[test]
    fn test_rejects_short_tip_hash() {
        let mut raw = raw_utxos();
        raw.tip_block_hash = vec![0u8; 20];
        assert_eq!(UtxoSet::from_raw(raw).unwrap_err().code(), "UnexpectedResponseShape");
    }

    #[test]
    fn test_rejects_value_above_money_supply() {
        let mut raw = raw_utxos();
        raw.utxos[0].value = u64::MAX;
        raw.utxos[1].value = u64::MAX;

        let err = UtxoSet::from_raw(raw).unwrap_err();
        assert_eq!(err.code(), "UnexpectedResponseShape");
        assert!(err.to_string().contains("utxo 0"));

        let mut raw = raw_utxos();
        raw.utxos[0].value = MAX_MONEY;
        assert!(UtxoSet::from_raw(raw).is_ok());
    }

    #[test]
    fn test_total_saturates() {
        let mut set = UtxoSet::from_raw(raw_utxos()).unwrap();
        for utxo in &mut set.utxos {
            utxo.value = SatoshiAmount::from_sat(u64::MAX);
        }
        assert_eq!(set.total().to_sat(), u64::MAX);
    }

    #[test]
    fn test_confirmations_at_max_tip() {
        let mut set = UtxoSet::from_raw(raw_utxos()).unwrap();
        set.tip_height = u32::MAX;

        let mut utxo = set.utxos[0];
        utxo.height = u32::MAX;
        assert_eq!(set.confirmations(&utxo), 1);
        utxo.height = 0;
        assert_eq!(set.confirmations(&utxo), u32::MAX);
    }

    #[test]
    fn test_empty_listing() {
        let raw = RawUtxosResponse {
            tip_block_hash: vec![0u8; 32],
            next_page: Some(vec![1, 2, 3]),
            ..Default::default()
        };
        let set = UtxoSet::from_raw(raw).unwrap();
        assert!(set.utxos.is_empty());
        assert_eq!(set.total().to_sat(), 0);
        assert_eq!(set.next_page, Some(vec![1, 2, 3]));
    }
}
