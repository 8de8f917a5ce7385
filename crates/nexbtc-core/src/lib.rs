//! Bitcoin wire codec and request validation for the NexBTC wallet.
//!
//! This crate sits between user input and a threshold-signing Bitcoin
//! backend canister. It provides pure Rust implementations of:
//! - Hex encoding/decoding with strict validation
//! - Byte-order reversal for hashes and little-endian integer reads
//! - 80-byte block header decoding and height-correlated header batches
//! - BTC to satoshi conversion without floating point
//! - Derivation path, hash field, and address validation
//! - Fee percentile normalization and summaries
//! - The public and authenticated backend capabilities

pub mod amount;
pub mod client;
pub mod codec;
pub mod endian;
pub mod error;
pub mod fees;
pub mod header;
pub mod network;
pub mod path;
pub mod request;
pub mod response;

pub use amount::{btc_to_satoshi, SatoshiAmount};
pub use client::{ops, AuthenticatedClient, PublicClient};
pub use endian::{read_le_u32, reverse_byte_order, reverse_bytes};
pub use error::{Error, Result};
pub use fees::{FeePercentileTable, FeeTier, Priority, WireRate};
pub use header::{BlockHeader, HeaderBatch, HeightedHeader};
pub use network::{BackendConfig, Deployment};
pub use path::DerivationPath;
pub use request::{
    AddressKind, BitcoinAddress, EcdsaSignRequest, HeightRange, SchnorrAux, SchnorrSignRequest,
    SendRequest, SendSource,
};
pub use response::{Outpoint, RawBlockHeadersResponse, RawUtxosResponse, Utxo, UtxoSet};
