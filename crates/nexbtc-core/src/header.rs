//! Bitcoin block header decoding for display.
//!
//! Only the layout is interpreted here. No proof-of-work, hash, or
//! difficulty checks are performed.

use chrono::{DateTime, SecondsFormat};

use crate::codec;
use crate::endian::{read_le_u32, to_display_hex};
use crate::error::{Error, Result};
use crate::network::BLOCK_HEADER_SIZE;
use crate::request::HeightRange;
use crate::response::RawBlockHeadersResponse;

/// A decoded Bitcoin block header (80 bytes).
///
/// Hashes are kept in wire (internal) byte order; use the `*_hex` accessors
/// for display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Version field, raw wire bytes.
    pub version: [u8; 4],
    /// Hash of the previous block (internal byte order).
    pub prev_block_hash: [u8; 32],
    /// Merkle root of all transactions (internal byte order).
    pub merkle_root: [u8; 32],
    /// Block timestamp (Unix seconds).
    pub timestamp: u32,
    /// Difficulty target in compact form, raw wire bytes.
    pub bits: [u8; 4],
    /// Proof-of-work nonce.
    pub nonce: u32,
}

impl BlockHeader {
    /// Decode a raw header.
    ///
    /// Fails with [`Error::InvalidHeaderLength`] unless `bytes` is exactly
    /// 80 bytes long.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let raw: &[u8; BLOCK_HEADER_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::InvalidHeaderLength(bytes.len()))?;

        let mut version = [0u8; 4];
        version.copy_from_slice(&raw[0..4]);

        let mut prev_block_hash = [0u8; 32];
        prev_block_hash.copy_from_slice(&raw[4..36]);

        let mut merkle_root = [0u8; 32];
        merkle_root.copy_from_slice(&raw[36..68]);

        let mut bits = [0u8; 4];
        bits.copy_from_slice(&raw[72..76]);

        Ok(BlockHeader {
            version,
            prev_block_hash,
            merkle_root,
            timestamp: read_le_u32(&raw[68..72])?,
            bits,
            nonce: read_le_u32(&raw[76..80])?,
        })
    }

    /// Decode a header given as hex text.
    pub fn parse_hex(text: &str) -> Result<Self> {
        Self::parse(&codec::decode(text)?)
    }

    /// Serialize the header back to its 80 wire bytes.
    pub fn serialize(&self) -> [u8; BLOCK_HEADER_SIZE] {
        let mut header = [0u8; BLOCK_HEADER_SIZE];

        header[0..4].copy_from_slice(&self.version);
        header[4..36].copy_from_slice(&self.prev_block_hash);
        header[36..68].copy_from_slice(&self.merkle_root);
        header[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        header[72..76].copy_from_slice(&self.bits);
        header[76..80].copy_from_slice(&self.nonce.to_le_bytes());

        header
    }

    /// Version as a signed integer (BIP9 versionbits live in the high bits).
    pub fn version_number(&self) -> i32 {
        i32::from_le_bytes(self.version)
    }

    /// Version bytes as hex, not reversed.
    pub fn version_hex(&self) -> String {
        codec::encode(&self.version)
    }

    /// Previous block hash in display order.
    pub fn prev_block_hash_hex(&self) -> String {
        to_display_hex(&self.prev_block_hash)
    }

    /// Merkle root in display order.
    pub fn merkle_root_hex(&self) -> String {
        to_display_hex(&self.merkle_root)
    }

    /// Bits bytes as hex, not reversed.
    pub fn bits_hex(&self) -> String {
        codec::encode(&self.bits)
    }

    /// Timestamp rendered as RFC 3339 UTC.
    pub fn timestamp_rfc3339(&self) -> String {
        DateTime::from_timestamp(i64::from(self.timestamp), 0)
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default()
    }

    /// The full raw header as hex.
    pub fn raw_hex(&self) -> String {
        codec::encode(&self.serialize())
    }
}

/// A header paired with the height it was requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightedHeader {
    pub height: u32,
    pub header: BlockHeader,
}

/// Headers returned for a [`HeightRange`] request.
///
/// The backend response does not say which height each header belongs to.
/// The only correlation is ordering: element `i` of the returned list is the
/// header at height `range.start + i`. Reordering or filtering the raw list
/// before building the batch breaks that invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBatch {
    /// Chain tip height reported by the backend.
    pub tip_height: u32,
    /// Decoded headers in ascending height order.
    pub headers: Vec<HeightedHeader>,
}

impl HeaderBatch {
    /// Decode every header of a response and attach its height.
    ///
    /// Fewer headers than requested is accepted (range past the tip). More
    /// headers than the range covers is a contract violation.
    pub fn from_response(range: &HeightRange, response: RawBlockHeadersResponse) -> Result<Self> {
        let requested = range.len();
        if response.block_headers.len() as u64 > requested {
            return Err(Error::UnexpectedResponseShape(format!(
                "requested {} headers from height {}, got {}",
                requested,
                range.start(),
                response.block_headers.len()
            )));
        }

        let headers = response
            .block_headers
            .iter()
            .zip(range.heights())
            .map(|(raw, height)| {
                BlockHeader::parse(raw).map(|header| HeightedHeader { height, header })
            })
            .collect::<Result<Vec<_>>>()?;

        if headers.len() as u64 != requested {
            log::debug!(
                "requested {} headers from height {}, backend returned {} (tip {})",
                requested,
                range.start(),
                headers.len(),
                response.tip_height
            );
        }

        Ok(HeaderBatch {
            tip_height: response.tip_height,
            headers,
        })
    }
}
