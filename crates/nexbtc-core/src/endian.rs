//! Byte-order helpers for fields that are little-endian on the wire.
//!
//! Bitcoin serializes hashes in internal (little-endian) order but displays
//! them reversed, so the "leading zeros" of a block hash are the trailing
//! bytes of the wire form.

use crate::codec;
use crate::error::{Error, Result};
use crate::network::HASH_SIZE;

/// Return a reversed copy of `bytes`. Accepts any length.
pub fn reverse_byte_order(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().rev().copied().collect()
}

/// Reverse the byte order of a 32-byte array.
#[inline]
pub fn reverse_bytes(bytes: &[u8; HASH_SIZE]) -> [u8; HASH_SIZE] {
    let mut reversed = *bytes;
    reversed.reverse();
    reversed
}

/// Interpret exactly four bytes as a little-endian `u32`.
pub fn read_le_u32(bytes: &[u8]) -> Result<u32> {
    let array: [u8; 4] = bytes.try_into().map_err(|_| Error::InvalidLength {
        field: "Little-endian u32",
        expected: 4,
        actual: bytes.len(),
    })?;
    Ok(u32::from_le_bytes(array))
}

/// Convert a wire-order hash to its display hex.
pub fn to_display_hex(wire: &[u8; HASH_SIZE]) -> String {
    codec::encode(&reverse_bytes(wire))
}

/// Parse a display-order hash (as shown by explorers) into wire order.
pub fn from_display_hex(field: &'static str, text: &str) -> Result<[u8; HASH_SIZE]> {
    let display: [u8; HASH_SIZE] = codec::decode_array(field, text)?;
    Ok(reverse_bytes(&display))
}
