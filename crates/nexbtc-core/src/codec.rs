//! Hex text <-> byte conversion.
//!
//! Hex only exists at the UI edge. Everything handed to the backend is raw
//! bytes, everything shown to the user goes back through [`encode`].

use hex::FromHexError;

use crate::error::{Error, Result};

/// Decode hex text into bytes.
///
/// Accepts an optional `0x` / `0X` prefix and either letter case. Fails with
/// [`Error::MalformedHex`] on odd length or any non-hex character.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    let digits = strip_prefix(text);

    hex::decode(digits).map_err(|e| match e {
        FromHexError::OddLength => {
            Error::MalformedHex(format!("odd number of hex digits ({})", digits.len()))
        }
        FromHexError::InvalidHexCharacter { c, index } => {
            Error::MalformedHex(format!("invalid character {:?} at position {}", c, index))
        }
        FromHexError::InvalidStringLength => Error::MalformedHex("invalid length".into()),
    })
}

/// Encode bytes as lowercase hex, no prefix, no separators.
#[inline]
pub fn encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode hex text into a fixed-size array.
///
/// `field` names the value in the [`Error::InvalidLength`] message.
pub fn decode_array<const N: usize>(field: &'static str, text: &str) -> Result<[u8; N]> {
    let bytes = decode(text)?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| Error::InvalidLength {
        field,
        expected: N,
        actual: bytes.len(),
    })
}

fn strip_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}
