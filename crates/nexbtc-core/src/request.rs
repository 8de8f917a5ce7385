//! Validation of user input into typed backend requests.
//!
//! Every request type here can only be built from values that already passed
//! validation, so a constructed request is always safe to send.

use crate::amount::SatoshiAmount;
use crate::codec;
use crate::error::{Error, Result};
use crate::network::HASH_SIZE;
use crate::path::DerivationPath;

/// Decode a hex field that must be exactly 32 bytes.
pub fn parse_hash32(field: &'static str, text: &str) -> Result<[u8; HASH_SIZE]> {
    codec::decode_array(field, text.trim())
}

/// A non-empty, trimmed Bitcoin address.
///
/// Format checks are left to the backend; its rejection is surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitcoinAddress(String);

impl BitcoinAddress {
    /// Validate an address field. `field` names it in the error message.
    pub fn parse(field: &'static str, text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Error::MissingAddress(field));
        }
        Ok(BitcoinAddress(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for BitcoinAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inclusive block height range for a header request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightRange {
    start: u32,
    end: Option<u32>,
}

impl HeightRange {
    /// Build a range, rejecting an end below the start.
    pub fn new(start: u32, end: Option<u32>) -> Result<Self> {
        if let Some(end) = end {
            if end < start {
                return Err(Error::InvalidRange(format!(
                    "End height {} must be greater than or equal to start height {}",
                    end, start
                )));
            }
        }
        Ok(HeightRange { start, end })
    }

    /// Parse the start / optional end text fields of the header form.
    ///
    /// A blank end means a single header at `start`.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start_text = start.trim();
        if start_text.is_empty() {
            return Err(Error::InvalidRange("Please enter a start height".into()));
        }
        let start = parse_height("Start", start_text)?;

        let end_text = end.trim();
        let end = if end_text.is_empty() {
            None
        } else {
            Some(parse_height("End", end_text)?)
        };

        Self::new(start, end)
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> Option<u32> {
        self.end
    }

    /// Number of headers the range covers.
    pub fn len(&self) -> u64 {
        match self.end {
            Some(end) => u64::from(end - self.start) + 1,
            None => 1,
        }
    }

    /// A range always covers at least one height.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The covered heights in ascending order.
    pub fn heights(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end.unwrap_or(self.start)
    }
}

fn parse_height(which: &str, text: &str) -> Result<u32> {
    text.parse::<u32>().map_err(|_| {
        Error::InvalidRange(format!(
            "{} height must be a non-negative integer, got {:?}",
            which, text
        ))
    })
}

/// Auxiliary input for a Schnorr signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchnorrAux {
    /// Plain BIP-340 signature.
    #[default]
    None,
    /// BIP-341 taproot tweak with the script tree Merkle root.
    Bip341 { merkle_root_hash: [u8; HASH_SIZE] },
}

impl SchnorrAux {
    /// Build from the form state: the BIP-341 toggle and the Merkle root field.
    ///
    /// The Merkle root is ignored when BIP-341 is off.
    pub fn from_input(use_bip341: bool, merkle_root_hex: &str) -> Result<Self> {
        if !use_bip341 {
            return Ok(SchnorrAux::None);
        }
        let merkle_root_hash = parse_hash32("Merkle root hash", merkle_root_hex)?;
        Ok(SchnorrAux::Bip341 { merkle_root_hash })
    }

    pub fn merkle_root_hash(&self) -> Option<&[u8; HASH_SIZE]> {
        match self {
            SchnorrAux::None => None,
            SchnorrAux::Bip341 { merkle_root_hash } => Some(merkle_root_hash),
        }
    }
}

/// Request for a threshold ECDSA signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcdsaSignRequest {
    pub message_hash: [u8; HASH_SIZE],
    pub derivation_path: DerivationPath,
}

impl EcdsaSignRequest {
    pub fn parse(message_hash_hex: &str, derivation_path: &str) -> Result<Self> {
        Ok(EcdsaSignRequest {
            message_hash: parse_hash32("Message hash", message_hash_hex)?,
            derivation_path: DerivationPath::parse(derivation_path)?,
        })
    }
}

/// Request for a threshold Schnorr signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchnorrSignRequest {
    pub message: [u8; HASH_SIZE],
    pub derivation_path: DerivationPath,
    pub aux: SchnorrAux,
}

impl SchnorrSignRequest {
    pub fn parse(
        message_hex: &str,
        derivation_path: &str,
        use_bip341: bool,
        merkle_root_hex: &str,
    ) -> Result<Self> {
        Ok(SchnorrSignRequest {
            message: parse_hash32("Message", message_hex)?,
            derivation_path: DerivationPath::parse(derivation_path)?,
            aux: SchnorrAux::from_input(use_bip341, merkle_root_hex)?,
        })
    }
}

/// Which backend-held key funds an outgoing transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendSource {
    /// Legacy pay-to-public-key-hash.
    P2pkh,
    /// Taproot with key-path spending only.
    P2trKeyOnly,
    /// Taproot with a script tree, spent via the key path.
    P2trKeyPath,
    /// Taproot with a script tree, spent via the script path.
    P2trScriptPath,
}

impl SendSource {
    /// Parse the form selector value.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "p2pkh" => Some(SendSource::P2pkh),
            "p2tr_key_only" => Some(SendSource::P2trKeyOnly),
            "p2tr_key_path" => Some(SendSource::P2trKeyPath),
            "p2tr_script_path" => Some(SendSource::P2trScriptPath),
            _ => None,
        }
    }

    /// Like [`SendSource::from_str`], failing with `UnknownSendSource`.
    pub fn parse(s: &str) -> Result<Self> {
        Self::from_str(s).ok_or_else(|| Error::UnknownSendSource(s.to_string()))
    }

    /// Backend method that sends from this source.
    pub fn method(&self) -> &'static str {
        match self {
            SendSource::P2pkh => "send_from_p2pkh_address",
            SendSource::P2trKeyOnly => "send_from_p2tr_key_only_address",
            SendSource::P2trKeyPath => "send_from_p2tr_address_key_path",
            SendSource::P2trScriptPath => "send_from_p2tr_address_script_path",
        }
    }
}

/// Backend-held address types that can be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    P2pkh,
    P2trKeyOnly,
    P2tr,
}

impl AddressKind {
    pub const ALL: [AddressKind; 3] = [AddressKind::P2pkh, AddressKind::P2trKeyOnly, AddressKind::P2tr];

    /// Backend method returning this address.
    pub fn method(&self) -> &'static str {
        match self {
            AddressKind::P2pkh => "get_p2pkh_address",
            AddressKind::P2trKeyOnly => "get_p2tr_key_only_address",
            AddressKind::P2tr => "get_p2tr_address",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AddressKind::P2pkh => "p2pkh",
            AddressKind::P2trKeyOnly => "p2tr_key_only",
            AddressKind::P2tr => "p2tr",
        }
    }
}

/// Payment from a backend-held address, or a vault withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub destination_address: BitcoinAddress,
    pub amount: SatoshiAmount,
}

impl SendRequest {
    pub fn parse(destination: &str, amount_btc: &str) -> Result<Self> {
        Ok(SendRequest {
            destination_address: BitcoinAddress::parse("destination address", destination)?,
            amount: SatoshiAmount::from_btc_str(amount_btc)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash32_lengths() {
        let ok = parse_hash32("Message hash", &"ab".repeat(32)).unwrap();
        assert_eq!(ok, [0xab; 32]);

        for len in [0usize, 31, 33] {
            let err = parse_hash32("Message hash", &"ab".repeat(len)).unwrap_err();
            assert_eq!(
                err,
                Error::InvalidLength { field: "Message hash", expected: 32, actual: len }
            );
        }

        let prefixed = format!("  0x{}  ", "00".repeat(32));
        assert!(parse_hash32("Message hash", &prefixed).is_ok());
    }

    #[test]
    fn test_address() {
        let addr = BitcoinAddress::parse("Bitcoin address", "  bc1qxyz  ").unwrap();
        assert_eq!(addr.as_str(), "bc1qxyz");

        assert_eq!(
            BitcoinAddress::parse("Bitcoin address", " \n"),
            Err(Error::MissingAddress("Bitcoin address"))
        );
    }

    #[test]
    fn test_height_range() {
        assert!(matches!(HeightRange::new(10, Some(5)), Err(Error::InvalidRange(_))));

        let single = HeightRange::new(10, None).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single.heights().collect::<Vec<_>>(), vec![10]);

        let span = HeightRange::new(10, Some(15)).unwrap();
        assert_eq!(span.len(), 6);
        assert_eq!(span.heights().collect::<Vec<_>>(), vec![10, 11, 12, 13, 14, 15]);

        let full = HeightRange::new(0, Some(u32::MAX)).unwrap();
        assert_eq!(full.len(), u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_height_range_parse() {
        assert_eq!(HeightRange::parse("10", "").unwrap(), HeightRange::new(10, None).unwrap());
        assert_eq!(HeightRange::parse(" 10 ", " 15 ").unwrap().len(), 6);

        for (start, end) in [("", ""), ("-1", ""), ("ten", ""), ("10", "5"), ("10", "x"), ("1.5", "")] {
            assert!(
                matches!(HeightRange::parse(start, end), Err(Error::InvalidRange(_))),
                "{:?}..{:?} should be rejected",
                start,
                end
            );
        }
    }

    #[test]
    fn test_schnorr_aux() {
        assert_eq!(SchnorrAux::from_input(false, "garbage").unwrap(), SchnorrAux::None);

        let aux = SchnorrAux::from_input(true, &"11".repeat(32)).unwrap();
        assert_eq!(aux.merkle_root_hash(), Some(&[0x11; 32]));

        assert!(matches!(
            SchnorrAux::from_input(true, ""),
            Err(Error::InvalidLength { actual: 0, .. })
        ));
    }

    #[test]
    fn test_sign_requests() {
        let req = EcdsaSignRequest::parse(&"00".repeat(32), "01,02").unwrap();
        assert_eq!(req.derivation_path.len(), 2);

        assert_eq!(
            EcdsaSignRequest::parse(&"00".repeat(32), "zz").unwrap_err().code(),
            "MalformedHex"
        );

        let req = SchnorrSignRequest::parse(&"00".repeat(32), "", true, &"22".repeat(32)).unwrap();
        assert!(req.derivation_path.is_root());
        assert!(matches!(req.aux, SchnorrAux::Bip341 { .. }));

        let err = SchnorrSignRequest::parse(&"00".repeat(32), "", true, &"22".repeat(31)).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidLength { field: "Merkle root hash", expected: 32, actual: 31 }
        );
    }

    #[test]
    fn test_send_request() {
        let req = SendRequest::parse("tb1qexample", "0.001").unwrap();
        assert_eq!(req.amount.to_sat(), 100_000);

        assert_eq!(SendRequest::parse("", "0.001").unwrap_err().code(), "MissingAddress");
        assert_eq!(SendRequest::parse("tb1q", "0").unwrap_err().code(), "InvalidAmount");
    }

    #[test]
    fn test_send_source() {
        assert_eq!(SendSource::from_str("p2tr_script_path"), Some(SendSource::P2trScriptPath));
        assert_eq!(SendSource::from_str("p2wpkh"), None);
        assert_eq!(SendSource::parse("p2pkh"), Ok(SendSource::P2pkh));
        assert_eq!(SendSource::parse("p2wpkh").unwrap_err().code(), "UnknownSendSource");
        assert_eq!(SendSource::P2trKeyPath.method(), "send_from_p2tr_address_key_path");
    }
}
