//! BTC <-> satoshi conversion.
//!
//! Amounts are parsed as decimal text and never pass through floating point,
//! so `0.1 + 0.2`-style drift cannot produce a fractional satoshi.

use crate::error::{Error, Result};
use crate::network::{DUST_LIMIT, MAX_MONEY, SATOSHIS_PER_BTC};

/// Number of fractional digits a satoshi can represent.
const BTC_DECIMALS: usize = 8;

/// A whole number of satoshis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SatoshiAmount(u64);

impl SatoshiAmount {
    /// Wrap a raw satoshi count.
    pub const fn from_sat(sat: u64) -> Self {
        SatoshiAmount(sat)
    }

    /// Get the raw satoshi count.
    pub const fn to_sat(self) -> u64 {
        self.0
    }

    /// Parse a user-entered BTC amount.
    ///
    /// The amount must be a positive plain decimal (`1`, `0.5`, `.25`, `1.`).
    /// Digits past the eighth decimal are truncated toward zero. Zero,
    /// negative, unparseable, above-supply, and amounts that truncate to zero
    /// satoshis are rejected with [`Error::InvalidAmount`].
    pub fn from_btc_str(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidAmount("Please enter an amount".into()));
        }

        let unsigned = text.strip_prefix('+').unwrap_or(text);
        if unsigned.starts_with('-') {
            return Err(Error::InvalidAmount(format!("{} is not positive", text)));
        }

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
            return Err(Error::InvalidAmount(format!("{:?} is not a decimal number", text)));
        }

        let too_large = || Error::InvalidAmount(format!("{} BTC exceeds the 21,000,000 BTC supply", text));

        let whole_sat = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u64>()
                .ok()
                .and_then(|btc| btc.checked_mul(SATOSHIS_PER_BTC))
                .ok_or_else(too_large)?
        };

        // Left-align the fraction in 8 digits, dropping anything finer.
        let mut fraction_sat = 0u64;
        for i in 0..BTC_DECIMALS {
            let digit = fraction.as_bytes().get(i).map_or(0, |b| u64::from(b - b'0'));
            fraction_sat = fraction_sat * 10 + digit;
        }

        let sat = whole_sat.checked_add(fraction_sat).ok_or_else(too_large)?;
        if sat > MAX_MONEY {
            return Err(too_large());
        }
        if sat == 0 {
            return Err(Error::InvalidAmount(format!("{} BTC is not greater than zero", text)));
        }

        Ok(SatoshiAmount(sat))
    }

    /// Format as BTC with all eight decimals, e.g. `0.00000546`.
    pub fn to_btc_string(self) -> String {
        format!(
            "{}.{:08}",
            self.0 / SATOSHIS_PER_BTC,
            self.0 % SATOSHIS_PER_BTC
        )
    }

    /// Below the standard dust limit. Informational only.
    pub fn is_dust(self) -> bool {
        self.0 < DUST_LIMIT
    }
}

impl core::fmt::Display for SatoshiAmount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} sat", self.0)
    }
}

impl From<SatoshiAmount> for u64 {
    fn from(amount: SatoshiAmount) -> u64 {
        amount.0
    }
}

/// Convert a BTC amount string to satoshis.
pub fn btc_to_satoshi(text: &str) -> Result<u64> {
    SatoshiAmount::from_btc_str(text).map(SatoshiAmount::to_sat)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sat(text: &str) -> u64 {
        btc_to_satoshi(text).unwrap()
    }

    fn rejected(text: &str) -> bool {
        matches!(btc_to_satoshi(text), Err(Error::InvalidAmount(_)))
    }

    #[test]
    fn test_basic_conversion() {
        assert_eq!(sat("0.00000001"), 1);
        assert_eq!(sat("1.0"), 100_000_000);
        assert_eq!(sat("1"), 100_000_000);
        assert_eq!(sat("0.1"), 10_000_000);
        assert_eq!(sat(".5"), 50_000_000);
        assert_eq!(sat("2."), 200_000_000);
        assert_eq!(sat(" +0.00000546 "), 546);
    }

    #[test]
    fn test_float_drift_free() {
        // 0.29 * 1e8 is 28999999.999999996 in binary floating point.
        assert_eq!(sat("0.29"), 29_000_000);
        assert_eq!(sat("1.15"), 115_000_000);
    }

    #[test]
    fn test_truncates_extra_precision() {
        assert_eq!(sat("0.123456789"), 12_345_678);
        assert_eq!(sat("0.000000019"), 1);
        assert!(rejected("0.000000009"));
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(rejected("0"));
        assert!(rejected("0.0"));
        assert!(rejected("-1"));
        assert!(rejected("-0.00000001"));
    }

    #[test]
    fn test_rejects_garbage() {
        for text in ["", "   ", ".", "abc", "1.2.3", "1e-8", "0x10", "1,5", "--1", "+-1"] {
            assert!(rejected(text), "{:?} should be rejected", text);
        }
    }

    #[test]
    fn test_supply_cap() {
        assert_eq!(sat("21000000"), MAX_MONEY);
        assert!(rejected("21000000.00000001"));
        assert!(rejected("184467440737.09551616"));
        assert!(rejected("99999999999999999999999"));
    }

    #[test]
    fn test_formatting() {
        assert_eq!(SatoshiAmount::from_sat(546).to_btc_string(), "0.00000546");
        assert_eq!(SatoshiAmount::from_sat(150_000_000).to_btc_string(), "1.50000000");
        assert_eq!(SatoshiAmount::from_sat(0).to_btc_string(), "0.00000000");
        assert_eq!(SatoshiAmount::from_sat(7).to_string(), "7 sat");
    }

    #[test]
    fn test_dust() {
        assert!(SatoshiAmount::from_sat(545).is_dust());
        assert!(!SatoshiAmount::from_sat(546).is_dust());
    }
}
