//! Key derivation paths as sent to the threshold signing backend.

use crate::codec;
use crate::error::{Error, Result};

/// An ordered list of opaque derivation segments.
///
/// An empty path means the backend's root key is used unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DerivationPath(Vec<Vec<u8>>);

impl DerivationPath {
    /// The empty path.
    pub fn root() -> Self {
        DerivationPath(Vec::new())
    }

    /// Build a path from raw segments.
    pub fn from_segments(segments: Vec<Vec<u8>>) -> Self {
        DerivationPath(segments)
    }

    /// Parse a comma-separated list of hex segments, e.g. `01,02`.
    ///
    /// Blank input yields the empty path. Each segment is trimmed and decoded
    /// on its own; a blank segment between commas becomes an empty byte
    /// segment. One malformed segment fails the whole path.
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::root());
        }

        let segments = text
            .split(',')
            .enumerate()
            .map(|(i, segment)| {
                codec::decode(segment.trim()).map_err(|e| match e {
                    Error::MalformedHex(reason) => {
                        Error::MalformedHex(format!("derivation path segment {}: {}", i + 1, reason))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DerivationPath(segments))
    }

    pub fn segments(&self) -> &[Vec<u8>] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_segments(self) -> Vec<Vec<u8>> {
        self.0
    }
}

impl core::fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", codec::encode(segment))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_root() {
        assert!(DerivationPath::parse("").unwrap().is_root());
        assert!(DerivationPath::parse("  \t ").unwrap().is_root());
    }

    #[test]
    fn test_two_segments() {
        let path = DerivationPath::parse("01,02").unwrap();
        assert_eq!(path.segments(), &[vec![0x01], vec![0x02]]);
    }

    #[test]
    fn test_segments_are_trimmed_and_prefixed() {
        let path = DerivationPath::parse(" 0xdead , BEEF00 ").unwrap();
        assert_eq!(path.segments(), &[vec![0xde, 0xad], vec![0xbe, 0xef, 0x00]]);
        assert_eq!(path.to_string(), "dead,beef00");
    }

    #[test]
    fn test_blank_segment_is_empty_bytes() {
        let path = DerivationPath::parse("01,,02").unwrap();
        assert_eq!(path.len(), 3);
        assert!(path.segments()[1].is_empty());
    }

    #[test]
    fn test_malformed_segment_fails_whole_path() {
        assert!(matches!(DerivationPath::parse("zz"), Err(Error::MalformedHex(_))));

        let err = DerivationPath::parse("01,abc,02").unwrap_err();
        assert_eq!(err.code(), "MalformedHex");
        assert!(err.to_string().contains("segment 2"));
    }

    #[test]
    fn test_root_display() {
        assert_eq!(DerivationPath::root().to_string(), "(root)");
    }
}
