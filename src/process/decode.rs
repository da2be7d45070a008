use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Text encodings the source extract may arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encoding {
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    /// ISO-8859-1: every byte maps to exactly one code point, so decoding
    /// cannot fail and cannot introduce replacement characters.
    #[serde(rename = "latin-1", alias = "iso-8859-1")]
    Latin1,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Utf8 => f.write_str("utf-8"),
            Encoding::Latin1 => f.write_str("latin-1"),
        }
    }
}

impl Encoding {
    fn decode(self, bytes: &[u8]) -> Result<String, std::str::Utf8Error> {
        match self {
            Encoding::Utf8 => std::str::from_utf8(bytes).map(str::to_owned),
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

/// Decode `bytes` with the first encoding in `order` that accepts them.
///
/// A leading UTF-8 byte-order mark is dropped. On failure the error from the
/// last strict attempt is returned; with `Latin1` anywhere in `order` this
/// never fails.
pub fn decode_bytes(
    bytes: &[u8],
    order: &[Encoding],
) -> Result<(String, Encoding), std::str::Utf8Error> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let mut last_err = None;
    for &enc in order {
        match enc.decode(bytes) {
            Ok(text) => {
                debug!(encoding = %enc, chars = text.len(), "decoded source");
                return Ok((text, enc));
            }
            Err(e) => {
                warn!(encoding = %enc, error = %e, "decoding failed, trying next encoding");
                last_err = Some(e);
            }
        }
    }

    match last_err {
        Some(e) => Err(e),
        // Only reachable with an empty `order`; surface it as a strict UTF-8 attempt.
        None => std::str::from_utf8(bytes).map(|s| (s.to_owned(), Encoding::Utf8)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_utf8_is_kept() {
        let (text, enc) =
            decode_bytes("Bantuan Sosial – Kaltim".as_bytes(), &[Encoding::Utf8, Encoding::Latin1])
                .unwrap();
        assert_eq!(enc, Encoding::Utf8);
        assert_eq!(text, "Bantuan Sosial – Kaltim");
    }

    #[test]
    fn legacy_bytes_fall_back_to_latin1() {
        // "José;Samarinda" with é as a single 0xE9 byte
        let bytes = b"Jos\xE9;Samarinda";
        let (text, enc) = decode_bytes(bytes, &[Encoding::Utf8, Encoding::Latin1]).unwrap();
        assert_eq!(enc, Encoding::Latin1);
        assert_eq!(text, "José;Samarinda");
        assert!(!text.contains('\u{FFFD}'));
        assert_eq!(text.split(';').count(), 2);
    }

    #[test]
    fn strict_only_reports_failure() {
        assert!(decode_bytes(b"\xFF\xFEabc", &[Encoding::Utf8]).is_err());
    }

    #[test]
    fn bom_is_stripped() {
        let (text, _) = decode_bytes(b"\xEF\xBB\xBFUSIA;KSE", &[Encoding::Utf8]).unwrap();
        assert_eq!(text, "USIA;KSE");
    }
}
