//! Charset and byte-order-mark normalization
//!
//! JSON documents may arrive as UTF-8, UTF-8 with a BOM, or UTF-16 in either
//! byte order with or without a BOM. [`normalize`] sniffs the leading bytes and
//! hands back UTF-8 ready for the JSON parser.
//!
//! Detection order:
//! 1. Literal BOM prefixes: UTF-8 (`EF BB BF`), UTF-16BE (`FE FF`), UTF-16LE (`FF FE`).
//! 2. Without a BOM, a zero byte at offset 0 means UTF-16BE and a zero byte at
//!    offset 1 means UTF-16LE. ASCII text encoded as UTF-16 always looks like
//!    this, but binary garbage can too; that ambiguity is accepted.
//!
//! Any BOM, UTF-8 or UTF-16, is only tolerated when the caller allows it. The
//! heuristic path is unaffected by that setting.
//!
//! This module is only used for JSON-family documents. YAML input is handed to
//! the YAML parser untouched, so BOM-less UTF-16 YAML is not detected.

use std::fmt;

use crate::error::CharsetError;

pub const BOM_UTF8: &[u8] = b"\xEF\xBB\xBF";
pub const BOM_UTF16BE: &[u8] = b"\xFE\xFF";
pub const BOM_UTF16LE: &[u8] = b"\xFF\xFE";

/// Text encodings the normalizer can recognise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Utf8,
    Utf16Be,
    Utf16Le,
}

impl Encoding {
    pub fn label(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Utf16Be => "utf-16be",
            Encoding::Utf16Le => "utf-16le",
        }
    }

    fn bom(self) -> &'static [u8] {
        match self {
            Encoding::Utf8 => BOM_UTF8,
            Encoding::Utf16Be => BOM_UTF16BE,
            Encoding::Utf16Le => BOM_UTF16LE,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What [`detect`] found at the start of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub encoding: Encoding,
    /// Length of the BOM prefix, 0 when the encoding was guessed
    pub bom_len: usize,
}

impl Detection {
    fn with_bom(encoding: Encoding) -> Self {
        Self {
            encoding,
            bom_len: encoding.bom().len(),
        }
    }

    fn guessed(encoding: Encoding) -> Self {
        Self {
            encoding,
            bom_len: 0,
        }
    }

    pub fn has_bom(&self) -> bool {
        self.bom_len > 0
    }
}

/// Sniff the encoding of `buf`.
///
/// Returns `None` when nothing points away from plain UTF-8, including every
/// buffer shorter than two bytes.
pub fn detect(buf: &[u8]) -> Option<Detection> {
    if buf.len() < 2 {
        return None;
    }

    if buf.starts_with(BOM_UTF8) {
        Some(Detection::with_bom(Encoding::Utf8))
    } else if buf.starts_with(BOM_UTF16BE) {
        Some(Detection::with_bom(Encoding::Utf16Be))
    } else if buf.starts_with(BOM_UTF16LE) {
        Some(Detection::with_bom(Encoding::Utf16Le))
    } else if buf[0] == 0 {
        Some(Detection::guessed(Encoding::Utf16Be))
    } else if buf[1] == 0 {
        Some(Detection::guessed(Encoding::Utf16Le))
    } else {
        None
    }
}

/// Normalize a raw JSON document to UTF-8.
///
/// Any BOM is an error unless `allow_bom` is set, in which case it is
/// stripped. UTF-16 input is decoded, whether it was recognised by its BOM or
/// by the zero-byte heuristic. Anything else is returned unchanged.
pub fn normalize(mut buf: Vec<u8>, allow_bom: bool) -> Result<Vec<u8>, CharsetError> {
    let Some(detection) = detect(&buf) else {
        return Ok(buf);
    };

    if detection.has_bom() && !allow_bom {
        return Err(CharsetError::UnexpectedBom);
    }

    if detection.encoding == Encoding::Utf8 {
        buf.drain(..detection.bom_len);
        return Ok(buf);
    }

    decode_utf16(&buf[detection.bom_len..], detection.encoding)
}

/// Decode UTF-16 code units to UTF-8 bytes. Strict: a dangling byte or an
/// unpaired surrogate fails instead of being replaced.
pub fn decode_utf16(bytes: &[u8], encoding: Encoding) -> Result<Vec<u8>, CharsetError> {
    let from_bytes: fn([u8; 2]) -> u16 = match encoding {
        Encoding::Utf16Be => u16::from_be_bytes,
        Encoding::Utf16Le => u16::from_le_bytes,
        Encoding::Utf8 => return Ok(bytes.to_vec()),
    };

    let chunks = bytes.chunks_exact(2);
    if !chunks.remainder().is_empty() {
        return Err(CharsetError::TruncatedCodeUnit {
            encoding: encoding.label(),
            len: bytes.len(),
        });
    }

    let units = chunks.map(|pair| from_bytes([pair[0], pair[1]]));
    let mut decoded = String::with_capacity(bytes.len() / 2);
    for ch in char::decode_utf16(units) {
        let ch = ch.map_err(|e| CharsetError::UnpairedSurrogate {
            encoding: encoding.label(),
            unit: e.unpaired_surrogate(),
        })?;
        decoded.push(ch);
    }

    Ok(decoded.into_bytes())
}
