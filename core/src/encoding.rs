//! Character encodings for request and response bodies.
//!
//! # Design
//! Decoding never falls back to lossy replacement. A body that is not valid
//! under its declared encoding is a `DecodeError`, and an encoding label the
//! registry does not know is a `DecodeError` too. UTF-16, US-ASCII and
//! ISO-8859-1 are handled directly; everything else goes through
//! `encoding_rs`.
//!
//! Labels resolve through the WHATWG registry first. The registry folds
//! US-ASCII and ISO-8859-1 into windows-1252, which would accept bytes
//! those charsets forbid or map them to different characters, so their
//! aliases are pulled back out to the strict variants.

use std::fmt;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};

const ASCII_LABELS: &[&str] = &[
    "us-ascii",
    "ascii",
    "ansi_x3.4-1968",
    "ansi_x3.4-1986",
    "iso-ir-6",
    "iso_646.irv:1991",
    "iso646-us",
    "us",
    "ibm367",
    "cp367",
    "csascii",
];

/// Registry labels that really mean windows-1252.
const WINDOWS_1252_LABELS: &[&str] = &["windows-1252", "cp1252", "x-cp1252"];

/// Failure to turn body bytes into text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("encoding `{0}` is not registered")]
    UnknownEncoding(String),

    #[error("binary content cannot be decoded as text")]
    Binary,

    #[error("content is not valid {encoding}")]
    Malformed { encoding: String },
}

/// Failure to turn request text into bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("encoding `{0}` is not registered")]
    UnknownEncoding(String),

    #[error("text cannot be represented in {encoding}")]
    Unrepresentable { encoding: String },
}

/// Declared character encoding of a body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum EncodingType {
    #[default]
    Utf8,
    /// Byte order taken from a leading BOM, big-endian without one.
    Utf16,
    Utf16Be,
    Utf16Le,
    Ascii,
    Iso8859_1,
    /// Raw bytes with no text form.
    Binary,
    /// Any other label, resolved through the WHATWG registry.
    Named(String),
}

impl EncodingType {
    /// Map a charset label to an encoding. Unknown labels become `Named`
    /// and are only rejected when text is actually decoded or encoded.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        let lower = label.to_ascii_lowercase();
        match lower.as_str() {
            "utf-16" | "utf16" => return EncodingType::Utf16,
            "binary" => return EncodingType::Binary,
            l if ASCII_LABELS.contains(&l) => return EncodingType::Ascii,
            _ => {}
        }
        match Encoding::for_label(lower.as_bytes()) {
            Some(encoding) if encoding == UTF_8 => EncodingType::Utf8,
            Some(encoding) if encoding == UTF_16BE => EncodingType::Utf16Be,
            Some(encoding) if encoding == UTF_16LE => EncodingType::Utf16Le,
            Some(encoding) if encoding == WINDOWS_1252 && !WINDOWS_1252_LABELS.contains(&lower.as_str()) => {
                EncodingType::Iso8859_1
            }
            _ => EncodingType::Named(label.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            EncodingType::Utf8 => "UTF-8",
            EncodingType::Utf16 => "UTF-16",
            EncodingType::Utf16Be => "UTF-16BE",
            EncodingType::Utf16Le => "UTF-16LE",
            EncodingType::Ascii => "US-ASCII",
            EncodingType::Iso8859_1 => "ISO-8859-1",
            EncodingType::Binary => "binary",
            EncodingType::Named(label) => label,
        }
    }

    /// Decode `bytes` completely. A byte-order mark matching this encoding
    /// is skipped.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        if let Some(canonical) = self.canonical() {
            return canonical.decode(bytes);
        }
        match self {
            EncodingType::Binary => Err(DecodeError::Binary),
            EncodingType::Utf16 => {
                let (encoding, body) = match Encoding::for_bom(bytes) {
                    Some((bom, len)) if bom == UTF_16BE || bom == UTF_16LE => (bom, &bytes[len..]),
                    _ => (UTF_16BE, bytes),
                };
                self.strict(encoding, body)
            }
            EncodingType::Ascii => {
                if bytes.is_ascii() {
                    Ok(bytes.iter().map(|&b| char::from(b)).collect())
                } else {
                    Err(self.malformed())
                }
            }
            EncodingType::Iso8859_1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            _ => {
                let encoding = self.resolve().ok_or_else(|| DecodeError::UnknownEncoding(self.label().to_string()))?;
                let body = match Encoding::for_bom(bytes) {
                    Some((bom, len)) if bom == encoding => &bytes[len..],
                    _ => bytes,
                };
                self.strict(encoding, body)
            }
        }
    }

    /// Encode `text` for a request body. `Binary` passes the UTF-8 bytes
    /// through untouched. `Utf16` writes a big-endian BOM and big-endian
    /// code units.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, EncodeError> {
        if let Some(canonical) = self.canonical() {
            return canonical.encode(text);
        }
        match self {
            EncodingType::Utf8 | EncodingType::Binary => Ok(text.as_bytes().to_vec()),
            EncodingType::Utf16 => Ok([0xFE, 0xFF]
                .into_iter()
                .chain(text.encode_utf16().flat_map(u16::to_be_bytes))
                .collect()),
            EncodingType::Utf16Be => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            EncodingType::Utf16Le => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            EncodingType::Ascii => {
                if text.is_ascii() {
                    Ok(text.as_bytes().to_vec())
                } else {
                    Err(self.unrepresentable())
                }
            }
            EncodingType::Iso8859_1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).map_err(|_| self.unrepresentable()))
                .collect(),
            EncodingType::Named(label) => {
                let encoding = self.resolve().ok_or_else(|| EncodeError::UnknownEncoding(label.clone()))?;
                let (bytes, used, unmappable) = encoding.encode(text);
                if unmappable || used != encoding {
                    return Err(self.unrepresentable());
                }
                Ok(bytes.into_owned())
            }
        }
    }

    /// A `Named` label that one of the dedicated variants covers.
    fn canonical(&self) -> Option<EncodingType> {
        match self {
            EncodingType::Named(label) => match EncodingType::from_label(label) {
                EncodingType::Named(_) => None,
                canonical => Some(canonical),
            },
            _ => None,
        }
    }

    fn strict(&self, encoding: &'static Encoding, body: &[u8]) -> Result<String, DecodeError> {
        encoding
            .decode_without_bom_handling_and_without_replacement(body)
            .map(|text| text.into_owned())
            .ok_or_else(|| self.malformed())
    }

    fn resolve(&self) -> Option<&'static Encoding> {
        match self {
            EncodingType::Utf8 => Some(UTF_8),
            EncodingType::Utf16Be => Some(UTF_16BE),
            EncodingType::Utf16Le => Some(UTF_16LE),
            EncodingType::Named(label) => Encoding::for_label(label.as_bytes()),
            _ => None,
        }
    }

    fn malformed(&self) -> DecodeError {
        DecodeError::Malformed {
            encoding: self.label().to_string(),
        }
    }

    fn unrepresentable(&self) -> EncodeError {
        EncodeError::Unrepresentable {
            encoding: self.label().to_string(),
        }
    }
}

impl fmt::Display for EncodingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&str> for EncodingType {
    fn from(label: &str) -> Self {
        EncodingType::from_label(label)
    }
}
