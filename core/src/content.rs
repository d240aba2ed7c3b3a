//! Raw response bytes with a decode-once text view.

use std::cell::OnceCell;
#[cfg(test)]
use std::cell::Cell;

use crate::encoding::{DecodeError, EncodingType};

/// Body of one response: the bytes as received plus their declared encoding.
///
/// `text()` decodes on first success and caches the result, so every later
/// call returns the same `&str`. A failed decode is not cached. The cache is
/// a `OnceCell`, so a `ContentData` is not `Sync` and must not be read from
/// several threads before the first decode.
#[derive(Debug)]
pub struct ContentData {
    bytes: Vec<u8>,
    encoding: EncodingType,
    text: OnceCell<String>,
    #[cfg(test)]
    decodes: Cell<usize>,
}

impl ContentData {
    pub fn new(bytes: Vec<u8>, encoding: EncodingType) -> Self {
        Self {
            bytes,
            encoding,
            text: OnceCell::new(),
            #[cfg(test)]
            decodes: Cell::new(0),
        }
    }

    pub fn content_length(&self) -> usize {
        self.bytes.len()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn encoding(&self) -> &EncodingType {
        &self.encoding
    }

    pub fn text(&self) -> Result<&str, DecodeError> {
        if let Some(text) = self.text.get() {
            return Ok(text);
        }
        let decoded = self.encoding.decode(&self.bytes)?;
        #[cfg(test)]
        self.decodes.set(self.decodes.get() + 1);
        Ok(self.text.get_or_init(|| decoded))
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
