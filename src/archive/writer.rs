//! The write half of the archive codec.

use super::value::{encode_str, ArchiveValue};
use crate::error::FeaturizerError;

/// An append-only write cursor. `commit` hands the accumulated bytes to the caller.
#[derive(Debug, Default)]
pub struct ArchiveWriter {
    buffer: Vec<u8>,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Appends the encoding of `value`. Returns `self` so writes can be chained.
    pub fn write<T: ArchiveValue>(
        &mut self,
        value: &T,
    ) -> Result<&mut Self, FeaturizerError> {
        value.encode(self)?;
        Ok(self)
    }

    /// Appends a string with the same encoding as `String`.
    pub fn write_str(&mut self, value: &str) -> Result<&mut Self, FeaturizerError> {
        encode_str(value, self)?;
        Ok(self)
    }

    /// Appends raw bytes with no length prefix.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buffer.extend_from_slice(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Freezes the archive and returns its bytes.
    pub fn commit(self) -> Vec<u8> {
        self.buffer
    }
}
