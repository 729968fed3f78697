//! The read half of the archive codec.

use super::value::ArchiveValue;
use crate::error::FeaturizerError;

/// A read cursor over a borrowed byte buffer.
///
/// Every read either consumes exactly the bytes the matching write produced or
/// fails with `FeaturizerError::Decoding`; a failed read leaves the cursor where it was.
#[derive(Debug, Clone)]
pub struct ArchiveReader<'a> {
    buffer: &'a [u8],
    pos: usize,
}

impl<'a> ArchiveReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, pos: 0 }
    }

    /// Builds a reader over a caller-supplied `(pointer, length)` pair.
    ///
    /// `(null, 0)` is an empty archive. A null pointer with a non-zero length, or
    /// a non-null pointer with a zero length, is rejected as an invalid argument.
    ///
    /// # Safety
    /// When `ptr` is non-null it must point to `len` readable bytes that stay
    /// valid and unmodified for `'a`.
    pub unsafe fn from_raw_parts(ptr: *const u8, len: usize) -> Result<Self, FeaturizerError> {
        if ptr.is_null() {
            if len != 0 {
                return Err(FeaturizerError::invalid_argument(
                    "Invalid buffer: null pointer with a non-zero size",
                ));
            }
            return Ok(Self::new(&[]));
        }
        if len == 0 {
            return Err(FeaturizerError::invalid_argument(
                "Invalid buffer: non-null pointer with a zero size",
            ));
        }
        Ok(Self::new(std::slice::from_raw_parts(ptr, len)))
    }

    /// Decodes the next value.
    pub fn read<T: ArchiveValue>(&mut self) -> Result<T, FeaturizerError> {
        let start = self.pos;
        T::decode(self).map_err(|err| {
            self.pos = start;
            err
        })
    }

    /// Consumes `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], FeaturizerError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.buffer.len())
            .ok_or_else(|| {
                FeaturizerError::Decoding(format!(
                    "Unexpected end of buffer: needed {} bytes at offset {}, {} remain",
                    len,
                    self.pos,
                    self.remaining()
                ))
            })?;
        let bytes = &self.buffer[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], FeaturizerError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.pos
    }

    pub fn at_end(&self) -> bool {
        self.pos == self.buffer.len()
    }

    /// Copies the unread bytes into an owned buffer without advancing the cursor.
    pub fn clone_remaining(&self) -> Result<Vec<u8>, FeaturizerError> {
        if self.at_end() {
            return Err(FeaturizerError::decoding("no bytes remain to clone"));
        }
        Ok(self.buffer[self.pos..].to_vec())
    }

    /// Fails if any bytes are left unread.
    pub fn finish(self) -> Result<(), FeaturizerError> {
        if !self.at_end() {
            return Err(FeaturizerError::Decoding(format!(
                "Trailing bytes detected: {} unread",
                self.remaining()
            )));
        }
        Ok(())
    }
}
