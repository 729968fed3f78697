//! `ArchiveValue` implementations for the primitive and composite field types.
//!
//! Encodings (all little-endian):
//! - integers and floats: their fixed-width byte representation
//! - `bool`: one byte, `0` or `1`
//! - `String`: `u32` byte length followed by the UTF-8 bytes
//! - `Option<T>`: a `bool` presence flag, then the value when present
//! - `Vec<T>`: `u32` element count followed by each element

use super::reader::ArchiveReader;
use super::writer::ArchiveWriter;
use crate::error::FeaturizerError;

pub trait ArchiveValue: Sized {
    fn encode(&self, writer: &mut ArchiveWriter) -> Result<(), FeaturizerError>;

    fn decode(reader: &mut ArchiveReader<'_>) -> Result<Self, FeaturizerError>;
}

//==================================================================================
// 1. Fixed-width Primitives
//==================================================================================

macro_rules! impl_archive_value_for_primitive {
    ($($t:ty),+ $(,)?) => {
        $(
            impl ArchiveValue for $t {
                fn encode(&self, writer: &mut ArchiveWriter) -> Result<(), FeaturizerError> {
                    writer.write_bytes(&self.to_le_bytes());
                    Ok(())
                }

                fn decode(reader: &mut ArchiveReader<'_>) -> Result<Self, FeaturizerError> {
                    let bytes = reader.read_array::<{ std::mem::size_of::<$t>() }>()?;
                    Ok(<$t>::from_le_bytes(bytes))
                }
            }
        )+
    };
}

impl_archive_value_for_primitive!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl ArchiveValue for bool {
    fn encode(&self, writer: &mut ArchiveWriter) -> Result<(), FeaturizerError> {
        writer.write_bytes(&[u8::from(*self)]);
        Ok(())
    }

    fn decode(reader: &mut ArchiveReader<'_>) -> Result<Self, FeaturizerError> {
        match reader.read_array::<1>()?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(FeaturizerError::Decoding(format!(
                "invalid bool byte {:#04x}",
                other
            ))),
        }
    }
}

//==================================================================================
// 2. Length-prefixed Composites
//==================================================================================

fn encode_len(len: usize, writer: &mut ArchiveWriter) -> Result<(), FeaturizerError> {
    let len = u32::try_from(len).map_err(|_| {
        FeaturizerError::invalid_argument(format!("length {} does not fit in a u32 prefix", len))
    })?;
    len.encode(writer)
}

pub(super) fn encode_str(value: &str, writer: &mut ArchiveWriter) -> Result<(), FeaturizerError> {
    encode_len(value.len(), writer)?;
    writer.write_bytes(value.as_bytes());
    Ok(())
}

impl ArchiveValue for String {
    fn encode(&self, writer: &mut ArchiveWriter) -> Result<(), FeaturizerError> {
        encode_str(self, writer)
    }

    fn decode(reader: &mut ArchiveReader<'_>) -> Result<Self, FeaturizerError> {
        let len = u32::decode(reader)? as usize;
        let bytes = reader.read_bytes(len)?;
        Ok(std::str::from_utf8(bytes)?.to_owned())
    }
}

impl<T: ArchiveValue> ArchiveValue for Option<T> {
    fn encode(&self, writer: &mut ArchiveWriter) -> Result<(), FeaturizerError> {
        match self {
            Some(value) => {
                true.encode(writer)?;
                value.encode(writer)
            }
            None => false.encode(writer),
        }
    }

    fn decode(reader: &mut ArchiveReader<'_>) -> Result<Self, FeaturizerError> {
        if bool::decode(reader)? {
            Ok(Some(T::decode(reader)?))
        } else {
            Ok(None)
        }
    }
}

impl<T: ArchiveValue> ArchiveValue for Vec<T> {
    fn encode(&self, writer: &mut ArchiveWriter) -> Result<(), FeaturizerError> {
        encode_len(self.len(), writer)?;
        for item in self {
            item.encode(writer)?;
        }
        Ok(())
    }

    fn decode(reader: &mut ArchiveReader<'_>) -> Result<Self, FeaturizerError> {
        let count = u32::decode(reader)? as usize;
        // Cap the pre-allocation by what the buffer could possibly hold.
        let mut items = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            items.push(T::decode(reader)?);
        }
        Ok(items)
    }
}
