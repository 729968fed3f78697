//! The binary codec used to persist trained transformer state.
//!
//! An `ArchiveWriter` appends values to a growable byte buffer and `commit`s it;
//! an `ArchiveReader` borrows a byte slice and decodes the same values back in
//! the same order. The format is flat and schema-less: nothing in the stream
//! names a field or a type, so every `save` must be mirrored exactly by its
//! `reconstruct`. Transformers prefix their state with a format version of
//! their own (see `write_version`/`read_version`).

pub mod reader;
pub mod value;
pub mod writer;

pub use reader::ArchiveReader;
pub use value::ArchiveValue;
pub use writer::ArchiveWriter;

use crate::error::FeaturizerError;

/// Writes a `(major, minor)` format version as two little-endian `u16`s.
pub fn write_version(
    writer: &mut ArchiveWriter,
    major: u16,
    minor: u16,
) -> Result<(), FeaturizerError> {
    writer.write(&major)?.write(&minor)?;
    Ok(())
}

/// Reads a format version and fails unless it equals `(major, minor)`.
pub fn read_version(
    reader: &mut ArchiveReader<'_>,
    major: u16,
    minor: u16,
) -> Result<(), FeaturizerError> {
    let found_major: u16 = reader.read()?;
    let found_minor: u16 = reader.read()?;
    if found_major != major || found_minor != minor {
        return Err(FeaturizerError::Decoding(format!(
            "Unsupported archive version {}.{} (expected {}.{})",
            found_major, found_minor, major, minor
        )));
    }
    Ok(())
}
