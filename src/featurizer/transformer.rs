//! The inference-side contract.

use crate::archive::{ArchiveReader, ArchiveWriter};
use crate::error::FeaturizerError;

/// A trained, serializable mapping from inputs to outputs.
///
/// Outputs are delivered through a callback so a transformer may emit zero,
/// one or several values per input; whatever it holds back is emitted by `flush`.
pub trait Transformer: Send + Sized + 'static {
    type Input;
    type Output;

    fn execute(
        &mut self,
        input: &Self::Input,
        callback: &mut dyn FnMut(Self::Output),
    ) -> Result<(), FeaturizerError>;

    /// Emits buffered outputs in order and empties the buffer.
    fn flush(&mut self, _callback: &mut dyn FnMut(Self::Output)) -> Result<(), FeaturizerError> {
        Ok(())
    }

    /// Appends the learned state to `writer`.
    fn save(&self, writer: &mut ArchiveWriter) -> Result<(), FeaturizerError>;

    /// Reads back exactly the fields `save` wrote.
    fn reconstruct(reader: &mut ArchiveReader<'_>) -> Result<Self, FeaturizerError>;

    /// One-in, one-out form of `execute`. Fails unless exactly one output is produced.
    fn transform(&mut self, input: &Self::Input) -> Result<Self::Output, FeaturizerError> {
        let mut output = None;
        let mut count = 0usize;
        self.execute(input, &mut |value| {
            count += 1;
            output = Some(value);
        })?;
        match output {
            Some(value) if count == 1 => Ok(value),
            _ => Err(FeaturizerError::InvalidState(format!(
                "expected exactly one output from execute, got {}",
                count
            ))),
        }
    }
}
