//! Backward-fill imputation: a missing value is replaced by the next present
//! value in the stream. Missing values are held back until that value arrives;
//! `flush` resolves whatever is still pending with the configured default.

use crate::archive::{read_version, write_version, ArchiveReader, ArchiveWriter};
use crate::error::FeaturizerError;
use crate::featurizer::{Estimator, EstimatorImpl, FitResult, Transformer};
use crate::traits::FeatureValue;

const ARCHIVE_VERSION: (u16, u16) = (1, 0);

pub type BackwardFillImputer<T> = Estimator<BackwardFillImputerEstimator<T>>;

pub struct BackwardFillImputerEstimator<T: FeatureValue> {
    default_value: Option<T>,
}

impl<T: FeatureValue> BackwardFillImputerEstimator<T> {
    /// `default_value` fills items still pending at `flush`.
    pub fn new(default_value: Option<T>) -> Self {
        Self { default_value }
    }
}

impl<T: FeatureValue> EstimatorImpl for BackwardFillImputerEstimator<T> {
    const NAME: &'static str = "BackwardFillImputerFeaturizer";
    type Input = T::Nullable;
    type Transformer = BackwardFillTransformer<T>;

    fn begin_training_impl(&mut self) -> Result<bool, FeaturizerError> {
        Ok(false)
    }

    fn fit_impl(&mut self, _input: &T::Nullable) -> Result<FitResult, FeaturizerError> {
        Ok(FitResult::Complete)
    }

    fn complete_training_impl(&mut self) -> Result<(), FeaturizerError> {
        Ok(())
    }

    fn create_transformer_impl(&mut self) -> Result<Self::Transformer, FeaturizerError> {
        Ok(BackwardFillTransformer::new(self.default_value.clone()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackwardFillTransformer<T: FeatureValue> {
    default_value: Option<T>,
    pending: usize,
}

impl<T: FeatureValue> BackwardFillTransformer<T> {
    /// A NaN default for a float type counts as no default, here and when
    /// rebuilt from an archive.
    pub fn new(default_value: Option<T>) -> Self {
        Self {
            default_value: default_value.filter(|value| !T::is_native_null(value)),
            pending: 0,
        }
    }

    /// Number of missing inputs waiting for a value.
    pub fn pending(&self) -> usize {
        self.pending
    }
}

impl<T: FeatureValue> Transformer for BackwardFillTransformer<T> {
    type Input = T::Nullable;
    type Output = T;

    fn execute(&mut self, input: &T::Nullable, callback: &mut dyn FnMut(T)) -> Result<(), FeaturizerError> {
        if T::is_null(input) {
            self.pending += 1;
            return Ok(());
        }
        let value = T::get_nullable_value(input)?;
        for _ in 0..=self.pending {
            callback(value.clone());
        }
        self.pending = 0;
        Ok(())
    }

    fn flush(&mut self, callback: &mut dyn FnMut(T)) -> Result<(), FeaturizerError> {
        if self.pending == 0 {
            return Ok(());
        }
        let default_value = self.default_value.as_ref().ok_or_else(|| {
            FeaturizerError::InvalidState(format!(
                "{} pending backward fill item(s) remain and no default value was provided",
                self.pending
            ))
        })?;
        for _ in 0..self.pending {
            callback(default_value.clone());
        }
        self.pending = 0;
        Ok(())
    }

    fn save(&self, writer: &mut ArchiveWriter) -> Result<(), FeaturizerError> {
        write_version(writer, ARCHIVE_VERSION.0, ARCHIVE_VERSION.1)?;
        writer.write(&self.default_value)?;
        Ok(())
    }

    fn reconstruct(reader: &mut ArchiveReader<'_>) -> Result<Self, FeaturizerError> {
        read_version(reader, ARCHIVE_VERSION.0, ARCHIVE_VERSION.1)?;
        Ok(Self::new(reader.read()?))
    }
}
