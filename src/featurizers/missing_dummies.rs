//! Missing-value dummies: emits `1` for a missing input and `0` otherwise.
//! There is nothing to learn, so training finishes as soon as it begins.

use std::marker::PhantomData;

use crate::archive::{read_version, write_version, ArchiveReader, ArchiveWriter};
use crate::error::FeaturizerError;
use crate::featurizer::{Estimator, EstimatorImpl, FitResult, Transformer};
use crate::traits::FeatureValue;

const ARCHIVE_VERSION: (u16, u16) = (1, 0);

pub type MissingDummies<T> = Estimator<MissingDummiesEstimator<T>>;

pub struct MissingDummiesEstimator<T: FeatureValue> {
    _marker: PhantomData<T>,
}

impl<T: FeatureValue> MissingDummiesEstimator<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T: FeatureValue> Default for MissingDummiesEstimator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FeatureValue> EstimatorImpl for MissingDummiesEstimator<T> {
    const NAME: &'static str = "MissingDummiesFeaturizer";
    type Input = T::Nullable;
    type Transformer = MissingDummiesTransformer<T>;

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
        Ok(MissingDummiesTransformer::new())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissingDummiesTransformer<T: FeatureValue> {
    _marker: PhantomData<T>,
}

impl<T: FeatureValue> MissingDummiesTransformer<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T: FeatureValue> Default for MissingDummiesTransformer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FeatureValue> Transformer for MissingDummiesTransformer<T> {
    type Input = T::Nullable;
    type Output = i8;

    fn execute(
        &mut self,
        input: &T::Nullable,
        callback: &mut dyn FnMut(i8),
    ) -> Result<(), FeaturizerError> {
        callback(if T::is_null(input) { 1 } else { 0 });
        Ok(())
    }

    fn save(&self, writer: &mut ArchiveWriter) -> Result<(), FeaturizerError> {
        write_version(writer, ARCHIVE_VERSION.0, ARCHIVE_VERSION.1)
    }

    fn reconstruct(reader: &mut ArchiveReader<'_>) -> Result<Self, FeaturizerError> {
        read_version(reader, ARCHIVE_VERSION.0, ARCHIVE_VERSION.1)?;
        Ok(Self::new())
    }
}
