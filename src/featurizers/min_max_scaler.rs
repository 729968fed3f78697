// In: src/featurizers/min_max_scaler.rs

//! Min-max scaling: learns the observed range and maps `x` to
//! `(x - min) / (max - min)`. Outputs are not clamped, so values outside the
//! training range land outside `[0, 1]`.

use crate::archive::{read_version, write_version, ArchiveReader, ArchiveWriter};
use crate::error::FeaturizerError;
use crate::featurizer::{Estimator, EstimatorImpl, FitResult, Transformer};
use crate::traits::NumericValue;

const ARCHIVE_VERSION: (u16, u16) = (1, 0);

pub type MinMaxScaler<T> = Estimator<MinMaxScalerEstimator<T>>;

//==================================================================================
// 1. Estimator
//==================================================================================

pub struct MinMaxScalerEstimator<T: NumericValue> {
    range: Option<(T, T)>,
    seen: usize,
    /// Stop training after this many non-null values.
    max_training_items: Option<usize>,
}

impl<T: NumericValue> MinMaxScalerEstimator<T> {
    pub fn new(max_training_items: Option<usize>) -> Result<Self, FeaturizerError> {
        if max_training_items == Some(0) {
            return Err(FeaturizerError::invalid_argument(
                "max_training_items must be greater than zero",
            ));
        }
        Ok(Self {
            range: None,
            seen: 0,
            max_training_items,
        })
    }

    /// The `(min, max)` seen so far, if any value has been fitted.
    pub fn range(&self) -> Option<(T, T)> {
        self.range
    }
}

impl<T: NumericValue> EstimatorImpl for MinMaxScalerEstimator<T> {
    const NAME: &'static str = "MinMaxScalerFeaturizer";
    type Input = T;
    type Transformer = MinMaxScalerTransformer<T>;

    fn fit_impl(&mut self, input: &T) -> Result<FitResult, FeaturizerError> {
        if T::is_native_null(input) {
            return Ok(FitResult::Continue);
        }
        let value = *input;
        self.range = Some(match self.range {
            None => (value, value),
            Some((min, max)) => (
                if value < min { value } else { min },
                if value > max { value } else { max },
            ),
        });
        self.seen += 1;

        match self.max_training_items {
            Some(limit) if self.seen >= limit => Ok(FitResult::Complete),
            _ => Ok(FitResult::Continue),
        }
    }

    fn complete_training_impl(&mut self) -> Result<(), FeaturizerError> {
        if self.range.is_none() {
            return Err(FeaturizerError::Training(
                "No elements were provided during training".to_string(),
            ));
        }
        Ok(())
    }

    fn create_transformer_impl(&mut self) -> Result<Self::Transformer, FeaturizerError> {
        let (min, max) = self.range.ok_or_else(|| {
            FeaturizerError::invalid_state("no range was learned during training")
        })?;
        MinMaxScalerTransformer::new(min, max)
    }
}

//==================================================================================
// 2. Transformer
//==================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScalerTransformer<T: NumericValue> {
    min: T,
    max: T,
}

impl<T: NumericValue> MinMaxScalerTransformer<T> {
    pub fn new(min: T, max: T) -> Result<Self, FeaturizerError> {
        if T::is_native_null(&min) || T::is_native_null(&max) || min > max {
            return Err(FeaturizerError::InvalidArgument(format!(
                "invalid range: min {:?} is not <= max {:?}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> T {
        self.min
    }

    pub fn max(&self) -> T {
        self.max
    }
}

impl<T: NumericValue> Transformer for MinMaxScalerTransformer<T> {
    type Input = T;
    type Output = f64;

    fn execute(&mut self, input: &T, callback: &mut dyn FnMut(f64)) -> Result<(), FeaturizerError> {
        if T::is_native_null(input) {
            callback(f64::NAN);
            return Ok(());
        }
        let min = self.min.to_f64_lossy();
        let span = self.max.to_f64_lossy() - min;
        if span == 0.0 {
            callback(0.0);
        } else {
            callback((input.to_f64_lossy() - min) / span);
        }
        Ok(())
    }

    fn save(&self, writer: &mut ArchiveWriter) -> Result<(), FeaturizerError> {
        write_version(writer, ARCHIVE_VERSION.0, ARCHIVE_VERSION.1)?;
        writer.write(&self.min)?.write(&self.max)?;
        Ok(())
    }

    fn reconstruct(reader: &mut ArchiveReader<'_>) -> Result<Self, FeaturizerError> {
        read_version(reader, ARCHIVE_VERSION.0, ARCHIVE_VERSION.1)?;
        let min: T = reader.read()?;
        let max: T = reader.read()?;
        Self::new(min, max).map_err(|err| FeaturizerError::Decoding(err.to_string()))
    }
}
