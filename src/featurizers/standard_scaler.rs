// In: src/featurizers/standard_scaler.rs

//! Standardization: maps `x` to `(x - mean) / std` using population statistics.
//!
//! Training takes two passes over the data. The first computes the mean (and a
//! Welford running variance); the second accumulates squared deviations from
//! that mean. If training is finalized before the second pass completes, the
//! Welford variance from the first pass is used instead.

use std::marker::PhantomData;

use crate::archive::{read_version, write_version, ArchiveReader, ArchiveWriter};
use crate::error::FeaturizerError;
use crate::featurizer::{Estimator, EstimatorImpl, FitResult, Transformer};
use crate::traits::NumericValue;

const ARCHIVE_VERSION: (u16, u16) = (1, 0);

pub type StandardScaler<T> = Estimator<StandardScalerEstimator<T>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Mean,
    Deviation,
}

//==================================================================================
// 1. Estimator
//==================================================================================

pub struct StandardScalerEstimator<T: NumericValue> {
    pass: Pass,
    max_training_items: Option<usize>,
    // Pass one (Welford).
    count: usize,
    mean: f64,
    m2: f64,
    // Pass two.
    deviation_count: usize,
    sum_squared_deviation: f64,
    learned: Option<(f64, f64)>,
    _marker: PhantomData<T>,
}

impl<T: NumericValue> StandardScalerEstimator<T> {
    pub fn new(max_training_items: Option<usize>) -> Result<Self, FeaturizerError> {
        if max_training_items == Some(0) {
            return Err(FeaturizerError::invalid_argument(
                "max_training_items must be greater than zero",
            ));
        }
        Ok(Self {
            pass: Pass::Mean,
            max_training_items,
            count: 0,
            mean: 0.0,
            m2: 0.0,
            deviation_count: 0,
            sum_squared_deviation: 0.0,
            learned: None,
            _marker: PhantomData,
        })
    }

    /// The learned `(mean, std)`, available once training has completed.
    pub fn statistics(&self) -> Option<(f64, f64)> {
        self.learned
    }

    fn limit_reached(&self, seen: usize) -> bool {
        matches!(self.max_training_items, Some(limit) if seen >= limit)
    }
}

impl<T: NumericValue> EstimatorImpl for StandardScalerEstimator<T> {
    const NAME: &'static str = "StandardScalerFeaturizer";
    type Input = T;
    type Transformer = StandardScalerTransformer<T>;

    fn fit_impl(&mut self, input: &T) -> Result<FitResult, FeaturizerError> {
        if T::is_native_null(input) {
            return Ok(FitResult::Continue);
        }
        let x = input.to_f64_lossy();

        match self.pass {
            Pass::Mean => {
                self.count += 1;
                let delta = x - self.mean;
                self.mean += delta / self.count as f64;
                self.m2 += delta * (x - self.mean);

                if self.limit_reached(self.count) {
                    self.pass = Pass::Deviation;
                    return Ok(FitResult::ResetAndContinue);
                }
            }
            Pass::Deviation => {
                self.deviation_count += 1;
                self.sum_squared_deviation += (x - self.mean).powi(2);

                if self.limit_reached(self.deviation_count) {
                    return Ok(FitResult::Complete);
                }
            }
        }
        Ok(FitResult::Continue)
    }

    fn on_data_completed_impl(&mut self) -> Result<bool, FeaturizerError> {
        match self.pass {
            // Nothing was seen: let complete_training report it.
            Pass::Mean if self.count == 0 => Ok(true),
            Pass::Mean => {
                self.pass = Pass::Deviation;
                Ok(false)
            }
            Pass::Deviation => Ok(true),
        }
    }

    fn complete_training_impl(&mut self) -> Result<(), FeaturizerError> {
        if self.count == 0 {
            return Err(FeaturizerError::Training(
                "No elements were provided during training".to_string(),
            ));
        }
        let n = self.count as f64;
        let variance = if self.deviation_count == self.count {
            self.sum_squared_deviation / n
        } else {
            log::debug!(
                "{}: second pass incomplete ({} of {} values), using running variance",
                Self::NAME,
                self.deviation_count,
                self.count
            );
            self.m2 / n
        };
        let std = variance.sqrt();
        self.learned = Some((self.mean, if std == 0.0 { 1.0 } else { std }));
        Ok(())
    }

    fn create_transformer_impl(&mut self) -> Result<Self::Transformer, FeaturizerError> {
        let (mean, std) = self
            .learned
            .ok_or_else(|| FeaturizerError::invalid_state("statistics have not been computed"))?;
        StandardScalerTransformer::new(mean, std)
    }
}

//==================================================================================
// 2. Transformer
//==================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct StandardScalerTransformer<T: NumericValue> {
    mean: f64,
    std: f64,
    _marker: PhantomData<T>,
}

impl<T: NumericValue> StandardScalerTransformer<T> {
    pub fn new(mean: f64, std: f64) -> Result<Self, FeaturizerError> {
        if !mean.is_finite() || !std.is_finite() || std <= 0.0 {
            return Err(FeaturizerError::InvalidArgument(format!(
                "invalid statistics: mean {}, std {}",
                mean, std
            )));
        }
        Ok(Self {
            mean,
            std,
            _marker: PhantomData,
        })
    }
}

impl<T: NumericValue> Transformer for StandardScalerTransformer<T> {
    type Input = T;
    type Output = f64;

    fn execute(&mut self, input: &T, callback: &mut dyn FnMut(f64)) -> Result<(), FeaturizerError> {
        callback((input.to_f64_lossy() - self.mean) / self.std);
        Ok(())
    }

    fn save(&self, writer: &mut ArchiveWriter) -> Result<(), FeaturizerError> {
        write_version(writer, ARCHIVE_VERSION.0, ARCHIVE_VERSION.1)?;
        writer.write(&self.mean)?.write(&self.std)?;
        Ok(())
    }

    fn reconstruct(reader: &mut ArchiveReader<'_>) -> Result<Self, FeaturizerError> {
        read_version(reader, ARCHIVE_VERSION.0, ARCHIVE_VERSION.1)?;
        let mean: f64 = reader.read()?;
        let std: f64 = reader.read()?;
        Self::new(mean, std).map_err(|err| FeaturizerError::Decoding(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::featurizer::{train, AnnotationMaps, TrainingState};

    fn scaler<T: NumericValue>(limit: Option<usize>) -> StandardScaler<T> {
        let inner = StandardScalerEstimator::new(limit).unwrap();
        Estimator::new(inner, AnnotationMaps::new(1).unwrap(), 0).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_two_passes_over_full_data() {
        let mut estimator = scaler::<i32>(None);
        estimator.begin_training().unwrap();
        estimator.fit_buffer(&[1, 2, 3, 4]).unwrap();
        estimator.on_data_completed().unwrap();
        // First pass done; the estimator wants the data again.
        assert_eq!(estimator.state(), TrainingState::Training);
        estimator.fit_buffer(&[1, 2, 3, 4]).unwrap();
        estimator.on_data_completed().unwrap();
        assert_eq!(estimator.state(), TrainingState::Finished);
        estimator.complete_training().unwrap();

        let (mean, std) = estimator.inner().statistics().unwrap();
        assert!(approx(mean, 2.5));
        assert!(approx(std, 1.25f64.sqrt()));

        let mut transformer = estimator.create_transformer().unwrap();
        assert!(approx(transformer.transform(&2).unwrap(), -0.5 / 1.25f64.sqrt()));
    }

    #[test]
    fn test_item_limit_resets_then_completes() {
        let mut estimator = scaler::<f64>(Some(2));
        estimator.begin_training().unwrap();
        assert_eq!(estimator.fit(&2.0).unwrap(), FitResult::Continue);
        assert_eq!(estimator.fit(&4.0).unwrap(), FitResult::ResetAndContinue);
        assert_eq!(estimator.fit(&2.0).unwrap(), FitResult::Continue);
        assert_eq!(estimator.fit(&4.0).unwrap(), FitResult::Complete);
        estimator.complete_training().unwrap();
        assert_eq!(estimator.inner().statistics(), Some((3.0, 1.0)));
    }

    #[test]
    fn test_driver_handles_both_passes() {
        let mut estimator = scaler::<u8>(Some(3));
        train(&mut estimator, &[vec![1, 2], vec![3, 100]], 4).unwrap();
        let (mean, _) = estimator.inner().statistics().unwrap();
        assert!(approx(mean, 2.0));
    }

    #[test]
    fn test_constant_data_uses_unit_std() {
        let mut estimator = scaler::<i64>(None);
        train(&mut estimator, &[vec![7, 7, 7]], 2).unwrap();
        assert_eq!(estimator.inner().statistics(), Some((7.0, 1.0)));
        let mut transformer = estimator.create_transformer().unwrap();
        assert_eq!(transformer.transform(&8).unwrap(), 1.0);
    }

    #[test]
    fn test_early_completion_falls_back_to_running_variance() {
        let mut estimator = scaler::<f32>(None);
        estimator.begin_training().unwrap();
        estimator.fit_buffer(&[1.0, 3.0]).unwrap();
        estimator.complete_training().unwrap();
        assert_eq!(estimator.inner().statistics(), Some((2.0, 1.0)));
    }

    #[test]
    fn test_no_values_fails() {
        let mut estimator = scaler::<f64>(None);
        assert!(matches!(
            train(&mut estimator, &[vec![f64::NAN]], 2),
            Err(FeaturizerError::Training(_))
        ));
    }
}
