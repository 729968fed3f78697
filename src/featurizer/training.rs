// In: src/featurizer/training.rs

//! Caller-side drivers for the training and inference protocols.

use super::estimator::{Estimator, EstimatorImpl, FitResult, TrainingState};
use super::transformer::Transformer;
use crate::error::FeaturizerError;

/// Trains `estimator` over `batches` until it leaves the `Training` state,
/// then finalizes it.
///
/// The batches are one logical data source. `ResetAndContinue` rewinds to the
/// first batch; reaching the end of the last batch calls `on_data_completed`
/// and rewinds again if the estimator is still training. Each rewind starts a
/// new pass; more than `max_passes` passes is reported as a training error.
pub fn train<E: EstimatorImpl>(
    estimator: &mut Estimator<E>,
    batches: &[Vec<E::Input>],
    max_passes: usize,
) -> Result<(), FeaturizerError> {
    if estimator.state() == TrainingState::Pending {
        estimator.begin_training()?;
    }

    let mut passes = 0usize;
    'pass: while estimator.state() == TrainingState::Training {
        passes += 1;
        if passes > max_passes {
            return Err(FeaturizerError::Training(format!(
                "{} did not finish training within {} passes",
                E::NAME,
                max_passes
            )));
        }
        log::debug!("{}: starting training pass {}", E::NAME, passes);

        for batch in batches.iter().filter(|batch| !batch.is_empty()) {
            match estimator.fit_buffer(batch)? {
                FitResult::Continue => {}
                FitResult::Complete => break 'pass,
                FitResult::ResetAndContinue => continue 'pass,
            }
        }
        estimator.on_data_completed()?;
    }

    estimator.complete_training()
}

/// Executes every input in order, then flushes, collecting all outputs.
pub fn predict<T: Transformer>(
    transformer: &mut T,
    inputs: &[T::Input],
) -> Result<Vec<T::Output>, FeaturizerError> {
    let mut outputs = Vec::with_capacity(inputs.len());
    for input in inputs {
        transformer.execute(input, &mut |value| outputs.push(value))?;
    }
    transformer.flush(&mut |value| outputs.push(value))?;
    Ok(outputs)
}
