// In: src/featurizer/estimator.rs

//! The estimator training-state machine.
//!
//! An algorithm implements `EstimatorImpl` (its accumulators and the hooks
//! below); `Estimator<E>` wraps it and owns the lifecycle:
//!
//! ```text
//! Pending --begin_training--> Training --fit: Complete / on_data_completed--> Finished
//!    |                           |                                               |
//!    |                           +------------- complete_training ---------------+--> Completed
//!    +-- begin_training returns false (nothing to learn) --> Finished
//! ```
//!
//! Every transition is checked here, so algorithms never see a call in the
//! wrong state. Callers only need to distinguish `Training` from "anything
//! else"; `Finished` and `Completed` exist so that `complete_training` and
//! `create_transformer` can be validated.

use std::fmt;

use super::annotations::AnnotationMaps;
use super::transformer::Transformer;
use crate::error::FeaturizerError;

//==================================================================================
// 1. Lifecycle Enums
//==================================================================================

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    /// Constructed, `begin_training` not yet called.
    Pending = 1,
    /// Accepting `fit` calls.
    Training = 2,
    /// The algorithm has all it needs; waiting for `complete_training`.
    Finished = 3,
    /// Finalized; a transformer can be created.
    Completed = 4,
}

impl fmt::Display for TrainingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The outcome of feeding one value (or one buffer) to an estimator.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitResult {
    /// Enough information has been seen; stop feeding data.
    Complete = 1,
    /// Feed the next value.
    Continue = 2,
    /// Rewind to the start of the data and feed it again.
    ResetAndContinue = 3,
}

//==================================================================================
// 2. Algorithm Hooks
//==================================================================================

/// The algorithm-specific half of an estimator.
pub trait EstimatorImpl: Send + 'static {
    /// Human-readable featurizer name, used in logs and error messages.
    const NAME: &'static str;

    type Input: Clone + fmt::Debug + Send + 'static;
    type Transformer: Transformer;

    /// Called once when training begins. Returning `false` means the algorithm
    /// needs no data and the estimator moves straight to `Finished`.
    fn begin_training_impl(&mut self) -> Result<bool, FeaturizerError> {
        Ok(true)
    }

    fn fit_impl(&mut self, input: &Self::Input) -> Result<FitResult, FeaturizerError>;

    /// Called at the end of a pass over the data. Returning `true` ends training;
    /// `false` asks the caller to feed the data again.
    fn on_data_completed_impl(&mut self) -> Result<bool, FeaturizerError> {
        Ok(true)
    }

    /// Finalizes the learned state. Fails if required input never arrived.
    fn complete_training_impl(&mut self) -> Result<(), FeaturizerError>;

    fn create_transformer_impl(&mut self) -> Result<Self::Transformer, FeaturizerError>;
}

//==================================================================================
// 3. The State Machine
//==================================================================================

pub struct Estimator<E: EstimatorImpl> {
    annotations: AnnotationMaps,
    column_index: usize,
    state: TrainingState,
    created_transformer: bool,
    inner: E,
}

impl<E: EstimatorImpl> Estimator<E> {
    /// Wraps `inner` in a `Pending` estimator bound to one annotated column.
    pub fn new(
        inner: E,
        annotations: AnnotationMaps,
        column_index: usize,
    ) -> Result<Self, FeaturizerError> {
        if E::NAME.is_empty() {
            return Err(FeaturizerError::invalid_argument("estimator name is empty"));
        }
        annotations.check_column(column_index)?;
        Ok(Self {
            annotations,
            column_index,
            state: TrainingState::Pending,
            created_transformer: false,
            inner,
        })
    }

    pub fn name(&self) -> &'static str {
        E::NAME
    }

    pub fn annotations(&self) -> &AnnotationMaps {
        &self.annotations
    }

    pub fn column_index(&self) -> usize {
        self.column_index
    }

    /// Read-only access to the algorithm's state, for introspection.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn state(&self) -> TrainingState {
        self.state
    }

    pub fn is_training_complete(&self) -> bool {
        self.state != TrainingState::Training
    }

    pub fn has_created_transformer(&self) -> bool {
        self.created_transformer
    }

    fn transition(&mut self, next: TrainingState) {
        if self.state != next {
            log_event!(
                "event" = "state_transition",
                "estimator" = E::NAME,
                "from" = self.state,
                "to" = next
            );
            self.state = next;
        }
    }

    fn require_state(&self, allowed: &[TrainingState], op: &str) -> Result<(), FeaturizerError> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        Err(FeaturizerError::InvalidState(format!(
            "{}: '{}' cannot be called while in the {} state",
            E::NAME,
            op,
            self.state
        )))
    }

    pub fn begin_training(&mut self) -> Result<(), FeaturizerError> {
        self.require_state(&[TrainingState::Pending], "begin_training")?;
        let needs_data = self.inner.begin_training_impl()?;
        self.transition(if needs_data {
            TrainingState::Training
        } else {
            TrainingState::Finished
        });
        Ok(())
    }

    pub fn fit(&mut self, input: &E::Input) -> Result<FitResult, FeaturizerError> {
        self.require_state(&[TrainingState::Training], "fit")?;
        let result = self.inner.fit_impl(input)?;
        if result == FitResult::Complete {
            self.transition(TrainingState::Finished);
        }
        Ok(result)
    }

    /// Equivalent to calling `fit` on each element in order, stopping at the
    /// first result that is not `Continue`.
    pub fn fit_buffer(&mut self, inputs: &[E::Input]) -> Result<FitResult, FeaturizerError> {
        if inputs.is_empty() {
            return Err(FeaturizerError::invalid_argument("input buffer is empty"));
        }
        self.require_state(&[TrainingState::Training], "fit")?;
        for input in inputs {
            let result = self.fit(input)?;
            if result != FitResult::Continue {
                return Ok(result);
            }
        }
        Ok(FitResult::Continue)
    }

    pub fn on_data_completed(&mut self) -> Result<(), FeaturizerError> {
        self.require_state(
            &[TrainingState::Training, TrainingState::Finished],
            "on_data_completed",
        )?;
        if self.inner.on_data_completed_impl()? {
            self.transition(TrainingState::Finished);
        }
        Ok(())
    }

    /// Finalizes training. Calling it again once `Completed` is a no-op.
    pub fn complete_training(&mut self) -> Result<(), FeaturizerError> {
        if self.state == TrainingState::Completed {
            return Ok(());
        }
        self.require_state(
            &[TrainingState::Training, TrainingState::Finished],
            "complete_training",
        )?;
        self.inner.complete_training_impl()?;
        self.transition(TrainingState::Completed);
        log::debug!("{}: training completed", E::NAME);
        Ok(())
    }

    /// Produces the transformer. Allowed once, after `complete_training`.
    pub fn create_transformer(&mut self) -> Result<E::Transformer, FeaturizerError> {
        self.require_state(&[TrainingState::Completed], "create_transformer")?;
        if self.created_transformer {
            return Err(FeaturizerError::InvalidState(format!(
                "{}: a transformer has already been created from this estimator",
                E::NAME
            )));
        }
        let transformer = self.inner.create_transformer_impl()?;
        self.created_transformer = true;
        Ok(transformer)
    }
}

impl<E: EstimatorImpl> fmt::Debug for Estimator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Estimator")
            .field("name", &E::NAME)
            .field("column_index", &self.column_index)
            .field("state", &self.state)
            .field("created_transformer", &self.created_transformer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveReader, ArchiveWriter};

    /// Sums inputs and completes once the running total reaches `limit`.
    struct SumEstimator {
        total: i64,
        limit: i64,
        needs_data: bool,
    }

    struct SumTransformer {
        total: i64,
    }

    impl Transformer for SumTransformer {
        type Input = i64;
        type Output = i64;

        fn execute(
            &mut self,
            input: &i64,
            callback: &mut dyn FnMut(i64),
        ) -> Result<(), FeaturizerError> {
            callback(input + self.total);
            Ok(())
        }

        fn save(&self, writer: &mut ArchiveWriter) -> Result<(), FeaturizerError> {
            writer.write(&self.total)?;
            Ok(())
        }

        fn reconstruct(reader: &mut ArchiveReader<'_>) -> Result<Self, FeaturizerError> {
            Ok(Self { total: reader.read()? })
        }
    }

    impl EstimatorImpl for SumEstimator {
        const NAME: &'static str = "SumEstimator";
        type Input = i64;
        type Transformer = SumTransformer;

        fn begin_training_impl(&mut self) -> Result<bool, FeaturizerError> {
            Ok(self.needs_data)
        }

        fn fit_impl(&mut self, input: &i64) -> Result<FitResult, FeaturizerError> {
            self.total += input;
            Ok(if self.total >= self.limit {
                FitResult::Complete
            } else {
                FitResult::Continue
            })
        }

        fn complete_training_impl(&mut self) -> Result<(), FeaturizerError> {
            Ok(())
        }

        fn create_transformer_impl(&mut self) -> Result<SumTransformer, FeaturizerError> {
            Ok(SumTransformer { total: self.total })
        }
    }

    fn make(limit: i64) -> Estimator<SumEstimator> {
        let inner = SumEstimator {
            total: 0,
            limit,
            needs_data: true,
        };
        Estimator::new(inner, AnnotationMaps::new(1).unwrap(), 0).unwrap()
    }

    #[test]
    fn test_full_lifecycle() {
        let mut estimator = make(100);
        assert_eq!(estimator.state(), TrainingState::Pending);
        estimator.begin_training().unwrap();
        assert_eq!(estimator.state(), TrainingState::Training);
        assert!(!estimator.is_training_complete());

        assert_eq!(estimator.fit(&5).unwrap(), FitResult::Continue);
        assert_eq!(estimator.fit_buffer(&[1, 2]).unwrap(), FitResult::Continue);
        estimator.on_data_completed().unwrap();
        assert_eq!(estimator.state(), TrainingState::Finished);
        assert!(estimator.is_training_complete());

        estimator.complete_training().unwrap();
        assert_eq!(estimator.state(), TrainingState::Completed);

        let mut transformer = estimator.create_transformer().unwrap();
        assert_eq!(transformer.transform(&1).unwrap(), 9);
    }

    #[test]
    fn test_fit_after_finalization_fails() {
        let mut estimator = make(3);
        estimator.begin_training().unwrap();
        assert_eq!(estimator.fit_buffer(&[1, 2, 3, 4]).unwrap(), FitResult::Complete);
        // The short-circuit left the last element unread.
        assert_eq!(estimator.inner().total, 3);
        assert_eq!(estimator.state(), TrainingState::Finished);

        assert!(matches!(estimator.fit(&1), Err(FeaturizerError::InvalidState(_))));
        estimator.complete_training().unwrap();
        assert!(matches!(estimator.fit(&1), Err(FeaturizerError::InvalidState(_))));
        assert!(estimator.complete_training().is_ok());
        assert_eq!(estimator.state(), TrainingState::Completed);
    }

    #[test]
    fn test_out_of_order_calls_are_rejected() {
        let mut estimator = make(10);
        assert!(estimator.fit(&1).is_err());
        assert!(estimator.complete_training().is_err());
        assert!(estimator.on_data_completed().is_err());
        assert!(estimator.create_transformer().is_err());

        estimator.begin_training().unwrap();
        assert!(estimator.begin_training().is_err());
        assert!(estimator.create_transformer().is_err());
        assert!(matches!(
            estimator.fit_buffer(&[]),
            Err(FeaturizerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_transformer_is_created_once() {
        let mut estimator = make(1);
        estimator.begin_training().unwrap();
        estimator.fit(&1).unwrap();
        estimator.complete_training().unwrap();
        assert!(estimator.create_transformer().is_ok());
        assert!(estimator.has_created_transformer());
        assert!(matches!(
            estimator.create_transformer(),
            Err(FeaturizerError::InvalidState(_))
        ));
    }

    #[test]
    fn test_no_data_needed_skips_training() {
        let inner = SumEstimator {
            total: 4,
            limit: 0,
            needs_data: false,
        };
        let mut estimator = Estimator::new(inner, AnnotationMaps::new(1).unwrap(), 0).unwrap();
        estimator.begin_training().unwrap();
        assert_eq!(estimator.state(), TrainingState::Finished);
        assert!(estimator.fit(&1).is_err());
        estimator.complete_training().unwrap();
        assert!(estimator.create_transformer().is_ok());
    }

    #[test]
    fn test_construction_validates_column() {
        let inner = SumEstimator {
            total: 0,
            limit: 0,
            needs_data: true,
        };
        let err = Estimator::new(inner, AnnotationMaps::new(2).unwrap(), 2).unwrap_err();
        assert!(matches!(err, FeaturizerError::InvalidArgument(_)));
    }
}
