//! The generic training and inference contract every featurizer plugs into.
//!
//! - `estimator`: the training-state machine (`Estimator<E>`) wrapping an
//!   algorithm's `EstimatorImpl`.
//! - `transformer`: the inference-side `Transformer` trait.
//! - `annotations`: the shared per-column context handed to estimators.
//! - `training`: the caller-side protocol that drives an estimator over batches.

pub mod annotations;
pub mod estimator;
pub mod training;
pub mod transformer;

pub use annotations::AnnotationMaps;
pub use estimator::{Estimator, EstimatorImpl, FitResult, TrainingState};
pub use training::{predict, train};
pub use transformer::Transformer;
