//! The concrete featurizers. Each one is an `EstimatorImpl` plus its
//! `Transformer`, generic over the value type it consumes.

pub mod backward_fill_imputer;
pub mod median_imputer;
pub mod min_max_scaler;
pub mod missing_dummies;
pub mod standard_scaler;

pub use backward_fill_imputer::{BackwardFillImputer, BackwardFillImputerEstimator, BackwardFillTransformer};
pub use median_imputer::{ImputerTransformer, MedianImputer, MedianImputerEstimator};
pub use min_max_scaler::{MinMaxScaler, MinMaxScalerEstimator, MinMaxScalerTransformer};
pub use missing_dummies::{MissingDummies, MissingDummiesEstimator, MissingDummiesTransformer};
pub use standard_scaler::{StandardScaler, StandardScalerEstimator, StandardScalerTransformer};
