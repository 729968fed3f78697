// In: src/featurizers/median_imputer.rs

//! Median imputation: learns the median of the non-null training values and
//! substitutes it for missing inputs at inference time.
//!
//! The running median is kept in two heaps: a max-heap holding the lower half
//! and a min-heap holding the upper half, with the lower half allowed at most
//! one extra element.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::marker::PhantomData;

use crate::archive::{read_version, write_version, ArchiveReader, ArchiveWriter};
use crate::error::FeaturizerError;
use crate::featurizer::{Estimator, EstimatorImpl, FitResult, Transformer};
use crate::traits::NumericValue;

const ARCHIVE_VERSION: (u16, u16) = (1, 0);

pub type MedianImputer<T> = Estimator<MedianImputerEstimator<T>>;

/// `f64` with a total order so it can live in a `BinaryHeap`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OrderedF64(f64);

impl Eq for OrderedF64 {}

impl PartialOrd for OrderedF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

//==================================================================================
// 1. Estimator
//==================================================================================

pub struct MedianImputerEstimator<T: NumericValue> {
    lower: BinaryHeap<OrderedF64>,
    upper: BinaryHeap<Reverse<OrderedF64>>,
    /// Average the two middle values for an even count; otherwise take the lower one.
    interpolate: bool,
    median: Option<f64>,
    _marker: PhantomData<T>,
}

impl<T: NumericValue> MedianImputerEstimator<T> {
    pub fn new(interpolate: bool) -> Self {
        Self {
            lower: BinaryHeap::new(),
            upper: BinaryHeap::new(),
            interpolate,
            median: None,
            _marker: PhantomData,
        }
    }

    pub fn count(&self) -> usize {
        self.lower.len() + self.upper.len()
    }

    /// The learned median, available once training has completed.
    pub fn median(&self) -> Option<f64> {
        self.median
    }

    fn push(&mut self, value: f64) {
        match self.lower.peek() {
            Some(top) if value > top.0 => self.upper.push(Reverse(OrderedF64(value))),
            _ => self.lower.push(OrderedF64(value)),
        }

        // Rebalance so that lower.len() is upper.len() or upper.len() + 1.
        if self.lower.len() > self.upper.len() + 1 {
            if let Some(moved) = self.lower.pop() {
                self.upper.push(Reverse(moved));
            }
        } else if self.upper.len() > self.lower.len() {
            if let Some(Reverse(moved)) = self.upper.pop() {
                self.lower.push(moved);
            }
        }
    }

    fn current_median(&self) -> Option<f64> {
        let low = self.lower.peek()?.0;
        if self.lower.len() > self.upper.len() || !self.interpolate {
            return Some(low);
        }
        let high = self.upper.peek().map(|top| top.0 .0)?;
        Some((low + high) / 2.0)
    }
}

impl<T: NumericValue> EstimatorImpl for MedianImputerEstimator<T> {
    const NAME: &'static str = "MedianImputerFeaturizer";
    type Input = T::Nullable;
    type Transformer = ImputerTransformer<T>;

    fn fit_impl(&mut self, input: &T::Nullable) -> Result<FitResult, FeaturizerError> {
        if !T::is_null(input) {
            let value = T::get_nullable_value(input)?.to_f64_lossy();
            self.push(value);
        }
        Ok(FitResult::Continue)
    }

    fn complete_training_impl(&mut self) -> Result<(), FeaturizerError> {
        let median = self.current_median().ok_or_else(|| {
            FeaturizerError::Training("No elements were provided during training".to_string())
        })?;
        log::debug!("{}: median {} over {} values", Self::NAME, median, self.count());
        self.median = Some(median);
        // The heaps are no longer needed once the median is known.
        self.lower = BinaryHeap::new();
        self.upper = BinaryHeap::new();
        Ok(())
    }

    fn create_transformer_impl(&mut self) -> Result<Self::Transformer, FeaturizerError> {
        let median = self
            .median
            .ok_or_else(|| FeaturizerError::invalid_state("median has not been computed"))?;
        Ok(ImputerTransformer::new(median))
    }
}

//==================================================================================
// 2. Transformer
//==================================================================================

/// Replaces missing values with a fixed learned value.
#[derive(Debug, Clone, PartialEq)]
pub struct ImputerTransformer<T: NumericValue> {
    value: f64,
    _marker: PhantomData<T>,
}

impl<T: NumericValue> ImputerTransformer<T> {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl<T: NumericValue> Transformer for ImputerTransformer<T> {
    type Input = T::Nullable;
    type Output = f64;

    fn execute(
        &mut self,
        input: &T::Nullable,
        callback: &mut dyn FnMut(f64),
    ) -> Result<(), FeaturizerError> {
        if T::is_null(input) {
            callback(self.value);
        } else {
            callback(T::get_nullable_value(input)?.to_f64_lossy());
        }
        Ok(())
    }

    fn save(&self, writer: &mut ArchiveWriter) -> Result<(), FeaturizerError> {
        write_version(writer, ARCHIVE_VERSION.0, ARCHIVE_VERSION.1)?;
        writer.write(&self.value)?;
        Ok(())
    }

    fn reconstruct(reader: &mut ArchiveReader<'_>) -> Result<Self, FeaturizerError> {
        read_version(reader, ARCHIVE_VERSION.0, ARCHIVE_VERSION.1)?;
        Ok(Self::new(reader.read()?))
    }
}
