//! The cross-column context shared by the estimators of one data set.

use std::sync::Arc;

use crate::error::FeaturizerError;

#[derive(Debug)]
struct AnnotationMapsInner {
    num_columns: usize,
}

/// A reference-counted, opaque per-column context. Estimators built over the
/// same data set share one instance; only the column count is observable.
#[derive(Debug, Clone)]
pub struct AnnotationMaps {
    inner: Arc<AnnotationMapsInner>,
}

impl AnnotationMaps {
    pub fn new(num_columns: usize) -> Result<Self, FeaturizerError> {
        if num_columns == 0 {
            return Err(FeaturizerError::invalid_argument(
                "annotation maps must describe at least one column",
            ));
        }
        Ok(Self {
            inner: Arc::new(AnnotationMapsInner { num_columns }),
        })
    }

    pub fn num_columns(&self) -> usize {
        self.inner.num_columns
    }

    pub(crate) fn check_column(&self, column_index: usize) -> Result<(), FeaturizerError> {
        if column_index >= self.num_columns() {
            return Err(FeaturizerError::InvalidArgument(format!(
                "column index {} is out of range for {} annotated column(s)",
                column_index,
                self.num_columns()
            )));
        }
        Ok(())
    }
}
