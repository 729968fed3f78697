// In: src/runtime.rs

//! The `Runtime` owns the handle registry and the configuration, and exposes
//! every estimator/transformer lifecycle operation in terms of handles.
//!
//! This is the layer the C ABI drives. Each operation is generic over the
//! concrete estimator or transformer type, and the registry checks that a
//! handle really refers to an object of that type.

use crate::archive::{ArchiveReader, ArchiveWriter};
use crate::config::FeaturizerConfig;
use crate::error::FeaturizerError;
use crate::featurizer::{train, AnnotationMaps, Estimator, EstimatorImpl, Transformer};
use crate::pointer_table::{Handle, PointerTable};

#[derive(Debug)]
pub struct Runtime {
    table: PointerTable,
    config: FeaturizerConfig,
}

impl Runtime {
    pub fn new(config: FeaturizerConfig) -> Result<Self, FeaturizerError> {
        config.validate()?;
        log::info!(
            "featurizer runtime v{} initialized (seeded handles: {})",
            crate::VERSION,
            config.handle_seed.is_some()
        );
        Ok(Self {
            table: PointerTable::new(config.handle_seed),
            config,
        })
    }

    pub fn config(&self) -> &FeaturizerConfig {
        &self.config
    }

    /// Number of live estimators and transformers.
    pub fn live_objects(&self) -> usize {
        self.table.len()
    }

    //==============================================================================
    // 1. Estimators
    //==============================================================================

    /// Wraps `inner`, begins training and registers the estimator.
    pub fn create_estimator<E: EstimatorImpl>(
        &mut self,
        inner: E,
        annotations: AnnotationMaps,
        column_index: usize,
    ) -> Result<Handle, FeaturizerError> {
        let mut estimator = Estimator::new(inner, annotations, column_index)?;
        estimator.begin_training()?;
        self.table.add(estimator)
    }

    pub fn estimator<E: EstimatorImpl>(&self, handle: Handle) -> Result<&Estimator<E>, FeaturizerError> {
        self.table.get::<Estimator<E>>(handle)
    }

    pub fn estimator_mut<E: EstimatorImpl>(
        &mut self,
        handle: Handle,
    ) -> Result<&mut Estimator<E>, FeaturizerError> {
        self.table.get_mut::<Estimator<E>>(handle)
    }

    pub fn destroy_estimator<E: EstimatorImpl>(&mut self, handle: Handle) -> Result<(), FeaturizerError> {
        self.table.take::<Estimator<E>>(handle).map(drop)
    }

    /// Runs the full training protocol over `batches`, bounded by the
    /// configured pass limit.
    pub fn train_estimator<E: EstimatorImpl>(
        &mut self,
        handle: Handle,
        batches: &[Vec<E::Input>],
    ) -> Result<(), FeaturizerError> {
        let max_passes = self.config.max_training_passes;
        train(self.estimator_mut::<E>(handle)?, batches, max_passes)
    }

    //==============================================================================
    // 2. Transformers
    //==============================================================================

    pub fn create_transformer_from_estimator<E: EstimatorImpl>(
        &mut self,
        estimator: Handle,
    ) -> Result<Handle, FeaturizerError> {
        let transformer = self.estimator_mut::<E>(estimator)?.create_transformer()?;
        let handle = self.table.add(transformer)?;
        log_event!("event" = "transformer_created", "estimator" = E::NAME, "handle" = handle);
        Ok(handle)
    }

    /// Rebuilds a transformer from bytes produced by `transformer_save_data`.
    /// The buffer must be consumed exactly.
    pub fn create_transformer_from_saved_data<T: Transformer>(
        &mut self,
        bytes: &[u8],
    ) -> Result<Handle, FeaturizerError> {
        if bytes.is_empty() {
            return Err(FeaturizerError::invalid_argument("saved data buffer is empty"));
        }
        let mut reader = ArchiveReader::new(bytes);
        let transformer = T::reconstruct(&mut reader)?;
        reader.finish()?;
        let handle = self.table.add(transformer)?;
        log_event!("event" = "transformer_reconstructed", "bytes" = bytes.len(), "handle" = handle);
        Ok(handle)
    }

    pub fn transformer_save_data<T: Transformer>(&self, handle: Handle) -> Result<Vec<u8>, FeaturizerError> {
        let transformer = self.transformer::<T>(handle)?;
        let mut writer = ArchiveWriter::with_capacity(self.config.archive_reserve_bytes);
        transformer.save(&mut writer)?;
        log_event!("event" = "transformer_saved", "handle" = handle, "bytes" = writer.len());
        Ok(writer.commit())
    }

    pub fn transformer<T: Transformer>(&self, handle: Handle) -> Result<&T, FeaturizerError> {
        self.table.get::<T>(handle)
    }

    pub fn transformer_mut<T: Transformer>(&mut self, handle: Handle) -> Result<&mut T, FeaturizerError> {
        self.table.get_mut::<T>(handle)
    }

    pub fn destroy_transformer<T: Transformer>(&mut self, handle: Handle) -> Result<(), FeaturizerError> {
        self.table.take::<T>(handle).map(drop)
    }
}
