// In: src/ffi/global.rs

//! The process-wide runtime behind the C ABI.
//!
//! A single `Runtime` sits behind a `Mutex`; every export locks it for the
//! duration of one call, which serializes registry access across threads.
//! `FeaturizerRuntime_Initialize` installs a configured runtime; exports called
//! before that lazily create one with the default configuration.

use std::ffi::{c_char, CStr};
use std::sync::{Mutex, PoisonError};

use super::error_info::{guard, ErrorInfo};
use crate::archive::ArchiveReader;
use crate::config::FeaturizerConfig;
use crate::error::FeaturizerError;
use crate::observability;
use crate::runtime::Runtime;

static RUNTIME: Mutex<Option<Runtime>> = Mutex::new(None);

/// Runs `f` against the shared runtime, creating a default one if needed.
pub(crate) fn with_runtime<R>(
    f: impl FnOnce(&mut Runtime) -> Result<R, FeaturizerError>,
) -> Result<R, FeaturizerError> {
    // A panic inside a previous call is reported through its own ErrorInfo;
    // the registry itself is still consistent.
    let mut slot = RUNTIME.lock().unwrap_or_else(PoisonError::into_inner);
    if slot.is_none() {
        *slot = Some(Runtime::new(FeaturizerConfig::default())?);
    }
    let runtime = slot
        .as_mut()
        .ok_or_else(|| FeaturizerError::Internal("runtime is not available".into()))?;
    f(runtime)
}

/// Replaces the shared runtime. Every live estimator and transformer is dropped.
pub(crate) fn install_runtime(config: FeaturizerConfig) -> Result<(), FeaturizerError> {
    let runtime = Runtime::new(config)?;
    let mut slot = RUNTIME.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(previous) = slot.replace(runtime) {
        log::info!(
            "runtime replaced; {} live object(s) released",
            previous.live_objects()
        );
    }
    Ok(())
}

pub(crate) fn shutdown_runtime() -> usize {
    let mut slot = RUNTIME.lock().unwrap_or_else(PoisonError::into_inner);
    slot.take().map(|runtime| runtime.live_objects()).unwrap_or(0)
}

//==================================================================================
// Exports
//==================================================================================

/// Initializes the shared runtime from a UTF-8 JSON configuration document.
/// `(null, 0)` selects the defaults.
///
/// # Safety
/// `config_json` must be null or point to `config_json_len` readable bytes.
#[export_name = "FeaturizerRuntime_Initialize"]
pub unsafe extern "C" fn featurizer_runtime_initialize(
    config_json: *const u8,
    config_json_len: usize,
    error_info: *mut *mut ErrorInfo,
) -> bool {
    guard(error_info, || unsafe {
        let reader = ArchiveReader::from_raw_parts(config_json, config_json_len)?;
        let config = if reader.at_end() {
            FeaturizerConfig::default()
        } else {
            let bytes = reader.clone_remaining()?;
            let text = std::str::from_utf8(&bytes).map_err(|err| {
                FeaturizerError::InvalidArgument(format!("configuration is not UTF-8: {}", err))
            })?;
            FeaturizerConfig::from_json(text)?
        };
        if config.log_level == crate::config::LogLevel::Off {
            // Silence without installing a backend a later call may want to target.
            log::set_max_level(log::LevelFilter::Off);
        } else {
            observability::init_logging(
                config.log_level.to_level_filter(),
                config.log_file.as_deref(),
            )?;
        }
        install_runtime(config)
    })
}

/// Drops the shared runtime and everything registered in it.
///
/// # Safety
/// `error_info` must be null or writable.
#[export_name = "FeaturizerRuntime_Shutdown"]
pub unsafe extern "C" fn featurizer_runtime_shutdown(error_info: *mut *mut ErrorInfo) -> bool {
    guard(error_info, || {
        let released = shutdown_runtime();
        log::info!("runtime shut down; {} live object(s) released", released);
        Ok(())
    })
}

/// Turns on info-level logging, to stderr or appended to `log_file` when non-null.
///
/// # Safety
/// `log_file` must be null or a NUL-terminated string.
#[export_name = "Featurizer_EnableVerboseLogging"]
pub unsafe extern "C" fn featurizer_enable_verbose_logging(
    log_file: *const c_char,
    error_info: *mut *mut ErrorInfo,
) -> bool {
    guard(error_info, || unsafe {
        let path = if log_file.is_null() {
            None
        } else {
            Some(CStr::from_ptr(log_file).to_str().map_err(|err| {
                FeaturizerError::InvalidArgument(format!("log file path is not UTF-8: {}", err))
            })?)
        };
        observability::init_logging(log::LevelFilter::Info, path)
    })
}
