// In: src/ffi/error_info.rs

//! Error objects handed across the C ABI, and the entry-point guard that
//! produces them.
//!
//! Every export returns `bool` and takes a trailing `*mut *mut ErrorInfo`.
//! `guard` implements the shared contract: a null error out-pointer fails
//! immediately, `*err` is cleared on entry, and any `FeaturizerError` or panic
//! raised by the body becomes a newly allocated `ErrorInfo`.

use std::any::Any;
use std::ffi::{c_char, CString};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use super::marshal::{destroy_bytes, write_out};
use crate::error::{ErrorKind, FeaturizerError};

/// An opaque, heap-allocated error description.
#[derive(Debug)]
pub struct ErrorInfo {
    kind: ErrorKind,
    message: CString,
}

impl ErrorInfo {
    fn from_error(err: &FeaturizerError) -> Self {
        // CString cannot hold interior NULs.
        let text = err.to_string().replace('\0', " ");
        let message = CString::new(text).unwrap_or_default();
        Self {
            kind: err.kind(),
            message,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        self.message.to_str().unwrap_or("")
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        return (*text).to_string();
    }
    if let Some(text) = payload.downcast_ref::<String>() {
        return text.clone();
    }
    "unknown panic".to_string()
}

/// Runs `body` under the ABI error contract. Returns `true` on success.
pub(crate) fn guard<F>(error_info: *mut *mut ErrorInfo, body: F) -> bool
where
    F: FnOnce() -> Result<(), FeaturizerError>,
{
    if error_info.is_null() {
        return false;
    }
    // SAFETY: checked non-null; the caller provides a writable slot.
    unsafe { *error_info = ptr::null_mut() };

    let outcome = match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(result) => result,
        Err(payload) => Err(FeaturizerError::Internal(format!(
            "panic at the ABI boundary: {}",
            panic_message(payload)
        ))),
    };

    match outcome {
        Ok(()) => true,
        Err(err) => {
            log::warn!("{}", err);
            let info = Box::new(ErrorInfo::from_error(&err));
            // SAFETY: as above.
            unsafe { *error_info = Box::into_raw(info) };
            false
        }
    }
}

//==================================================================================
// Exports
//==================================================================================

/// Copies the error message into a new NUL-terminated string. Release it with
/// `DestroyErrorInfoString`.
///
/// # Safety
/// `error` must be null or a live `ErrorInfo`; the out-pointers must be null or writable.
#[export_name = "GetErrorInfoString"]
pub unsafe extern "C" fn get_error_info_string(
    error: *const ErrorInfo,
    output: *mut *const c_char,
    output_items: *mut usize,
) -> bool {
    if error.is_null() || output.is_null() || output_items.is_null() {
        return false;
    }
    let message = (*error).message.clone();
    *output_items = message.as_bytes().len();
    *output = message.into_raw();
    true
}

/// # Safety
/// `(output, output_items)` must come from `GetErrorInfoString`.
#[export_name = "DestroyErrorInfoString"]
pub unsafe extern "C" fn destroy_error_info_string(output: *const c_char, _output_items: usize) -> bool {
    if output.is_null() {
        return false;
    }
    drop(CString::from_raw(output as *mut c_char));
    true
}

/// # Safety
/// `error` must be null or a live `ErrorInfo`.
#[export_name = "GetErrorInfoKind"]
pub unsafe extern "C" fn get_error_info_kind(error: *const ErrorInfo, output: *mut u8) -> bool {
    if error.is_null() || output.is_null() {
        return false;
    }
    *output = (*error).kind as u8;
    true
}

/// # Safety
/// `error` must be null or a live `ErrorInfo` that is not used afterwards.
#[export_name = "DestroyErrorInfo"]
pub unsafe extern "C" fn destroy_error_info(error: *mut ErrorInfo) -> bool {
    if error.is_null() {
        return false;
    }
    drop(Box::from_raw(error));
    true
}

/// Releases a buffer produced by any `_CreateTransformerSaveData` export.
///
/// # Safety
/// `(buffer, buffer_size)` must be exactly a pair produced by that export.
#[export_name = "DestroyTransformerSaveData"]
pub unsafe extern "C" fn destroy_transformer_save_data(
    buffer: *const u8,
    buffer_size: usize,
    error_info: *mut *mut ErrorInfo,
) -> bool {
    guard(error_info, || unsafe { destroy_bytes(buffer, buffer_size) })
}

/// Reports the library version as a static NUL-terminated string.
///
/// # Safety
/// `output` must be null or writable.
#[export_name = "Featurizer_GetVersion"]
pub unsafe extern "C" fn get_version(output: *mut *const c_char, error_info: *mut *mut ErrorInfo) -> bool {
    static VERSION_C: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    guard(error_info, || unsafe {
        write_out(output, "output", VERSION_C.as_ptr() as *const c_char)
    })
}
