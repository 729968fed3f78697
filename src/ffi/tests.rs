use super::error_info::{destroy_error_info, destroy_transformer_save_data};
use super::exports::{backward_fill_imputer, median_imputer, min_max_scaler, missing_dummies, standard_scaler};
use super::global::{featurizer_enable_verbose_logging, featurizer_runtime_initialize, featurizer_runtime_shutdown};
use super::ErrorInfo;
use crate::error::ErrorKind;
use crate::featurizer::{FitResult, TrainingState};
use crate::observability::LOG_LEVEL_LOCK;
use crate::pointer_table::Handle;
use std::ffi::{c_char, CStr, CString};
use std::ptr;
use std::sync::{Mutex, MutexGuard, PoisonError};

// All tests share the process-wide runtime; Initialize/Shutdown would drop
// objects other tests are still using, so they run one at a time.
static ABI_LOCK: Mutex<()> = Mutex::new(());

fn lock() -> MutexGuard<'static, ()> {
    ABI_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Extracts the kind and message of a failed call and frees the error.
fn take_error(error: *mut ErrorInfo) -> (ErrorKind, String) {
    assert!(!error.is_null(), "expected an error to be reported");
    unsafe {
        let info = ((*error).kind(), (*error).message().to_string());
        assert!(destroy_error_info(error));
        info
    }
}

#[test]
fn test_min_max_scaler_abi_lifecycle() {
    let _guard = lock();
    let mut error: *mut ErrorInfo = ptr::null_mut();
    unsafe {
        // 1. Train
        let mut estimator: Handle = 0;
        assert!(min_max_scaler::double::create_estimator(&mut estimator, &mut error));
        assert_ne!(estimator, 0);

        let data = [-1.0f64, -0.5, 0.0, 1.0];
        let mut fit_result = 0u8;
        assert!(min_max_scaler::double::fit_buffer(
            estimator,
            data.as_ptr(),
            data.len(),
            &mut fit_result,
            &mut error
        ));
        assert_eq!(fit_result, FitResult::Continue as u8);

        let mut complete = true;
        assert!(min_max_scaler::double::is_training_complete(estimator, &mut complete, &mut error));
        assert!(!complete);
        assert!(min_max_scaler::double::complete_training(estimator, &mut error));

        let mut state = 0u8;
        assert!(min_max_scaler::double::get_state(estimator, &mut state, &mut error));
        assert_eq!(state, TrainingState::Completed as u8);

        // 2. Transform
        let mut transformer: Handle = 0;
        assert!(min_max_scaler::double::create_transformer_from_estimator(
            estimator,
            &mut transformer,
            &mut error
        ));
        assert!(min_max_scaler::double::destroy_estimator(estimator, &mut error));

        let mut output = 0.0f64;
        assert!(min_max_scaler::double::transform(transformer, 2.0, &mut output, &mut error));
        assert_eq!(output, 1.5);

        // 3. Save, reload, compare
        let mut buffer: *const u8 = ptr::null();
        let mut size = 0usize;
        assert!(min_max_scaler::double::create_transformer_save_data(
            transformer,
            &mut buffer,
            &mut size,
            &mut error
        ));
        assert!(size > 0);

        let mut restored: Handle = 0;
        assert!(min_max_scaler::double::create_transformer_from_saved_data(
            buffer,
            size,
            &mut restored,
            &mut error
        ));
        assert!(destroy_transformer_save_data(buffer, size, &mut error));

        let mut restored_output = 0.0f64;
        assert!(min_max_scaler::double::transform(restored, 2.0, &mut restored_output, &mut error));
        assert_eq!(restored_output.to_bits(), output.to_bits());

        // 4. Nothing is buffered by a one-to-one transformer.
        let mut flushed: *mut f64 = ptr::null_mut();
        let mut flushed_items = 7usize;
        assert!(min_max_scaler::double::flush(restored, &mut flushed, &mut flushed_items, &mut error));
        assert!(flushed.is_null());
        assert_eq!(flushed_items, 0);

        assert!(min_max_scaler::double::destroy_transformer(transformer, &mut error));
        assert!(min_max_scaler::double::destroy_transformer(restored, &mut error));
    }
    assert!(error.is_null());
}

#[test]
fn test_null_error_slot_fails_fast() {
    let _guard = lock();
    unsafe {
        let mut estimator: Handle = 0;
        assert!(!min_max_scaler::int32::create_estimator(&mut estimator, ptr::null_mut()));
        assert_eq!(estimator, 0);
    }
}

#[test]
fn test_argument_and_state_errors() {
    let _guard = lock();
    let mut error: *mut ErrorInfo = ptr::null_mut();
    unsafe {
        assert!(!min_max_scaler::int32::create_estimator(ptr::null_mut(), &mut error));
        let (kind, message) = take_error(error);
        assert_eq!(kind, ErrorKind::InvalidArgument);
        assert!(message.contains("'out_handle' is null"));

        let mut estimator: Handle = 0;
        assert!(min_max_scaler::int32::create_estimator(&mut estimator, &mut error));

        let mut fit_result = 0u8;
        let data = [1i32];
        assert!(!min_max_scaler::int32::fit_buffer(estimator, data.as_ptr(), 0, &mut fit_result, &mut error));
        assert!(take_error(error).1.contains("'input_items' is 0"));

        assert!(!min_max_scaler::int32::fit(0, 1, &mut fit_result, &mut error));
        assert!(take_error(error).1.contains("handle cannot be zero"));

        assert!(min_max_scaler::int32::fit(estimator, 3, &mut fit_result, &mut error));
        assert!(min_max_scaler::int32::complete_training(estimator, &mut error));
        assert!(!min_max_scaler::int32::fit(estimator, 4, &mut fit_result, &mut error));
        assert_eq!(take_error(error).0, ErrorKind::InvalidState);

        // An estimator handle is not a transformer handle.
        assert!(!min_max_scaler::int32::destroy_transformer(estimator, &mut error));
        assert_eq!(take_error(error).0, ErrorKind::InvalidArgument);
        // Nor an estimator of another featurizer.
        let mut state = 0u8;
        assert!(!standard_scaler::int32::get_state(estimator, &mut state, &mut error));
        assert_eq!(take_error(error).0, ErrorKind::InvalidArgument);

        assert!(min_max_scaler::int32::destroy_estimator(estimator, &mut error));
        assert!(!min_max_scaler::int32::destroy_estimator(estimator, &mut error));
        assert_eq!(take_error(error).0, ErrorKind::NotFound);

        let mut transformer: Handle = 0;
        assert!(!min_max_scaler::int32::create_transformer_from_saved_data(
            ptr::null(),
            4,
            &mut transformer,
            &mut error
        ));
        assert!(take_error(error).1.contains("'buffer' is null"));
        let bytes = [1u8, 0, 0, 0];
        assert!(!min_max_scaler::int32::create_transformer_from_saved_data(
            bytes.as_ptr(),
            bytes.len(),
            &mut transformer,
            &mut error
        ));
        assert_eq!(take_error(error).0, ErrorKind::Decoding);
    }
}

#[test]
fn test_missing_dummies_abi() {
    let _guard = lock();
    let mut error: *mut ErrorInfo = ptr::null_mut();
    unsafe {
        let mut estimator: Handle = 0;
        assert!(missing_dummies::int32::create_estimator(&mut estimator, &mut error));
        let mut complete = false;
        assert!(missing_dummies::int32::is_training_complete(estimator, &mut complete, &mut error));
        assert!(complete);
        assert!(missing_dummies::int32::complete_training(estimator, &mut error));

        let mut transformer: Handle = 0;
        assert!(missing_dummies::int32::create_transformer_from_estimator(
            estimator,
            &mut transformer,
            &mut error
        ));

        let mut flag = -1i8;
        assert!(missing_dummies::int32::transform(transformer, ptr::null(), &mut flag, &mut error));
        assert_eq!(flag, 1);
        let present = 42i32;
        assert!(missing_dummies::int32::transform(transformer, &present, &mut flag, &mut error));
        assert_eq!(flag, 0);

        // Strings arrive as NUL-terminated pointers.
        let mut strings: Handle = 0;
        assert!(missing_dummies::string::create_estimator(&mut strings, &mut error));
        assert!(missing_dummies::string::complete_training(strings, &mut error));
        let mut string_transformer: Handle = 0;
        assert!(missing_dummies::string::create_transformer_from_estimator(
            strings,
            &mut string_transformer,
            &mut error
        ));
        let text = CString::new("value").unwrap();
        assert!(missing_dummies::string::transform(string_transformer, text.as_ptr(), &mut flag, &mut error));
        assert_eq!(flag, 0);
        assert!(missing_dummies::string::transform(string_transformer, ptr::null(), &mut flag, &mut error));
        assert_eq!(flag, 1);

        assert!(missing_dummies::int32::destroy_estimator(estimator, &mut error));
        assert!(missing_dummies::int32::destroy_transformer(transformer, &mut error));
        assert!(missing_dummies::string::destroy_estimator(strings, &mut error));
        assert!(missing_dummies::string::destroy_transformer(string_transformer, &mut error));
    }
}

#[test]
fn test_median_imputer_abi_with_nan() {
    let _guard = lock();
    let mut error: *mut ErrorInfo = ptr::null_mut();
    unsafe {
        let mut estimator: Handle = 0;
        assert!(median_imputer::float::create_estimator(true, &mut estimator, &mut error));
        let data = [f32::NAN, 1.0, 2.0, 9.0, 4.0];
        let mut fit_result = 0u8;
        assert!(median_imputer::float::fit_buffer(estimator, data.as_ptr(), data.len(), &mut fit_result, &mut error));
        assert!(median_imputer::float::on_data_completed(estimator, &mut error));
        assert!(median_imputer::float::complete_training(estimator, &mut error));

        let mut transformer: Handle = 0;
        assert!(median_imputer::float::create_transformer_from_estimator(
            estimator,
            &mut transformer,
            &mut error
        ));
        let mut output = 0.0f64;
        assert!(median_imputer::float::transform(transformer, f32::NAN, &mut output, &mut error));
        assert_eq!(output, 3.0);
        assert!(median_imputer::float::transform(transformer, 7.5, &mut output, &mut error));
        assert_eq!(output, 7.5);

        // A second transformer from the same estimator is refused.
        let mut second: Handle = 0;
        assert!(!median_imputer::float::create_transformer_from_estimator(
            estimator,
            &mut second,
            &mut error
        ));
        assert_eq!(take_error(error).0, ErrorKind::InvalidState);

        assert!(median_imputer::float::destroy_estimator(estimator, &mut error));
        assert!(median_imputer::float::destroy_transformer(transformer, &mut error));
    }
}

#[test]
fn test_backward_fill_streams_and_flushes() {
    let _guard = lock();
    let mut error: *mut ErrorInfo = ptr::null_mut();
    unsafe {
        let default_value = CString::new("z").unwrap();
        let mut estimator: Handle = 0;
        assert!(backward_fill_imputer::string::create_estimator(
            default_value.as_ptr(),
            &mut estimator,
            &mut error
        ));
        assert!(backward_fill_imputer::string::complete_training(estimator, &mut error));
        let mut transformer: Handle = 0;
        assert!(backward_fill_imputer::string::create_transformer_from_estimator(
            estimator,
            &mut transformer,
            &mut error
        ));
        assert!(backward_fill_imputer::string::destroy_estimator(estimator, &mut error));

        let mut items: *mut *mut c_char = ptr::null_mut();
        let mut count = 0usize;

        assert!(backward_fill_imputer::string::transform(transformer, ptr::null(), &mut items, &mut count, &mut error));
        assert!(items.is_null());
        assert_eq!(count, 0);

        let value = CString::new("a").unwrap();
        assert!(backward_fill_imputer::string::transform(transformer, value.as_ptr(), &mut items, &mut count, &mut error));
        assert_eq!(count, 2);
        for i in 0..count {
            assert_eq!(CStr::from_ptr(*items.add(i)).to_str().unwrap(), "a");
        }
        assert!(backward_fill_imputer::string::destroy_transformed_data(items, count, &mut error));

        assert!(backward_fill_imputer::string::transform(transformer, ptr::null(), &mut items, &mut count, &mut error));
        assert!(backward_fill_imputer::string::flush(transformer, &mut items, &mut count, &mut error));
        assert_eq!(count, 1);
        assert_eq!(CStr::from_ptr(*items).to_str().unwrap(), "z");
        assert!(backward_fill_imputer::string::destroy_transformed_data(items, count, &mut error));

        assert!(backward_fill_imputer::string::destroy_transformer(transformer, &mut error));
    }
}

#[test]
fn test_backward_fill_flush_without_default_fails() {
    let _guard = lock();
    let mut error: *mut ErrorInfo = ptr::null_mut();
    unsafe {
        let mut estimator: Handle = 0;
        assert!(backward_fill_imputer::int64::create_estimator(ptr::null(), &mut estimator, &mut error));
        assert!(backward_fill_imputer::int64::complete_training(estimator, &mut error));
        let mut transformer: Handle = 0;
        assert!(backward_fill_imputer::int64::create_transformer_from_estimator(
            estimator,
            &mut transformer,
            &mut error
        ));

        let mut items: *mut i64 = ptr::null_mut();
        let mut count = 0usize;
        assert!(backward_fill_imputer::int64::transform(transformer, ptr::null(), &mut items, &mut count, &mut error));
        assert!(!backward_fill_imputer::int64::flush(transformer, &mut items, &mut count, &mut error));
        let (kind, message) = take_error(error);
        assert_eq!(kind, ErrorKind::InvalidState);
        assert!(message.contains("no default value"));

        assert!(backward_fill_imputer::int64::destroy_estimator(estimator, &mut error));
        assert!(backward_fill_imputer::int64::destroy_transformer(transformer, &mut error));
    }
}

#[test]
fn test_standard_scaler_abi_two_passes() {
    let _guard = lock();
    let mut error: *mut ErrorInfo = ptr::null_mut();
    unsafe {
        let mut estimator: Handle = 0;
        assert!(standard_scaler::uint16::create_estimator(&mut estimator, &mut error));
        let data = [2u16, 4, 4, 4, 5, 5, 7, 9];
        let mut fit_result = 0u8;
        let mut complete = false;

        for _pass in 0..2 {
            assert!(standard_scaler::uint16::fit_buffer(estimator, data.as_ptr(), data.len(), &mut fit_result, &mut error));
            assert!(standard_scaler::uint16::on_data_completed(estimator, &mut error));
        }
        assert!(standard_scaler::uint16::is_training_complete(estimator, &mut complete, &mut error));
        assert!(complete);
        assert!(standard_scaler::uint16::complete_training(estimator, &mut error));

        let mut transformer: Handle = 0;
        assert!(standard_scaler::uint16::create_transformer_from_estimator(
            estimator,
            &mut transformer,
            &mut error
        ));
        // Mean 5, population std 2.
        let mut output = 0.0f64;
        assert!(standard_scaler::uint16::transform(transformer, 9, &mut output, &mut error));
        assert!((output - 2.0).abs() < 1e-12);

        assert!(standard_scaler::uint16::destroy_estimator(estimator, &mut error));
        assert!(standard_scaler::uint16::destroy_transformer(transformer, &mut error));
    }
}

#[test]
fn test_runtime_initialize_and_shutdown() {
    let _guard = lock();
    let _level = LOG_LEVEL_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let mut error: *mut ErrorInfo = ptr::null_mut();
    unsafe {
        let bad = b"{ not json";
        assert!(!featurizer_runtime_initialize(bad.as_ptr(), bad.len(), &mut error));
        assert_eq!(take_error(error).0, ErrorKind::InvalidArgument);

        let config = br#"{ "handle_seed": 11, "log_level": "off" }"#;
        assert!(featurizer_runtime_initialize(config.as_ptr(), config.len(), &mut error));

        let mut estimator: Handle = 0;
        assert!(min_max_scaler::uint8::create_estimator(&mut estimator, &mut error));

        assert!(featurizer_runtime_shutdown(&mut error));

        // The next call lazily creates a fresh runtime without the old handle.
        let mut state = 0u8;
        assert!(!min_max_scaler::uint8::get_state(estimator, &mut state, &mut error));
        assert_eq!(take_error(error).0, ErrorKind::NotFound);

        assert!(featurizer_runtime_initialize(ptr::null(), 0, &mut error));
        assert!(!featurizer_runtime_initialize(ptr::null(), 3, &mut error));
        assert_eq!(take_error(error).0, ErrorKind::InvalidArgument);
    }
}

#[test]
fn test_verbose_logging_after_initialize_raises_level() {
    let _guard = lock();
    let _level = LOG_LEVEL_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let mut error: *mut ErrorInfo = ptr::null_mut();
    unsafe {
        // 1. Initialize with the default config, which logs at warn
        assert!(featurizer_runtime_initialize(ptr::null(), 0, &mut error));
        assert!(!log::log_enabled!(log::Level::Info));

        // 2. Verbose logging must take effect even though a logger is installed
        assert!(featurizer_enable_verbose_logging(ptr::null(), &mut error));
        assert!(error.is_null());
        assert!(log::log_enabled!(log::Level::Info));

        // 3. Re-initializing applies the configured level again
        let config = br#"{ "log_level": "error" }"#;
        assert!(featurizer_runtime_initialize(config.as_ptr(), config.len(), &mut error));
        assert!(!log::log_enabled!(log::Level::Warn));
    }
}

#[test]
fn test_symbol_suffixes_match_value_types() {
    macro_rules! check {
        ($($group:ident :: $module:ident),+ $(,)?) => {
            $(
                assert_eq!(
                    $group::$module::VALUE_TYPE.abi_suffix(),
                    $group::$module::SYMBOL_SUFFIX,
                    "{}::{}",
                    stringify!($group),
                    stringify!($module)
                );
            )+
        };
    }
    check!(
        min_max_scaler::int8, min_max_scaler::uint64, min_max_scaler::float, min_max_scaler::double,
        standard_scaler::int16, standard_scaler::uint32, standard_scaler::float,
        median_imputer::int32, median_imputer::uint8, median_imputer::double,
        missing_dummies::int64, missing_dummies::uint16, missing_dummies::boolean, missing_dummies::string,
        backward_fill_imputer::int8, backward_fill_imputer::float, backward_fill_imputer::boolean,
        backward_fill_imputer::string,
    );
}
