// In: src/ffi/marshal.rs

//! Conversions between C ABI argument shapes and the core value types.
//!
//! Inputs arrive in one of three shapes:
//! - `ByValue<T>`: a plain value (floats carry "missing" as NaN).
//! - `NullablePtr<T>`: a `*const T`, where null means "missing".
//! - `NullableStr`: a NUL-terminated `*const c_char`, where null means "missing".
//!
//! Outputs that leave the library are either written into caller-provided
//! scalars or handed over as heap arrays that the caller releases with the
//! matching `DestroyTransformedData` export.

use std::ffi::{c_char, CStr, CString};
use std::marker::PhantomData;
use std::ptr;

use crate::error::FeaturizerError;

//==================================================================================
// 1. Out-parameter Helpers
//==================================================================================

/// Fails with the conventional message when a required pointer is null.
pub(crate) fn require_non_null<T>(ptr: *const T, name: &str) -> Result<(), FeaturizerError> {
    if ptr.is_null() {
        return Err(FeaturizerError::InvalidArgument(format!("'{}' is null", name)));
    }
    Ok(())
}

/// Writes `value` through `out` after checking it is non-null.
///
/// # Safety
/// `out` must be null or valid for a write of `T`.
pub(crate) unsafe fn write_out<T>(out: *mut T, name: &str, value: T) -> Result<(), FeaturizerError> {
    require_non_null(out as *const T, name)?;
    out.write(value);
    Ok(())
}

//==================================================================================
// 2. Inputs
//==================================================================================

pub trait AbiInput {
    type Raw: Copy;
    type Value;

    /// # Safety
    /// Pointer-shaped raws must be null or point to a valid value.
    unsafe fn from_raw(raw: Self::Raw) -> Result<Self::Value, FeaturizerError>;
}

pub struct ByValue<T>(PhantomData<T>);

impl<T: Copy> AbiInput for ByValue<T> {
    type Raw = T;
    type Value = T;

    unsafe fn from_raw(raw: T) -> Result<T, FeaturizerError> {
        Ok(raw)
    }
}

pub struct NullablePtr<T>(PhantomData<T>);

impl<T: Copy> AbiInput for NullablePtr<T> {
    type Raw = *const T;
    type Value = Option<T>;

    unsafe fn from_raw(raw: *const T) -> Result<Option<T>, FeaturizerError> {
        Ok(raw.as_ref().copied())
    }
}

pub struct NullableStr;

impl AbiInput for NullableStr {
    type Raw = *const c_char;
    type Value = Option<String>;

    unsafe fn from_raw(raw: *const c_char) -> Result<Option<String>, FeaturizerError> {
        if raw.is_null() {
            return Ok(None);
        }
        let text = CStr::from_ptr(raw)
            .to_str()
            .map_err(|err| FeaturizerError::InvalidArgument(format!("input is not valid UTF-8: {}", err)))?;
        Ok(Some(text.to_owned()))
    }
}

/// Converts a caller-supplied `(pointer, count)` array of raw inputs.
///
/// # Safety
/// `items` must be null or point to `count` valid raws.
pub(crate) unsafe fn inputs_from_raw<I: AbiInput>(
    items: *const I::Raw,
    count: usize,
) -> Result<Vec<I::Value>, FeaturizerError> {
    require_non_null(items, "input_ptr")?;
    if count == 0 {
        return Err(FeaturizerError::invalid_argument("'input_items' is 0"));
    }
    std::slice::from_raw_parts(items, count)
        .iter()
        .map(|raw| I::from_raw(*raw))
        .collect()
}

//==================================================================================
// 3. Outputs
//==================================================================================

pub trait AbiOutput: Sized {
    type Raw: Copy;

    fn into_raw(self) -> Result<Self::Raw, FeaturizerError>;

    /// # Safety
    /// `raw` must come from `into_raw` and not have been destroyed yet.
    unsafe fn destroy_raw(_raw: Self::Raw) {}
}

macro_rules! impl_abi_output_for_primitive {
    ($($t:ty),+ $(,)?) => {
        $(
            impl AbiOutput for $t {
                type Raw = $t;

                fn into_raw(self) -> Result<$t, FeaturizerError> {
                    Ok(self)
                }
            }
        )+
    };
}

impl_abi_output_for_primitive!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, bool);

impl AbiOutput for String {
    type Raw = *mut c_char;

    fn into_raw(self) -> Result<*mut c_char, FeaturizerError> {
        CString::new(self)
            .map(CString::into_raw)
            .map_err(|_| FeaturizerError::invalid_argument("output string contains a NUL byte"))
    }

    unsafe fn destroy_raw(raw: *mut c_char) {
        if !raw.is_null() {
            drop(CString::from_raw(raw));
        }
    }
}

/// Hands `values` to the caller as a heap array. An empty set is `(null, 0)`.
pub(crate) fn outputs_into_raw<O: AbiOutput>(
    values: Vec<O>,
) -> Result<(*mut O::Raw, usize), FeaturizerError> {
    if values.is_empty() {
        return Ok((ptr::null_mut(), 0));
    }
    let mut raws = Vec::with_capacity(values.len());
    for value in values {
        match value.into_raw() {
            Ok(raw) => raws.push(raw),
            Err(err) => {
                for raw in raws {
                    // SAFETY: produced by `into_raw` just above.
                    unsafe { O::destroy_raw(raw) };
                }
                return Err(err);
            }
        }
    }
    let len = raws.len();
    let boxed = raws.into_boxed_slice();
    Ok((Box::into_raw(boxed) as *mut O::Raw, len))
}

/// Releases an array produced by `outputs_into_raw`.
///
/// # Safety
/// `(items, count)` must be exactly a pair returned by `outputs_into_raw`.
pub(crate) unsafe fn destroy_outputs<O: AbiOutput>(
    items: *mut O::Raw,
    count: usize,
) -> Result<(), FeaturizerError> {
    match (items.is_null(), count) {
        (true, 0) => Ok(()),
        (true, _) => Err(FeaturizerError::invalid_argument("'result_ptr' is null")),
        (false, 0) => Err(FeaturizerError::invalid_argument("'result_items' is 0")),
        (false, _) => {
            let boxed = Box::from_raw(ptr::slice_from_raw_parts_mut(items, count));
            for raw in boxed.iter() {
                O::destroy_raw(*raw);
            }
            Ok(())
        }
    }
}

/// Hands a saved transformer buffer to the caller.
pub(crate) fn bytes_into_raw(bytes: Vec<u8>) -> (*const u8, usize) {
    let len = bytes.len();
    if len == 0 {
        return (ptr::null(), 0);
    }
    (Box::into_raw(bytes.into_boxed_slice()) as *const u8, len)
}

/// # Safety
/// `(buffer, size)` must be exactly a pair returned by `bytes_into_raw`.
pub(crate) unsafe fn destroy_bytes(buffer: *const u8, size: usize) -> Result<(), FeaturizerError> {
    require_non_null(buffer, "buffer")?;
    if size == 0 {
        return Err(FeaturizerError::invalid_argument("'buffer_size' is 0"));
    }
    drop(Box::from_raw(ptr::slice_from_raw_parts_mut(buffer as *mut u8, size)));
    Ok(())
}
