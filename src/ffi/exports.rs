// In: src/ffi/exports.rs

//! The per-featurizer, per-value-type C exports.
//!
//! `featurizer_exports!` expands one module of `extern "C"` functions for a
//! single (featurizer, value type) pair. Symbols are named
//! `<Featurizer>_<type>_<Operation>`, e.g. `MinMaxScalerFeaturizer_int8_Fit`.
//! Each function marshals its arguments, locks the shared runtime, and calls
//! the matching `Runtime` operation inside `guard`.
//!
//! Transformers come in two output modes:
//! - `scalar`: one output per input, written into a caller-provided slot.
//! - `stream`: zero or more outputs per input, returned as a heap array that
//!   the caller releases with `_DestroyTransformedData`.
//!
//! `Flush` always returns an array (null with zero items when nothing is buffered).

//==================================================================================
// 1. Generator
//==================================================================================

macro_rules! featurizer_exports {
    (
        $module:ident, $name:literal, $suffix:literal,
        value = $value:ty,
        estimator = $estimator:ty,
        transformer = $transformer:ty,
        input = $input:ty,
        output = $mode:ident,
        create($($arg:ident : $arg_ty:ty),*) => $ctor:expr
    ) => {
        pub mod $module {
            #[allow(unused_imports)]
            use crate::featurizers::*;
            #[allow(unused_imports)]
            use crate::ffi::marshal::{
                bytes_into_raw, destroy_outputs, inputs_from_raw, outputs_into_raw,
                require_non_null, write_out, AbiInput, AbiOutput, ByValue, NullablePtr, NullableStr,
            };
            use crate::featurizer::{AnnotationMaps, Transformer};
            use crate::ffi::error_info::{guard, ErrorInfo};
            use crate::ffi::global::with_runtime;
            use crate::pointer_table::Handle;
            use crate::traits::FeatureValue;
            use crate::types::ValueTypeId;

            /// The value type this module is instantiated for.
            pub const VALUE_TYPE: ValueTypeId = <$value as FeatureValue>::TYPE_ID;
            /// The type token in this module's symbol names.
            pub const SYMBOL_SUFFIX: &str = $suffix;

            type Est = $estimator;
            type Trans = $transformer;
            type Input = $input;
            type InRaw = <Input as AbiInput>::Raw;
            type Output = <Trans as Transformer>::Output;
            type OutRaw = <Output as AbiOutput>::Raw;

            //------------------------------------------------------------------
            // Estimator
            //------------------------------------------------------------------

            /// # Safety
            /// Pointer arguments must be null or valid for their documented use.
            #[export_name = concat!($name, "_", $suffix, "_CreateEstimator")]
            pub unsafe extern "C" fn create_estimator(
                $($arg: $arg_ty,)*
                out_handle: *mut Handle,
                error_info: *mut *mut ErrorInfo,
            ) -> bool {
                guard(error_info, || unsafe {
                    require_non_null(out_handle, "out_handle")?;
                    let inner: Est = $ctor;
                    let annotations = AnnotationMaps::new(1)?;
                    let handle = with_runtime(|rt| rt.create_estimator(inner, annotations, 0))?;
                    log_event!(
                        "event" = "abi_estimator_created",
                        "featurizer" = $name,
                        "type" = VALUE_TYPE.abi_suffix(),
                        "handle" = handle
                    );
                    write_out(out_handle, "out_handle", handle)
                })
            }

            /// # Safety
            /// `error_info` must be null or writable.
            #[export_name = concat!($name, "_", $suffix, "_DestroyEstimator")]
            pub unsafe extern "C" fn destroy_estimator(
                handle: Handle,
                error_info: *mut *mut ErrorInfo,
            ) -> bool {
                guard(error_info, || with_runtime(|rt| rt.destroy_estimator::<Est>(handle)))
            }

            /// # Safety
            /// Pointer arguments must be null or writable.
            #[export_name = concat!($name, "_", $suffix, "_GetState")]
            pub unsafe extern "C" fn get_state(
                handle: Handle,
                out_state: *mut u8,
                error_info: *mut *mut ErrorInfo,
            ) -> bool {
                guard(error_info, || unsafe {
                    require_non_null(out_state, "out_state")?;
                    let state = with_runtime(|rt| Ok(rt.estimator::<Est>(handle)?.state()))?;
                    write_out(out_state, "out_state", state as u8)
                })
            }

            /// # Safety
            /// Pointer arguments must be null or writable.
            #[export_name = concat!($name, "_", $suffix, "_IsTrainingComplete")]
            pub unsafe extern "C" fn is_training_complete(
                handle: Handle,
                out_complete: *mut bool,
                error_info: *mut *mut ErrorInfo,
            ) -> bool {
                guard(error_info, || unsafe {
                    require_non_null(out_complete, "out_complete")?;
                    let complete =
                        with_runtime(|rt| Ok(rt.estimator::<Est>(handle)?.is_training_complete()))?;
                    write_out(out_complete, "out_complete", complete)
                })
            }

            /// # Safety
            /// Pointer arguments must be null or valid for their documented use.
            #[export_name = concat!($name, "_", $suffix, "_Fit")]
            pub unsafe extern "C" fn fit(
                handle: Handle,
                input: InRaw,
                out_result: *mut u8,
                error_info: *mut *mut ErrorInfo,
            ) -> bool {
                guard(error_info, || unsafe {
                    require_non_null(out_result, "fit_result")?;
                    let value = <Input as AbiInput>::from_raw(input)?;
                    let result = with_runtime(|rt| rt.estimator_mut::<Est>(handle)?.fit(&value))?;
                    write_out(out_result, "fit_result", result as u8)
                })
            }

            /// # Safety
            /// `input_ptr` must be null or point to `input_items` raw inputs.
            #[export_name = concat!($name, "_", $suffix, "_FitBuffer")]
            pub unsafe extern "C" fn fit_buffer(
                handle: Handle,
                input_ptr: *const InRaw,
                input_items: usize,
                out_result: *mut u8,
                error_info: *mut *mut ErrorInfo,
            ) -> bool {
                guard(error_info, || unsafe {
                    require_non_null(out_result, "fit_result")?;
                    let values = inputs_from_raw::<Input>(input_ptr, input_items)?;
                    let result =
                        with_runtime(|rt| rt.estimator_mut::<Est>(handle)?.fit_buffer(&values))?;
                    write_out(out_result, "fit_result", result as u8)
                })
            }

            /// # Safety
            /// `error_info` must be null or writable.
            #[export_name = concat!($name, "_", $suffix, "_OnDataCompleted")]
            pub unsafe extern "C" fn on_data_completed(
                handle: Handle,
                error_info: *mut *mut ErrorInfo,
            ) -> bool {
                guard(error_info, || {
                    with_runtime(|rt| rt.estimator_mut::<Est>(handle)?.on_data_completed())
                })
            }

            /// # Safety
            /// `error_info` must be null or writable.
            #[export_name = concat!($name, "_", $suffix, "_CompleteTraining")]
            pub unsafe extern "C" fn complete_training(
                handle: Handle,
                error_info: *mut *mut ErrorInfo,
            ) -> bool {
                guard(error_info, || {
                    with_runtime(|rt| rt.estimator_mut::<Est>(handle)?.complete_training())
                })
            }

            //------------------------------------------------------------------
            // Transformer
            //------------------------------------------------------------------

            /// # Safety
            /// Pointer arguments must be null or writable.
            #[export_name = concat!($name, "_", $suffix, "_CreateTransformerFromEstimator")]
            pub unsafe extern "C" fn create_transformer_from_estimator(
                estimator: Handle,
                out_handle: *mut Handle,
                error_info: *mut *mut ErrorInfo,
            ) -> bool {
                guard(error_info, || unsafe {
                    require_non_null(out_handle, "out_handle")?;
                    let handle =
                        with_runtime(|rt| rt.create_transformer_from_estimator::<Est>(estimator))?;
                    write_out(out_handle, "out_handle", handle)
                })
            }

            /// # Safety
            /// `buffer` must be null or point to `buffer_size` readable bytes.
            #[export_name = concat!($name, "_", $suffix, "_CreateTransformerFromSavedData")]
            pub unsafe extern "C" fn create_transformer_from_saved_data(
                buffer: *const u8,
                buffer_size: usize,
                out_handle: *mut Handle,
                error_info: *mut *mut ErrorInfo,
            ) -> bool {
                guard(error_info, || unsafe {
                    require_non_null(buffer, "buffer")?;
                    if buffer_size == 0 {
                        return Err(crate::error::FeaturizerError::invalid_argument(
                            "'buffer_size' is 0",
                        ));
                    }
                    require_non_null(out_handle, "out_handle")?;
                    let bytes = std::slice::from_raw_parts(buffer, buffer_size);
                    let handle =
                        with_runtime(|rt| rt.create_transformer_from_saved_data::<Trans>(bytes))?;
                    write_out(out_handle, "out_handle", handle)
                })
            }

            /// # Safety
            /// `error_info` must be null or writable.
            #[export_name = concat!($name, "_", $suffix, "_DestroyTransformer")]
            pub unsafe extern "C" fn destroy_transformer(
                handle: Handle,
                error_info: *mut *mut ErrorInfo,
            ) -> bool {
                guard(error_info, || with_runtime(|rt| rt.destroy_transformer::<Trans>(handle)))
            }

            /// Release the buffer with `DestroyTransformerSaveData`.
            ///
            /// # Safety
            /// Pointer arguments must be null or writable.
            #[export_name = concat!($name, "_", $suffix, "_CreateTransformerSaveData")]
            pub unsafe extern "C" fn create_transformer_save_data(
                handle: Handle,
                out_buffer: *mut *const u8,
                out_buffer_size: *mut usize,
                error_info: *mut *mut ErrorInfo,
            ) -> bool {
                guard(error_info, || unsafe {
                    require_non_null(out_buffer, "out_buffer")?;
                    require_non_null(out_buffer_size, "out_buffer_size")?;
                    let bytes = with_runtime(|rt| rt.transformer_save_data::<Trans>(handle))?;
                    let (buffer, size) = bytes_into_raw(bytes);
                    write_out(out_buffer, "out_buffer", buffer)?;
                    write_out(out_buffer_size, "out_buffer_size", size)
                })
            }

            featurizer_exports!(@transform $mode, $name, $suffix);

            /// # Safety
            /// Pointer arguments must be null or writable.
            #[export_name = concat!($name, "_", $suffix, "_Flush")]
            pub unsafe extern "C" fn flush(
                handle: Handle,
                out_ptr: *mut *mut OutRaw,
                out_items: *mut usize,
                error_info: *mut *mut ErrorInfo,
            ) -> bool {
                guard(error_info, || unsafe {
                    require_non_null(out_ptr, "output_ptr")?;
                    require_non_null(out_items, "output_items")?;
                    let mut outputs: Vec<Output> = Vec::new();
                    with_runtime(|rt| {
                        rt.transformer_mut::<Trans>(handle)?
                            .flush(&mut |value| outputs.push(value))
                    })?;
                    let (items, count) = outputs_into_raw(outputs)?;
                    write_out(out_ptr, "output_ptr", items)?;
                    write_out(out_items, "output_items", count)
                })
            }

            /// Releases an array returned by `_Flush` (or by a streaming `_Transform`).
            ///
            /// # Safety
            /// `(result_ptr, result_items)` must be exactly a pair returned by this module.
            #[export_name = concat!($name, "_", $suffix, "_DestroyTransformedData")]
            pub unsafe extern "C" fn destroy_transformed_data(
                result_ptr: *mut OutRaw,
                result_items: usize,
                error_info: *mut *mut ErrorInfo,
            ) -> bool {
                guard(error_info, || unsafe { destroy_outputs::<Output>(result_ptr, result_items) })
            }
        }
    };

    (@transform scalar, $name:literal, $suffix:literal) => {
        /// # Safety
        /// Pointer arguments must be null or valid for their documented use.
        #[export_name = concat!($name, "_", $suffix, "_Transform")]
        pub unsafe extern "C" fn transform(
            handle: Handle,
            input: InRaw,
            output: *mut OutRaw,
            error_info: *mut *mut ErrorInfo,
        ) -> bool {
            guard(error_info, || unsafe {
                require_non_null(output, "output")?;
                let value = <Input as AbiInput>::from_raw(input)?;
                let result = with_runtime(|rt| rt.transformer_mut::<Trans>(handle)?.transform(&value))?;
                write_out(output, "output", result.into_raw()?)
            })
        }
    };

    (@transform stream, $name:literal, $suffix:literal) => {
        /// Release the returned array with `_DestroyTransformedData`.
        ///
        /// # Safety
        /// Pointer arguments must be null or valid for their documented use.
        #[export_name = concat!($name, "_", $suffix, "_Transform")]
        pub unsafe extern "C" fn transform(
            handle: Handle,
            input: InRaw,
            out_ptr: *mut *mut OutRaw,
            out_items: *mut usize,
            error_info: *mut *mut ErrorInfo,
        ) -> bool {
            guard(error_info, || unsafe {
                require_non_null(out_ptr, "output_ptr")?;
                require_non_null(out_items, "output_items")?;
                let value = <Input as AbiInput>::from_raw(input)?;
                let mut outputs: Vec<Output> = Vec::new();
                with_runtime(|rt| {
                    rt.transformer_mut::<Trans>(handle)?
                        .execute(&value, &mut |result| outputs.push(result))
                })?;
                let (items, count) = outputs_into_raw(outputs)?;
                write_out(out_ptr, "output_ptr", items)?;
                write_out(out_items, "output_items", count)
            })
        }
    };
}

//==================================================================================
// 2. Per-featurizer Instantiations
//==================================================================================

/// Scalers: non-nullable numeric input, `f64` output, no construction arguments.
macro_rules! scaler_exports {
    ($group:ident, $name:literal, $estimator:ident, $transformer:ident;
     $($module:ident: $t:ty => $suffix:literal),+ $(,)?) => {
        pub mod $group {
            $(
                featurizer_exports!(
                    $module, $name, $suffix,
                    value = $t,
                    estimator = $estimator<$t>,
                    transformer = $transformer<$t>,
                    input = ByValue<$t>,
                    output = scalar,
                    create() => $estimator::new(None)?
                );
            )+
        }
    };
}

scaler_exports!(min_max_scaler, "MinMaxScalerFeaturizer", MinMaxScalerEstimator, MinMaxScalerTransformer;
    int8: i8 => "int8",
    int16: i16 => "int16",
    int32: i32 => "int32",
    int64: i64 => "int64",
    uint8: u8 => "uint8",
    uint16: u16 => "uint16",
    uint32: u32 => "uint32",
    uint64: u64 => "uint64",
    float: f32 => "float",
    double: f64 => "double",
);

scaler_exports!(standard_scaler, "StandardScalerFeaturizer", StandardScalerEstimator, StandardScalerTransformer;
    int8: i8 => "int8",
    int16: i16 => "int16",
    int32: i32 => "int32",
    int64: i64 => "int64",
    uint8: u8 => "uint8",
    uint16: u16 => "uint16",
    uint32: u32 => "uint32",
    uint64: u64 => "uint64",
    float: f32 => "float",
    double: f64 => "double",
);

/// Median imputation: nullable numeric input, `f64` output, `interpolate` flag.
macro_rules! median_imputer_exports {
    ($($module:ident: $t:ty => $suffix:literal, $input:ty),+ $(,)?) => {
        pub mod median_imputer {
            $(
                featurizer_exports!(
                    $module, "MedianImputerFeaturizer", $suffix,
                    value = $t,
                    estimator = MedianImputerEstimator<$t>,
                    transformer = ImputerTransformer<$t>,
                    input = $input,
                    output = scalar,
                    create(interpolate: bool) => MedianImputerEstimator::new(interpolate)
                );
            )+
        }
    };
}

median_imputer_exports!(
    int8: i8 => "int8", NullablePtr<i8>,
    int16: i16 => "int16", NullablePtr<i16>,
    int32: i32 => "int32", NullablePtr<i32>,
    int64: i64 => "int64", NullablePtr<i64>,
    uint8: u8 => "uint8", NullablePtr<u8>,
    uint16: u16 => "uint16", NullablePtr<u16>,
    uint32: u32 => "uint32", NullablePtr<u32>,
    uint64: u64 => "uint64", NullablePtr<u64>,
    float: f32 => "float", ByValue<f32>,
    double: f64 => "double", ByValue<f64>,
);

/// Missing dummies: nullable input of any type, `i8` output.
macro_rules! missing_dummies_exports {
    ($($module:ident: $t:ty => $suffix:literal, $input:ty),+ $(,)?) => {
        pub mod missing_dummies {
            $(
                featurizer_exports!(
                    $module, "MissingDummiesFeaturizer", $suffix,
                    value = $t,
                    estimator = MissingDummiesEstimator<$t>,
                    transformer = MissingDummiesTransformer<$t>,
                    input = $input,
                    output = scalar,
                    create() => MissingDummiesEstimator::new()
                );
            )+
        }
    };
}

missing_dummies_exports!(
    int8: i8 => "int8", NullablePtr<i8>,
    int16: i16 => "int16", NullablePtr<i16>,
    int32: i32 => "int32", NullablePtr<i32>,
    int64: i64 => "int64", NullablePtr<i64>,
    uint8: u8 => "uint8", NullablePtr<u8>,
    uint16: u16 => "uint16", NullablePtr<u16>,
    uint32: u32 => "uint32", NullablePtr<u32>,
    uint64: u64 => "uint64", NullablePtr<u64>,
    float: f32 => "float", ByValue<f32>,
    double: f64 => "double", ByValue<f64>,
    boolean: bool => "bool", NullablePtr<bool>,
    string: String => "string", NullableStr,
);

/// Backward fill: nullable input, streaming output of the same type. The
/// optional default is passed in the input's nullable shape.
macro_rules! backward_fill_exports {
    ($($module:ident: $t:ty => $suffix:literal, $input:ty, |$raw:ident| $default:expr),+ $(,)?) => {
        pub mod backward_fill_imputer {
            $(
                featurizer_exports!(
                    $module, "BackwardFillImputerFeaturizer", $suffix,
                    value = $t,
                    estimator = BackwardFillImputerEstimator<$t>,
                    transformer = BackwardFillTransformer<$t>,
                    input = $input,
                    output = stream,
                    create($raw: <$input as AbiInput>::Raw) => BackwardFillImputerEstimator::new($default)
                );
            )+
        }
    };
}

backward_fill_exports!(
    int8: i8 => "int8", NullablePtr<i8>, |default_value| NullablePtr::<i8>::from_raw(default_value)?,
    int16: i16 => "int16", NullablePtr<i16>, |default_value| NullablePtr::<i16>::from_raw(default_value)?,
    int32: i32 => "int32", NullablePtr<i32>, |default_value| NullablePtr::<i32>::from_raw(default_value)?,
    int64: i64 => "int64", NullablePtr<i64>, |default_value| NullablePtr::<i64>::from_raw(default_value)?,
    uint8: u8 => "uint8", NullablePtr<u8>, |default_value| NullablePtr::<u8>::from_raw(default_value)?,
    uint16: u16 => "uint16", NullablePtr<u16>, |default_value| NullablePtr::<u16>::from_raw(default_value)?,
    uint32: u32 => "uint32", NullablePtr<u32>, |default_value| NullablePtr::<u32>::from_raw(default_value)?,
    uint64: u64 => "uint64", NullablePtr<u64>, |default_value| NullablePtr::<u64>::from_raw(default_value)?,
    float: f32 => "float", ByValue<f32>, |default_value| Some(default_value),
    double: f64 => "double", ByValue<f64>, |default_value| Some(default_value),
    boolean: bool => "bool", NullablePtr<bool>, |default_value| NullablePtr::<bool>::from_raw(default_value)?,
    string: String => "string", NullableStr, |default_value| NullableStr::from_raw(default_value)?,
);
