//! This module defines the value-type traits shared by every featurizer.
//!
//! `FeatureValue` is the capability set a type must provide to flow through an
//! estimator: a zero value (`Default`), a null surrogate, and an archive
//! encoding. Floating-point types are their own surrogate (NaN marks a missing
//! value); every other type is wrapped in `Option`.

use num_traits::ToPrimitive;
use std::fmt::Debug;

use crate::archive::ArchiveValue;
use crate::error::FeaturizerError;
use crate::types::ValueTypeId;

pub trait FeatureValue: ArchiveValue + Clone + Debug + Default + PartialEq + Send + 'static {
    const TYPE_ID: ValueTypeId;

    /// The representation used wherever a value may be missing.
    type Nullable: ArchiveValue + Clone + Debug + PartialEq + Send + 'static;

    fn create_null_value() -> Self::Nullable;

    fn is_null(value: &Self::Nullable) -> bool;

    /// Borrows the present value, or fails if `value` is the null surrogate.
    fn get_nullable_value(value: &Self::Nullable) -> Result<&Self, FeaturizerError>;

    fn into_nullable(value: Self) -> Self::Nullable;

    /// True when the plain value itself encodes "missing" (NaN for floats).
    fn is_native_null(_value: &Self) -> bool {
        false
    }
}

/// Types the numeric featurizers can learn statistics over.
pub trait NumericValue: FeatureValue + Copy + PartialOrd + ToPrimitive {
    fn to_f64_lossy(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

fn null_value_error(type_id: ValueTypeId) -> FeaturizerError {
    FeaturizerError::invalid_argument(format!("{} value is null", type_id))
}

//==================================================================================
// 1. Option-wrapped Types
//==================================================================================

macro_rules! impl_option_nullable {
    ($($t:ty => $id:ident),+ $(,)?) => {
        $(
            impl FeatureValue for $t {
                const TYPE_ID: ValueTypeId = ValueTypeId::$id;
                type Nullable = Option<$t>;

                fn create_null_value() -> Self::Nullable {
                    None
                }

                fn is_null(value: &Self::Nullable) -> bool {
                    value.is_none()
                }

                fn get_nullable_value(value: &Self::Nullable) -> Result<&Self, FeaturizerError> {
                    value.as_ref().ok_or_else(|| null_value_error(Self::TYPE_ID))
                }

                fn into_nullable(value: Self) -> Self::Nullable {
                    Some(value)
                }
            }
        )+
    };
}

impl_option_nullable!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    bool => Bool,
    String => String,
);

//==================================================================================
// 2. Natively Nullable Floats
//==================================================================================

macro_rules! impl_nan_nullable {
    ($($t:ty => $id:ident),+ $(,)?) => {
        $(
            impl FeatureValue for $t {
                const TYPE_ID: ValueTypeId = ValueTypeId::$id;
                type Nullable = $t;

                fn create_null_value() -> Self::Nullable {
                    <$t>::NAN
                }

                fn is_null(value: &Self::Nullable) -> bool {
                    value.is_nan()
                }

                fn get_nullable_value(value: &Self::Nullable) -> Result<&Self, FeaturizerError> {
                    if value.is_nan() {
                        return Err(null_value_error(Self::TYPE_ID));
                    }
                    Ok(value)
                }

                fn into_nullable(value: Self) -> Self::Nullable {
                    value
                }

                fn is_native_null(value: &Self) -> bool {
                    value.is_nan()
                }
            }
        )+
    };
}

impl_nan_nullable!(f32 => Float32, f64 => Float64);

impl NumericValue for i8 {}
impl NumericValue for i16 {}
impl NumericValue for i32 {}
impl NumericValue for i64 {}
impl NumericValue for u8 {}
impl NumericValue for u16 {}
impl NumericValue for u32 {}
impl NumericValue for u64 {}
impl NumericValue for f32 {}
impl NumericValue for f64 {}
