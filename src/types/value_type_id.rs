//! This module defines the canonical identifier for the value types a featurizer
//! can consume or produce.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of value types supported by the featurizers and the C ABI.
///
/// Each variant corresponds to one instantiation of the per-type ABI surface;
/// `abi_suffix` gives the lowercase token used in the exported symbol names.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueTypeId {
    String,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Bool,
}

impl ValueTypeId {
    /// The lowercase token used in exported symbol names, e.g. `"int8"` in
    /// `MinMaxScalerFeaturizer_int8_Fit`.
    pub fn abi_suffix(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float",
            Self::Float64 => "double",
            Self::Bool => "bool",
        }
    }

}

impl fmt::Display for ValueTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
