//! This module defines the strongly-typed identifiers used throughout the
//! featurizer runtime.
//!
//! It currently holds the `ValueTypeId` enum, which names every value type
//! a featurizer can be instantiated for.

pub mod value_type_id;

// Re-export the main type(s) for easier access.
pub use value_type_id::ValueTypeId;
