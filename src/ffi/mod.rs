//! The stable C ABI.
//!
//! - `error_info`: the `ErrorInfo` object, the shared entry-point guard and the
//!   type-independent exports (`GetErrorInfoString`, `DestroyErrorInfo`, ...).
//! - `global`: the process-wide runtime and its init/shutdown exports.
//! - `marshal`: argument and result conversion between C shapes and core types.
//! - `exports`: the generated per-featurizer, per-type function sets.
//!
//! No error or panic crosses the boundary: every export returns `bool` and
//! reports failures through a trailing `ErrorInfo` out-parameter.

pub mod error_info;
pub mod exports;
mod global;
pub mod marshal;

pub use error_info::ErrorInfo;

#[cfg(test)]
mod tests;
