//! This file is the root of the `featurizer_core` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of the library (`featurizer`,
//!     `featurizers`, `archive`, etc.) so the Rust compiler knows they exist.
//! 2.  Re-exporting the handful of types most callers need.
//!
//! The C ABI lives in `ffi` and is compiled into the `cdylib` artifact; Rust
//! callers use `Runtime` (or the `featurizer` types directly) instead.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

#[doc(hidden)]
pub use log as __log;

pub mod archive;
pub mod config;
pub mod error;
pub mod featurizer;
pub mod featurizers;
pub mod ffi;
pub mod pointer_table;
pub mod runtime;
pub mod traits;
pub mod types;

//==================================================================================
// 2. Re-exports
//==================================================================================
pub use config::{FeaturizerConfig, LogLevel};
pub use error::{ErrorKind, FeaturizerError};
pub use observability::init_logging;
pub use pointer_table::{Handle, PointerTable, INVALID_HANDLE};
pub use runtime::Runtime;
