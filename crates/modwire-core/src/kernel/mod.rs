//! # Modwire Kernel
//!
//! Shared plumbing for the rest of the crate: the top-level [`Error`] type and
//! its `Result` alias, system-wide constants, and the [`RuntimeInfo`] that
//! supplies versions for the `PHP` and `ProcessWire` pseudo-modules.
pub mod constants;
pub mod error;
pub mod runtime;

pub use error::{Error, Result};
pub use runtime::RuntimeInfo;
