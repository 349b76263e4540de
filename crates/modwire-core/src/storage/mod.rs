//! # Modwire Storage
//!
//! Configuration files, per-module configuration data, and the file-backed
//! registry store.
pub mod config;
pub mod error;
pub mod json_store;

/// Re-export key types
pub use config::{ConfigData, ConfigFormat, EngineConfig};
pub use error::StorageSystemError;
pub use json_store::JsonRegistryStore;
