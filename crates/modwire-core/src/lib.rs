//! # Modwire Core
//!
//! Module dependency resolution and install/uninstall orchestration.
//!
//! - [`kernel`]: crate-level error type, constants and runtime versions
//! - [`module_system`]: the engine itself, fronted by [`ModuleManager`]
//! - [`storage`]: configuration files and the file-backed registry store
//! - [`utils`]: filesystem helpers
pub mod kernel;
pub mod module_system;
pub mod storage;
pub mod utils;

pub use kernel::error::Error as KernelError;
pub use kernel::RuntimeInfo;
pub use module_system::{
    DependencyEdge, InstallOptions, Module, ModuleFactory, ModuleInfo, ModuleManager, ModuleSystemError,
    ModuleVersion, VersionOperator,
};
pub use storage::{EngineConfig, JsonRegistryStore};

#[cfg(test)]
mod tests;
