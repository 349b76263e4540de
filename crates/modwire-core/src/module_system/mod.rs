//! # Modwire Module System
//!
//! Dependency resolution and the install/uninstall engine for modules.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`version`]**: Compares versions in either encoding (legacy packed
//!   integers such as `101`, or dotted text such as `"1.0.1"`) under an
//!   operator, and formats packed versions for display.
//! - **[`dependency`]**: Parses `requires` edges like `"Bar>=1.0.0"`.
//! - **[`info`]** and **[`flags`]**: Module metadata and the persisted flag
//!   bitset.
//! - **[`catalog`]**: Known modules, installed rows and cached metadata
//!   ([`Catalog`]), behind the read-only [`ModuleCatalog`] trait.
//! - **[`resolver`]**: [`DependencyResolver`] answers "what is missing",
//!   "who requires this" and "what goes with it" questions.
//! - **[`installer`]** and **[`uninstaller`]**: The install and uninstall state
//!   machines, implemented on [`ModuleManager`].
//! - **[`locator`]** and **[`loader`]**: Discovery of module definition files
//!   and the installable index.
//! - **[`registry`]**: The persisted row store ([`RegistryStore`]).
//! - **[`permissions`]**, **[`hooks`]**, **[`fields`]**: Collaborators touched
//!   while installing and uninstalling.
//! - **[`notice`]**: Advisory notices raised alongside log records.
//! - **[`error`]**: [`ModuleSystemError`] and its [`ErrorKind`] tag.
pub mod catalog;
pub mod dependency;
pub mod error;
pub mod fields;
pub mod flags;
pub mod hooks;
pub mod info;
pub mod installer;
pub mod loader;
pub mod locator;
pub mod manager;
pub mod notice;
pub mod permissions;
pub mod registry;
pub mod resolver;
pub mod traits;
pub mod uninstaller;
pub mod version;

pub use catalog::{Catalog, ModuleCatalog};
pub use dependency::{DependencyEdge, DependencyError};
pub use error::{ErrorKind, ModuleSystemError};
pub use fields::{FieldMap, FieldUsage, NoFields};
pub use flags::ModuleFlags;
pub use hooks::{Hook, HookRegistry};
pub use info::{ModuleInfo, ModuleInfoBuilder};
pub use installer::InstallOptions;
pub use loader::{DeclarativeModuleFactory, ModuleDefinition};
pub use locator::FileLocator;
pub use manager::ModuleManager;
pub use notice::{Notice, NoticeLevel, Notices};
pub use permissions::{MemoryPermissionStore, Permission, PermissionError, PermissionStore};
pub use registry::{MemoryRegistryStore, RegistryRow, RegistryStore, StoreError};
pub use resolver::{DependencyResolver, EdgeStatus, VersionsMode};
pub use traits::{HookError, Module, ModuleContext, ModuleFactory};
pub use uninstaller::UninstallBlock;
pub use version::{ModuleVersion, VersionOperator};

// Test module declaration
#[cfg(test)]
mod tests;
