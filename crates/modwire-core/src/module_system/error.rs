//! # Modwire Module System Errors
//!
//! Defines [`ModuleSystemError`], the single outcome type shared by dependency
//! resolution and the install and uninstall paths, and [`ErrorKind`], a
//! coarse tag for each variant.
//!
//! The public edges differ: [`install`](crate::ModuleManager::install) returns
//! these errors, while [`uninstall`](crate::ModuleManager::uninstall) turns a
//! blocked uninstall into `Ok(false)` and only surfaces failures raised by the
//! module's own uninstall hook.
use std::fmt;

use crate::module_system::dependency::DependencyError;
use crate::module_system::permissions::PermissionError;
use crate::module_system::registry::StoreError;
use crate::module_system::uninstaller::UninstallBlock;

/// Coarse classification of a [`ModuleSystemError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnmetDependency,
    NotInstallable,
    ModuleInstallFailure,
    PermissionInstallFailure,
    AutoInstallFailure,
    UninstallBlocked,
    ModuleUninstallFailure,
    CyclicDependency,
    InvalidRequirement,
    UnknownModule,
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModuleSystemError {
    #[error("Module {class} requires: {list}{detail}", list = .requires.join(", "))]
    UnmetDependency {
        class: String,
        requires: Vec<String>,
        detail: String,
    },

    #[error("Module '{class}' is not installable")]
    NotInstallable { class: String },

    #[error("Unknown module '{0}'")]
    UnknownModule(String),

    #[error("Unable to install module '{class}': {message}")]
    InstallFailure { class: String, message: String },

    #[error("Error adding permission: {name}")]
    PermissionInstall {
        name: String,
        #[source]
        source: PermissionError,
    },

    #[error("Unable to auto-install module '{class}': {source}")]
    AutoInstall {
        class: String,
        #[source]
        source: Box<ModuleSystemError>,
    },

    #[error("Module '{class}' cannot be uninstalled: {reason}")]
    UninstallBlocked { class: String, reason: UninstallBlock },

    #[error("Unable to uninstall module '{class}': {message}")]
    UninstallFailure { class: String, message: String },

    #[error(transparent)]
    Dependency(#[from] DependencyError),

    #[error("Registry error: {0}")]
    Store(#[from] StoreError),
}

impl ModuleSystemError {
    /// Tag describing which step failed
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModuleSystemError::UnmetDependency { .. } => ErrorKind::UnmetDependency,
            ModuleSystemError::NotInstallable { .. } => ErrorKind::NotInstallable,
            ModuleSystemError::UnknownModule(_) => ErrorKind::UnknownModule,
            ModuleSystemError::InstallFailure { .. } => ErrorKind::ModuleInstallFailure,
            ModuleSystemError::PermissionInstall { .. } => ErrorKind::PermissionInstallFailure,
            ModuleSystemError::AutoInstall { .. } => ErrorKind::AutoInstallFailure,
            ModuleSystemError::UninstallBlocked { .. } => ErrorKind::UninstallBlocked,
            ModuleSystemError::UninstallFailure { .. } => ErrorKind::ModuleUninstallFailure,
            ModuleSystemError::Dependency(DependencyError::CyclicDependency(_)) => ErrorKind::CyclicDependency,
            ModuleSystemError::Dependency(DependencyError::InvalidRequirement(_)) => ErrorKind::InvalidRequirement,
            ModuleSystemError::Store(_) => ErrorKind::Storage,
        }
    }
}
