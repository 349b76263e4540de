use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::module_system::hooks::HookRegistry;
use crate::module_system::info::ModuleInfo;
use crate::module_system::notice::Notices;
use crate::module_system::registry::StoreError;

/// Error raised by a module's install or uninstall hook.
///
/// `Database` marks a failure in the storage layer. An install that fails
/// this way keeps its registry row; any other failure rolls the row back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("{0}")]
    Failed(String),
}

impl From<StoreError> for HookError {
    fn from(err: StoreError) -> Self {
        HookError::Database(err.to_string())
    }
}

/// State handed to a module while it initializes or runs a lifecycle hook
pub struct ModuleContext<'a> {
    /// Class of the module being called
    pub class: &'a str,
    /// Registry id, once the module is installed
    pub module_id: Option<u64>,
    /// Hooks attached in the running system
    pub hooks: &'a mut HookRegistry,
    /// Notice buffer
    pub notices: &'a mut Notices,
}

impl<'a> ModuleContext<'a> {
    /// Attach a hook handled by this module: `self::to_method` runs when
    /// `from_class::method` is called.
    pub fn add_hook(&mut self, from_class: &str, method: &str, to_method: &str) -> u64 {
        self.hooks.add(from_class, method, self.class, to_method)
    }
}

impl fmt::Debug for ModuleContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleContext")
            .field("class", &self.class)
            .field("module_id", &self.module_id)
            .finish_non_exhaustive()
    }
}

/// Core trait that all modules implement.
///
/// Install and uninstall hooks are optional; the defaults do nothing.
pub trait Module: Send + Sync {
    /// Class name the module is registered under
    fn class_name(&self) -> &str;

    /// Only one instance may exist
    fn is_singular(&self) -> bool {
        false
    }

    /// Loaded on every boot
    fn is_autoload(&self) -> bool {
        false
    }

    /// Called once the module is instantiated for use
    fn init(&self, _ctx: &mut ModuleContext<'_>) {}

    /// Called once, right after the module's registry row is created
    fn on_install(&self, _ctx: &mut ModuleContext<'_>) -> Result<(), HookError> {
        Ok(())
    }

    /// Called once, before the module's registry row is deleted
    fn on_uninstall(&self, _ctx: &mut ModuleContext<'_>) -> Result<(), HookError> {
        Ok(())
    }
}

/// Source of module metadata and instances for one class
pub trait ModuleFactory: Send + Sync {
    /// Class name of the modules this factory produces
    fn class_name(&self) -> &str;

    /// Metadata the module declares
    fn module_info(&self) -> ModuleInfo;

    /// Create a new module instance
    fn create(&self) -> Arc<dyn Module>;
}
