use std::fmt;

use crate::kernel::constants::UNINSTALL_METHOD;
use crate::module_system::catalog::ModuleCatalog;
use crate::module_system::error::ModuleSystemError;
use crate::module_system::flags::ModuleFlags;
use crate::module_system::hooks::Hook;
use crate::module_system::info::ModuleInfo;
use crate::module_system::manager::ModuleManager;
use crate::module_system::permissions::{is_valid_permission_name, sanitize_permission_name};
use crate::module_system::traits::ModuleContext;

/// Reason a module cannot be uninstalled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallBlock {
    NotInstalled,
    /// Already being uninstalled further up the current call
    InProgress,
    Permanent,
    /// Installed modules that require it
    RequiredBy(Vec<String>),
    /// Fields using the field type it provides
    FieldtypeInUse(Vec<String>),
}

impl fmt::Display for UninstallBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UninstallBlock::NotInstalled => write!(f, "Module is not already installed"),
            UninstallBlock::InProgress => write!(f, "Module is already being uninstalled"),
            UninstallBlock::Permanent => write!(f, "Module is permanent"),
            UninstallBlock::RequiredBy(names) => write!(
                f,
                "Module is required by other modules that must be removed first ({})",
                names.join(", ")
            ),
            UninstallBlock::FieldtypeInUse(fields) => write!(
                f,
                "This module is a Fieldtype currently in use by one or more fields ({})",
                fields.join(", ")
            ),
        }
    }
}

impl ModuleManager {
    /// Why `class` cannot be uninstalled right now, if anything blocks it
    pub fn uninstall_blocker(&self, class: &str) -> Option<UninstallBlock> {
        let Some(row) = self.catalog.row(class) else {
            return Some(UninstallBlock::NotInstalled);
        };
        if self.uninstall_stack.iter().any(|c| c == class) {
            return Some(UninstallBlock::InProgress);
        }
        let info = self.catalog.module_info(class).unwrap_or_default();
        if info.permanent || row.flags.contains(ModuleFlags::PERMANENT) {
            return Some(UninstallBlock::Permanent);
        }
        let required_by = self.resolver().requires_for_uninstall(class);
        if !required_by.is_empty() {
            return Some(UninstallBlock::RequiredBy(required_by));
        }
        if info.fieldtype {
            let fields = self.fields.fields_using(class);
            if !fields.is_empty() {
                return Some(UninstallBlock::FieldtypeInUse(fields));
            }
        }
        None
    }

    pub fn is_uninstallable(&self, class: &str) -> bool {
        self.uninstall_blocker(class).is_none()
    }

    /// Uninstall `class`.
    ///
    /// Returns `Ok(false)` when something blocks the uninstall; nothing is
    /// changed in that case. Errors come only from the module's own
    /// uninstall hook or from the registry store.
    pub fn uninstall(&mut self, class: &str) -> Result<bool, ModuleSystemError> {
        match self.try_uninstall(class) {
            Ok(()) => Ok(true),
            Err(ModuleSystemError::UninstallBlocked { class, reason }) => {
                log::info!("Module '{}' not uninstalled: {}", class, reason);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn try_uninstall(&mut self, class: &str) -> Result<(), ModuleSystemError> {
        if let Some(reason) = self.uninstall_blocker(class) {
            return Err(ModuleSystemError::UninstallBlocked {
                class: class.to_string(),
                reason,
            });
        }

        let info = self.catalog.module_info(class).unwrap_or_default();
        self.uninstall_stack.push(class.to_string());
        let result = self.uninstall_module(class, &info);
        self.uninstall_stack.pop();
        result
    }

    fn uninstall_module(&mut self, class: &str, info: &ModuleInfo) -> Result<(), ModuleSystemError> {
        let uninstalls = self.resolver().uninstalls(class);
        for name in uninstalls {
            match self.try_uninstall(&name) {
                Ok(()) => self.notices.message(format!("Module Auto Uninstall: {}", name)),
                Err(e) => self
                    .notices
                    .error(format!("Unable to auto-uninstall module '{}': {}", name, e)),
            }
        }

        let module = self
            .catalog
            .instance(class)
            .or_else(|| self.catalog.new_module(class));

        for hook in self.hooks.involving(class) {
            if is_uninstall_hook(&hook) {
                continue;
            }
            self.hooks.remove(hook.id);
            self.notices.debug(format!(
                "Removed hook {}::{} => {}::{}",
                hook.from_class, hook.method, hook.to_class, hook.to_method
            ));
        }

        if let Some(module) = module {
            let mut ctx = ModuleContext {
                class,
                module_id: self.catalog.module_id(class),
                hooks: &mut self.hooks,
                notices: &mut self.notices,
            };
            module
                .on_uninstall(&mut ctx)
                .map_err(|e| ModuleSystemError::UninstallFailure {
                    class: class.to_string(),
                    message: e.to_string(),
                })?;
        }

        for hook in self.hooks.involving(class) {
            self.hooks.remove(hook.id);
        }

        self.catalog.delete_row(class)?;
        self.catalog.remove_instance(class);

        if self.catalog.has_class(class) {
            let file = self.catalog.entry_file(class).map(|f| f.to_path_buf());
            self.locator.add_installable(class, file);
        }

        for name in info.permissions.keys() {
            let name = sanitize_permission_name(name);
            if !is_valid_permission_name(&name) {
                continue;
            }
            match self.permissions.delete(&name) {
                Ok(true) => self.notices.message(format!("Deleted Permission: {}", name)),
                Ok(false) => {}
                Err(e) => {
                    log::error!("{}", e);
                    self.notices.error(format!("Error deleting permission: {}", name));
                }
            }
        }

        log::info!("Uninstalled module '{}'", class);
        self.notices.message(format!("Uninstalled module: {}", class));

        // The row is already gone; a failed reload must not report the
        // uninstall as failed
        if let Err(e) = self.refresh() {
            self.notices
                .error(format!("Unable to refresh modules after uninstalling '{}': {}", class, e));
        }
        Ok(())
    }
}

fn is_uninstall_hook(hook: &Hook) -> bool {
    hook.method == UNINSTALL_METHOD || hook.to_method == UNINSTALL_METHOD
}
