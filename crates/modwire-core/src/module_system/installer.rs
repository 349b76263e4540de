use std::sync::Arc;

use crate::kernel::runtime::RuntimeInfo;
use crate::module_system::catalog::ModuleCatalog;
use crate::module_system::dependency::DependencyError;
use crate::module_system::error::ModuleSystemError;
use crate::module_system::flags::ModuleFlags;
use crate::module_system::manager::ModuleManager;
use crate::module_system::permissions::{is_valid_permission_name, sanitize_permission_name};
use crate::module_system::traits::{HookError, Module, ModuleContext};

/// Options for [`ModuleManager::install`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallOptions {
    /// Install missing required modules first
    pub dependencies: bool,
    /// Drop cached module metadata when done. Nested installs turn this off
    /// so the cache is reset once, by the outermost call.
    pub reset_cache: bool,
    /// Install even if requirements remain unmet, with a warning
    pub force: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            dependencies: true,
            reset_cache: true,
            force: false,
        }
    }
}

impl InstallOptions {
    pub fn force() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }

    pub fn without_dependencies() -> Self {
        Self {
            dependencies: false,
            ..Self::default()
        }
    }

    fn nested(self) -> Self {
        Self {
            reset_cache: false,
            ..self
        }
    }
}

impl ModuleManager {
    /// Whether `class` is indexed as installable and has an implementation.
    /// With `now`, its requirements must also already be met.
    pub fn is_installable(&self, class: &str, now: bool) -> bool {
        if !self.locator.is_indexed(class) || !self.catalog.has_class(class) {
            return false;
        }
        !now || self.resolver().requires_for_install(class).is_empty()
    }

    /// Install `class` and return the new module instance.
    ///
    /// Missing requirements are installed first when `options.dependencies`
    /// is set. Requirements still unmet afterwards abort the install before
    /// anything is written, unless `options.force` is set.
    ///
    /// Failures of permission installs and of the modules listed in
    /// `installs` are recorded as error notices and do not fail the call.
    pub fn install(&mut self, class: &str, options: InstallOptions) -> Result<Arc<dyn Module>, ModuleSystemError> {
        if let Some(pos) = self.install_stack.iter().position(|c| c == class) {
            let mut cycle = self.install_stack[pos..].to_vec();
            cycle.push(class.to_string());
            return Err(DependencyError::CyclicDependency(cycle).into());
        }
        if !self.is_installable(class, false) {
            if !self.catalog.has_class(class) && !self.catalog.is_installed(class) {
                return Err(ModuleSystemError::UnknownModule(class.to_string()));
            }
            return Err(ModuleSystemError::NotInstallable { class: class.to_string() });
        }

        self.install_stack.push(class.to_string());
        let result = self.install_module(class, options);
        self.install_stack.pop();
        result
    }

    fn install_module(&mut self, class: &str, options: InstallOptions) -> Result<Arc<dyn Module>, ModuleSystemError> {
        let mut requires = self.resolver().requires_for_install(class);
        let mut detail = String::new();

        if !requires.is_empty() && options.dependencies {
            let missing = self.resolver().missing_edges(class);
            for edge in missing {
                let target = edge.target;
                if RuntimeInfo::is_pseudo_module(&target) || self.catalog.is_installed(&target) {
                    continue;
                }
                if !self.is_installable(&target, false) {
                    detail.push_str(&format!(" Unable to install required module - {}.", target));
                    continue;
                }
                match self.install(&target, options.nested()) {
                    Ok(_) => log::info!("Installed module '{}' required by '{}'", target, class),
                    Err(e @ ModuleSystemError::Dependency(DependencyError::CyclicDependency(_))) => return Err(e),
                    Err(e) => {
                        log::warn!("Required module '{}' failed to install: {}", target, e);
                        detail.push_str(&format!(" Unable to install required module - {}.", target));
                    }
                }
            }
            requires = self.resolver().requires_for_install(class);
        }

        if !requires.is_empty() {
            let unmet = ModuleSystemError::UnmetDependency {
                class: class.to_string(),
                requires,
                detail,
            };
            if !options.force {
                return Err(unmet);
            }
            self.notices.warning(format!("Warning! {}", unmet));
        }

        let module = self
            .catalog
            .new_module(class)
            .ok_or_else(|| ModuleSystemError::UnknownModule(class.to_string()))?;
        let info = self.catalog.module_info(class).unwrap_or_default();

        let mut flags = ModuleFlags::empty();
        flags.set(ModuleFlags::SINGULAR, info.singular.unwrap_or_else(|| module.is_singular()));
        flags.set(ModuleFlags::AUTOLOAD, info.autoload.unwrap_or_else(|| module.is_autoload()));
        flags.set(ModuleFlags::PERMANENT, info.permanent);
        flags.set(ModuleFlags::NO_FILE, self.catalog.entry_file(class).is_none());

        let row = self.catalog.insert_row(class, flags)?;
        self.locator.remove_installable(class);

        let hook_result = {
            let mut ctx = ModuleContext {
                class,
                module_id: Some(row.id),
                hooks: &mut self.hooks,
                notices: &mut self.notices,
            };
            module.on_install(&mut ctx)
        };
        match hook_result {
            Ok(()) => {}
            Err(HookError::Database(message)) => {
                log::error!("Module reported error during install ({}): {}", class, message);
                self.notices
                    .warning(format!("Module reported error during install ({}): {}", class, message));
            }
            Err(HookError::Failed(message)) => {
                self.rollback_install(class);
                self.notices
                    .error(format!("Unable to install module ({}): {}", class, message));
                return Err(ModuleSystemError::InstallFailure {
                    class: class.to_string(),
                    message,
                });
            }
        }

        // Kept so `get_module` hands out the instance that ran `on_install`
        self.catalog.set_instance(class, module.clone());

        for (name, title) in &info.permissions {
            let name = sanitize_permission_name(name);
            if !is_valid_permission_name(&name) || self.permissions.get(&name).is_some() {
                continue;
            }
            match self.permissions.add(&name, title) {
                Ok(_) => self.notices.message(format!("Added Permission: {}", name)),
                Err(source) => {
                    let err = ModuleSystemError::PermissionInstall { name, source };
                    self.notices.error(format!("{} ({})", err, err.kind()));
                }
            }
        }

        for name in &info.installs {
            // Still on the stack means an outer call is installing it
            if self.catalog.is_installed(name) || self.install_stack.contains(name) {
                continue;
            }
            match self.install(name, options.nested()) {
                Ok(_) => self.notices.message(format!("Module Auto Install: {}", name)),
                Err(source) => {
                    let err = ModuleSystemError::AutoInstall {
                        class: name.clone(),
                        source: Box::new(source),
                    };
                    self.notices.error(err.to_string());
                }
            }
        }

        log::info!("Installed module '{}'", class);
        self.notices.message(format!("Installed module: {}", class));

        if options.reset_cache {
            self.catalog.clear_info_cache();
        }
        Ok(module)
    }

    /// Undo a failed install: drop the row and any hooks the module attached
    fn rollback_install(&mut self, class: &str) {
        if let Err(e) = self.catalog.delete_row(class) {
            log::error!("Unable to remove registry row for '{}': {}", class, e);
        }
        self.catalog.remove_instance(class);
        for hook in self.hooks.involving(class) {
            self.hooks.remove(hook.id);
        }
        let file = self.catalog.entry_file(class).map(|f| f.to_path_buf());
        self.locator.add_installable(class, file);
    }
}
