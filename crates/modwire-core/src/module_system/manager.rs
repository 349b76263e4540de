use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::kernel::error::Result;
use crate::kernel::runtime::RuntimeInfo;
use crate::module_system::catalog::{Catalog, ModuleCatalog};
use crate::module_system::error::ModuleSystemError;
use crate::module_system::fields::{FieldUsage, NoFields};
use crate::module_system::flags::ModuleFlags;
use crate::module_system::hooks::HookRegistry;
use crate::module_system::info::ModuleInfo;
use crate::module_system::loader::load_factory;
use crate::module_system::locator::FileLocator;
use crate::module_system::notice::Notices;
use crate::module_system::permissions::{MemoryPermissionStore, PermissionStore};
use crate::module_system::registry::RegistryStore;
use crate::module_system::resolver::{DependencyResolver, VersionsMode};
use crate::module_system::traits::{Module, ModuleContext, ModuleFactory};
use crate::storage::config::{ConfigData, EngineConfig};
use crate::storage::json_store::JsonRegistryStore;

/// Entry point to the module engine.
///
/// Owns the catalog, the installable index and every collaborator the
/// install and uninstall paths touch. Collaborators are injected, so tests
/// can swap in fakes.
pub struct ModuleManager {
    pub(crate) catalog: Catalog,
    pub(crate) locator: FileLocator,
    pub(crate) permissions: Box<dyn PermissionStore>,
    pub(crate) hooks: HookRegistry,
    pub(crate) fields: Box<dyn FieldUsage>,
    pub(crate) runtime: RuntimeInfo,
    pub(crate) notices: Notices,
    pub(crate) install_stack: Vec<String>,
    pub(crate) uninstall_stack: Vec<String>,
}

impl ModuleManager {
    /// Create a manager over `store`
    pub fn new(store: Box<dyn RegistryStore>, runtime: RuntimeInfo) -> std::result::Result<Self, ModuleSystemError> {
        Ok(Self {
            catalog: Catalog::new(store)?,
            locator: FileLocator::default(),
            permissions: Box::new(MemoryPermissionStore::new()),
            hooks: HookRegistry::new(),
            fields: Box::new(NoFields),
            runtime,
            notices: Notices::new(false),
            install_stack: Vec::new(),
            uninstall_stack: Vec::new(),
        })
    }

    /// Build a manager from configuration: open the registry file and scan
    /// the module directories.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let store = JsonRegistryStore::open(&config.registry_path)?;
        let mut manager = Self::new(Box::new(store), config.runtime.clone())?.with_debug(config.debug);
        for root in &config.module_paths {
            manager.locator.add_root(root.clone());
        }
        manager.discover()?;
        Ok(manager)
    }

    pub fn with_permissions(mut self, permissions: Box<dyn PermissionStore>) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_fields(mut self, fields: Box<dyn FieldUsage>) -> Self {
        self.fields = fields;
        self
    }

    /// Record debug notices as well as logging them
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.notices.set_debug(debug);
        self
    }

    /// Register a module implementation. Uninstalled modules become
    /// installable.
    pub fn register_module(&mut self, factory: Arc<dyn ModuleFactory>, file: Option<PathBuf>) {
        let class = factory.class_name().to_string();
        self.catalog.register(factory, file.clone());
        if !self.catalog.is_installed(&class) {
            self.locator.add_installable(&class, file);
        }
    }

    /// Scan the module directories and register every definition file found.
    /// Files that fail to parse are skipped with an error notice.
    pub fn discover(&mut self) -> Result<usize> {
        let found = self.locator.scan()?;
        let mut registered = 0;
        for (class, file) in found {
            match load_factory(&file) {
                Ok(factory) => {
                    self.register_module(Arc::new(factory), Some(file));
                    registered += 1;
                }
                Err(e) => self
                    .notices
                    .error(format!("Unable to load module '{}' from '{}': {}", class, file.display(), e)),
            }
        }
        log::debug!(
            "Registered {} module definition(s) from {} root(s)",
            registered,
            self.locator.roots().len()
        );
        Ok(registered)
    }

    /// Reload installed rows, clear cached metadata and rebuild the
    /// installable index
    pub fn refresh(&mut self) -> std::result::Result<(), ModuleSystemError> {
        self.catalog.refresh()?;
        let registered = self.catalog.registered();
        let catalog = &self.catalog;
        self.locator.rebuild(&registered, |class| catalog.is_installed(class));
        Ok(())
    }

    pub fn resolver(&self) -> DependencyResolver<'_> {
        DependencyResolver::new(&self.catalog, &self.runtime)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn locator(&self) -> &FileLocator {
        &self.locator
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    pub fn permissions(&self) -> &dyn PermissionStore {
        self.permissions.as_ref()
    }

    pub fn runtime(&self) -> &RuntimeInfo {
        &self.runtime
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }

    pub fn is_installed(&self, class: &str) -> bool {
        self.catalog.is_installed(class)
    }

    pub fn module_info(&self, class: &str) -> Option<ModuleInfo> {
        self.catalog.module_info(class)
    }

    pub fn requires(&self, class: &str, only_missing: bool, versions: VersionsMode) -> Vec<String> {
        self.resolver().requires(class, only_missing, versions)
    }

    pub fn requires_for_install(&self, class: &str) -> Vec<String> {
        self.resolver().requires_for_install(class)
    }

    pub fn required_by(&self, class: &str, include_uninstalled: bool, exclude_installs_owned: bool) -> Vec<String> {
        self.resolver().required_by(class, include_uninstalled, exclude_installs_owned)
    }

    pub fn requires_for_uninstall(&self, class: &str) -> Vec<String> {
        self.resolver().requires_for_uninstall(class)
    }

    pub fn uninstalls(&self, class: &str) -> Vec<String> {
        self.resolver().uninstalls(class)
    }

    pub fn dependency_errors(&self, class: &str) -> Vec<String> {
        self.resolver().dependency_errors(class)
    }

    /// Initialized instance of an installed module.
    ///
    /// Reuses the instance kept by [`ModuleManager::install`]; `init` runs
    /// once per instance.
    pub fn get_module(&mut self, class: &str) -> Option<Arc<dyn Module>> {
        if !self.catalog.is_installed(class) {
            return None;
        }
        let module = match self.catalog.instance(class) {
            Some(module) => module,
            None => {
                let module = self.catalog.new_module(class)?;
                self.catalog.set_instance(class, module.clone());
                module
            }
        };
        if !self.catalog.is_initialized(class) {
            let mut ctx = ModuleContext {
                class,
                module_id: self.catalog.module_id(class),
                hooks: &mut self.hooks,
                notices: &mut self.notices,
            };
            module.init(&mut ctx);
            self.catalog.mark_initialized(class);
        }
        Some(module)
    }

    /// Initialize every installed autoload module; returns how many were
    /// loaded
    pub fn boot(&mut self) -> usize {
        let autoload: Vec<String> = self
            .catalog
            .installed_classes()
            .into_iter()
            .filter(|class| {
                self.catalog
                    .row(class)
                    .is_some_and(|row| row.flags.contains(ModuleFlags::AUTOLOAD))
            })
            .collect();
        autoload
            .iter()
            .filter(|class| self.get_module(class).is_some())
            .count()
    }

    /// Stored configuration data of an installed module
    pub fn module_config(&self, class: &str) -> Option<ConfigData> {
        self.catalog.row(class).map(|row| row.data.clone())
    }

    /// Replace the stored configuration data of an installed module
    pub fn save_module_config(&mut self, class: &str, data: ConfigData) -> std::result::Result<(), ModuleSystemError> {
        if !self.catalog.is_installed(class) {
            return Err(ModuleSystemError::UnknownModule(class.to_string()));
        }
        self.catalog.update_data(class, data)?;
        log::debug!("Saved module config for '{}'", class);
        Ok(())
    }

    /// Flags stored for an installed module
    pub fn module_flags(&self, class: &str) -> Option<ModuleFlags> {
        self.catalog.row(class).map(|row| row.flags)
    }
}

impl fmt::Debug for ModuleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleManager")
            .field("catalog", &self.catalog)
            .field("installable", &self.locator.installable_classes())
            .field("hooks", &self.hooks.len())
            .field("runtime", &self.runtime)
            .finish()
    }
}
