use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::module_system::flags::ModuleFlags;
use crate::module_system::info::ModuleInfo;
use crate::module_system::registry::{rows_by_class, RegistryRow, RegistryStore, StoreError};
use crate::module_system::traits::{Module, ModuleFactory};
use crate::storage::config::ConfigData;

/// Read-only view of known modules, as consumed by dependency resolution.
pub trait ModuleCatalog {
    /// Whether `class` has a registry row
    fn is_installed(&self, class: &str) -> bool;

    /// Metadata for `class`, if it is known
    fn module_info(&self, class: &str) -> Option<ModuleInfo>;

    /// Every known class, installed or not
    fn module_classes(&self) -> Vec<String>;

    /// Version of `class` in comparable form
    fn module_version(&self, class: &str) -> Option<String> {
        self.module_info(class).map(|info| info.version.compare_string())
    }
}

struct CatalogEntry {
    factory: Arc<dyn ModuleFactory>,
    file: Option<PathBuf>,
}

/// Known module factories plus the installed rows loaded from a registry
/// store.
///
/// Module metadata is cached on first use; [`Catalog::clear_info_cache`]
/// drops it.
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
    rows: BTreeMap<String, RegistryRow>,
    store: Box<dyn RegistryStore>,
    info_cache: RefCell<HashMap<String, ModuleInfo>>,
    instances: HashMap<String, Arc<dyn Module>>,
    // Instances whose `init` has run
    initialized: HashSet<String>,
}

impl Catalog {
    /// Create a catalog backed by `store`, loading its rows
    pub fn new(store: Box<dyn RegistryStore>) -> Result<Self, StoreError> {
        let rows = rows_by_class(store.rows()?);
        Ok(Self {
            entries: BTreeMap::new(),
            rows,
            store,
            info_cache: RefCell::new(HashMap::new()),
            instances: HashMap::new(),
            initialized: HashSet::new(),
        })
    }

    /// Register a factory; an existing factory for the same class is replaced
    pub fn register(&mut self, factory: Arc<dyn ModuleFactory>, file: Option<PathBuf>) {
        let class = factory.class_name().to_string();
        self.info_cache.borrow_mut().remove(&class);
        self.instances.remove(&class);
        self.initialized.remove(&class);
        if self.entries.insert(class.clone(), CatalogEntry { factory, file }).is_some() {
            log::debug!("Replaced factory for module '{}'", class);
        }
    }

    /// Whether a factory is registered for `class`
    pub fn has_class(&self, class: &str) -> bool {
        self.entries.contains_key(class)
    }

    /// Definition file registered with the factory
    pub fn entry_file(&self, class: &str) -> Option<&Path> {
        self.entries.get(class).and_then(|e| e.file.as_deref())
    }

    /// Every registered class with its definition file
    pub fn registered(&self) -> Vec<(String, Option<PathBuf>)> {
        self.entries
            .iter()
            .map(|(class, entry)| (class.clone(), entry.file.clone()))
            .collect()
    }

    /// Metadata straight from the factory, bypassing the cache
    pub fn module_info_fresh(&self, class: &str) -> Option<ModuleInfo> {
        self.entries.get(class).map(|e| e.factory.module_info())
    }

    pub fn clear_info_cache(&self) {
        self.info_cache.borrow_mut().clear();
    }

    /// Registry id of an installed module
    pub fn module_id(&self, class: &str) -> Option<u64> {
        self.rows.get(class).map(|r| r.id)
    }

    pub fn row(&self, class: &str) -> Option<&RegistryRow> {
        self.rows.get(class)
    }

    /// Installed classes in name order
    pub fn installed_classes(&self) -> Vec<String> {
        self.rows.keys().cloned().collect()
    }

    pub(crate) fn insert_row(&mut self, class: &str, flags: ModuleFlags) -> Result<RegistryRow, StoreError> {
        let row = self.store.insert(class, flags, ConfigData::new())?;
        self.rows.insert(class.to_string(), row.clone());
        Ok(row)
    }

    pub(crate) fn delete_row(&mut self, class: &str) -> Result<bool, StoreError> {
        let Some(row) = self.rows.get(class) else {
            return Ok(false);
        };
        self.store.delete(row.id)?;
        self.rows.remove(class);
        Ok(true)
    }

    pub(crate) fn update_data(&mut self, class: &str, data: ConfigData) -> Result<(), StoreError> {
        let row = self
            .rows
            .get_mut(class)
            .ok_or_else(|| StoreError::Backend(format!("Module '{}' is not installed", class)))?;
        self.store.update_data(row.id, data.clone())?;
        row.data = data;
        Ok(())
    }

    /// Create a fresh module instance without initializing it
    pub fn new_module(&self, class: &str) -> Option<Arc<dyn Module>> {
        self.entries.get(class).map(|e| e.factory.create())
    }

    /// Instance already created for use, if any
    pub fn instance(&self, class: &str) -> Option<Arc<dyn Module>> {
        self.instances.get(class).cloned()
    }

    pub(crate) fn set_instance(&mut self, class: &str, module: Arc<dyn Module>) {
        self.initialized.remove(class);
        self.instances.insert(class.to_string(), module);
    }

    pub(crate) fn remove_instance(&mut self, class: &str) -> Option<Arc<dyn Module>> {
        self.initialized.remove(class);
        self.instances.remove(class)
    }

    pub(crate) fn is_initialized(&self, class: &str) -> bool {
        self.initialized.contains(class)
    }

    pub(crate) fn mark_initialized(&mut self, class: &str) {
        self.initialized.insert(class.to_string());
    }

    /// Reload rows from the store and drop cached metadata
    pub fn refresh(&mut self) -> Result<(), StoreError> {
        self.rows = rows_by_class(self.store.rows()?);
        self.clear_info_cache();
        Ok(())
    }
}

impl ModuleCatalog for Catalog {
    fn is_installed(&self, class: &str) -> bool {
        self.rows.contains_key(class)
    }

    fn module_info(&self, class: &str) -> Option<ModuleInfo> {
        if let Some(info) = self.info_cache.borrow().get(class) {
            return Some(info.clone());
        }
        let info = self.module_info_fresh(class)?;
        self.info_cache.borrow_mut().insert(class.to_string(), info.clone());
        Some(info)
    }

    fn module_classes(&self) -> Vec<String> {
        let classes: BTreeSet<String> = self.entries.keys().chain(self.rows.keys()).cloned().collect();
        classes.into_iter().collect()
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("classes", &self.entries.keys().collect::<Vec<_>>())
            .field("installed", &self.rows.keys().collect::<Vec<_>>())
            .field("store", &self.store)
            .finish()
    }
}
