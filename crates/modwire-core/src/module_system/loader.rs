use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::kernel::constants::MODULE_FILE_MARKER;
use crate::module_system::info::ModuleInfo;
use crate::module_system::traits::{Module, ModuleContext, ModuleFactory};
use crate::storage::config::{load_file, ConfigFormat};
use crate::storage::error::StorageSystemError;

/// Hook declared in a definition file; the module handles it with
/// `to_method`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookDefinition {
    pub from: String,
    pub method: String,
    pub to_method: String,
}

/// Contents of a `<Class>.module.<ext>` definition file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleDefinition {
    #[serde(flatten)]
    pub info: ModuleInfo,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hooks: Vec<HookDefinition>,
}

/// Class name defined by a file named `<Class>.module.<ext>`, where `ext`
/// is a supported configuration format
pub fn definition_class(path: &Path) -> Option<String> {
    ConfigFormat::from_path(path)?;
    let stem = path.file_stem()?.to_str()?;
    let class = stem.strip_suffix(MODULE_FILE_MARKER)?;
    let valid = !class.is_empty() && class.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then(|| class.to_string())
}

/// Parse a definition file
pub fn load_definition(path: &Path) -> Result<ModuleDefinition, StorageSystemError> {
    load_file(path)
}

/// Load a definition file into a factory
pub fn load_factory(path: &Path) -> Result<DeclarativeModuleFactory, StorageSystemError> {
    let class = definition_class(path).ok_or_else(|| StorageSystemError::InvalidPath {
        path: path.to_path_buf(),
        reason: "not a module definition file".to_string(),
    })?;
    let definition = load_definition(path)?;
    Ok(DeclarativeModuleFactory::new(&class, definition))
}

/// Factory for a module defined entirely by its definition file
#[derive(Debug, Clone)]
pub struct DeclarativeModuleFactory {
    class: String,
    definition: ModuleDefinition,
}

impl DeclarativeModuleFactory {
    pub fn new(class: &str, definition: ModuleDefinition) -> Self {
        Self {
            class: class.to_string(),
            definition,
        }
    }

    pub fn definition(&self) -> &ModuleDefinition {
        &self.definition
    }
}

impl ModuleFactory for DeclarativeModuleFactory {
    fn class_name(&self) -> &str {
        &self.class
    }

    fn module_info(&self) -> ModuleInfo {
        self.definition.info.clone()
    }

    fn create(&self) -> Arc<dyn Module> {
        Arc::new(DeclarativeModule {
            class: self.class.clone(),
            singular: self.definition.info.singular.unwrap_or(false),
            autoload: self.definition.info.autoload.unwrap_or(false),
            hooks: self.definition.hooks.clone(),
        })
    }
}

/// Module with no code; its install and uninstall hooks do nothing
#[derive(Debug)]
pub struct DeclarativeModule {
    class: String,
    singular: bool,
    autoload: bool,
    hooks: Vec<HookDefinition>,
}

impl Module for DeclarativeModule {
    fn class_name(&self) -> &str {
        &self.class
    }

    fn is_singular(&self) -> bool {
        self.singular
    }

    fn is_autoload(&self) -> bool {
        self.autoload
    }

    fn init(&self, ctx: &mut ModuleContext<'_>) {
        for hook in &self.hooks {
            ctx.add_hook(&hook.from, &hook.method, &hook.to_method);
        }
    }
}
