use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::module_system::dependency::DependencyEdge;
use crate::module_system::version::{ModuleVersion, VersionOperator};

/// Metadata a module declares about itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleInfo {
    /// Human-readable title
    pub title: String,

    /// One-line description
    pub summary: String,

    /// Module version (packed integer or dotted text)
    pub version: ModuleVersion,

    /// Modules (or pseudo-modules) that must be installed first
    pub requires: Vec<DependencyEdge>,

    /// Modules installed alongside this one and removed with it
    pub installs: Vec<String>,

    /// Permissions created on install, name to title
    pub permissions: BTreeMap<String, String>,

    /// Module cannot be uninstalled
    pub permanent: bool,

    /// Overrides the module's own singular declaration
    pub singular: Option<bool>,

    /// Overrides the module's own autoload declaration
    pub autoload: Option<bool>,

    /// Module provides a field type; it cannot be removed while fields use it
    pub fieldtype: bool,
}

impl ModuleInfo {
    /// Create metadata with a title and version
    pub fn new(title: &str, version: impl Into<ModuleVersion>) -> Self {
        Self {
            title: title.to_string(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Whether `class` appears as a `requires` target
    pub fn requires_class(&self, class: &str) -> bool {
        self.requires.iter().any(|edge| edge.target == class)
    }

    /// Class names of all `requires` targets, in declaration order
    pub fn required_classes(&self) -> Vec<String> {
        self.requires.iter().map(|edge| edge.target.clone()).collect()
    }

    /// Map of required class to its operator and version constraint
    pub fn requires_versions(&self) -> BTreeMap<String, (VersionOperator, Option<String>)> {
        self.requires
            .iter()
            .map(|edge| (edge.target.clone(), (edge.operator.clone(), edge.version.clone())))
            .collect()
    }

    /// Whether `class` appears in the `installs` list
    pub fn installs_class(&self, class: &str) -> bool {
        self.installs.iter().any(|name| name == class)
    }
}

/// Builder for creating module metadata
pub struct ModuleInfoBuilder {
    info: ModuleInfo,
}

impl ModuleInfoBuilder {
    /// Create a new builder
    pub fn new(title: &str) -> Self {
        Self {
            info: ModuleInfo::new(title, ModuleVersion::default()),
        }
    }

    pub fn summary(mut self, summary: &str) -> Self {
        self.info.summary = summary.to_string();
        self
    }

    pub fn version(mut self, version: impl Into<ModuleVersion>) -> Self {
        self.info.version = version.into();
        self
    }

    /// Add a requirement edge
    pub fn requires(mut self, edge: DependencyEdge) -> Self {
        self.info.requires.push(edge);
        self
    }

    /// Add a module to the `installs` list
    pub fn installs(mut self, class: &str) -> Self {
        self.info.installs.push(class.to_string());
        self
    }

    /// Declare a permission created on install
    pub fn permission(mut self, name: &str, title: &str) -> Self {
        self.info.permissions.insert(name.to_string(), title.to_string());
        self
    }

    pub fn permanent(mut self, permanent: bool) -> Self {
        self.info.permanent = permanent;
        self
    }

    pub fn singular(mut self, singular: bool) -> Self {
        self.info.singular = Some(singular);
        self
    }

    pub fn autoload(mut self, autoload: bool) -> Self {
        self.info.autoload = Some(autoload);
        self
    }

    pub fn fieldtype(mut self, fieldtype: bool) -> Self {
        self.info.fieldtype = fieldtype;
        self
    }

    /// Build the metadata
    pub fn build(self) -> ModuleInfo {
        self.info
    }
}
