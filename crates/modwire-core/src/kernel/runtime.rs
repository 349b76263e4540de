use serde::{Deserialize, Serialize};

use crate::kernel::constants;

/// Versions of the running environment.
///
/// Requirements on the `PHP` and `ProcessWire` pseudo-modules are checked
/// against these values instead of the module catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeInfo {
    /// Version reported for the `PHP` pseudo-module
    pub php_version: String,
    /// Version reported for the `ProcessWire` pseudo-module
    pub core_version: String,
}

impl RuntimeInfo {
    pub fn new(php_version: &str, core_version: &str) -> Self {
        Self {
            php_version: php_version.to_string(),
            core_version: core_version.to_string(),
        }
    }

    /// Returns the runtime version for a pseudo-module name, or `None` when
    /// the name refers to an ordinary module.
    pub fn pseudo_module_version(&self, class: &str) -> Option<&str> {
        match class {
            constants::PSEUDO_MODULE_PHP => Some(&self.php_version),
            constants::PSEUDO_MODULE_CORE => Some(&self.core_version),
            _ => None,
        }
    }

    /// Whether a class name is one of the pseudo-modules
    pub fn is_pseudo_module(class: &str) -> bool {
        class == constants::PSEUDO_MODULE_PHP || class == constants::PSEUDO_MODULE_CORE
    }
}

impl Default for RuntimeInfo {
    fn default() -> Self {
        Self::new(constants::DEFAULT_PHP_VERSION, constants::DEFAULT_CORE_VERSION)
    }
}
