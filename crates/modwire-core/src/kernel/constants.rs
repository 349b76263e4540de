/// Application name
pub const APP_NAME: &str = "modwire";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Pseudo-module whose version is the language runtime version
pub const PSEUDO_MODULE_PHP: &str = "PHP";

/// Pseudo-module whose version is the core framework version
pub const PSEUDO_MODULE_CORE: &str = "ProcessWire";

/// Runtime version reported for `PHP` when nothing is configured
pub const DEFAULT_PHP_VERSION: &str = "8.2.0";

/// Core version reported for `ProcessWire` when nothing is configured
pub const DEFAULT_CORE_VERSION: &str = "3.0.229";

/// Default configuration file looked up by the CLI
pub const DEFAULT_CONFIG_FILE: &str = "modwire.toml";

/// Default registry file (relative to the working directory)
pub const DEFAULT_REGISTRY_FILE: &str = "modwire-registry.json";

/// Default directory scanned for module definition files
pub const DEFAULT_MODULES_DIR: &str = "modules";

/// Marker that precedes the format extension of a module definition file,
/// e.g. `Foo.module.json`
pub const MODULE_FILE_MARKER: &str = ".module";

/// Hook method name that survives hook teardown until the module's own
/// uninstall hook has run
pub const UNINSTALL_METHOD: &str = "uninstall";
