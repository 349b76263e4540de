#![cfg(test)]

use std::fs;
use std::path::Path;

use tempfile::tempdir;

use crate::module_system::catalog::ModuleCatalog;
use crate::module_system::flags::ModuleFlags;
use crate::module_system::installer::InstallOptions;
use crate::module_system::manager::ModuleManager;
use crate::storage::config::{ConfigData, EngineConfig};

fn write_modules(dir: &Path) {
    let modules = dir.join("modules");
    fs::create_dir_all(modules.join("blog")).unwrap();
    fs::write(
        modules.join("blog/Blog.module.json"),
        r#"{
            "title": "Blog",
            "version": 102,
            "requires": ["ProcessWire>=3.0.0", "Comments"],
            "installs": ["BlogWidgets"],
            "permissions": { "blog-edit": "Edit blog posts" },
            "autoload": true,
            "hooks": [{ "from": "Pages", "method": "save", "to_method": "afterSave" }]
        }"#,
    )
    .unwrap();
    fs::write(
        modules.join("blog/BlogWidgets.module.toml"),
        "title = \"Blog widgets\"\nversion = \"1.1.0\"\nrequires = [\"Blog\"]\n",
    )
    .unwrap();
    fs::write(
        modules.join("Comments.module.yaml"),
        "title: Comments\nversion: 3\nsingular: true\n",
    )
    .unwrap();
}

fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("modwire.json");
    fs::write(
        &path,
        r#"{
            "runtime": { "php_version": "8.3.1", "core_version": "3.0.240" },
            "registry_path": "var/registry.json",
            "module_paths": ["modules"]
        }"#,
    )
    .unwrap();
    path
}

#[test]
fn test_discovered_modules_install_and_persist() {
    let dir = tempdir().unwrap();
    write_modules(dir.path());
    let config = EngineConfig::load(&write_config(dir.path())).unwrap();

    let mut manager = ModuleManager::from_config(&config).unwrap();
    assert_eq!(
        manager.locator().installable_classes(),
        vec!["Blog", "BlogWidgets", "Comments"]
    );

    manager.install("Blog", InstallOptions::default()).unwrap();
    assert!(manager.is_installed("Comments"));
    assert!(manager.is_installed("BlogWidgets"));
    assert!(manager.permissions().get("blog-edit").is_some());
    assert!(config.registry_path.exists());

    let flags = manager.module_flags("Blog").unwrap();
    assert!(flags.contains(ModuleFlags::AUTOLOAD));
    assert!(!flags.contains(ModuleFlags::NO_FILE));
    assert!(manager.module_flags("Comments").unwrap().contains(ModuleFlags::SINGULAR));

    // A second manager over the same files sees the installed rows
    let mut reopened = ModuleManager::from_config(&config).unwrap();
    assert!(reopened.is_installed("Blog"));
    assert!(reopened.locator().installable_classes().is_empty());
    assert_eq!(reopened.boot(), 1);
    assert_eq!(reopened.hooks().hooks_to("Blog").len(), 1);
}

#[test]
fn test_uninstall_tears_down_discovered_module() {
    let dir = tempdir().unwrap();
    write_modules(dir.path());
    let config = EngineConfig::load(&write_config(dir.path())).unwrap();

    let mut manager = ModuleManager::from_config(&config).unwrap().with_debug(true);
    manager.install("Blog", InstallOptions::default()).unwrap();
    manager.boot();
    assert_eq!(manager.hooks().len(), 1);

    assert!(!manager.uninstall("Comments").unwrap(), "Blog still requires Comments");
    assert!(manager.uninstall("Blog").unwrap());

    assert!(!manager.is_installed("Blog"));
    assert!(!manager.is_installed("BlogWidgets"));
    assert!(manager.is_installed("Comments"));
    assert!(manager.hooks().is_empty());
    assert!(manager.notices().contains("Removed hook Pages::save => Blog::afterSave"));
    assert!(manager.is_installable("Blog", false));
    assert!(manager.is_installable("BlogWidgets", false));

    let reopened = ModuleManager::from_config(&config).unwrap();
    assert_eq!(reopened.catalog().installed_classes(), vec!["Comments"]);
}

#[test]
fn test_module_config_persists() {
    let dir = tempdir().unwrap();
    write_modules(dir.path());
    let config = EngineConfig::load(&write_config(dir.path())).unwrap();

    let mut manager = ModuleManager::from_config(&config).unwrap();
    manager.install("Comments", InstallOptions::default()).unwrap();
    let mut data = ConfigData::new();
    data.set("per_page", 25).unwrap();
    manager.save_module_config("Comments", data).unwrap();

    let reopened = ModuleManager::from_config(&config).unwrap();
    let data = reopened.module_config("Comments").unwrap();
    assert_eq!(data.get::<u32>("per_page"), Some(25));
    assert!(reopened.module_config("Blog").is_none());
}

#[test]
fn test_runtime_versions_checked_from_config() {
    let dir = tempdir().unwrap();
    write_modules(dir.path());
    fs::write(
        dir.path().join("modules/Legacy.module.json"),
        r#"{ "title": "Legacy", "version": 1, "requires": ["PHP<7.0"] }"#,
    )
    .unwrap();
    let config = EngineConfig::load(&write_config(dir.path())).unwrap();
    let mut manager = ModuleManager::from_config(&config).unwrap();

    assert_eq!(manager.requires_for_install("Legacy"), vec!["PHP<7.0"]);
    assert!(!manager.is_installable("Legacy", true));
    assert!(manager.install("Legacy", InstallOptions::default()).is_err());
    assert!(manager.catalog().module_info("Legacy").is_some());
}
