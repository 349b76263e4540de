#![cfg(test)]

use crate::module_system::catalog::ModuleCatalog;
use crate::module_system::error::ErrorKind;
use crate::module_system::installer::InstallOptions;
use crate::module_system::version;
use crate::tests::integration::common::*;

#[test]
fn test_version_compare_properties() {
    assert!(version::compare_str("100", "100", "="));
    assert!(version::compare_str("1.2.0", "1.2.1", "<"));
    assert!(!version::compare_str("50", "100", ">="));
}

#[test]
fn test_install_chases_missing_requirement() {
    let log = call_log();
    let mut manager = test_manager();
    register(&mut manager, "A", module_info("1.0.0", &["B"], &[]), &log);
    register(&mut manager, "B", module_info("1.0.0", &[], &[]), &log);

    manager.install("A", InstallOptions::default()).unwrap();

    assert!(manager.is_installed("A"));
    assert!(manager.is_installed("B"));
    assert_eq!(calls(&log), vec!["install:B", "install:A"]);
    let a_id = manager.catalog().module_id("A").unwrap();
    let b_id = manager.catalog().module_id("B").unwrap();
    assert!(b_id < a_id, "required module is registered first");
}

#[test]
fn test_install_unmet_requirement_aborts_without_row() {
    let log = call_log();
    let mut manager = test_manager();
    register(&mut manager, "A", module_info("1.0.0", &["Missing>=2.0.0"], &[]), &log);

    let err = manager.install("A", InstallOptions::default()).err().unwrap();

    assert_eq!(err.kind(), ErrorKind::UnmetDependency);
    assert!(err.to_string().contains("requires:"));
    assert_eq!(err.to_string(), "Module A requires: Missing Unable to install required module - Missing.");
    assert!(!manager.is_installed("A"));
    assert!(calls(&log).is_empty());
}

#[test]
fn test_required_module_blocks_uninstall() {
    let log = call_log();
    let mut manager = test_manager();
    register(&mut manager, "A", module_info("1.0.0", &[], &[]), &log);
    register(&mut manager, "C", module_info("1.0.0", &["A"], &[]), &log);
    manager.install("C", InstallOptions::default()).unwrap();
    let row_before = manager.catalog().row("A").cloned();

    assert!(!manager.is_uninstallable("A"));
    assert!(!manager.uninstall("A").unwrap());
    assert_eq!(manager.catalog().row("A").cloned(), row_before);
    assert!(!calls(&log).contains(&"uninstall:A".to_string()));
}

#[test]
fn test_uninstalls_requires_back_reference() {
    let log = call_log();
    let mut manager = test_manager();
    register(&mut manager, "A", module_info("1.0.0", &[], &["X"]), &log);
    register(&mut manager, "X", module_info("1.0.0", &["A"], &[]), &log);
    manager.install("A", InstallOptions::default()).unwrap();
    assert!(manager.is_installed("X"));
    assert_eq!(manager.uninstalls("A"), vec!["X"]);

    let log = call_log();
    let mut manager = test_manager();
    register(&mut manager, "A", module_info("1.0.0", &[], &["X"]), &log);
    register(&mut manager, "X", module_info("1.0.0", &[], &[]), &log);
    manager.install("A", InstallOptions::default()).unwrap();
    assert!(manager.is_installed("X"));
    assert!(manager.uninstalls("A").is_empty());
}

#[test]
fn test_install_uninstall_round_trip() {
    let log = call_log();
    let mut manager = test_manager();
    let mut info = module_info("1.0.0", &[], &[]);
    info.permissions.insert("a-edit".to_string(), "Edit A".to_string());
    info.permissions.insert("a-view".to_string(), "View A".to_string());
    register(&mut manager, "A", info, &log);

    manager.install("A", InstallOptions::default()).unwrap();
    assert_eq!(manager.permissions().names(), vec!["a-edit", "a-view"]);

    assert!(manager.uninstall("A").unwrap());
    assert!(manager.catalog().row("A").is_none());
    assert!(manager.permissions().names().is_empty());
    assert!(manager.is_installable("A", false));
    assert_eq!(calls(&log), vec!["install:A", "uninstall:A"]);
}

#[test]
fn test_installs_list_pre_satisfies_versioned_requirement() {
    let log = call_log();
    let mut manager = test_manager();
    register(&mut manager, "Foo", module_info("1.0.0", &["Bar>=1.0.0"], &["Bar"]), &log);
    register(&mut manager, "Bar", module_info("1.0.0", &[], &[]), &log);

    assert!(manager.requires_for_install("Foo").is_empty());
    manager.install("Foo", InstallOptions::default()).unwrap();

    assert!(manager.is_installed("Foo"));
    assert!(manager.is_installed("Bar"));
    assert!(manager.requires_for_install("Foo").is_empty());
    assert!(manager.notices().contains("Module Auto Install: Bar"));
    assert!(manager.dependency_errors("Foo").is_empty());
}

#[test]
fn test_cascading_uninstall_removes_owned_module() {
    let log = call_log();
    let mut manager = test_manager();
    register(&mut manager, "Shop", module_info("1.0.0", &[], &["ShopCart"]), &log);
    register(&mut manager, "ShopCart", module_info("1.0.0", &["Shop"], &[]), &log);
    manager.install("Shop", InstallOptions::default()).unwrap();

    // ShopCart requires Shop, but Shop owns it, so it does not block
    assert!(manager.requires_for_uninstall("Shop").is_empty());
    assert!(manager.uninstall("Shop").unwrap());

    assert!(!manager.is_installed("Shop"));
    assert!(!manager.is_installed("ShopCart"));
    assert!(manager.notices().contains("Module Auto Uninstall: ShopCart"));
    let log = calls(&log);
    let cart = log.iter().position(|c| c == "uninstall:ShopCart").unwrap();
    let shop = log.iter().position(|c| c == "uninstall:Shop").unwrap();
    assert!(cart < shop);
}

#[test]
fn test_shared_permission_deleted_with_either_owner() {
    // Permissions are deleted by name even when another installed module
    // declares the same one.
    let log = call_log();
    let mut manager = test_manager();
    let mut a = module_info("1.0.0", &[], &[]);
    a.permissions.insert("shared-edit".to_string(), "Shared".to_string());
    let mut b = module_info("1.0.0", &[], &[]);
    b.permissions.insert("shared-edit".to_string(), "Shared".to_string());
    register(&mut manager, "A", a, &log);
    register(&mut manager, "B", b, &log);
    manager.install("A", InstallOptions::default()).unwrap();
    manager.install("B", InstallOptions::default()).unwrap();

    assert!(manager.uninstall("A").unwrap());

    assert!(manager.is_installed("B"));
    assert!(manager.permissions().get("shared-edit").is_none());
}
