#![cfg(test)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::module_system::error::ErrorKind;
use crate::module_system::fields::FieldMap;
use crate::module_system::flags::ModuleFlags;
use crate::module_system::installer::InstallOptions;
use crate::module_system::manager::ModuleManager;
use crate::module_system::registry::{MemoryRegistryStore, RegistryRow, RegistryStore, StoreError};
use crate::module_system::uninstaller::UninstallBlock;
use crate::storage::config::ConfigData;
use crate::tests::integration::common::*;

/// In-memory store whose `rows` starts failing once `broken` is set
#[derive(Debug)]
struct UnreadableStore {
    inner: MemoryRegistryStore,
    broken: Arc<AtomicBool>,
}

impl RegistryStore for UnreadableStore {
    fn rows(&self) -> Result<Vec<RegistryRow>, StoreError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("registry unreadable".to_string()));
        }
        self.inner.rows()
    }

    fn insert(&mut self, class: &str, flags: ModuleFlags, data: ConfigData) -> Result<RegistryRow, StoreError> {
        self.inner.insert(class, flags, data)
    }

    fn delete(&mut self, id: u64) -> Result<(), StoreError> {
        self.inner.delete(id)
    }

    fn delete_class(&mut self, class: &str) -> Result<bool, StoreError> {
        self.inner.delete_class(class)
    }

    fn update_flags(&mut self, id: u64, flags: ModuleFlags) -> Result<(), StoreError> {
        self.inner.update_flags(id, flags)
    }

    fn update_data(&mut self, id: u64, data: ConfigData) -> Result<(), StoreError> {
        self.inner.update_data(id, data)
    }
}

#[test]
fn test_uninstall_blockers() {
    let log = call_log();
    let mut fields = FieldMap::new();
    fields.add_field("body", "FieldtypeTextarea");
    let mut manager = test_manager().with_fields(Box::new(fields));

    let mut permanent = module_info("1.0.0", &[], &[]);
    permanent.permanent = true;
    let mut fieldtype = module_info("1.0.0", &[], &[]);
    fieldtype.fieldtype = true;
    register(&mut manager, "Base", module_info("1.0.0", &[], &[]), &log);
    register(&mut manager, "User", module_info("1.0.0", &["Base"], &[]), &log);
    register(&mut manager, "Locked", permanent, &log);
    register(&mut manager, "FieldtypeTextarea", fieldtype.clone(), &log);
    register(&mut manager, "FieldtypeUnused", fieldtype, &log);
    for class in ["User", "Locked", "FieldtypeTextarea", "FieldtypeUnused"] {
        manager.install(class, InstallOptions::default()).unwrap();
    }

    assert_eq!(manager.uninstall_blocker("Nope"), Some(UninstallBlock::NotInstalled));
    assert_eq!(manager.uninstall_blocker("Locked"), Some(UninstallBlock::Permanent));
    assert_eq!(
        manager.uninstall_blocker("Base"),
        Some(UninstallBlock::RequiredBy(vec!["User".to_string()]))
    );
    assert_eq!(
        manager.uninstall_blocker("FieldtypeTextarea"),
        Some(UninstallBlock::FieldtypeInUse(vec!["body".to_string()]))
    );
    assert_eq!(manager.uninstall_blocker("FieldtypeUnused"), None);
    assert!(manager.is_uninstallable("User"));
    assert_eq!(UninstallBlock::Permanent.to_string(), "Module is permanent");
}

#[test]
fn test_blocked_uninstall_returns_false() {
    let log = call_log();
    let mut manager = test_manager();
    let mut info = module_info("1.0.0", &[], &[]);
    info.permanent = true;
    register(&mut manager, "Locked", info, &log);
    manager.install("Locked", InstallOptions::default()).unwrap();

    assert!(!manager.uninstall("Locked").unwrap());
    assert!(!manager.uninstall("NeverInstalled").unwrap());
    assert!(manager.is_installed("Locked"));
    assert_eq!(calls(&log), vec!["install:Locked"]);
}

#[test]
fn test_uninstall_removes_hooks_except_uninstall_hooks_until_done() {
    let log = call_log();
    let mut manager = test_manager().with_debug(true);
    register_factory(
        &mut manager,
        TestFactory::new("Seo", module_info("1.0.0", &[], &[]), &log)
            .init_hook("Pages", "save", "afterSave")
            .init_hook("Seo", "uninstall", "cleanup"),
    );
    manager.install("Seo", InstallOptions::default()).unwrap();
    manager.get_module("Seo").unwrap();
    let other = manager.hooks_mut().add("Seo", "render", "Theme", "wrap");
    manager.hooks_mut().add("Pages", "delete", "Theme", "purge");
    assert_eq!(manager.hooks().len(), 4);

    assert!(manager.uninstall("Seo").unwrap());

    assert!(manager.hooks().get(other).is_none());
    assert_eq!(manager.hooks().len(), 1);
    assert_eq!(manager.hooks().hooks_to("Theme").len(), 1);
    assert!(manager.notices().contains("Removed hook Pages::save => Seo::afterSave"));
    assert!(manager.notices().contains("Removed hook Seo::render => Theme::wrap"));
    assert!(!manager.notices().contains("Removed hook Seo::uninstall"));
}

#[test]
fn test_uninstall_hook_failure_propagates() {
    let log = call_log();
    let mut manager = test_manager();
    register_factory(
        &mut manager,
        TestFactory::new("Fragile", module_info("1.0.0", &[], &[]), &log)
            .uninstall_behavior(HookBehavior::Fail("still in use".to_string())),
    );
    manager.install("Fragile", InstallOptions::default()).unwrap();

    let err = manager.uninstall("Fragile").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ModuleUninstallFailure);
    assert!(err.to_string().contains("still in use"));
    assert!(manager.is_installed("Fragile"));
}

#[test]
fn test_auto_uninstall_failure_is_not_fatal() {
    let log = call_log();
    let mut manager = test_manager();
    register(&mut manager, "Shop", module_info("1.0.0", &[], &["Cart"]), &log);
    register_factory(
        &mut manager,
        TestFactory::new("Cart", module_info("1.0.0", &["Shop"], &[]), &log)
            .uninstall_behavior(HookBehavior::Fail("cart busy".to_string())),
    );
    manager.install("Shop", InstallOptions::default()).unwrap();
    assert!(manager.is_installed("Cart"));

    assert!(manager.uninstall("Shop").unwrap());

    assert!(!manager.is_installed("Shop"));
    assert!(manager.is_installed("Cart"));
    assert!(manager.notices().contains("Unable to auto-uninstall module 'Cart'"));
    assert!(!manager.dependency_errors("Cart").is_empty());
}

#[test]
fn test_uninstall_deletes_declared_permissions() {
    let log = call_log();
    let mut manager = test_manager();
    let mut info = module_info("1.0.0", &[], &[]);
    info.permissions.insert("Blog Edit".to_string(), "Edit".to_string());
    register(&mut manager, "Blog", info, &log);
    manager.install("Blog", InstallOptions::default()).unwrap();
    assert!(manager.permissions().get("blog-edit").is_some());

    assert!(manager.uninstall("Blog").unwrap());

    assert!(manager.permissions().get("blog-edit").is_none());
    assert!(manager.notices().contains("Deleted Permission: blog-edit"));
}

#[test]
fn test_mutual_ownership_does_not_recurse_forever() {
    let log = call_log();
    let mut manager = test_manager();
    register(&mut manager, "Left", module_info("1.0.0", &["Right"], &["Right"]), &log);
    register(&mut manager, "Right", module_info("1.0.0", &["Left"], &["Left"]), &log);
    manager.install("Left", InstallOptions::default()).unwrap();
    assert!(manager.is_installed("Right"));

    assert!(manager.uninstall("Left").unwrap());

    assert!(!manager.is_installed("Left"));
    assert!(!manager.is_installed("Right"));
}

#[test]
fn test_failed_refresh_after_uninstall_is_reported_as_notice() {
    let log = call_log();
    let broken = Arc::new(AtomicBool::new(false));
    let store = UnreadableStore {
        inner: MemoryRegistryStore::new(),
        broken: broken.clone(),
    };
    let mut manager = ModuleManager::new(Box::new(store), test_runtime()).unwrap();
    register(&mut manager, "Foo", module_info("1.0.0", &[], &[]), &log);
    manager.install("Foo", InstallOptions::default()).unwrap();

    broken.store(true, Ordering::SeqCst);
    assert!(manager.uninstall("Foo").unwrap());

    assert!(!manager.is_installed("Foo"));
    assert!(manager.is_installable("Foo", false));
    let errors = manager.notices().errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].text.starts_with("Unable to refresh modules after uninstalling 'Foo'"));
    assert_eq!(calls(&log), vec!["install:Foo", "uninstall:Foo"]);
}
