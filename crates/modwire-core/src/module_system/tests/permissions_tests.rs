#![cfg(test)]

use crate::module_system::fields::{FieldMap, FieldUsage, NoFields};
use crate::module_system::hooks::HookRegistry;
use crate::module_system::notice::{NoticeLevel, Notices};
use crate::module_system::permissions::{
    is_valid_permission_name, sanitize_permission_name, MemoryPermissionStore, PermissionError, PermissionStore,
};

#[test]
fn test_sanitize_permission_name() {
    assert_eq!(sanitize_permission_name("page-edit"), "page-edit");
    assert_eq!(sanitize_permission_name("Page Edit"), "page-edit");
    assert_eq!(sanitize_permission_name("  blog:post  admin "), "blog-post-admin");
    assert_eq!(sanitize_permission_name("--trim.me__"), "trim.me");
    assert_eq!(sanitize_permission_name("!!!"), "");
    assert_eq!(sanitize_permission_name("Ünïcode"), "n-code");
}

#[test]
fn test_valid_permission_names() {
    assert!(is_valid_permission_name("page-edit"));
    assert!(is_valid_permission_name("v2"));
    assert!(!is_valid_permission_name(""));
    assert!(!is_valid_permission_name("42"));
}

#[test]
fn test_memory_permission_store() {
    let mut store = MemoryPermissionStore::new();
    let edit = store.add("page-edit", "Edit pages").unwrap();
    assert_eq!(edit.title, "Edit pages");
    assert!(matches!(store.add("page-edit", "Again"), Err(PermissionError::AlreadyExists(_))));
    assert_eq!(store.get("page-edit").map(|p| p.id), Some(edit.id));

    assert!(store.delete("page-edit").unwrap());
    assert!(!store.delete("page-edit").unwrap());
    assert!(store.names().is_empty());
}

#[test]
fn test_notices_levels_and_debug_gate() {
    let mut notices = Notices::default();
    notices.message("hello");
    notices.warning("careful");
    notices.error("broken");
    notices.debug("hidden");
    assert_eq!(notices.len(), 3);
    assert!(!notices.contains("hidden"));

    notices.set_debug(true);
    notices.debug("shown");
    assert_eq!(notices.at_level(NoticeLevel::Debug).len(), 1);
    assert_eq!(notices.warnings()[0].to_string(), "[warning] careful");

    let taken = notices.take();
    assert_eq!(taken.len(), 4);
    assert!(notices.is_empty());
}

#[test]
fn test_hook_registry_queries() {
    let mut hooks = HookRegistry::new();
    let a = hooks.add("Pages", "save", "Seo", "afterSave");
    let b = hooks.add("Seo", "render", "Theme", "wrap");
    hooks.add("Pages", "delete", "Theme", "purge");

    assert_eq!(hooks.hooks_to("Seo").len(), 1);
    assert_eq!(hooks.hooks_on("Seo").len(), 1);
    let involving: Vec<u64> = hooks.involving("Seo").iter().map(|h| h.id).collect();
    assert_eq!(involving, vec![a, b]);

    assert!(hooks.remove(a).is_some());
    assert!(hooks.remove(a).is_none());
    assert_eq!(hooks.len(), 2);
}

#[test]
fn test_field_usage() {
    let mut fields = FieldMap::new();
    fields.add_field("title", "FieldtypeText").add_field("summary", "FieldtypeText");
    assert_eq!(fields.fields_using("FieldtypeText"), vec!["summary", "title"]);
    assert!(fields.fields_using("FieldtypeImage").is_empty());
    assert_eq!(fields.remove_field("title").as_deref(), Some("FieldtypeText"));
    assert!(NoFields.fields_using("FieldtypeText").is_empty());
}
