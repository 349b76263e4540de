use std::fs;

use tempfile::tempdir;

use crate::utils::fs::{file_name, find_files};

#[test]
fn test_find_files_recurses_and_sorts() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("b/nested")).unwrap();
    fs::write(dir.path().join("b/nested/z.module.json"), "{}").unwrap();
    fs::write(dir.path().join("a.module.json"), "{}").unwrap();
    fs::write(dir.path().join("readme.txt"), "").unwrap();

    let found = find_files(dir.path(), &|p: &std::path::Path| file_name(p).ends_with(".module.json")).unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(file_name(&found[0]), "a.module.json");
    assert_eq!(file_name(&found[1]), "z.module.json");
}

#[test]
fn test_find_files_missing_directory_is_empty() {
    let dir = tempdir().unwrap();
    let found = find_files(dir.path().join("nope"), &|_: &std::path::Path| true).unwrap();
    assert!(found.is_empty());
}

#[test]
fn test_find_files_single_file_path() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("One.module.toml");
    fs::write(&file, "").unwrap();
    let found = find_files(&file, &|_: &std::path::Path| true).unwrap();
    assert_eq!(found, vec![file]);
}
