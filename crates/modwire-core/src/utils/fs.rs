use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Find files recursively in a directory that match a predicate.
///
/// Results are sorted so scans are deterministic across platforms.
pub fn find_files<P, F>(path: P, predicate: &F) -> io::Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
    F: Fn(&Path) -> bool + ?Sized,
{
    let mut result = Vec::new();
    collect_files(path.as_ref(), predicate, &mut result)?;
    result.sort();
    Ok(result)
}

fn collect_files<F>(path: &Path, predicate: &F, result: &mut Vec<PathBuf>) -> io::Result<()>
where
    F: Fn(&Path) -> bool + ?Sized,
{
    if !path.exists() {
        return Ok(());
    }

    if path.is_file() {
        if predicate(path) {
            result.push(path.to_path_buf());
        }
        return Ok(());
    }

    for entry in fs::read_dir(path)? {
        let entry_path = entry?.path();
        if entry_path.is_file() {
            if predicate(&entry_path) {
                result.push(entry_path);
            }
        } else if entry_path.is_dir() {
            collect_files(&entry_path, predicate, result)?;
        }
    }

    Ok(())
}

/// File name without its directory, or an empty string
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
