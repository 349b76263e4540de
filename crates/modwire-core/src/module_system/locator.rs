use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::module_system::loader::definition_class;
use crate::storage::error::StorageSystemError;
use crate::utils::fs::find_files;

/// Discovery index of module definition files, and the installable index
/// derived from it.
///
/// A module is installable when it is indexed here. Modules registered from
/// code are indexed without a file.
#[derive(Debug, Default, Clone)]
pub struct FileLocator {
    roots: Vec<PathBuf>,
    discovered: BTreeMap<String, PathBuf>,
    installable: BTreeMap<String, Option<PathBuf>>,
}

impl FileLocator {
    /// Create a locator for the given directories
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            ..Default::default()
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn add_root(&mut self, root: impl Into<PathBuf>) {
        self.roots.push(root.into());
    }

    /// Scan every root for module definition files.
    ///
    /// Returns the `(class, file)` pairs found. When two files define the
    /// same class the first one in path order wins.
    pub fn scan(&mut self) -> Result<Vec<(String, PathBuf)>, StorageSystemError> {
        let mut found = Vec::new();
        for root in &self.roots {
            let files = find_files(root, &|p: &Path| definition_class(p).is_some())
                .map_err(|e| StorageSystemError::io(e, "scan_modules", root.clone()))?;
            for file in files {
                let Some(class) = definition_class(&file) else { continue };
                if let Some(existing) = self.discovered.get(&class) {
                    if existing != &file {
                        log::warn!(
                            "Duplicate module '{}' at '{}' ignored; using '{}'",
                            class,
                            file.display(),
                            existing.display()
                        );
                    }
                    continue;
                }
                log::debug!("Discovered module '{}' at '{}'", class, file.display());
                self.discovered.insert(class.clone(), file.clone());
                found.push((class, file));
            }
        }
        Ok(found)
    }

    /// Discovered definition file for `class`
    pub fn discovered_file(&self, class: &str) -> Option<&Path> {
        self.discovered.get(class).map(PathBuf::as_path)
    }

    /// Rebuild the installable index from everything discovered or
    /// registered, leaving out installed classes
    pub fn rebuild<F>(&mut self, known: &[(String, Option<PathBuf>)], is_installed: F)
    where
        F: Fn(&str) -> bool,
    {
        self.installable = known
            .iter()
            .filter(|(class, _)| !is_installed(class))
            .map(|(class, file)| (class.clone(), file.clone()))
            .collect();
    }

    /// Whether `class` is in the installable index
    pub fn is_indexed(&self, class: &str) -> bool {
        self.installable.contains_key(class)
    }

    /// File backing an installable module
    pub fn installable_file(&self, class: &str) -> Option<&Path> {
        self.installable.get(class).and_then(|f| f.as_deref())
    }

    pub fn add_installable(&mut self, class: &str, file: Option<PathBuf>) {
        self.installable.insert(class.to_string(), file);
    }

    pub fn remove_installable(&mut self, class: &str) -> bool {
        self.installable.remove(class).is_some()
    }

    /// Installable classes in name order
    pub fn installable_classes(&self) -> Vec<String> {
        self.installable.keys().cloned().collect()
    }
}
