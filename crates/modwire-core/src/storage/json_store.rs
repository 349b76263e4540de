use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::module_system::flags::ModuleFlags;
use crate::module_system::registry::{RegistryRow, RegistryStore, RowTable, StoreError};
use crate::storage::config::{ConfigData, ConfigFormat};
use crate::storage::error::StorageSystemError;

/// Registry store persisted as one pretty-printed JSON file.
///
/// Every mutation rewrites the whole file through a temporary file in the
/// same directory, so readers never see a partial write. A missing file is an
/// empty registry.
#[derive(Debug)]
pub struct JsonRegistryStore {
    path: PathBuf,
    table: RowTable,
}

impl JsonRegistryStore {
    /// Open the registry file at `path`, creating nothing until the first write
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageSystemError> {
        let path = path.into();
        let table = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| StorageSystemError::io(e, "read_to_string", path.clone()))?;
            if content.trim().is_empty() {
                RowTable::default()
            } else {
                ConfigFormat::Json.parse(&content)?
            }
        } else {
            RowTable::default()
        };
        log::debug!("Opened registry '{}' with {} row(s)", path.display(), table.modules.len());
        Ok(Self { path, table })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StorageSystemError> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| StorageSystemError::io(e, "create_dir_all", parent.clone()))?;

        let content = ConfigFormat::Json.render(&self.table)?;
        let mut temp_file = NamedTempFile::new_in(&parent)
            .map_err(|e| StorageSystemError::io(e, "create_temp_file", parent.clone()))?;
        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| StorageSystemError::io(e, "write_temp_file", temp_file.path().to_path_buf()))?;
        temp_file
            .persist(&self.path)
            .map_err(|e| StorageSystemError::io(e.error, "persist_temp_file", self.path.clone()))?;
        Ok(())
    }

    /// Apply `change` and write the file; the in-memory table is restored if
    /// the write fails.
    fn mutate<T>(&mut self, change: impl FnOnce(&mut RowTable) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let snapshot = self.table.clone();
        let value = change(&mut self.table)?;
        if let Err(e) = self.save() {
            self.table = snapshot;
            return Err(e.into());
        }
        Ok(value)
    }
}

impl RegistryStore for JsonRegistryStore {
    fn rows(&self) -> Result<Vec<RegistryRow>, StoreError> {
        Ok(self.table.rows())
    }

    fn insert(&mut self, class: &str, flags: ModuleFlags, data: ConfigData) -> Result<RegistryRow, StoreError> {
        self.mutate(|table| table.insert(class, flags, data))
    }

    fn delete(&mut self, id: u64) -> Result<(), StoreError> {
        self.mutate(|table| table.delete(id))
    }

    fn delete_class(&mut self, class: &str) -> Result<bool, StoreError> {
        if !self.table.modules.iter().any(|r| r.class == class) {
            return Ok(false);
        }
        self.mutate(|table| Ok(table.delete_class(class)))
    }

    fn update_flags(&mut self, id: u64, flags: ModuleFlags) -> Result<(), StoreError> {
        self.mutate(|table| {
            table.row_mut(id)?.flags = flags;
            Ok(())
        })
    }

    fn update_data(&mut self, id: u64, data: ConfigData) -> Result<(), StoreError> {
        self.mutate(|table| {
            table.row_mut(id)?.data = data;
            Ok(())
        })
    }
}
