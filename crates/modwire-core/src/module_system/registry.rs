use std::collections::BTreeMap;
use std::fmt::Debug;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::module_system::flags::ModuleFlags;
use crate::storage::config::ConfigData;
use crate::storage::error::StorageSystemError;

/// One persisted row per installed module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryRow {
    pub id: u64,
    pub class: String,
    #[serde(default)]
    pub flags: ModuleFlags,
    #[serde(default)]
    pub data: ConfigData,
    /// Seconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<u64>,
}

/// Errors from the registry database layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Module '{0}' already has a registry row")]
    Duplicate(String),

    #[error("No registry row with id {0}")]
    NotFound(u64),

    #[error(transparent)]
    Storage(#[from] StorageSystemError),

    #[error("Registry backend error: {0}")]
    Backend(String),
}

/// Persistent store of installed modules
pub trait RegistryStore: Debug {
    /// All rows, ordered by id
    fn rows(&self) -> Result<Vec<RegistryRow>, StoreError>;

    /// Insert a row for `class` and return it with its assigned id
    fn insert(&mut self, class: &str, flags: ModuleFlags, data: ConfigData) -> Result<RegistryRow, StoreError>;

    /// Delete a row by id
    fn delete(&mut self, id: u64) -> Result<(), StoreError>;

    /// Delete the row for `class`; returns whether one existed
    fn delete_class(&mut self, class: &str) -> Result<bool, StoreError>;

    fn update_flags(&mut self, id: u64, flags: ModuleFlags) -> Result<(), StoreError>;

    fn update_data(&mut self, id: u64, data: ConfigData) -> Result<(), StoreError>;
}

pub(crate) fn now_secs() -> Option<u64> {
    SystemTime::now().duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}

/// Shared row table used by the in-memory and file-backed stores
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub(crate) struct RowTable {
    #[serde(default)]
    pub next_id: u64,
    #[serde(default)]
    pub modules: Vec<RegistryRow>,
}

impl RowTable {
    pub fn rows(&self) -> Vec<RegistryRow> {
        let mut rows = self.modules.clone();
        rows.sort_by_key(|r| r.id);
        rows
    }

    pub fn insert(&mut self, class: &str, flags: ModuleFlags, data: ConfigData) -> Result<RegistryRow, StoreError> {
        if self.modules.iter().any(|r| r.class == class) {
            return Err(StoreError::Duplicate(class.to_string()));
        }
        let max_id = self.modules.iter().map(|r| r.id).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id) + 1;
        let row = RegistryRow {
            id: self.next_id,
            class: class.to_string(),
            flags,
            data,
            created: now_secs(),
        };
        self.modules.push(row.clone());
        Ok(row)
    }

    pub fn delete(&mut self, id: u64) -> Result<(), StoreError> {
        let before = self.modules.len();
        self.modules.retain(|r| r.id != id);
        if self.modules.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    pub fn delete_class(&mut self, class: &str) -> bool {
        let before = self.modules.len();
        self.modules.retain(|r| r.class != class);
        self.modules.len() != before
    }

    pub fn row_mut(&mut self, id: u64) -> Result<&mut RegistryRow, StoreError> {
        self.modules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))
    }
}

/// Registry store kept in memory
#[derive(Debug, Default)]
pub struct MemoryRegistryStore {
    table: RowTable,
}

impl MemoryRegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `rows`
    pub fn with_rows(rows: Vec<RegistryRow>) -> Self {
        let next_id = rows.iter().map(|r| r.id).max().unwrap_or(0);
        Self {
            table: RowTable { next_id, modules: rows },
        }
    }
}

impl RegistryStore for MemoryRegistryStore {
    fn rows(&self) -> Result<Vec<RegistryRow>, StoreError> {
        Ok(self.table.rows())
    }

    fn insert(&mut self, class: &str, flags: ModuleFlags, data: ConfigData) -> Result<RegistryRow, StoreError> {
        self.table.insert(class, flags, data)
    }

    fn delete(&mut self, id: u64) -> Result<(), StoreError> {
        self.table.delete(id)
    }

    fn delete_class(&mut self, class: &str) -> Result<bool, StoreError> {
        Ok(self.table.delete_class(class))
    }

    fn update_flags(&mut self, id: u64, flags: ModuleFlags) -> Result<(), StoreError> {
        self.table.row_mut(id)?.flags = flags;
        Ok(())
    }

    fn update_data(&mut self, id: u64, data: ConfigData) -> Result<(), StoreError> {
        self.table.row_mut(id)?.data = data;
        Ok(())
    }
}

/// Index rows by class name
pub(crate) fn rows_by_class(rows: Vec<RegistryRow>) -> BTreeMap<String, RegistryRow> {
    rows.into_iter().map(|row| (row.class.clone(), row)).collect()
}
