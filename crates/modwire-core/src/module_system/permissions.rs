use std::collections::BTreeMap;
use std::fmt::Debug;

use thiserror::Error;

/// A named permission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub id: u64,
    pub name: String,
    pub title: String,
}

/// Error reported by a permission store
#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("Permission '{0}' already exists")]
    AlreadyExists(String),

    #[error("Permission store error: {0}")]
    Store(String),
}

/// Collaborator that stores permissions.
///
/// The engine adds the permissions a module declares on install and deletes
/// them again by name on uninstall.
pub trait PermissionStore: Debug {
    /// Look up a permission by name
    fn get(&self, name: &str) -> Option<Permission>;

    /// Create a permission
    fn add(&mut self, name: &str, title: &str) -> Result<Permission, PermissionError>;

    /// Delete a permission; returns whether one existed
    fn delete(&mut self, name: &str) -> Result<bool, PermissionError>;

    /// Names of all stored permissions
    fn names(&self) -> Vec<String>;
}

/// In-memory permission store
#[derive(Debug, Default)]
pub struct MemoryPermissionStore {
    next_id: u64,
    permissions: BTreeMap<String, Permission>,
}

impl MemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PermissionStore for MemoryPermissionStore {
    fn get(&self, name: &str) -> Option<Permission> {
        self.permissions.get(name).cloned()
    }

    fn add(&mut self, name: &str, title: &str) -> Result<Permission, PermissionError> {
        if self.permissions.contains_key(name) {
            return Err(PermissionError::AlreadyExists(name.to_string()));
        }
        self.next_id += 1;
        let permission = Permission {
            id: self.next_id,
            name: name.to_string(),
            title: title.to_string(),
        };
        self.permissions.insert(name.to_string(), permission.clone());
        Ok(permission)
    }

    fn delete(&mut self, name: &str) -> Result<bool, PermissionError> {
        Ok(self.permissions.remove(name).is_some())
    }

    fn names(&self) -> Vec<String> {
        self.permissions.keys().cloned().collect()
    }
}

/// Sanitizes a permission name the way page names are sanitized: lowercase,
/// only `a-z`, `0-9`, `-`, `_` and `.`, other runs collapsed to one `-`, and
/// separators trimmed from both ends.
pub fn sanitize_permission_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.' || c == '-' {
            if pending_dash && !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    let trimmed = out.trim_matches(|c| c == '-' || c == '_' || c == '.');
    trimmed.chars().take(128).collect()
}

/// Whether a sanitized name can be used as a permission name. Empty names
/// and all-digit names are rejected.
pub fn is_valid_permission_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().all(|c| c.is_ascii_digit())
}
