use std::collections::BTreeMap;
use std::fmt::Debug;

/// Collaborator answering which fields use a given field type module.
pub trait FieldUsage: Debug {
    /// Names of live fields whose type is `fieldtype`
    fn fields_using(&self, fieldtype: &str) -> Vec<String>;
}

/// No fields exist
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFields;

impl FieldUsage for NoFields {
    fn fields_using(&self, _fieldtype: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Fixed map of field name to field type
#[derive(Debug, Default, Clone)]
pub struct FieldMap {
    fields: BTreeMap<String, String>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_field(&mut self, name: &str, fieldtype: &str) -> &mut Self {
        self.fields.insert(name.to_string(), fieldtype.to_string());
        self
    }

    pub fn remove_field(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }
}

impl FieldUsage for FieldMap {
    fn fields_using(&self, fieldtype: &str) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(_, t)| t.as_str() == fieldtype)
            .map(|(name, _)| name.clone())
            .collect()
    }
}
