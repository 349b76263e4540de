use std::collections::BTreeMap;

/// Identifier assigned to each hook
pub type HookId = u64;

/// A hook: `to_class::to_method` runs whenever `from_class::method` is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hook {
    pub id: HookId,
    /// Class of the object the hook is attached to
    pub from_class: String,
    /// Hooked method
    pub method: String,
    /// Class of the object handling the hook
    pub to_class: String,
    /// Handler method
    pub to_method: String,
}

/// All hooks currently attached in the running system.
///
/// Hook state is in-process only; it is never persisted in the registry.
#[derive(Debug, Default)]
pub struct HookRegistry {
    next_id: HookId,
    hooks: BTreeMap<HookId, Hook>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a hook and return its id
    pub fn add(&mut self, from_class: &str, method: &str, to_class: &str, to_method: &str) -> HookId {
        self.next_id += 1;
        let id = self.next_id;
        self.hooks.insert(
            id,
            Hook {
                id,
                from_class: from_class.to_string(),
                method: method.to_string(),
                to_class: to_class.to_string(),
                to_method: to_method.to_string(),
            },
        );
        id
    }

    pub fn remove(&mut self, id: HookId) -> Option<Hook> {
        self.hooks.remove(&id)
    }

    pub fn get(&self, id: HookId) -> Option<&Hook> {
        self.hooks.get(&id)
    }

    /// Hooks attached to objects of `class`
    pub fn hooks_on(&self, class: &str) -> Vec<Hook> {
        self.hooks.values().filter(|h| h.from_class == class).cloned().collect()
    }

    /// Hooks handled by objects of `class`
    pub fn hooks_to(&self, class: &str) -> Vec<Hook> {
        self.hooks.values().filter(|h| h.to_class == class).cloned().collect()
    }

    /// Hooks that reference `class` on either side
    pub fn involving(&self, class: &str) -> Vec<Hook> {
        self.hooks
            .values()
            .filter(|h| h.from_class == class || h.to_class == class)
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hook> {
        self.hooks.values()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
