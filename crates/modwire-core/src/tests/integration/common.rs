#![cfg(test)]

use std::sync::{Arc, Mutex};

use crate::kernel::runtime::RuntimeInfo;
use crate::module_system::dependency::DependencyEdge;
use crate::module_system::info::ModuleInfo;
use crate::module_system::manager::ModuleManager;
use crate::module_system::permissions::{MemoryPermissionStore, Permission, PermissionError, PermissionStore};
use crate::module_system::registry::MemoryRegistryStore;
use crate::module_system::traits::{HookError, Module, ModuleContext, ModuleFactory};

// ===== CALL RECORDING =====

/// Shared, ordered record of lifecycle calls made on test modules
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

// ===== MOCK MODULES =====

/// What a test module's install or uninstall hook does
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HookBehavior {
    #[default]
    Succeed,
    Database(String),
    Fail(String),
}

impl HookBehavior {
    fn run(&self) -> Result<(), HookError> {
        match self {
            HookBehavior::Succeed => Ok(()),
            HookBehavior::Database(msg) => Err(HookError::Database(msg.clone())),
            HookBehavior::Fail(msg) => Err(HookError::Failed(msg.clone())),
        }
    }
}

/// `(from_class, method, to_method)`
type HookSpec = (String, String, String);

/// A module that records every lifecycle call
pub struct TestModule {
    class: String,
    singular: bool,
    autoload: bool,
    install: HookBehavior,
    uninstall: HookBehavior,
    init_hooks: Vec<HookSpec>,
    install_hooks: Vec<HookSpec>,
    calls: CallLog,
}

impl TestModule {
    fn record(&self, event: &str) {
        self.calls.lock().unwrap().push(format!("{}:{}", event, self.class));
    }
}

impl Module for TestModule {
    fn class_name(&self) -> &str {
        &self.class
    }

    fn is_singular(&self) -> bool {
        self.singular
    }

    fn is_autoload(&self) -> bool {
        self.autoload
    }

    fn init(&self, ctx: &mut ModuleContext<'_>) {
        self.record("init");
        for (from, method, to_method) in &self.init_hooks {
            ctx.add_hook(from, method, to_method);
        }
    }

    fn on_install(&self, ctx: &mut ModuleContext<'_>) -> Result<(), HookError> {
        self.record("install");
        for (from, method, to_method) in &self.install_hooks {
            ctx.add_hook(from, method, to_method);
        }
        self.install.run()
    }

    fn on_uninstall(&self, _ctx: &mut ModuleContext<'_>) -> Result<(), HookError> {
        self.record("uninstall");
        self.uninstall.run()
    }
}

/// Factory producing [`TestModule`]s
#[derive(Clone)]
pub struct TestFactory {
    class: String,
    info: ModuleInfo,
    singular: bool,
    autoload: bool,
    install: HookBehavior,
    uninstall: HookBehavior,
    init_hooks: Vec<HookSpec>,
    install_hooks: Vec<HookSpec>,
    calls: CallLog,
}

impl TestFactory {
    pub fn new(class: &str, info: ModuleInfo, calls: &CallLog) -> Self {
        Self {
            class: class.to_string(),
            info,
            singular: false,
            autoload: false,
            install: HookBehavior::Succeed,
            uninstall: HookBehavior::Succeed,
            init_hooks: Vec::new(),
            install_hooks: Vec::new(),
            calls: calls.clone(),
        }
    }

    pub fn install_behavior(mut self, behavior: HookBehavior) -> Self {
        self.install = behavior;
        self
    }

    pub fn uninstall_behavior(mut self, behavior: HookBehavior) -> Self {
        self.uninstall = behavior;
        self
    }

    pub fn singular(mut self) -> Self {
        self.singular = true;
        self
    }

    pub fn autoload(mut self) -> Self {
        self.autoload = true;
        self
    }

    /// Hook attached when the module initializes
    pub fn init_hook(mut self, from: &str, method: &str, to_method: &str) -> Self {
        self.init_hooks.push((from.to_string(), method.to_string(), to_method.to_string()));
        self
    }

    /// Hook attached from inside the install hook
    pub fn install_hook(mut self, from: &str, method: &str, to_method: &str) -> Self {
        self.install_hooks.push((from.to_string(), method.to_string(), to_method.to_string()));
        self
    }
}

impl ModuleFactory for TestFactory {
    fn class_name(&self) -> &str {
        &self.class
    }

    fn module_info(&self) -> ModuleInfo {
        self.info.clone()
    }

    fn create(&self) -> Arc<dyn Module> {
        Arc::new(TestModule {
            class: self.class.clone(),
            singular: self.singular,
            autoload: self.autoload,
            install: self.install.clone(),
            uninstall: self.uninstall.clone(),
            init_hooks: self.init_hooks.clone(),
            install_hooks: self.install_hooks.clone(),
            calls: self.calls.clone(),
        })
    }
}

// ===== MOCK PERMISSION STORE =====

/// Permission store that refuses to add one specific name
#[derive(Debug, Default)]
pub struct RefusingPermissionStore {
    inner: MemoryPermissionStore,
    refuse: String,
}

impl RefusingPermissionStore {
    pub fn new(refuse: &str) -> Self {
        Self {
            inner: MemoryPermissionStore::new(),
            refuse: refuse.to_string(),
        }
    }

    /// Seed a permission that exists before any module is installed
    pub fn with_existing(mut self, name: &str) -> Self {
        self.inner.add(name, name).unwrap();
        self
    }
}

impl PermissionStore for RefusingPermissionStore {
    fn get(&self, name: &str) -> Option<Permission> {
        self.inner.get(name)
    }

    fn add(&mut self, name: &str, title: &str) -> Result<Permission, PermissionError> {
        if name == self.refuse {
            return Err(PermissionError::Store(format!("refused '{}'", name)));
        }
        self.inner.add(name, title)
    }

    fn delete(&mut self, name: &str) -> Result<bool, PermissionError> {
        self.inner.delete(name)
    }

    fn names(&self) -> Vec<String> {
        self.inner.names()
    }
}

// ===== SETUP HELPERS =====

pub fn test_runtime() -> RuntimeInfo {
    RuntimeInfo::new("8.2.0", "3.0.229")
}

/// Manager over an empty in-memory registry
pub fn test_manager() -> ModuleManager {
    ModuleManager::new(Box::new(MemoryRegistryStore::new()), test_runtime()).unwrap()
}

/// Module metadata with the given version, requirements and installs list
pub fn module_info(version: &str, requires: &[&str], installs: &[&str]) -> ModuleInfo {
    let mut info = ModuleInfo::new("Test module", version);
    info.requires = requires.iter().map(|r| DependencyEdge::parse(r).unwrap()).collect();
    info.installs = installs.iter().map(|s| s.to_string()).collect();
    info
}

/// Register a plain recording module
pub fn register(manager: &mut ModuleManager, class: &str, info: ModuleInfo, calls: &CallLog) {
    manager.register_module(Arc::new(TestFactory::new(class, info, calls)), None);
}

pub fn register_factory(manager: &mut ModuleManager, factory: TestFactory) {
    manager.register_module(Arc::new(factory), None);
}
