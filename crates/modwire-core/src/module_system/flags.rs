use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Bitset stored in each registry row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleFlags(u32);

impl ModuleFlags {
    /// Only one instance of the module may exist
    pub const SINGULAR: ModuleFlags = ModuleFlags(1);
    /// Loaded and initialized on every boot
    pub const AUTOLOAD: ModuleFlags = ModuleFlags(2);
    /// Autoload depends on a runtime condition
    pub const CONDITIONAL: ModuleFlags = ModuleFlags(4);
    /// Configuration is not editable by users
    pub const NO_USER_CONFIG: ModuleFlags = ModuleFlags(8);
    /// The module's source file is missing
    pub const NO_FILE: ModuleFlags = ModuleFlags(16);
    /// Module cannot be uninstalled
    pub const PERMANENT: ModuleFlags = ModuleFlags(32);

    const NAMES: [(ModuleFlags, &'static str); 6] = [
        (Self::SINGULAR, "singular"),
        (Self::AUTOLOAD, "autoload"),
        (Self::CONDITIONAL, "conditional"),
        (Self::NO_USER_CONFIG, "no-user-config"),
        (Self::NO_FILE, "no-file"),
        (Self::PERMANENT, "permanent"),
    ];

    pub const fn empty() -> Self {
        ModuleFlags(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        ModuleFlags(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn contains(&self, other: ModuleFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: ModuleFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: ModuleFlags) {
        self.0 &= !other.0;
    }

    pub fn set(&mut self, other: ModuleFlags, on: bool) {
        if on {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ModuleFlags {
    type Output = ModuleFlags;

    fn bitor(self, rhs: ModuleFlags) -> ModuleFlags {
        ModuleFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModuleFlags {
    fn bitor_assign(&mut self, rhs: ModuleFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for ModuleFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            write!(f, "-")
        } else {
            write!(f, "{}", names.join(","))
        }
    }
}
