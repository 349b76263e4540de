use std::fmt;

use crate::kernel::runtime::RuntimeInfo;
use crate::module_system::catalog::ModuleCatalog;
use crate::module_system::dependency::DependencyEdge;

/// How requirement labels carry their version constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionsMode {
    /// Class names only
    Never,
    /// Append the constraint when the target is present but at the wrong
    /// version
    #[default]
    WhenSpecific,
    /// Append the constraint whenever the edge has one
    Always,
}

/// Whether a requirement edge is met right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStatus {
    Satisfied,
    NotInstalled,
    VersionMismatch,
}

/// Answers dependency questions against a catalog.
///
/// `PHP` and `ProcessWire` are pseudo-modules: they are always present and
/// their versions come from [`RuntimeInfo`] rather than the catalog.
pub struct DependencyResolver<'a> {
    catalog: &'a dyn ModuleCatalog,
    runtime: &'a RuntimeInfo,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(catalog: &'a dyn ModuleCatalog, runtime: &'a RuntimeInfo) -> Self {
        Self { catalog, runtime }
    }

    /// Current version of `class`: the runtime version for pseudo-modules,
    /// the installed module's version otherwise
    pub fn current_version(&self, class: &str) -> Option<String> {
        if let Some(version) = self.runtime.pseudo_module_version(class) {
            return Some(version.to_string());
        }
        if !self.catalog.is_installed(class) {
            return None;
        }
        Some(self.catalog.module_version(class).unwrap_or_else(|| "0".to_string()))
    }

    /// Check one edge against what is installed
    pub fn edge_status(&self, edge: &DependencyEdge) -> EdgeStatus {
        match self.current_version(&edge.target) {
            None => EdgeStatus::NotInstalled,
            Some(current) if edge.is_satisfied_by(&current) => EdgeStatus::Satisfied,
            Some(_) => EdgeStatus::VersionMismatch,
        }
    }

    /// Requirements of `class`, as `"Class"` or `"Class<op><version>"`.
    ///
    /// With `only_missing`, requirements that are met are dropped, and so are
    /// requirements on modules `class` installs itself.
    pub fn requires(&self, class: &str, only_missing: bool, versions: VersionsMode) -> Vec<String> {
        let Some(info) = self.catalog.module_info(class) else {
            return Vec::new();
        };

        let mut requires = Vec::new();
        for edge in &info.requires {
            let status = if only_missing {
                if info.installs_class(&edge.target) {
                    continue;
                }
                let status = self.edge_status(edge);
                if status == EdgeStatus::Satisfied {
                    continue;
                }
                Some(status)
            } else {
                None
            };

            let with_version = edge.version.is_some()
                && match versions {
                    VersionsMode::Never => false,
                    VersionsMode::Always => true,
                    VersionsMode::WhenSpecific => status == Some(EdgeStatus::VersionMismatch),
                };
            requires.push(if with_version { edge.label() } else { edge.target.clone() });
        }
        requires
    }

    /// Requirements that must be installed before `class` can be
    pub fn requires_for_install(&self, class: &str) -> Vec<String> {
        self.requires(class, true, VersionsMode::WhenSpecific)
    }

    /// Unmet requirement edges of `class`, after dropping those it installs
    /// itself
    pub fn missing_edges(&self, class: &str) -> Vec<DependencyEdge> {
        let Some(info) = self.catalog.module_info(class) else {
            return Vec::new();
        };
        info.requires
            .iter()
            .filter(|edge| !info.installs_class(&edge.target))
            .filter(|edge| self.edge_status(edge) != EdgeStatus::Satisfied)
            .cloned()
            .collect()
    }

    /// Modules that require `class`.
    ///
    /// Uninstalled modules are included only with `include_uninstalled`.
    /// With `exclude_installs_owned`, modules that `class` lists in its own
    /// `installs` are left out, since they are removed together with it.
    pub fn required_by(&self, class: &str, include_uninstalled: bool, exclude_installs_owned: bool) -> Vec<String> {
        let owned = if exclude_installs_owned {
            self.catalog.module_info(class).map(|info| info.installs).unwrap_or_default()
        } else {
            Vec::new()
        };

        self.catalog
            .module_classes()
            .into_iter()
            .filter(|name| name != class)
            .filter(|name| include_uninstalled || self.catalog.is_installed(name))
            .filter(|name| !owned.contains(name))
            .filter(|name| {
                self.catalog
                    .module_info(name)
                    .is_some_and(|info| info.requires_class(class))
            })
            .collect()
    }

    /// Installed modules that block uninstalling `class`
    pub fn requires_for_uninstall(&self, class: &str) -> Vec<String> {
        self.required_by(class, false, true)
    }

    /// Modules removed together with `class`: those it lists in `installs`
    /// that are installed and declare that they require `class`
    pub fn uninstalls(&self, class: &str) -> Vec<String> {
        let Some(info) = self.catalog.module_info(class) else {
            return Vec::new();
        };
        info.installs
            .into_iter()
            .filter(|name| self.catalog.is_installed(name))
            .filter(|name| {
                self.catalog
                    .module_info(name)
                    .is_some_and(|child| child.requires_class(class))
            })
            .collect()
    }

    /// One readable message per unmet requirement of `class`
    pub fn dependency_errors(&self, class: &str) -> Vec<String> {
        let Some(info) = self.catalog.module_info(class) else {
            return Vec::new();
        };
        info.requires
            .iter()
            .filter_map(|edge| {
                let problem = match self.edge_status(edge) {
                    EdgeStatus::Satisfied => return None,
                    EdgeStatus::NotInstalled => DependencyProblem::Missing,
                    EdgeStatus::VersionMismatch => {
                        DependencyProblem::Version(self.current_version(&edge.target).unwrap_or_default())
                    }
                };
                Some(format!(
                    "Failed module dependency: {} requires {}{}",
                    class,
                    edge.label(),
                    problem
                ))
            })
            .collect()
    }
}

enum DependencyProblem {
    Missing,
    Version(String),
}

impl fmt::Display for DependencyProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyProblem::Missing => write!(f, " (not installed)"),
            DependencyProblem::Version(current) => write!(f, " (found {})", display_current(current)),
        }
    }
}

fn display_current(version: &str) -> String {
    if !version.is_empty() && version.chars().all(|c| c.is_ascii_digit()) {
        crate::module_system::version::format_version_str(version)
    } else {
        version.to_string()
    }
}
