use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::module_system::version::{self, VersionOperator};

/// A `requires` edge: the target module plus an optional version constraint.
///
/// Parsed from strings such as `"Bar"`, `"Bar>=1.0.0"` or `"PHP>=8.1"`.
/// Serialized back to the same compact text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DependencyEdge {
    /// The required module's class name
    pub target: String,
    /// Comparison operator (`>=` when the edge carries no constraint)
    pub operator: VersionOperator,
    /// Required version, if any
    pub version: Option<String>,
}

/// Error that can occur when declaring or resolving dependencies
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyError {
    /// The requirement string could not be parsed
    #[error("Invalid requirement '{0}'")]
    InvalidRequirement(String),

    /// Dependency cycle detected
    #[error("Circular dependency detected: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),
}

impl DependencyEdge {
    /// Requirement on any version of `target`
    pub fn any(target: &str) -> Self {
        Self {
            target: target.to_string(),
            operator: VersionOperator::Gte,
            version: None,
        }
    }

    /// Requirement on `target` constrained by `operator` and `version`
    pub fn with_version(target: &str, operator: VersionOperator, version: &str) -> Self {
        Self {
            target: target.to_string(),
            operator,
            version: Some(version.to_string()),
        }
    }

    /// Parses `"Class"` or `"Class<op><version>"`.
    pub fn parse(spec: &str) -> Result<Self, DependencyError> {
        let spec = spec.trim();
        let invalid = || DependencyError::InvalidRequirement(spec.to_string());

        let (target, rest) = match spec.find(VersionOperator::is_operator_char) {
            Some(idx) => (spec[..idx].trim(), &spec[idx..]),
            None => (spec, ""),
        };
        if target.is_empty() || !target.chars().all(is_class_char) {
            return Err(invalid());
        }

        let op_len: usize = rest
            .chars()
            .take_while(|c| VersionOperator::is_operator_char(*c))
            .map(char::len_utf8)
            .sum();
        let version = rest[op_len..].trim();
        if op_len > 0 && version.is_empty() {
            return Err(invalid());
        }

        let operator = if op_len == 0 {
            VersionOperator::Gte
        } else {
            rest[..op_len]
                .parse::<VersionOperator>()
                .unwrap_or_else(|never| match never {})
        };

        Ok(Self {
            target: target.to_string(),
            operator,
            version: (!version.is_empty()).then(|| version.to_string()),
        })
    }

    /// Whether a module at `current` meets this edge. Edges without a
    /// version constraint are met by any version.
    pub fn is_satisfied_by(&self, current: &str) -> bool {
        match &self.version {
            Some(required) => version::compare(current, required, &self.operator),
            None => true,
        }
    }

    /// Requirement text with the constraint, digit-only versions rendered in
    /// dotted form, e.g. `"Bar>=1.0.0"` for `Bar>=100`.
    pub fn label(&self) -> String {
        match &self.version {
            Some(v) => format!("{}{}{}", self.target, self.operator, display_version(v)),
            None => self.target.clone(),
        }
    }
}

fn is_class_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '\\'
}

fn display_version(v: &str) -> String {
    if !v.is_empty() && v.chars().all(|c| c.is_ascii_digit()) {
        version::format_version_str(v)
    } else {
        v.to_string()
    }
}

impl FromStr for DependencyEdge {
    type Err = DependencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DependencyEdge::parse(s)
    }
}

impl TryFrom<String> for DependencyEdge {
    type Error = DependencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DependencyEdge::parse(&value)
    }
}

impl From<DependencyEdge> for String {
    fn from(edge: DependencyEdge) -> Self {
        edge.to_string()
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}{}{}", self.target, self.operator, v),
            None => write!(f, "{}", self.target),
        }
    }
}
