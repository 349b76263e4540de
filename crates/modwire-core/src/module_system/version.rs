//! Version values and the comparator used for every requirement check.
//!
//! Two encodings coexist: legacy packed integers (`100` meaning `1.0.0`) and
//! dotted versions (`"1.2.3"`). When both sides of a comparison are plain
//! digit strings they are compared as integers without decomposition.
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Comparison operator of a requirement edge.
///
/// Operators outside the supported set are kept verbatim so they can be
/// displayed; they never match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum VersionOperator {
    Eq,
    Gt,
    Lt,
    #[default]
    Gte,
    Lte,
    Ne,
    Unsupported(String),
}

impl VersionOperator {
    /// Whether `ordering` (current compared to required) satisfies this operator
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            VersionOperator::Eq => ordering == Ordering::Equal,
            VersionOperator::Gt => ordering == Ordering::Greater,
            VersionOperator::Lt => ordering == Ordering::Less,
            VersionOperator::Gte => ordering != Ordering::Less,
            VersionOperator::Lte => ordering != Ordering::Greater,
            VersionOperator::Ne => ordering != Ordering::Equal,
            VersionOperator::Unsupported(_) => false,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            VersionOperator::Eq => "=",
            VersionOperator::Gt => ">",
            VersionOperator::Lt => "<",
            VersionOperator::Gte => ">=",
            VersionOperator::Lte => "<=",
            VersionOperator::Ne => "!=",
            VersionOperator::Unsupported(op) => op,
        }
    }

    /// Characters that may form an operator inside a requirement string
    pub fn is_operator_char(c: char) -> bool {
        matches!(c, '<' | '>' | '=' | '!')
    }
}

impl FromStr for VersionOperator {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "=" => VersionOperator::Eq,
            ">" => VersionOperator::Gt,
            "<" => VersionOperator::Lt,
            ">=" => VersionOperator::Gte,
            "<=" => VersionOperator::Lte,
            "!=" => VersionOperator::Ne,
            other => VersionOperator::Unsupported(other.to_string()),
        })
    }
}

impl fmt::Display for VersionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compares `current` against `required` under `operator`.
///
/// Pure digit strings on both sides take the integer fast path. Everything
/// else is normalized to three components and compared as a dotted version.
pub fn compare(current: &str, required: &str, operator: &VersionOperator) -> bool {
    if let VersionOperator::Unsupported(op) = operator {
        log::debug!("Unsupported version operator '{}'", op);
        return false;
    }
    let current = current.trim();
    let required = required.trim();

    if is_digits(current) && is_digits(required) {
        if let (Ok(a), Ok(b)) = (current.parse::<u64>(), required.parse::<u64>()) {
            return operator.accepts(a.cmp(&b));
        }
    }

    let current = normalize(current);
    let required = normalize(required);
    operator.accepts(dotted_ordering(&current, &required))
}

/// Same as [`compare`] but with the operator given as text.
/// Unknown operators yield `false`.
pub fn compare_str(current: &str, required: &str, operator: &str) -> bool {
    let operator = operator
        .parse::<VersionOperator>()
        .unwrap_or_else(|never| match never {});
    compare(current, required, &operator)
}

/// Formats a packed integer version as `"X.Y.Z"`.
///
/// The number is left-padded to three digits; the first two digits become
/// major and minor and the remainder is the patch level, so `100` is `1.0.0`,
/// `12` is `0.1.2` and `1234` is `1.2.34`.
pub fn format_version(version: u32) -> String {
    let digits = format!("{:03}", version);
    format!("{}.{}.{}", &digits[0..1], &digits[1..2], &digits[2..])
}

/// Formats any version text as a three component dotted version.
///
/// Characters other than digits and dots are dropped first. Digit-only input
/// is treated as a packed integer; dotted input is padded with `.0`.
pub fn format_version_str(version: &str) -> String {
    let version = version.trim();
    let cleaned: String = version
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if is_digits(&cleaned) {
        return match cleaned.parse::<u32>() {
            Ok(packed) => format_version(packed),
            Err(_) => cleaned,
        };
    }
    if cleaned.contains('.') {
        let mut parts: Vec<&str> = cleaned.split('.').collect();
        while parts.len() < 3 {
            parts.push("0");
        }
        return parts.join(".");
    }
    "0.0.0".to_string()
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn normalize(version: &str) -> String {
    if version.matches('.').count() < 2 {
        format_version_str(version)
    } else {
        version.to_string()
    }
}

/// Orders two dotted versions. Well-formed semantic versions use semver
/// precedence (so pre-releases sort before their release); anything else
/// falls back to numeric comparison of each dot-separated component.
fn dotted_ordering(current: &str, required: &str) -> Ordering {
    if let (Ok(a), Ok(b)) = (semver::Version::parse(current), semver::Version::parse(required)) {
        return a.cmp_precedence(&b);
    }

    let a: Vec<u64> = current.split('.').map(leading_number).collect();
    let b: Vec<u64> = required.split('.').map(leading_number).collect();
    let len = a.len().max(b.len());
    for i in 0..len {
        let left = a.get(i).copied().unwrap_or(0);
        let right = b.get(i).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

fn leading_number(part: &str) -> u64 {
    let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// A module's version, in either encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModuleVersion {
    /// Legacy packed integer, e.g. `101` for 1.0.1
    Packed(u32),
    /// Dotted version text, e.g. `"1.0.1"`
    Semantic(String),
}

impl ModuleVersion {
    /// The raw text handed to [`compare`]. Packed versions stay digit strings
    /// so that two packed versions take the integer fast path.
    pub fn compare_string(&self) -> String {
        match self {
            ModuleVersion::Packed(v) => v.to_string(),
            ModuleVersion::Semantic(s) => s.clone(),
        }
    }

    /// Human-readable `"X.Y.Z"` form
    pub fn formatted(&self) -> String {
        match self {
            ModuleVersion::Packed(v) => format_version(*v),
            ModuleVersion::Semantic(s) => s.clone(),
        }
    }

    /// Checks this version against a requirement
    pub fn satisfies(&self, operator: &VersionOperator, required: &str) -> bool {
        compare(&self.compare_string(), required, operator)
    }
}

impl Default for ModuleVersion {
    fn default() -> Self {
        ModuleVersion::Packed(0)
    }
}

impl From<u32> for ModuleVersion {
    fn from(v: u32) -> Self {
        ModuleVersion::Packed(v)
    }
}

impl From<&str> for ModuleVersion {
    fn from(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.parse::<u32>() {
            Ok(v) if is_digits(trimmed) => ModuleVersion::Packed(v),
            _ => ModuleVersion::Semantic(trimmed.to_string()),
        }
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}
