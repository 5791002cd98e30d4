// src/resolver/missing.rs

//! Diagnostic entries produced by dependency and conflict checks

use crate::packages::Dependency;
use serde::Serialize;
use std::fmt;

/// Why a [`MissingDependency`] was reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DepKind {
    /// `target` needs `dependency` and nothing satisfies it
    Depend,
    /// Removing `target` breaks the package named by `dependency`
    Required,
    /// `target` conflicts with the package named by `dependency`
    Conflict,
}

/// A `{target, kind, dependency}` triple
///
/// Equality is structural; result lists never hold two equal entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MissingDependency {
    pub target: String,
    pub kind: DepKind,
    pub dependency: Dependency,
}

impl MissingDependency {
    pub fn new(target: &str, kind: DepKind, dependency: Dependency) -> Self {
        Self {
            target: target.to_string(),
            kind,
            dependency,
        }
    }
}

impl fmt::Display for MissingDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DepKind::Depend => write!(f, "{}: requires {}", self.target, self.dependency),
            DepKind::Required => write!(
                f,
                "{}: is required by {}",
                self.target, self.dependency.name
            ),
            DepKind::Conflict => write!(
                f,
                "{}: conflicts with {}",
                self.target, self.dependency.name
            ),
        }
    }
}

/// Append `miss` unless an equal entry is already present
pub(crate) fn push_unique(list: &mut Vec<MissingDependency>, miss: MissingDependency) {
    if !list.contains(&miss) {
        list.push(miss);
    }
}
