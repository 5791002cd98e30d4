// src/packages/package.rs

//! Read-only package view shared by the databases and the resolver

use std::cell::OnceCell;
use std::str::FromStr;

/// Portion of a package record that a database loads on request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoLevel {
    /// Name, version, groups, install reason
    Desc,
    /// depends, provides, conflicts, requiredby
    Depends,
    /// Owned file list
    Files,
}

/// Why an installed package is on the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallReason {
    /// Requested by the user
    #[default]
    Explicit,
    /// Pulled in to satisfy another package
    Depend,
}

impl InstallReason {
    pub fn as_str(&self) -> &str {
        match self {
            InstallReason::Explicit => "0",
            InstallReason::Depend => "1",
        }
    }
}

impl FromStr for InstallReason {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "0" => Ok(InstallReason::Explicit),
            "1" => Ok(InstallReason::Depend),
            _ => Err(format!("Invalid install reason: {}", s)),
        }
    }
}

/// A package as seen by the resolver
///
/// Packages are owned by a database and only ever borrowed by the
/// resolution code. The file list is filled lazily through
/// [`PackageDatabase::read`](crate::db::PackageDatabase::read).
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub version: String,
    pub depends: Vec<String>,
    pub provides: Vec<String>,
    pub conflicts: Vec<String>,
    pub requiredby: Vec<String>,
    pub groups: Vec<String>,
    pub reason: InstallReason,
    files: OnceCell<Vec<String>>,
}

impl Package {
    /// Create a new package with no relations and no file list loaded
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            depends: Vec::new(),
            provides: Vec::new(),
            conflicts: Vec::new(),
            requiredby: Vec::new(),
            groups: Vec::new(),
            reason: InstallReason::Explicit,
            files: OnceCell::new(),
        }
    }

    pub fn with_depends(mut self, depends: &[&str]) -> Self {
        self.depends = to_strings(depends);
        self
    }

    pub fn with_provides(mut self, provides: &[&str]) -> Self {
        self.provides = to_strings(provides);
        self
    }

    pub fn with_conflicts(mut self, conflicts: &[&str]) -> Self {
        self.conflicts = to_strings(conflicts);
        self
    }

    pub fn with_requiredby(mut self, requiredby: &[&str]) -> Self {
        self.requiredby = to_strings(requiredby);
        self
    }

    pub fn with_reason(mut self, reason: InstallReason) -> Self {
        self.reason = reason;
        self
    }

    /// Attach a file list; entries are sorted so merge-walks can rely on it
    pub fn with_files(self, files: &[&str]) -> Self {
        self.set_files(to_strings(files));
        self
    }

    /// Whether `level` is available without another database read
    pub fn is_loaded(&self, level: InfoLevel) -> bool {
        match level {
            InfoLevel::Desc | InfoLevel::Depends => true,
            InfoLevel::Files => self.files.get().is_some(),
        }
    }

    /// Owned files, sorted; empty until the file list has been loaded
    pub fn files(&self) -> &[String] {
        self.files.get().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Populate the file list. A list that is already loaded is kept.
    pub fn set_files(&self, mut files: Vec<String>) {
        files.sort();
        files.dedup();
        let _ = self.files.set(files);
    }

    /// Whether this package declares `path` (exact entry match)
    pub fn owns_file(&self, path: &str) -> bool {
        self.files().binary_search_by(|f| f.as_str().cmp(path)).is_ok()
    }

    /// Whether the provides list names `name`
    pub fn provides(&self, name: &str) -> bool {
        self.provides.iter().any(|p| p == name)
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
