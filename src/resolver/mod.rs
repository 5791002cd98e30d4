// src/resolver/mod.rs

//! Dependency resolution and conflict detection
//!
//! This module provides dependency-ordered sorting of transaction targets,
//! dependency checking for add/upgrade/remove, recursive resolution of
//! missing dependencies from sync repositories, and package-level conflict
//! detection. Every operation reads from a [`Transaction`], an immutable
//! view of the databases, configuration and targets of the single
//! transaction in progress.

pub mod checkdeps;
pub mod conflict;
pub mod engine;
pub mod graph;
pub mod missing;
pub mod plan;

pub use checkdeps::check_deps;
pub use conflict::check_conflicts;
pub use engine::{Confirmer, ResolutionContext, remove_deps, resolve_deps};
pub use graph::sort_by_deps;
pub use missing::{DepKind, MissingDependency};
pub use plan::{TransactionPlan, prepare_add, prepare_remove, prepare_sync};

use crate::config::Config;
use crate::db::PackageDatabase;
use crate::packages::Package;
use crate::version::{Vercmp, VersionComparator};
use std::fmt;
use std::str::FromStr;

/// Kind of operation a dependency check or sort is performed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Install packages that are not installed yet
    Add,
    /// Replace installed packages with new versions
    Upgrade,
    /// Remove installed packages
    Remove,
}

impl Operation {
    pub fn as_str(&self) -> &str {
        match self {
            Operation::Add => "add",
            Operation::Upgrade => "upgrade",
            Operation::Remove => "remove",
        }
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "add" => Ok(Operation::Add),
            "upgrade" => Ok(Operation::Upgrade),
            "remove" => Ok(Operation::Remove),
            _ => Err(format!("Invalid operation: {}", s)),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static DEFAULT_VERCMP: Vercmp = Vercmp;

/// Read-only context of the transaction being prepared
///
/// Holds borrowed handles only; the databases must not change while a
/// transaction borrows them.
pub struct Transaction<'a> {
    local: &'a dyn PackageDatabase,
    sync_dbs: Vec<&'a dyn PackageDatabase>,
    config: &'a Config,
    vercmp: &'a dyn VersionComparator,
    targets: Vec<&'a Package>,
}

impl<'a> Transaction<'a> {
    /// Create a transaction against the installed database
    pub fn new(local: &'a dyn PackageDatabase, config: &'a Config) -> Self {
        Self {
            local,
            sync_dbs: Vec::new(),
            config,
            vercmp: &DEFAULT_VERCMP,
            targets: Vec::new(),
        }
    }

    /// Append a sync repository; repositories are searched in the order added
    pub fn with_sync_db(mut self, db: &'a dyn PackageDatabase) -> Self {
        self.sync_dbs.push(db);
        self
    }

    pub fn with_comparator(mut self, vercmp: &'a dyn VersionComparator) -> Self {
        self.vercmp = vercmp;
        self
    }

    pub fn with_target(mut self, pkg: &'a Package) -> Self {
        self.add_target(pkg);
        self
    }

    /// Add a target; a second target with the same name is ignored
    pub fn add_target(&mut self, pkg: &'a Package) {
        if self.target(&pkg.name).is_none() {
            self.targets.push(pkg);
        }
    }

    pub fn targets(&self) -> &[&'a Package] {
        &self.targets
    }

    /// The transaction target named `name`
    pub fn target(&self, name: &str) -> Option<&'a Package> {
        self.targets.iter().copied().find(|pkg| pkg.name == name)
    }

    pub fn local(&self) -> &'a dyn PackageDatabase {
        self.local
    }

    pub fn sync_dbs(&self) -> &[&'a dyn PackageDatabase] {
        &self.sync_dbs
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    pub fn vercmp(&self) -> &'a dyn VersionComparator {
        self.vercmp
    }

    /// First package named `name` across the sync repositories
    pub fn find_in_sync(&self, name: &str) -> Option<&'a Package> {
        self.sync_dbs.iter().find_map(|db| db.find(name))
    }

    /// Best sync candidate for `name`
    ///
    /// A literal name match in any repository wins over a provider; among
    /// equals the first repository in search order wins.
    pub fn find_provider(&self, name: &str) -> Option<&'a Package> {
        self.find_in_sync(name).or_else(|| {
            self.sync_dbs
                .iter()
                .find_map(|db| db.what_provides(name).first().copied())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;

    #[test]
    fn test_operation_parsing() {
        assert_eq!("add".parse::<Operation>(), Ok(Operation::Add));
        assert_eq!("remove".parse::<Operation>(), Ok(Operation::Remove));
        assert!("install".parse::<Operation>().is_err());
    }

    #[test]
    fn test_find_provider_prefers_literal_over_earlier_provider() {
        let local = MemoryDb::new("local");
        let core = MemoryDb::new("core").with_package(Package::new("busybox", "1.36-1").with_provides(&["sh"]));
        let extra = MemoryDb::new("extra").with_package(Package::new("sh", "1.0-1"));
        let config = Config::default();

        let tx = Transaction::new(&local, &config)
            .with_sync_db(&core)
            .with_sync_db(&extra);

        assert_eq!(tx.find_provider("sh").unwrap().name, "sh");
        assert_eq!(tx.find_provider("busybox").unwrap().name, "busybox");
        assert!(tx.find_provider("zsh").is_none());
    }

    #[test]
    fn test_find_provider_uses_repository_order() {
        let local = MemoryDb::new("local");
        let core = MemoryDb::new("core").with_package(Package::new("mawk", "1.3-1").with_provides(&["awk"]));
        let extra = MemoryDb::new("extra").with_package(Package::new("gawk", "5.3-1").with_provides(&["awk"]));
        let config = Config::default();

        let tx = Transaction::new(&local, &config)
            .with_sync_db(&extra)
            .with_sync_db(&core);

        assert_eq!(tx.find_provider("awk").unwrap().name, "gawk");
    }

    #[test]
    fn test_duplicate_targets_are_ignored() {
        let local = MemoryDb::new("local");
        let config = Config::default();
        let a1 = Package::new("a", "1");
        let a2 = Package::new("a", "2");

        let tx = Transaction::new(&local, &config).with_target(&a1).with_target(&a2);
        assert_eq!(tx.targets().len(), 1);
        assert_eq!(tx.target("a").unwrap().version, "1");
    }
}
