// src/resolver/conflict.rs

//! Package-level conflict detection
//!
//! Three directions are checked for every target `T`:
//! 1. `T`'s conflicts against installed packages
//! 2. `T`'s conflicts against the other targets
//! 3. installed packages' conflicts against `T`
//!
//! A match is on name or provides; a package never conflicts with a
//! package of its own name.

use super::missing::push_unique;
use super::{DepKind, MissingDependency};
use crate::db::PackageDatabase;
use crate::packages::{Dependency, Package};
use std::ptr;
use tracing::debug;

fn matches_conflict(pkg: &Package, conflict: &str) -> bool {
    pkg.name == conflict || pkg.provides(conflict)
}

fn record(conflicts: &mut Vec<MissingDependency>, target: &Package, other: &str) {
    debug!("{} conflicts with {}", target.name, other);
    push_unique(
        conflicts,
        MissingDependency::new(&target.name, DepKind::Conflict, Dependency::any(other)),
    );
}

/// Find conflicts between `packages` and the installed database
pub fn check_conflicts(packages: &[&Package], local: &dyn PackageDatabase) -> Vec<MissingDependency> {
    let mut conflicts = Vec::new();

    for target in packages {
        for conflict in &target.conflicts {
            if *conflict == target.name {
                continue;
            }

            debug!("checkconflicts: targ '{}' vs db", target.name);
            for installed in local.package_cache() {
                if installed.name != target.name && matches_conflict(installed, conflict) {
                    record(&mut conflicts, target, &installed.name);
                }
            }

            debug!("checkconflicts: targ '{}' vs targs", target.name);
            for other in packages {
                if ptr::eq(*other, *target) || other.name == target.name {
                    continue;
                }
                if matches_conflict(other, conflict) {
                    record(&mut conflicts, target, &other.name);
                }
            }
        }

        debug!("checkconflicts: db vs targ '{}'", target.name);
        for installed in local.package_cache() {
            if installed.name == target.name {
                continue;
            }
            // A target replacing this package brings its own conflicts
            let declared = packages
                .iter()
                .find(|p| p.name == installed.name)
                .map(|p| &p.conflicts)
                .unwrap_or(&installed.conflicts);

            if declared.iter().any(|c| matches_conflict(target, c)) {
                record(&mut conflicts, target, &installed.name);
            }
        }
    }

    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;

    #[test]
    fn test_conflict_through_provides_between_targets() {
        let local = MemoryDb::new("local");
        let c = Package::new("c", "1").with_conflicts(&["b"]);
        let a = Package::new("a", "1").with_provides(&["b"]);

        let conflicts = check_conflicts(&[&c, &a], &local);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].target, "c");
        assert_eq!(conflicts[0].kind, DepKind::Conflict);
        assert_eq!(conflicts[0].dependency.name, "a");
    }

    #[test]
    fn test_target_conflicts_with_installed() {
        let local = MemoryDb::new("local")
            .with_package(Package::new("vim", "9.1-1"))
            .with_package(Package::new("nano", "8.0-1"));
        let gvim = Package::new("gvim", "9.1-1").with_conflicts(&["vim", "gvim"]);

        let conflicts = check_conflicts(&[&gvim], &local);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].dependency.name, "vim");
    }

    #[test]
    fn test_installed_declares_conflict_with_target() {
        let local = MemoryDb::new("local")
            .with_package(Package::new("sysvinit", "3.0-1").with_conflicts(&["init"]));
        let systemd = Package::new("systemd", "255-1").with_provides(&["init"]);

        let conflicts = check_conflicts(&[&systemd], &local);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].target, "systemd");
        assert_eq!(conflicts[0].dependency.name, "sysvinit");

        // A new sysvinit without the conflict replaces the installed record
        let sysvinit = Package::new("sysvinit", "3.1-1");
        assert!(check_conflicts(&[&systemd, &sysvinit], &local).is_empty());
    }

    #[test]
    fn test_no_self_conflict_on_upgrade() {
        let local = MemoryDb::new("local")
            .with_package(Package::new("foo", "1.0-1").with_conflicts(&["foo"]));
        let foo = Package::new("foo", "1.1-1").with_conflicts(&["foo"]);

        assert!(check_conflicts(&[&foo], &local).is_empty());
    }
}
