// src/resolver/checkdeps.rs

//! Dependency checking for add, upgrade and remove transactions

use super::missing::push_unique;
use super::{DepKind, MissingDependency, Operation, Transaction};
use crate::packages::{Dependency, Package};
use crate::version::{VersionComparator, version_satisfies};
use std::ptr;
use tracing::debug;

/// Check the dependencies of `packages` for the operation `op`
///
/// - `Add`/`Upgrade`: every dependency of every package must be met by an
///   installed package or by another package in `packages`.
/// - `Upgrade` additionally reports installed packages whose dependencies
///   the old version met but the new version does not.
/// - `Remove`: reports installed packages that require a removed package.
///
/// The returned list holds no duplicates.
pub fn check_deps<'a>(
    tx: &Transaction<'a>,
    op: Operation,
    packages: &[&'a Package],
) -> Vec<MissingDependency> {
    let mut missing = Vec::new();

    match op {
        Operation::Add | Operation::Upgrade => {
            if op == Operation::Upgrade {
                check_upgrade_breakage(tx, packages, &mut missing);
            }
            for target in packages {
                check_package_depends(tx, target, packages, &mut missing);
            }
        }
        Operation::Remove => check_requiredby(tx, packages, &mut missing),
    }

    missing
}

/// Whether `name` is being installed, upgraded or removed
fn is_transaction_target(tx: &Transaction<'_>, packages: &[&Package], name: &str) -> bool {
    packages.iter().any(|p| p.name == name) || tx.target(name).is_some()
}

/// Versioned match on the name, unversioned match on provides
fn satisfied_by(cmp: &dyn VersionComparator, pkg: &Package, dep: &Dependency) -> bool {
    if pkg.name == dep.name {
        version_satisfies(cmp, &pkg.version, dep)
    } else {
        pkg.provides(&dep.name)
    }
}

/// Installed packages that depend on something a target's old version
/// offered and its new version no longer does
fn check_upgrade_breakage(
    tx: &Transaction<'_>,
    packages: &[&Package],
    missing: &mut Vec<MissingDependency>,
) {
    let cmp = tx.vercmp();

    for target in packages {
        let Some(old) = tx.local().find(&target.name) else {
            continue;
        };

        for required_by in &old.requiredby {
            let Some(dependent) = tx.local().find(required_by) else {
                continue;
            };
            // Being replaced too; its own new depends are checked forward
            if is_transaction_target(tx, packages, &dependent.name) {
                continue;
            }

            for dep in Dependency::parse_all(&dependent.depends) {
                if satisfied_by(cmp, old, &dep) && !satisfied_by(cmp, target, &dep) {
                    debug!(
                        "checkdeps: upgrading {} breaks dependency {} of {}",
                        target.name, dep, dependent.name
                    );
                    push_unique(
                        missing,
                        MissingDependency::new(&dependent.name, DepKind::Depend, dep),
                    );
                }
            }
        }
    }
}

fn check_package_depends(
    tx: &Transaction<'_>,
    target: &Package,
    packages: &[&Package],
    missing: &mut Vec<MissingDependency>,
) {
    for dep in Dependency::parse_all(&target.depends) {
        if is_satisfied(tx, target, &dep, packages) {
            continue;
        }
        debug!("checkdeps: missing dependency '{}' for {}", dep, target.name);
        push_unique(
            missing,
            MissingDependency::new(&target.name, DepKind::Depend, dep),
        );
    }
}

fn is_satisfied(
    tx: &Transaction<'_>,
    target: &Package,
    dep: &Dependency,
    packages: &[&Package],
) -> bool {
    let cmp = tx.vercmp();
    let local = tx.local();

    if let Some(installed) = local.find(&dep.name) {
        if version_satisfies(cmp, &installed.version, dep) {
            return true;
        }
    }

    // Installed providers, unless they are on their way out
    for provider in local.what_provides(&dep.name) {
        if is_transaction_target(tx, packages, &provider.name) {
            continue;
        }
        if version_satisfies(cmp, &provider.version, dep) {
            return true;
        }
    }

    // Other packages of this transaction; a provides match needs no version
    packages
        .iter()
        .filter(|p| !ptr::eq(**p, target))
        .any(|p| {
            if p.name == dep.name {
                version_satisfies(cmp, &p.version, dep)
            } else {
                p.provides(&dep.name)
            }
        })
}

fn check_requiredby(
    tx: &Transaction<'_>,
    packages: &[&Package],
    missing: &mut Vec<MissingDependency>,
) {
    for target in packages {
        for required_by in &target.requiredby {
            if packages.iter().any(|p| p.name == *required_by) {
                continue;
            }

            // Only targets that stay installed can take over the name
            let replaced = tx
                .targets()
                .iter()
                .filter(|t| !packages.iter().any(|p| p.name == t.name))
                .any(|t| t.name != target.name && t.provides(&target.name));
            if replaced {
                debug!("checkdeps: {} is provided by another target", target.name);
                continue;
            }

            debug!("checkdeps: {} is required by {}", target.name, required_by);
            push_unique(
                missing,
                MissingDependency::new(&target.name, DepKind::Required, Dependency::any(required_by)),
            );
        }
    }
}
