// src/resolver/engine.rs

//! Recursive resolution of missing dependencies
//!
//! [`resolve_deps`] walks the unmet dependencies of a package and pulls
//! providers from the sync repositories until everything is satisfied.
//! [`remove_deps`] does the reverse for removals, collecting installed
//! dependencies nothing else needs anymore.

use super::{MissingDependency, Operation, Transaction, check_deps};
use super::missing::push_unique;
use crate::error::{Error, Result};
use crate::packages::{Dependency, InstallReason, Package};
use tracing::{debug, info, warn};

/// Answers the questions a transaction asks before going ahead
pub trait Confirmer {
    /// `target` needs `provider`, which is on the ignore list
    fn confirm_ignored(&mut self, target: &str, provider: &Package) -> bool;

    /// `pkg` is on the hold list and about to be removed
    ///
    /// Refuses unless overridden.
    fn confirm_hold(&mut self, _pkg: &Package) -> bool {
        false
    }
}

impl<F> Confirmer for F
where
    F: FnMut(&str, &Package) -> bool,
{
    fn confirm_ignored(&mut self, target: &str, provider: &Package) -> bool {
        self(target, provider)
    }
}

/// Mutable state of one resolution run
#[derive(Debug, Default)]
pub struct ResolutionContext<'a> {
    /// Packages already chosen for the transaction, in pull order
    pub result: Vec<&'a Package>,
    /// Packages currently being resolved; guards against cycles
    pub trail: Vec<&'a Package>,
}

impl<'a> ResolutionContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the given transaction targets
    pub fn with_targets(targets: &[&'a Package]) -> Self {
        Self {
            result: targets.to_vec(),
            trail: Vec::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.result.iter().any(|p| p.name == name)
    }

    pub fn on_trail(&self, name: &str) -> bool {
        self.trail.iter().any(|p| p.name == name)
    }
}

/// Pull everything `pkg` needs into `ctx.result`
///
/// Dependencies come before their dependents in `ctx.result`. On failure
/// the offending entry is added to `diagnostics` and returned in
/// [`Error::UnsatisfiedDependencies`]; packages appended before the
/// failure stay in `ctx.result`.
pub fn resolve_deps<'a>(
    tx: &Transaction<'a>,
    pkg: &'a Package,
    ctx: &mut ResolutionContext<'a>,
    confirm: &mut dyn Confirmer,
    diagnostics: &mut Vec<MissingDependency>,
) -> Result<()> {
    let missing = check_deps(tx, Operation::Add, &[pkg]);

    for miss in missing {
        let name = &miss.dependency.name;

        if let Some(provider) = ctx.result.iter().find(|p| p.provides(name)) {
            debug!("{} provides dependency {} -- skipping", provider.name, name);
            continue;
        }

        let Some(provider) = tx.find_provider(name) else {
            warn!(
                "cannot resolve dependencies for \"{}\" (\"{}\" is not in the package set)",
                miss.target, miss.dependency
            );
            push_unique(diagnostics, miss.clone());
            return Err(Error::UnsatisfiedDependencies(vec![miss]));
        };

        if ctx.contains(&provider.name) {
            debug!("dependency {} is already in the target list -- skipping", provider.name);
            continue;
        }
        if ctx.on_trail(&provider.name) {
            debug!("dependency cycle detected: {}", provider.name);
            continue;
        }

        if tx.config().is_ignored(&provider.name) && !confirm.confirm_ignored(&miss.target, provider) {
            warn!(
                "{} needs {}, which is in IgnorePkg",
                miss.target, provider.name
            );
            push_unique(diagnostics, miss.clone());
            return Err(Error::UnsatisfiedDependencies(vec![miss]));
        }

        ctx.trail.push(provider);
        resolve_deps(tx, provider, ctx, confirm, diagnostics)?;
        debug!("pulling dependency {} (needed by {})", provider.name, pkg.name);
        ctx.result.push(provider);
    }

    Ok(())
}

/// Extend a removal with installed dependencies that become orphans
///
/// A dependency joins the list when it was installed as a dependency and
/// everything that requires it is already being removed. Explicitly
/// installed packages are never added.
pub fn remove_deps<'a>(tx: &Transaction<'a>, targets: &[&'a Package]) -> Vec<&'a Package> {
    let local = tx.local();
    let mut list: Vec<&'a Package> = targets.to_vec();

    loop {
        let mut added = false;

        for idx in 0..list.len() {
            let pkg = list[idx];
            for dep in Dependency::parse_all(&pkg.depends) {
                let candidate = match local.find(&dep.name) {
                    Some(found) => found,
                    None => match local.what_provides(&dep.name).first() {
                        Some(found) => *found,
                        None => {
                            warn!("cannot find package \"{}\" or anything that provides it", dep.name);
                            continue;
                        }
                    },
                };

                if list.iter().any(|p| p.name == candidate.name) {
                    continue;
                }
                if candidate.reason == InstallReason::Explicit {
                    debug!("excluding {} -- explicitly installed", candidate.name);
                    continue;
                }
                let still_needed = candidate
                    .requiredby
                    .iter()
                    .any(|r| !list.iter().any(|p| p.name == *r));
                if still_needed {
                    continue;
                }

                info!("adding '{}' to the targets", candidate.name);
                list.push(candidate);
                added = true;
            }
        }

        if !added {
            break;
        }
    }

    list
}
