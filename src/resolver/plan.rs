// src/resolver/plan.rs

//! Transaction preparation
//!
//! Each `prepare_*` function runs the checks a transaction of its kind
//! needs, in the order a package manager runs them, and returns the
//! packages in the order they should be processed.

use super::{
    Confirmer, Operation, ResolutionContext, Transaction, check_conflicts, check_deps,
    remove_deps, resolve_deps, sort_by_deps,
};
use crate::error::{Error, Result};
use crate::filesystem::{SkipList, find_conflicts};
use crate::packages::Package;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Outcome of a successful preparation
#[derive(Debug, Default, Serialize)]
pub struct TransactionPlan<'a> {
    /// Every package to process, in processing order
    #[serde(serialize_with = "serialize_names")]
    pub packages: Vec<&'a Package>,
    /// Packages added to the transaction by resolution or cascade
    #[serde(serialize_with = "serialize_names")]
    pub pulled: Vec<&'a Package>,
    /// Files changing owner within the transaction
    pub skip_list: SkipList,
}

fn serialize_names<S>(packages: &[&Package], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(packages.iter().map(|p| format!("{}-{}", p.name, p.version)))
}

impl<'a> TransactionPlan<'a> {
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Prepare a sync: resolve dependencies of every target from the sync
/// repositories, then check the whole set
pub fn prepare_sync<'a>(
    tx: &Transaction<'a>,
    confirm: &mut dyn Confirmer,
) -> Result<TransactionPlan<'a>> {
    let mut ctx = ResolutionContext::with_targets(tx.targets());
    let mut diagnostics = Vec::new();

    for &target in tx.targets() {
        info!("resolving dependencies for {}", target.name);
        if let Err(e) = resolve_deps(tx, target, &mut ctx, confirm, &mut diagnostics) {
            return Err(match e {
                Error::UnsatisfiedDependencies(_) => Error::UnsatisfiedDependencies(diagnostics),
                other => other,
            });
        }
    }

    let list = ctx.result;
    let pulled: Vec<&'a Package> = list
        .iter()
        .copied()
        .filter(|p| tx.target(&p.name).is_none())
        .collect();
    debug!("{} package(s) pulled in as dependencies", pulled.len());

    let missing = check_deps(tx, Operation::Upgrade, &list);
    if !missing.is_empty() {
        return Err(Error::UnsatisfiedDependencies(missing));
    }

    let conflicts = check_conflicts(&list, tx.local());
    if !conflicts.is_empty() {
        return Err(Error::ConflictingDependencies(conflicts));
    }

    Ok(TransactionPlan {
        packages: sort_by_deps(&list, Operation::Add),
        pulled,
        skip_list: SkipList::new(),
    })
}

/// Prepare installing or upgrading the transaction targets as given
///
/// Nothing is pulled from repositories; the targets must be complete
/// and carry their file lists. `op` is [`Operation::Add`] or
/// [`Operation::Upgrade`].
pub fn prepare_add<'a>(tx: &Transaction<'a>, op: Operation) -> Result<TransactionPlan<'a>> {
    if op == Operation::Remove {
        return Err(Error::UnsupportedOperation(format!(
            "{} cannot prepare an install",
            op
        )));
    }
    let targets = tx.targets();

    let missing = check_deps(tx, op, targets);
    if !missing.is_empty() {
        return Err(Error::UnsatisfiedDependencies(missing));
    }

    let conflicts = check_conflicts(targets, tx.local());
    if !conflicts.is_empty() {
        return Err(Error::ConflictingDependencies(conflicts));
    }

    let packages = sort_by_deps(targets, op);

    let (file_conflicts, skip_list) = find_conflicts(&packages, &tx.config().root, tx.local())?;
    if !file_conflicts.is_empty() {
        return Err(Error::FileConflicts(file_conflicts));
    }

    Ok(TransactionPlan {
        packages,
        pulled: Vec::new(),
        skip_list,
    })
}

/// Prepare removing the transaction targets
///
/// Targets on the hold list are removed only when `confirm` agrees. With
/// `cascade`, orphaned dependencies are removed too.
pub fn prepare_remove<'a>(
    tx: &Transaction<'a>,
    cascade: bool,
    confirm: &mut dyn Confirmer,
) -> Result<TransactionPlan<'a>> {
    let targets = tx.targets();

    for &target in targets {
        if tx.config().is_held(&target.name) && !confirm.confirm_hold(target) {
            warn!("{} is designated as a HoldPkg", target.name);
            return Err(Error::PackageHeld(target.name.clone()));
        }
    }

    let list = if cascade {
        remove_deps(tx, targets)
    } else {
        targets.to_vec()
    };

    let missing = check_deps(tx, Operation::Remove, &list);
    if !missing.is_empty() {
        return Err(Error::UnsatisfiedDependencies(missing));
    }

    let pulled = list[targets.len()..].to_vec();

    Ok(TransactionPlan {
        packages: sort_by_deps(&list, Operation::Remove),
        pulled,
        skip_list: SkipList::new(),
    })
}
