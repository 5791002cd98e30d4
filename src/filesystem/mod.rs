// src/filesystem/mod.rs

//! File conflict detection
//!
//! Before a transaction touches the disk every declared file of every
//! target is checked against the other targets and against what already
//! exists under the root. Files that change owner within the transaction
//! are not conflicts; they are collected in a [`SkipList`] so the removal
//! step leaves them in place.

pub mod path;

use crate::db::{PackageDatabase, load_files};
use crate::error::Result;
use crate::packages::{InfoLevel, Package};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::ptr;
use tracing::debug;

/// Paths exempt from conflict reporting and from removal
pub type SkipList = BTreeSet<String>;

/// Where a conflicting file collides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    /// Two targets declare the same file
    Target,
    /// A target's file already exists on disk and is not accounted for
    File,
}

/// A single file conflict
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Conflict {
    Target {
        target: String,
        file: String,
        conflicting_target: String,
    },
    File {
        target: String,
        file: String,
    },
}

impl Conflict {
    pub fn kind(&self) -> ConflictKind {
        match self {
            Conflict::Target { .. } => ConflictKind::Target,
            Conflict::File { .. } => ConflictKind::File,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Conflict::Target { target, .. } | Conflict::File { target, .. } => target,
        }
    }

    pub fn file(&self) -> &str {
        match self {
            Conflict::Target { file, .. } | Conflict::File { file, .. } => file,
        }
    }

    /// The other target for [`ConflictKind::Target`], empty otherwise
    pub fn conflicting_target(&self) -> &str {
        match self {
            Conflict::Target {
                conflicting_target, ..
            } => conflicting_target,
            Conflict::File { .. } => "",
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::Target {
                target,
                file,
                conflicting_target,
            } => write!(f, "{}: {} exists in '{}'", target, file, conflicting_target),
            Conflict::File { target, file } => {
                write!(f, "{}: {} exists in filesystem", target, file)
            }
        }
    }
}

fn is_directory_entry(entry: &str) -> bool {
    entry.ends_with('/')
}

/// Non-directory entries present in both sorted lists
fn common_files<'f>(a: &'f [String], b: &[String]) -> Vec<&'f String> {
    let (mut i, mut j) = (0, 0);
    let mut common = Vec::new();

    while i < a.len() && j < b.len() {
        if is_directory_entry(&a[i]) {
            i += 1;
        } else if is_directory_entry(&b[j]) {
            j += 1;
        } else {
            match a[i].cmp(&b[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    common.push(&a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
    }

    common
}

/// Whether `file` is leaving some other installed package in this
/// transaction: still owned by the installed version, dropped by the new one
fn is_moving_owner(
    targets: &[&Package],
    target: &Package,
    file: &str,
    local: &dyn PackageDatabase,
) -> Result<bool> {
    for other in targets {
        if ptr::eq(*other, target) || other.name == target.name {
            continue;
        }
        let Some(installed) = local.find(&other.name) else {
            continue;
        };
        let owned = load_files(local, installed)?
            .binary_search_by(|f| f.as_str().cmp(file))
            .is_ok();
        if owned && !other.owns_file(file) {
            debug!(
                "file {} moves from {} to {}",
                file, other.name, target.name
            );
            return Ok(true);
        }
    }
    Ok(false)
}

/// Check `target`'s files against what exists under `root`
fn check_filesystem(
    targets: &[&Package],
    target: &Package,
    root: &Path,
    local: &dyn PackageDatabase,
    conflicts: &mut Vec<Conflict>,
    skip_list: &mut SkipList,
) -> Result<()> {
    let installed = local.find(&target.name);

    for file in target.files() {
        let on_disk = path::root_join(root, file)?;
        if fs::symlink_metadata(&on_disk).is_err() {
            continue;
        }
        if fs::metadata(&on_disk).map(|m| m.is_dir()).unwrap_or(false) {
            continue;
        }

        // Upgrading a package that already owns the file
        if let Some(installed) = installed {
            if load_files(local, installed)?
                .binary_search_by(|f| f.as_str().cmp(file))
                .is_ok()
            {
                continue;
            }
        }

        if is_moving_owner(targets, target, file, local)? {
            skip_list.insert(file.clone());
            continue;
        }

        debug!("file conflict: {} ({})", file, target.name);
        conflicts.push(Conflict::File {
            target: target.name.clone(),
            file: file.clone(),
        });
    }

    Ok(())
}

/// Find file conflicts for `targets` installed under `root`
///
/// Targets must have their file lists loaded. Installed file lists are
/// loaded from `local` as needed. No path ends up in both the conflict
/// list and the skip list.
pub fn find_conflicts(
    targets: &[&Package],
    root: &Path,
    local: &dyn PackageDatabase,
) -> Result<(Vec<Conflict>, SkipList)> {
    let mut conflicts = Vec::new();
    let mut skip_list = SkipList::new();

    for (i, target) in targets.iter().enumerate() {
        if !target.is_loaded(InfoLevel::Files) {
            debug!("no file list for {}", target.name);
        }

        for other in &targets[i + 1..] {
            if other.name == target.name {
                continue;
            }
            for file in common_files(target.files(), other.files()) {
                debug!(
                    "file conflict: {} ({} vs {})",
                    file, target.name, other.name
                );
                conflicts.push(Conflict::Target {
                    target: target.name.clone(),
                    file: file.clone(),
                    conflicting_target: other.name.clone(),
                });
            }
        }

        check_filesystem(targets, target, root, local, &mut conflicts, &mut skip_list)?;
    }

    skip_list.retain(|file| !conflicts.iter().any(|c| c.file() == file));

    Ok((conflicts, skip_list))
}
