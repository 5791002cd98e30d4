// src/filesystem/path.rs

//! Mapping package file entries onto the target root
//!
//! File entries come from package and database records, so they are
//! untrusted: `..` components are rejected rather than resolved.

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Turn a package file entry into a path relative to the root
///
/// Leading and trailing slashes are dropped (`usr/share/` -> `usr/share`).
pub fn sanitize_path(entry: &str) -> Result<PathBuf> {
    let relative = entry.trim_start_matches('/');
    let mut normalized = PathBuf::new();

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(c) => normalized.push(c),
            Component::CurDir => {}
            Component::ParentDir => return Err(Error::PathTraversal(entry.to_string())),
            Component::Prefix(_) | Component::RootDir => {}
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(Error::PathTraversal(format!("empty path entry {:?}", entry)));
    }

    Ok(normalized)
}

/// Join a package file entry below `root`
pub fn root_join(root: &Path, entry: &str) -> Result<PathBuf> {
    Ok(root.join(sanitize_path(entry)?))
}
