// src/db/local.rs

//! Installed package database
//!
//! Layout: one directory per package, named `<name>-<version>`, holding
//! `desc`, `depends` and `files` records. `desc` and `depends` are read
//! when the database is opened; `files` only when a caller asks for it.

use super::desc::{self, DescFields};
use super::{InfoLevel, PackageDatabase};
use crate::error::{Error, Result};
use crate::packages::Package;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory-backed database of installed packages
#[derive(Debug)]
pub struct LocalDb {
    path: PathBuf,
    packages: Vec<Package>,
    /// Package name to its record directory
    entries: HashMap<String, PathBuf>,
}

impl LocalDb {
    /// Open the database rooted at `path` (e.g. `/var/lib/pacman/local`)
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Err(Error::DatabaseNotFound(path.display().to_string()));
        }

        let mut dirs: Vec<PathBuf> = fs::read_dir(path)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();

        let mut packages = Vec::with_capacity(dirs.len());
        let mut entries = HashMap::new();

        for dir in dirs {
            let desc_path = dir.join("desc");
            if !desc_path.exists() {
                debug!("Skipping {}: no desc record", dir.display());
                continue;
            }

            let mut fields: DescFields = desc::parse_desc(&fs::read_to_string(&desc_path)?);
            let depends_path = dir.join("depends");
            if depends_path.exists() {
                desc::merge_desc(&mut fields, &fs::read_to_string(&depends_path)?);
            }

            let pkg = desc::package_from_fields(&fields)?;
            entries.insert(pkg.name.clone(), dir);
            packages.push(pkg);
        }

        info!("Loaded {} installed packages from {}", packages.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            packages,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PackageDatabase for LocalDb {
    fn treename(&self) -> &str {
        "local"
    }

    fn package_cache(&self) -> &[Package] {
        &self.packages
    }

    fn read(&self, pkg: &Package, level: InfoLevel) -> Result<()> {
        if level != InfoLevel::Files || pkg.is_loaded(InfoLevel::Files) {
            return Ok(());
        }

        let dir = self
            .entries
            .get(&pkg.name)
            .ok_or_else(|| Error::PackageNotFound(format!("{} (local)", pkg.name)))?;

        let files_path = dir.join("files");
        let files = if files_path.exists() {
            desc::files_from_fields(&desc::parse_desc(&fs::read_to_string(&files_path)?))
        } else {
            Vec::new()
        };

        debug!("Loaded {} file entries for {}", files.len(), pkg.name);
        pkg.set_files(files);
        Ok(())
    }
}
