// src/db/memory.rs

//! In-memory package database

use super::{InfoLevel, PackageDatabase};
use crate::error::Result;
use crate::packages::Package;

/// A database whose packages are supplied directly by the caller
#[derive(Debug, Clone)]
pub struct MemoryDb {
    treename: String,
    packages: Vec<Package>,
}

impl MemoryDb {
    /// Create an empty database
    pub fn new(treename: &str) -> Self {
        Self {
            treename: treename.to_string(),
            packages: Vec::new(),
        }
    }

    /// Add a package, replacing any package with the same name
    pub fn add(&mut self, pkg: Package) {
        match self.packages.iter_mut().find(|p| p.name == pkg.name) {
            Some(existing) => *existing = pkg,
            None => self.packages.push(pkg),
        }
    }

    pub fn with_package(mut self, pkg: Package) -> Self {
        self.add(pkg);
        self
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl PackageDatabase for MemoryDb {
    fn treename(&self) -> &str {
        &self.treename
    }

    fn package_cache(&self) -> &[Package] {
        &self.packages
    }

    fn read(&self, pkg: &Package, level: InfoLevel) -> Result<()> {
        // Nothing is stored outside the package itself: an unloaded file
        // list is an empty one.
        if level == InfoLevel::Files && !pkg.is_loaded(InfoLevel::Files) {
            pkg.set_files(Vec::new());
        }
        Ok(())
    }
}
