// src/db/mod.rs

//! Package databases consumed by the resolver
//!
//! The resolver never owns packages: it borrows them from a
//! [`PackageDatabase`]. Three implementations are provided:
//! - [`MemoryDb`]: packages built in memory (embedders, tests)
//! - [`LocalDb`]: the installed-package directory tree
//! - [`SyncDb`]: a repository database archive

pub mod desc;
pub mod local;
pub mod memory;
pub mod sync;

pub use crate::packages::InfoLevel;
pub use local::LocalDb;
pub use memory::MemoryDb;
pub use sync::SyncDb;

use crate::error::Result;
use crate::packages::Package;
use tracing::debug;

/// Read-only access to a set of packages
pub trait PackageDatabase {
    /// Database name ("local", or the repository name)
    fn treename(&self) -> &str;

    /// All packages, in database order
    fn package_cache(&self) -> &[Package];

    /// Look up a package by exact name
    fn find(&self, name: &str) -> Option<&Package> {
        self.package_cache().iter().find(|pkg| pkg.name == name)
    }

    /// Packages whose provides list names `name`, in database order
    fn what_provides(&self, name: &str) -> Vec<&Package> {
        self.package_cache()
            .iter()
            .filter(|pkg| pkg.provides(name))
            .collect()
    }

    /// Load `level` into `pkg` if it is not loaded yet
    ///
    /// `pkg` must belong to this database.
    fn read(&self, pkg: &Package, level: InfoLevel) -> Result<()>;
}

/// Make sure `pkg`'s file list is loaded and return it
pub fn load_files<'p>(db: &dyn PackageDatabase, pkg: &'p Package) -> Result<&'p [String]> {
    if !pkg.is_loaded(InfoLevel::Files) {
        debug!("loading FILES info for '{}'", pkg.name);
        db.read(pkg, InfoLevel::Files)?;
    }
    Ok(pkg.files())
}
