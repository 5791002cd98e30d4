// src/db/sync.rs

//! Repository (sync) database
//!
//! A sync database is a compressed tarball with one directory per
//! package, each holding `desc` and `depends` records (and optionally a
//! `files` record).

use super::desc::{self, DescFields};
use super::{InfoLevel, PackageDatabase};
use crate::error::{Error, Result};
use crate::packages::Package;
use flate2::read::GzDecoder;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tar::Archive;
use tracing::{debug, info};
use xz2::read::XzDecoder;

/// Offset of the `ustar` magic in a tar header
const TAR_MAGIC_OFFSET: usize = 257;

/// An in-memory view of one repository database
#[derive(Debug)]
pub struct SyncDb {
    treename: String,
    packages: Vec<Package>,
}

impl SyncDb {
    /// Load the repository database file at `path`
    ///
    /// The repository name is the file name up to the first `.db`
    /// (`core.db.tar.gz` -> `core`).
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::DatabaseNotFound(path.display().to_string()));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let treename = file_name
            .split(".db")
            .next()
            .unwrap_or(&file_name)
            .to_string();

        let data = std::fs::read(path)?;
        Self::from_bytes(&treename, &data)
    }

    /// Parse a (possibly compressed) database tarball
    pub fn from_bytes(treename: &str, data: &[u8]) -> Result<Self> {
        let tarball = decompress_database(data)?;
        let mut archive = Archive::new(tarball.as_slice());

        // Records grouped by package directory, in archive order
        let mut order: Vec<String> = Vec::new();
        let mut records: HashMap<String, (DescFields, Option<Vec<String>>)> = HashMap::new();

        for entry in archive.entries()? {
            let mut entry = entry.map_err(|e| {
                Error::ParseError(format!("Failed to read tarball entry: {}", e))
            })?;

            let path = entry
                .path()
                .map_err(|e| Error::ParseError(format!("Invalid path in tarball: {}", e)))?
                .to_string_lossy()
                .to_string();

            let Some((dir, record)) = path.trim_end_matches('/').rsplit_once('/') else {
                continue;
            };
            if !matches!(record, "desc" | "depends" | "files") {
                continue;
            }

            let mut content = String::new();
            entry.read_to_string(&mut content).map_err(|e| {
                Error::ParseError(format!("Failed to read {}: {}", path, e))
            })?;

            if !records.contains_key(dir) {
                order.push(dir.to_string());
            }
            let (fields, files) = records.entry(dir.to_string()).or_default();
            if record == "files" {
                *files = Some(desc::files_from_fields(&desc::parse_desc(&content)));
            } else {
                desc::merge_desc(fields, &content);
            }
        }

        let mut packages = Vec::with_capacity(order.len());
        for dir in order {
            let Some((fields, files)) = records.remove(&dir) else {
                continue;
            };
            if !fields.contains_key("NAME") {
                debug!("Skipping {}: no desc record", dir);
                continue;
            }
            let pkg = desc::package_from_fields(&fields)?;
            if let Some(files) = files {
                pkg.set_files(files);
            }
            packages.push(pkg);
        }

        info!("Parsed {} packages from repository {}", packages.len(), treename);

        Ok(Self {
            treename: treename.to_string(),
            packages,
        })
    }
}

impl PackageDatabase for SyncDb {
    fn treename(&self) -> &str {
        &self.treename
    }

    fn package_cache(&self) -> &[Package] {
        &self.packages
    }

    fn read(&self, pkg: &Package, level: InfoLevel) -> Result<()> {
        // Repository databases without `files` records carry no file lists
        if level == InfoLevel::Files && !pkg.is_loaded(InfoLevel::Files) {
            pkg.set_files(Vec::new());
        }
        Ok(())
    }
}

/// Decompress the database (handles .gz, .xz, .zst or a plain tarball)
fn decompress_database(data: &[u8]) -> Result<Vec<u8>> {
    if is_plain_tar(data) {
        return Ok(data.to_vec());
    }

    // Try gzip first
    let mut gz = GzDecoder::new(data);
    let mut decompressed = Vec::new();
    if gz.read_to_end(&mut decompressed).is_ok() && !decompressed.is_empty() {
        debug!("Decompressed gzip database");
        return Ok(decompressed);
    }

    // Try xz
    let mut xz = XzDecoder::new(data);
    let mut decompressed = Vec::new();
    if xz.read_to_end(&mut decompressed).is_ok() && !decompressed.is_empty() {
        debug!("Decompressed xz database");
        return Ok(decompressed);
    }

    // If neither worked, try zstd
    match zstd::decode_all(data) {
        Ok(decompressed) => {
            debug!("Decompressed zstd database");
            Ok(decompressed)
        }
        Err(e) => Err(Error::ParseError(format!(
            "Failed to decompress database (tried gz, xz, zstd): {}",
            e
        ))),
    }
}

fn is_plain_tar(data: &[u8]) -> bool {
    data.len() > TAR_MAGIC_OFFSET + 5 && &data[TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + 5] == b"ustar"
}
