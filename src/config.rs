// src/config.rs

//! Resolver configuration
//!
//! A plain value threaded through every operation instead of process-wide
//! state. It can be read from a pacman.conf-style file:
//!
//! ```text
//! [options]
//! RootDir   = /
//! DBPath    = /var/lib/pacman
//! IgnorePkg = kernel firmware
//! HoldPkg   = pacman glibc
//!
//! [core]
//! [extra]
//! ```
//!
//! Every section other than `[options]` names a sync repository; file
//! order is the order providers are searched in.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default filesystem root
pub const DEFAULT_ROOT: &str = "/";

/// Default database directory (holds `local/` and `sync/`)
pub const DEFAULT_DB_PATH: &str = "/var/lib/pacman";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Filesystem root that file conflicts are checked against
    pub root: PathBuf,
    /// Directory holding the `local` and `sync` databases
    pub db_path: PathBuf,
    /// Packages that must not be pulled in without confirmation
    pub ignore_pkgs: Vec<String>,
    /// Packages the user wants to keep installed
    pub hold_pkgs: Vec<String>,
    /// Sync repositories in search order
    pub repos: Vec<String>,
    /// Answer every confirmation with yes
    pub no_confirm: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            ignore_pkgs: Vec::new(),
            hold_pkgs: Vec::new(),
            repos: Vec::new(),
            no_confirm: false,
        }
    }
}

impl Config {
    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// Parse pacman.conf-style configuration text
    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Self::default();
        let mut section: Option<String> = None;

        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let name = name.trim();
                if name.is_empty() {
                    return Err(Error::ConfigError(format!(
                        "line {}: empty section name",
                        lineno + 1
                    )));
                }
                if name != "options" && !config.repos.iter().any(|r| r == name) {
                    config.repos.push(name.to_string());
                }
                section = Some(name.to_string());
                continue;
            }

            let (key, value) = match line.split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (line, ""),
            };

            match section.as_deref() {
                None => {
                    return Err(Error::ConfigError(format!(
                        "line {}: '{}' outside of any section",
                        lineno + 1,
                        key
                    )));
                }
                Some("options") => config.apply_option(key, value),
                Some(repo) => debug!("Ignoring key '{}' in repository section [{}]", key, repo),
            }
        }

        Ok(config)
    }

    fn apply_option(&mut self, key: &str, value: &str) {
        match key.to_ascii_lowercase().as_str() {
            "rootdir" => self.root = PathBuf::from(value),
            "dbpath" => self.db_path = PathBuf::from(value),
            "ignorepkg" => extend_words(&mut self.ignore_pkgs, value),
            "holdpkg" => extend_words(&mut self.hold_pkgs, value),
            "noconfirm" => self.no_confirm = true,
            _ => warn!("Ignoring unknown option '{}'", key),
        }
    }

    /// Whether `name` is on the ignore list
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore_pkgs.iter().any(|p| p == name)
    }

    /// Whether `name` is on the hold list
    pub fn is_held(&self, name: &str) -> bool {
        self.hold_pkgs.iter().any(|p| p == name)
    }

    /// Directory of the installed package database
    pub fn local_db_path(&self) -> PathBuf {
        self.db_path.join("local")
    }

    /// Directory holding the repository database files
    pub fn sync_db_dir(&self) -> PathBuf {
        self.db_path.join("sync")
    }
}

fn extend_words(list: &mut Vec<String>, value: &str) {
    for word in value.split_whitespace() {
        if !list.iter().any(|w| w == word) {
            list.push(word.to_string());
        }
    }
}
