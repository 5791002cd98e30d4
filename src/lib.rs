// src/lib.rs

//! pkgdeps: dependency resolution for pacman-style package databases
//!
//! Decides, for a transaction on a set of packages, whether it can go
//! ahead and in which order packages should be processed.
//!
//! # Architecture
//!
//! - Databases own packages; everything else borrows them
//! - One read-only [`resolver::Transaction`] context per operation, no globals
//! - Versioned dependency strings, compared with pacman's `vercmp` rules
//! - Dependency-ordered sorting, recursive resolution from sync repositories
//! - Package-level and file-level conflict detection

pub mod config;
pub mod db;
mod error;
pub mod filesystem;
pub mod packages;
pub mod resolver;
pub mod version;

pub use error::{Error, Result};
