// src/packages/mod.rs

//! Package views and dependency specs
//!
//! [`Package`] is the read-only record the databases hand out;
//! [`Dependency`] is a parsed `name[op version]` spec from its lists.

pub mod depend;
pub mod package;

pub use depend::{DepMod, Dependency};
pub use package::{InfoLevel, InstallReason, Package};
