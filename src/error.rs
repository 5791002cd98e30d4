// src/error.rs

use crate::filesystem::Conflict;
use crate::resolver::MissingDependency;
use thiserror::Error;

/// Core error types for pkgdeps
#[derive(Error, Debug)]
pub enum Error {
    /// A dependency string could not be parsed
    #[error("Invalid dependency spec: {0:?}")]
    InvalidSpec(String),

    /// One or more dependencies cannot be satisfied
    #[error("Unsatisfied dependencies: {}", join_display(.0))]
    UnsatisfiedDependencies(Vec<MissingDependency>),

    /// Packages in the transaction conflict with each other or with installed packages
    #[error("Conflicting dependencies: {}", join_display(.0))]
    ConflictingDependencies(Vec<MissingDependency>),

    /// Files in the transaction collide with each other or with the filesystem
    #[error("File conflicts: {}", join_display(.0))]
    FileConflicts(Vec<Conflict>),

    /// Package not found in any database
    #[error("Package not found: {0}")]
    PackageNotFound(String),

    /// A held package was not confirmed for removal
    #[error("Package is held: {0}")]
    PackageHeld(String),

    /// The operation is not valid for this kind of preparation
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Database not found
    #[error("Database not found at path: {0}")]
    DatabaseNotFound(String),

    /// Database content could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A package file entry points outside the root
    #[error("Path traversal attempt: {0}")]
    PathTraversal(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_display<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias using pkgdeps' Error type
pub type Result<T> = std::result::Result<T, Error>;
