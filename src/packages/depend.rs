// src/packages/depend.rs

//! Dependency specs
//!
//! Parses raw dependency strings such as `glibc>=2.34`, `zlib` or
//! `sh=5.2-1` into a name, a comparison operator and a version.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Version comparison operator of a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DepMod {
    /// No version specified, any version is acceptable
    Any,
    Eq,
    Ge,
    Le,
    Gt,
    Lt,
}

impl DepMod {
    pub fn as_str(&self) -> &str {
        match self {
            DepMod::Any => "",
            DepMod::Eq => "=",
            DepMod::Ge => ">=",
            DepMod::Le => "<=",
            DepMod::Gt => ">",
            DepMod::Lt => "<",
        }
    }
}

/// Operators in scan priority order. Two-character operators come first so
/// that `>=` is never read as `=`.
const OPERATORS: [(&str, DepMod); 5] = [
    (">=", DepMod::Ge),
    ("<=", DepMod::Le),
    ("=", DepMod::Eq),
    ("<", DepMod::Lt),
    (">", DepMod::Gt),
];

/// A parsed dependency: `{name, operator, version}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Dependency {
    pub name: String,
    #[serde(rename = "mod")]
    pub modifier: DepMod,
    pub version: String,
}

impl Dependency {
    /// Parse a raw dependency string
    ///
    /// The first operator found (in the order `>=`, `<=`, `=`, `<`, `>`)
    /// splits the string into name and version. Without an operator the
    /// whole string is the name and any version matches.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::InvalidSpec(raw.to_string()));
        }

        for (op, modifier) in OPERATORS {
            if let Some(pos) = raw.find(op) {
                return Ok(Self {
                    name: raw[..pos].to_string(),
                    modifier,
                    version: raw[pos + op.len()..].to_string(),
                });
            }
        }

        Ok(Self::any(raw))
    }

    /// A dependency on `name` with no version constraint
    pub fn any(name: &str) -> Self {
        Self {
            name: name.to_string(),
            modifier: DepMod::Any,
            version: String::new(),
        }
    }

    /// Parse every entry of a raw depends list, skipping malformed entries
    pub fn parse_all<'a, I>(raw: I) -> Vec<Self>
    where
        I: IntoIterator<Item = &'a String>,
    {
        raw.into_iter()
            .filter_map(|spec| match Self::parse(spec) {
                Ok(dep) => Some(dep),
                Err(e) => {
                    tracing::warn!("Skipping dependency: {}", e);
                    None
                }
            })
            .collect()
    }
}

impl FromStr for Dependency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.modifier != DepMod::Any {
            write!(f, "{}{}", self.modifier.as_str(), self.version)?;
        }
        Ok(())
    }
}
