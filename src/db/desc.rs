// src/db/desc.rs

//! `%FIELD%` record parsing
//!
//! Local and sync databases store each package as small text files
//! (`desc`, `depends`, `files`) made of `%FIELD%` headers followed by one
//! value per line.

use crate::error::{Error, Result};
use crate::packages::{InstallReason, Package};
use std::collections::HashMap;

/// Parsed `%FIELD%` sections of one or more record files
pub type DescFields = HashMap<String, Vec<String>>;

/// Parse one record file into its fields
pub fn parse_desc(content: &str) -> DescFields {
    let mut fields = HashMap::new();
    merge_desc(&mut fields, content);
    fields
}

/// Parse `content` and add its fields to `fields`
///
/// Used to fold `desc` and `depends` of the same package into one map.
pub fn merge_desc(fields: &mut DescFields, content: &str) {
    let mut current_field: Option<String> = None;
    let mut values: Vec<String> = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed.len() > 2 && trimmed.starts_with('%') && trimmed.ends_with('%') {
            if let Some(field) = current_field.take() {
                fields
                    .entry(field)
                    .or_default()
                    .append(&mut values);
            }
            current_field = Some(trimmed[1..trimmed.len() - 1].to_string());
        } else if !trimmed.is_empty() {
            values.push(trimmed.to_string());
        }
    }

    if let Some(field) = current_field {
        fields.entry(field).or_default().append(&mut values);
    }
}

/// Build a package from the combined `desc` + `depends` fields
pub fn package_from_fields(fields: &DescFields) -> Result<Package> {
    let name = first(fields, "NAME")
        .ok_or_else(|| Error::ParseError("Missing %NAME% field".to_string()))?;
    let version = first(fields, "VERSION")
        .ok_or_else(|| Error::ParseError(format!("Missing %VERSION% field for {}", name)))?;

    let mut pkg = Package::new(name, version);
    pkg.depends = list(fields, "DEPENDS");
    pkg.provides = list(fields, "PROVIDES");
    pkg.conflicts = list(fields, "CONFLICTS");
    pkg.requiredby = list(fields, "REQUIREDBY");
    pkg.groups = list(fields, "GROUPS");

    if let Some(reason) = first(fields, "REASON") {
        pkg.reason = reason
            .parse::<InstallReason>()
            .map_err(|e| Error::ParseError(format!("{} in {}", e, name)))?;
    }

    Ok(pkg)
}

/// File entries of a `files` record
pub fn files_from_fields(fields: &DescFields) -> Vec<String> {
    list(fields, "FILES")
}

fn first<'f>(fields: &'f DescFields, key: &str) -> Option<&'f str> {
    fields.get(key).and_then(|v| v.first()).map(String::as_str)
}

fn list(fields: &DescFields, key: &str) -> Vec<String> {
    fields.get(key).cloned().unwrap_or_default()
}
