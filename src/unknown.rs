//! Detection of keys present in a config file but not declared by its schema.
//!
//! Walks the parsed tree alongside the [`Schema`]. A key is known if it is a
//! declared path or a section prefix of one; everything inside a declared
//! value (record fields, map entries) belongs to that value and is never
//! reported. Each unknown key is reported with its file path and best-effort
//! line number.

use std::path::Path;

use serde_yaml::{Mapping, Value as Yaml};

use crate::error::SnapfigError;
use crate::schema::Schema;

/// Every undeclared key in `root`, as [`SnapfigError::UnknownKey`]s in
/// document order.
pub fn find_unknown_keys(
    schema: &Schema,
    root: &Mapping,
    content: &str,
    path: &Path,
) -> Vec<SnapfigError> {
    let mut keys = Vec::new();
    collect(schema, root, "", &mut keys);
    keys.into_iter()
        .map(|key| {
            let line = find_key_line(content, &key);
            SnapfigError::UnknownKey {
                key,
                path: path.to_path_buf(),
                line,
            }
        })
        .collect()
}

/// Fail with [`SnapfigError::UnknownKeys`] if `root` holds any undeclared key.
pub fn validate_unknown_keys(
    schema: &Schema,
    root: &Mapping,
    content: &str,
    path: &Path,
) -> Result<(), SnapfigError> {
    let errors = find_unknown_keys(schema, root, content, path);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(SnapfigError::UnknownKeys(errors))
    }
}

fn collect(schema: &Schema, mapping: &Mapping, prefix: &str, out: &mut Vec<String>) {
    for (key, value) in mapping {
        let key = key_text(key);
        let full = if prefix.is_empty() {
            key
        } else {
            format!("{prefix}.{key}")
        };

        if schema.contains(&full) {
            continue;
        }
        if schema.has_section(&full) {
            match value {
                Yaml::Mapping(nested) => collect(schema, nested, &full, out),
                Yaml::Null => {}
                _ => out.push(full),
            }
            continue;
        }
        out.push(full);
    }
}

fn key_text(key: &Yaml) -> String {
    match key {
        Yaml::String(s) => s.clone(),
        Yaml::Number(n) => n.to_string(),
        Yaml::Bool(b) => b.to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Find the 1-indexed line number for a dotted key in YAML block content.
///
/// Tracks the chain of enclosing keys by indentation and matches when the
/// chain equals the key's segments. Handles plain and quoted block keys; flow
/// mappings and list items are skipped. Returns 0 if the key cannot be located.
fn find_key_line(content: &str, dotted_key: &str) -> usize {
    let segments: Vec<&str> = dotted_key.split('.').collect();
    let mut stack: Vec<(usize, String)> = Vec::new();

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('-') {
            continue;
        }
        let Some(key) = block_key(trimmed) else {
            continue;
        };

        let indent = line.len() - trimmed.len();
        while stack.last().is_some_and(|(depth, _)| *depth >= indent) {
            stack.pop();
        }
        stack.push((indent, key));

        if stack.len() == segments.len()
            && stack.iter().zip(&segments).all(|((_, k), s)| k == s)
        {
            return i + 1;
        }
    }
    0
}

/// The key of a `key: ...` line, unquoted.
fn block_key(trimmed: &str) -> Option<String> {
    if let Some(rest) = trimmed.strip_prefix('"') {
        let end = rest.find('"')?;
        return rest[end + 1..].starts_with(':').then(|| rest[..end].to_string());
    }
    if let Some(rest) = trimmed.strip_prefix('\'') {
        let end = rest.find('\'')?;
        return rest[end + 1..].starts_with(':').then(|| rest[..end].to_string());
    }
    let colon = trimmed
        .match_indices(':')
        .map(|(i, _)| i)
        .find(|&i| trimmed[i + 1..].is_empty() || trimmed[i + 1..].starts_with(' '))?;
    Some(trimmed[..colon].trim_end().to_string())
}
