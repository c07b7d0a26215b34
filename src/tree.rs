//! Raw YAML tree navigation and coercion to value kinds.
//!
//! The loader reads a file into a [`serde_yaml::Mapping`] and, for each
//! declared path, uses [`lookup`] to find the raw node and [`coerce`] to turn
//! it into a [`Value`] of the path's [`Kind`]. Coercion is deliberately
//! forgiving where YAML is ambiguous (text accepts any scalar, floats accept
//! integers) and strict everywhere else.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value as Yaml};

use crate::error::SnapfigError;
use crate::value::{IntMap, Kind, Record, TextMap, Value};

/// Parse a document. An empty (or comment-only) file is an empty mapping; a
/// document whose root is not a mapping is rejected.
pub fn parse_document(path: &Path, text: &str) -> Result<Mapping, SnapfigError> {
    let root: Yaml = serde_yaml::from_str(text).map_err(|source| SnapfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })?;
    match root {
        Yaml::Null => Ok(Mapping::new()),
        Yaml::Mapping(m) => Ok(m),
        other => Err(SnapfigError::InvalidDocument {
            path: path.to_path_buf(),
            reason: format!("expected a mapping at the top level, found {}", describe(&other)),
        }),
    }
}

/// Find the node at a dotted path. `null` counts as absent.
///
/// Segments match keys by their text, so a bare `1:` or `true:` in the file
/// is found under the path segment `"1"` or `"true"`.
pub fn lookup<'a>(root: &'a Mapping, path: &str) -> Option<&'a Yaml> {
    let mut segments = path.split('.');
    let mut node = child(root, segments.next()?)?;
    for segment in segments {
        node = child(node.as_mapping()?, segment)?;
    }
    (!node.is_null()).then_some(node)
}

fn child<'a>(mapping: &'a Mapping, segment: &str) -> Option<&'a Yaml> {
    mapping.get(segment).or_else(|| {
        mapping
            .iter()
            .find(|(k, _)| !k.is_string() && key_text(k).as_deref() == Some(segment))
            .map(|(_, v)| v)
    })
}

/// A scalar or `null` key as text, the way [`unknown`](crate::unknown) names keys.
fn key_text(key: &Yaml) -> Option<String> {
    match key {
        Yaml::Null => Some("null".to_string()),
        other => scalar_text(other),
    }
}

/// Convert a raw node to `kind`.
///
/// `Ok(None)` means an empty list: the file cannot tell "explicitly empty"
/// from "not given", so the caller keeps the default.
pub fn coerce(kind: Kind, raw: &Yaml) -> Result<Option<Value>, String> {
    let mismatch = || format!("expected {kind}, found {}", describe(raw));

    if kind.is_list() {
        match raw {
            Yaml::Sequence(items) if items.is_empty() => return Ok(None),
            Yaml::Sequence(_) => {}
            _ => return Err(mismatch()),
        }
    }

    let value = match kind {
        Kind::Int => Value::Int(typed(raw).ok_or_else(mismatch)?),
        Kind::Double => Value::Double(typed(raw).ok_or_else(mismatch)?),
        Kind::Bool => Value::Bool(typed(raw).ok_or_else(mismatch)?),
        Kind::Text => Value::Text(scalar_text(raw).ok_or_else(mismatch)?),
        Kind::IntList => Value::IntList(typed(raw).ok_or_else(mismatch)?),
        Kind::DoubleList => Value::DoubleList(typed(raw).ok_or_else(mismatch)?),
        Kind::TextList => Value::TextList(
            sequence(raw)
                .iter()
                .map(scalar_text)
                .collect::<Option<_>>()
                .ok_or_else(mismatch)?,
        ),
        Kind::RecordList => Value::RecordList(
            sequence(raw)
                .iter()
                .map(record)
                .collect::<Option<_>>()
                .ok_or_else(mismatch)?,
        ),
        Kind::Record => Value::Record(record(raw).ok_or_else(mismatch)?),
        Kind::TextMap => Value::TextMap(text_map(raw).ok_or_else(mismatch)?),
        Kind::IntMap => Value::IntMap(int_map(raw).ok_or_else(mismatch)?),
    };
    Ok(Some(value))
}

/// Short human description of a node's shape, for warnings.
pub fn describe(raw: &Yaml) -> String {
    match raw {
        Yaml::Null => "null".into(),
        Yaml::Bool(b) => format!("boolean {b}"),
        Yaml::Number(n) => format!("number {n}"),
        Yaml::String(s) => format!("text {s:?}"),
        Yaml::Sequence(_) => "a list".into(),
        Yaml::Mapping(_) => "a mapping".into(),
        Yaml::Tagged(t) => format!("a value tagged {}", t.tag),
    }
}

fn typed<T: DeserializeOwned>(raw: &Yaml) -> Option<T> {
    serde_yaml::from_value(raw.clone()).ok()
}

fn sequence(raw: &Yaml) -> &[Yaml] {
    raw.as_sequence().map(Vec::as_slice).unwrap_or_default()
}

/// Any scalar as text. Numbers and booleans keep their YAML spelling.
fn scalar_text(raw: &Yaml) -> Option<String> {
    match raw {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Number(n) => Some(n.to_string()),
        Yaml::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A mapping with every key turned into text.
fn record(raw: &Yaml) -> Option<Record> {
    raw.as_mapping()?
        .iter()
        .map(|(k, v)| Some((Yaml::String(scalar_text(k)?), v.clone())))
        .collect()
}

fn text_map(raw: &Yaml) -> Option<TextMap> {
    raw.as_mapping()?
        .iter()
        .map(|(k, v)| Some((scalar_text(k)?, scalar_text(v)?)))
        .collect()
}

fn int_map(raw: &Yaml) -> Option<IntMap> {
    raw.as_mapping()?
        .iter()
        .map(|(k, v)| Some((scalar_text(k)?, v.as_i64()?)))
        .collect()
}
