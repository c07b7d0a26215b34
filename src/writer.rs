//! Deterministic YAML rendering of a [`Config`].
//!
//! The output is a function of the snapshot alone:
//!
//! - The schema header, one `# ` line per header line, then a blank line.
//! - One group per first path segment, in first-seen order. Paths without a
//!   section share a single root group placed where the first of them appears.
//!   Groups are separated by exactly one blank line.
//! - Inside a group every intermediate key is written once, the first time
//!   its prefix is reached. Entries under the same prefix are kept together
//!   so a nested key never has to be reopened.
//! - Inline comments are padded to column 40 (at least one space) and appended
//!   as `# comment`. For values spanning several lines the comment sits on the
//!   `key:` line. Section headers are written as comment lines above the key.
//!
//! Per kind: text is double-quoted with escapes, numbers and booleans are
//! literal, integer and float lists are inline (`[1, 5, 10]`), text lists and
//! record lists put one `- ` bullet per line, records and maps are nested
//! blocks. Empty collections render as `[]` or `{}`.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::path::Path;

use serde_yaml::{Mapping, Value as Yaml};

use crate::config::Config;
use crate::error::SnapfigError;
use crate::store::{ConfigStore, YamlFileStore};
use crate::value::{ConfigValue, Value};

const COMMENT_COLUMN: usize = 40;
const INDENT: &str = "  ";

/// Render and store `config` at `path` on the local filesystem.
pub fn write(config: &Config, path: &Path) -> Result<(), SnapfigError> {
    write_to(&YamlFileStore, config, path)
}

pub fn write_to(store: &dyn ConfigStore, config: &Config, path: &Path) -> Result<(), SnapfigError> {
    store.write(path, &render(config))
}

/// Render `config` as a complete YAML document.
pub fn render(config: &Config) -> String {
    let schema = config.schema();
    let mut out = String::new();

    if let Some(header) = schema.header() {
        comment_block(&mut out, 0, header);
        out.push('\n');
    }

    for (i, (group, entries)) in group_entries(config.all_values()).into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if group.is_empty() {
            for entry in entries {
                leaf(&mut out, 0, entry.path(), entry);
            }
            continue;
        }

        if let Some(header) = schema.section_header(group) {
            comment_block(&mut out, 0, header);
        }
        let _ = writeln!(out, "{}:", key(group));

        let mut opened: HashSet<String> = HashSet::new();
        for entry in entries {
            let segments: Vec<&str> = entry.path().split('.').collect();
            for depth in 1..segments.len() - 1 {
                let prefix = segments[..=depth].join(".");
                if opened.insert(prefix.clone()) {
                    if let Some(header) = schema.section_header(&prefix) {
                        comment_block(&mut out, depth, header);
                    }
                    let _ = writeln!(out, "{}{}:", INDENT.repeat(depth), key(segments[depth]));
                }
            }
            let depth = segments.len() - 1;
            leaf(&mut out, depth, segments[depth], entry);
        }
    }
    out
}

/// Split entries into groups by first segment (root group `""` for bare
/// keys), then order each group so entries sharing a prefix are adjacent.
fn group_entries(values: &[ConfigValue]) -> Vec<(&str, Vec<&ConfigValue>)> {
    let mut groups: Vec<(&str, Vec<&ConfigValue>)> = Vec::new();
    for value in values {
        let group = match value.path().split_once('.') {
            Some((first, _)) => first,
            None => "",
        };
        match groups.iter_mut().find(|(g, _)| *g == group) {
            Some((_, entries)) => entries.push(value),
            None => groups.push((group, vec![value])),
        }
    }

    for (_, entries) in &mut groups {
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        let keys: Vec<Vec<usize>> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let segments: Vec<&str> = entry.path().split('.').collect();
                (1..=segments.len())
                    .map(|n| *first_seen.entry(segments[..n].join(".")).or_insert(i))
                    .collect()
            })
            .collect();
        let mut order: Vec<usize> = (0..entries.len()).collect();
        order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
        *entries = order.into_iter().map(|i| entries[i]).collect();
    }
    groups
}

fn comment_block(out: &mut String, depth: usize, text: &str) {
    let pad = INDENT.repeat(depth);
    for line in text.lines() {
        if line.is_empty() {
            let _ = writeln!(out, "{pad}#");
        } else {
            let _ = writeln!(out, "{pad}# {line}");
        }
    }
}

/// Append `# comment` to `line`, padded to the comment column.
fn with_comment(line: String, comment: Option<&str>) -> String {
    match comment {
        None => line,
        Some(comment) => {
            let width = line.chars().count();
            let pad = COMMENT_COLUMN.saturating_sub(width).max(1);
            format!("{line}{}# {}", " ".repeat(pad), comment.replace('\n', " "))
        }
    }
}

fn leaf(out: &mut String, depth: usize, name: &str, entry: &ConfigValue) {
    let head = format!("{}{}:", INDENT.repeat(depth), key(name));
    let comment = entry.comment();
    let value = entry.value();

    let block = match &value {
        Value::TextList(items) if !items.is_empty() => {
            let items: Vec<Yaml> = items.iter().map(|s| Yaml::String(s.clone())).collect();
            Some(Yaml::Sequence(items))
        }
        Value::RecordList(items) if !items.is_empty() => Some(Yaml::Sequence(
            items.iter().cloned().map(Yaml::Mapping).collect(),
        )),
        Value::Record(map) if !map.is_empty() => Some(Yaml::Mapping(map.clone())),
        Value::TextMap(map) if !map.is_empty() => Some(value.to_yaml()),
        Value::IntMap(map) if !map.is_empty() => Some(value.to_yaml()),
        _ => None,
    };

    match block {
        None => {
            let line = format!("{head} {}", format_inline(&value));
            let _ = writeln!(out, "{}", with_comment(line, comment));
        }
        Some(node) => {
            let _ = writeln!(out, "{}", with_comment(head, comment));
            block_body(out, depth + 1, &node);
        }
    }
}

/// Write the lines under a `key:` whose value is a non-empty collection.
fn block_body(out: &mut String, depth: usize, node: &Yaml) {
    match node {
        Yaml::Sequence(items) => {
            for item in items {
                bullet(out, depth, item);
            }
        }
        Yaml::Mapping(map) => mapping_body(out, depth, map),
        other => {
            let _ = writeln!(out, "{}{}", INDENT.repeat(depth), flow(other));
        }
    }
}

fn mapping_body(out: &mut String, depth: usize, map: &Mapping) {
    let pad = INDENT.repeat(depth);
    for (k, v) in map {
        let name = key(&scalar_key(k));
        if is_block(v) {
            let _ = writeln!(out, "{pad}{name}:");
            block_body(out, depth + 1, v);
        } else {
            let _ = writeln!(out, "{pad}{name}: {}", flow(v));
        }
    }
}

/// One `- ` list element. Mappings put their first field after the dash and
/// indent the rest beneath it.
fn bullet(out: &mut String, depth: usize, item: &Yaml) {
    let pad = INDENT.repeat(depth);
    if !is_block(item) {
        let _ = writeln!(out, "{pad}- {}", flow(item));
        return;
    }
    let mut body = String::new();
    match item {
        Yaml::Mapping(map) => mapping_body(&mut body, depth + 1, map),
        other => block_body(&mut body, depth + 1, other),
    }
    // The first body line starts with `pad + INDENT`; the dash takes that slot.
    let inner = format!("{pad}{INDENT}");
    if let Some(rest) = body.strip_prefix(&inner) {
        let _ = write!(out, "{pad}- {rest}");
    } else {
        out.push_str(&body);
    }
}

/// Values written on their own lines: non-empty mappings, and non-empty
/// sequences holding any collection.
fn is_block(node: &Yaml) -> bool {
    match node {
        Yaml::Mapping(map) => !map.is_empty(),
        Yaml::Sequence(items) => items
            .iter()
            .any(|i| matches!(i, Yaml::Mapping(_) | Yaml::Sequence(_))),
        _ => false,
    }
}

/// Single-line form of any value. Used for scalar kinds, numeric lists and
/// empty collections here, and by `config list`/`config get`.
pub fn format_inline(value: &Value) -> String {
    match value {
        Value::Int(i) => i.to_string(),
        Value::Double(d) => format_float(*d),
        Value::Text(s) => quote(s),
        Value::Bool(b) => b.to_string(),
        Value::IntList(items) => {
            let items: Vec<String> = items.iter().map(i64::to_string).collect();
            format!("[{}]", items.join(", "))
        }
        Value::DoubleList(items) => {
            let items: Vec<String> = items.iter().map(|d| format_float(*d)).collect();
            format!("[{}]", items.join(", "))
        }
        other => flow(&other.to_yaml()),
    }
}

/// Flow-style YAML for an arbitrary node.
fn flow(node: &Yaml) -> String {
    match node {
        Yaml::Null => "~".to_string(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format_float(f),
            _ => n.to_string(),
        },
        Yaml::String(s) => quote(s),
        Yaml::Sequence(items) => {
            let items: Vec<String> = items.iter().map(flow).collect();
            format!("[{}]", items.join(", "))
        }
        Yaml::Mapping(map) => {
            let fields: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", key(&scalar_key(k)), flow(v)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        Yaml::Tagged(tagged) => format!("{} {}", tagged.tag, flow(&tagged.value)),
    }
}

fn scalar_key(k: &Yaml) -> String {
    match k {
        Yaml::String(s) => s.clone(),
        Yaml::Number(n) => n.to_string(),
        Yaml::Bool(b) => b.to_string(),
        other => flow(other),
    }
}

fn format_float(d: f64) -> String {
    if d.is_nan() {
        return ".nan".to_string();
    }
    if d.is_infinite() {
        return (if d > 0.0 { ".inf" } else { "-.inf" }).to_string();
    }
    let text = format!("{d:?}");
    match text.split_once('e') {
        Some((mantissa, exp)) if !mantissa.contains('.') => format!("{mantissa}.0e{exp}"),
        _ => text,
    }
}

/// Double-quoted YAML string.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// A mapping key, quoted unless it is a plain word that reads back as the
/// same text (`1`, `true`, `null` and `0x1F` are not).
fn key(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        && matches!(serde_yaml::from_str::<Yaml>(name), Ok(Yaml::String(s)) if s == name);
    if plain { name.to_string() } else { quote(name) }
}
