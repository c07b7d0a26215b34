//! Schema declaration: the code-defined shape of a configuration file.
//!
//! A [`Schema`] is an ordered set of [`ConfigValue`] definitions keyed by
//! dotted path, plus an optional file header and per-section header comments.
//! It is built once through [`Schema::builder`] and never changes afterwards.
//! Declaration order is kept and drives both load order and write order.
//!
//! ```ignore
//! let schema = Schema::builder("abilities")
//!     .header("Abilities Configuration")
//!     .bool_value("abilities-enabled", true, "Master toggle for all abilities")
//!     .section("keraunos")
//!         .int_value_with("cooldown", 10, Validator::range(0, 300), "Cooldown in seconds")
//!         .double_value_with("radius", 3.0, Validator::min(0.0), "Effect radius in blocks")
//!         .section("knockback")
//!             .double_value("horizontal", 0.8, "")
//!             .double_value("vertical", 1.0, "")
//!         .parent()
//!         .text_list("allowed-items", ["DIAMOND_SWORD", "IRON_SWORD"], "")
//!     .end()
//!     .section("medkit")
//!         .int_value_with("charges", 3, Validator::range(1, 10), "Total charges")
//!     .build()?;
//! ```
//!
//! Builder mistakes (duplicate paths, a path that is both a value and a
//! section, `parent()` on a top-level section) are collected while declaring
//! and reported by [`build`](SchemaBuilder::build).

use std::collections::{HashMap, HashSet};

use crate::error::SnapfigError;
use crate::validator::Validator;
use crate::value::{ConfigValue, Definition, IntMap, Record, TextMap, ValueType};

#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    header: Option<String>,
    values: Vec<ConfigValue>,
    index: HashMap<String, usize>,
    section_headers: HashMap<String, String>,
}

impl Schema {
    /// Start declaring a schema. `name` is the base name of the persisted file.
    pub fn builder(name: &str) -> SchemaBuilder {
        SchemaBuilder {
            name: name.to_string(),
            header: None,
            values: Vec::new(),
            section_headers: HashMap::new(),
            errors: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Multi-line comment written at the top of the file.
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    /// Every declared value at its default, in declaration order.
    pub fn values(&self) -> &[ConfigValue] {
        &self.values
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(ConfigValue::path)
    }

    pub fn get(&self, path: &str) -> Option<&ConfigValue> {
        self.index.get(path).map(|&i| &self.values[i])
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// True if some declared path lives below `prefix`.
    pub fn has_section(&self, prefix: &str) -> bool {
        let needle = format!("{prefix}.");
        self.paths().any(|p| p.starts_with(&needle))
    }

    /// Header comment declared for the section at `prefix` (e.g. `"keraunos"`).
    pub fn section_header(&self, prefix: &str) -> Option<&str> {
        self.section_headers.get(prefix).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn index_of(&self, path: &str) -> Option<usize> {
        self.index.get(path).copied()
    }
}

/// Value declarations shared by [`SchemaBuilder`] and [`SectionBuilder`].
///
/// Keys are relative: on a section builder they are joined to the section's
/// prefix, on the schema builder they are used as-is. An empty comment means
/// no comment.
pub trait Declare: Sized {
    /// Register `definition` under `key`. The definition's own path is
    /// replaced by the resolved full path.
    fn register<T: ValueType>(self, key: &str, definition: Definition<T>) -> Self;

    fn value<T: ValueType>(self, key: &str, default: T, comment: &str) -> Self {
        self.register(key, Definition::new(key, default).with_comment(comment))
    }

    fn value_with<T: ValueType>(
        self,
        key: &str,
        default: T,
        validator: Validator<T>,
        comment: &str,
    ) -> Self {
        self.register(
            key,
            Definition::new(key, default)
                .with_validator(validator)
                .with_comment(comment),
        )
    }

    fn int_value(self, key: &str, default: i64, comment: &str) -> Self {
        self.value(key, default, comment)
    }

    fn int_value_with(self, key: &str, default: i64, validator: Validator<i64>, comment: &str) -> Self {
        self.value_with(key, default, validator, comment)
    }

    fn double_value(self, key: &str, default: f64, comment: &str) -> Self {
        self.value(key, default, comment)
    }

    fn double_value_with(self, key: &str, default: f64, validator: Validator<f64>, comment: &str) -> Self {
        self.value_with(key, default, validator, comment)
    }

    fn text_value(self, key: &str, default: impl Into<String>, comment: &str) -> Self {
        self.value(key, default.into(), comment)
    }

    fn text_value_with(
        self,
        key: &str,
        default: impl Into<String>,
        validator: Validator<String>,
        comment: &str,
    ) -> Self {
        self.value_with(key, default.into(), validator, comment)
    }

    fn bool_value(self, key: &str, default: bool, comment: &str) -> Self {
        self.value(key, default, comment)
    }

    fn text_list<I>(self, key: &str, default: I, comment: &str) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.value(key, default.into_iter().map(Into::into).collect::<Vec<String>>(), comment)
    }

    fn text_list_with<I>(
        self,
        key: &str,
        default: I,
        validator: Validator<Vec<String>>,
        comment: &str,
    ) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let default: Vec<String> = default.into_iter().map(Into::into).collect();
        self.value_with(key, default, validator, comment)
    }

    fn int_list(self, key: &str, default: impl IntoIterator<Item = i64>, comment: &str) -> Self {
        self.value(key, default.into_iter().collect::<Vec<i64>>(), comment)
    }

    fn int_list_with(
        self,
        key: &str,
        default: impl IntoIterator<Item = i64>,
        validator: Validator<Vec<i64>>,
        comment: &str,
    ) -> Self {
        self.value_with(key, default.into_iter().collect(), validator, comment)
    }

    fn double_list(self, key: &str, default: impl IntoIterator<Item = f64>, comment: &str) -> Self {
        self.value(key, default.into_iter().collect::<Vec<f64>>(), comment)
    }

    fn double_list_with(
        self,
        key: &str,
        default: impl IntoIterator<Item = f64>,
        validator: Validator<Vec<f64>>,
        comment: &str,
    ) -> Self {
        self.value_with(key, default.into_iter().collect(), validator, comment)
    }

    fn record_list(self, key: &str, default: Vec<Record>, comment: &str) -> Self {
        self.value(key, default, comment)
    }

    fn record_list_with(
        self,
        key: &str,
        default: Vec<Record>,
        validator: Validator<Vec<Record>>,
        comment: &str,
    ) -> Self {
        self.value_with(key, default, validator, comment)
    }

    fn record_value(self, key: &str, default: Record, comment: &str) -> Self {
        self.value(key, default, comment)
    }

    fn text_map(self, key: &str, default: TextMap, comment: &str) -> Self {
        self.value(key, default, comment)
    }

    fn text_map_with(self, key: &str, default: TextMap, validator: Validator<TextMap>, comment: &str) -> Self {
        self.value_with(key, default, validator, comment)
    }

    fn int_map(self, key: &str, default: IntMap, comment: &str) -> Self {
        self.value(key, default, comment)
    }

    fn int_map_with(self, key: &str, default: IntMap, validator: Validator<IntMap>, comment: &str) -> Self {
        self.value_with(key, default, validator, comment)
    }
}

/// Top-level schema builder. Values declared here use their bare key as path.
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    header: Option<String>,
    values: Vec<ConfigValue>,
    section_headers: HashMap<String, String>,
    errors: Vec<SnapfigError>,
}

impl SchemaBuilder {
    /// Set the file header comment.
    pub fn header(mut self, header: &str) -> Self {
        self.header = Some(header.to_string());
        self
    }

    /// Open a section. Every value declared on the returned builder lives
    /// under `prefix`.
    pub fn section(self, prefix: &str) -> SectionBuilder {
        SectionBuilder {
            schema: self,
            prefix: prefix.split('.').map(str::to_string).collect(),
        }
    }

    /// Register a fully-formed value at its own path.
    pub fn define(mut self, value: impl Into<ConfigValue>) -> Self {
        self.values.push(value.into());
        self
    }

    /// Finish declaring. Fails on the first recorded builder mistake or
    /// invalid, duplicate or conflicting path.
    pub fn build(mut self) -> Result<Schema, SnapfigError> {
        if !self.errors.is_empty() {
            return Err(self.errors.remove(0));
        }

        let mut index = HashMap::with_capacity(self.values.len());
        for (i, value) in self.values.iter().enumerate() {
            let path = value.path();
            if path.split('.').any(str::is_empty) {
                return Err(SnapfigError::InvalidPath(path.to_string()));
            }
            if index.insert(path.to_string(), i).is_some() {
                return Err(SnapfigError::DuplicatePath(path.to_string()));
            }
        }

        let paths: HashSet<&str> = index.keys().map(String::as_str).collect();
        for value in &self.values {
            let path = value.path();
            let mut end = 0;
            while let Some(offset) = path[end..].find('.') {
                end += offset;
                if paths.contains(&path[..end]) {
                    return Err(SnapfigError::PathConflict {
                        path: path[..end].to_string(),
                        other: path.to_string(),
                    });
                }
                end += 1;
            }
        }

        Ok(Schema {
            name: self.name,
            header: self.header,
            values: self.values,
            index,
            section_headers: self.section_headers,
        })
    }
}

impl Declare for SchemaBuilder {
    fn register<T: ValueType>(self, key: &str, definition: Definition<T>) -> Self {
        self.define(definition.with_path(key.to_string()))
    }
}

/// Builder bound to a (possibly nested) section prefix.
///
/// [`section`](Self::section) descends one level, [`parent`](Self::parent)
/// climbs back to the enclosing section and [`end`](Self::end) returns to
/// the top level.
#[derive(Debug)]
pub struct SectionBuilder {
    schema: SchemaBuilder,
    prefix: Vec<String>,
}

impl SectionBuilder {
    /// Dotted prefix of this section, e.g. `"keraunos.knockback"`.
    pub fn prefix(&self) -> String {
        self.prefix.join(".")
    }

    /// Set the header comment written above this section's key.
    pub fn header(mut self, header: &str) -> Self {
        let prefix = self.prefix();
        self.schema.section_headers.insert(prefix, header.to_string());
        self
    }

    /// Open a nested section under this one.
    pub fn section(mut self, key: &str) -> Self {
        self.prefix.extend(key.split('.').map(str::to_string));
        self
    }

    /// Return to the enclosing section. Calling this on a top-level section
    /// is a mistake and makes [`build`](Self::build) fail.
    pub fn parent(mut self) -> Self {
        if self.prefix.len() <= 1 {
            let prefix = self.prefix();
            self.schema.errors.push(SnapfigError::SectionUnderflow(prefix));
        } else {
            self.prefix.pop();
        }
        self
    }

    /// Leave the section and continue declaring top-level values.
    pub fn end(self) -> SchemaBuilder {
        self.schema
    }

    pub fn build(self) -> Result<Schema, SnapfigError> {
        self.schema.build()
    }
}

impl Declare for SectionBuilder {
    fn register<T: ValueType>(mut self, key: &str, definition: Definition<T>) -> Self {
        let path = format!("{}.{key}", self.prefix());
        self.schema.values.push(definition.with_path(path).into());
        self
    }
}
