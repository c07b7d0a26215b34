//! Immutable configuration snapshots.
//!
//! A [`Config`] holds one populated [`ConfigValue`] per path declared by its
//! [`Schema`], never more and never fewer. It is never modified: [`Config::with`]
//! and [`Config::with_all`] validate the change and return a new snapshot,
//! leaving the original untouched. Snapshots are `Send + Sync` and can be
//! shared freely; which snapshot is "current" is up to the caller (see
//! [`ConfigRegistry`](crate::ConfigRegistry) for one way to do that).
//!
//! Typed getters check the kind stored at a path. Asking for an integer where
//! a list lives is a [`SnapfigError::KindMismatch`], never a silent coercion.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::SnapfigError;
use crate::schema::Schema;
use crate::validation::ValidationResult;
use crate::value::{ConfigValue, IntMap, Record, TextMap, Value, ValueType};
use crate::writer;

#[derive(Debug, Clone)]
pub struct Config {
    schema: Arc<Schema>,
    values: Vec<ConfigValue>,
}

impl Config {
    /// The snapshot holding every declared default.
    pub fn defaults(schema: impl Into<Arc<Schema>>) -> Self {
        let schema = schema.into();
        let values = schema.values().to_vec();
        Self { schema, values }
    }

    /// `values` must be in schema declaration order, one per declared path.
    pub(crate) fn from_values(schema: Arc<Schema>, values: Vec<ConfigValue>) -> Self {
        debug_assert_eq!(schema.len(), values.len());
        Self { schema, values }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// Every entry in declaration order.
    pub fn all_values(&self) -> &[ConfigValue] {
        &self.values
    }

    pub fn get(&self, path: &str) -> Option<&ConfigValue> {
        self.schema.index_of(path).map(|i| &self.values[i])
    }

    pub fn get_or_err(&self, path: &str) -> Result<&ConfigValue, SnapfigError> {
        self.get(path)
            .ok_or_else(|| SnapfigError::UnknownPath(path.to_string()))
    }

    /// The current value at `path`, detached from its definition.
    pub fn get_value(&self, path: &str) -> Option<Value> {
        self.get(path).map(ConfigValue::value)
    }

    /// Borrow the value at `path` as `T`, failing if the path holds another kind.
    pub fn get_as<T: ValueType>(&self, path: &str) -> Result<&T, SnapfigError> {
        let entry = self.get_or_err(path)?;
        T::unwrap(entry)
            .map(|d| d.value())
            .ok_or_else(|| SnapfigError::KindMismatch {
                path: path.to_string(),
                expected: T::KIND,
                actual: entry.kind(),
            })
    }

    pub fn get_int(&self, path: &str) -> Result<i64, SnapfigError> {
        self.get_as::<i64>(path).copied()
    }

    pub fn get_double(&self, path: &str) -> Result<f64, SnapfigError> {
        self.get_as::<f64>(path).copied()
    }

    pub fn get_text(&self, path: &str) -> Result<&str, SnapfigError> {
        self.get_as::<String>(path).map(String::as_str)
    }

    pub fn get_bool(&self, path: &str) -> Result<bool, SnapfigError> {
        self.get_as::<bool>(path).copied()
    }

    pub fn get_text_list(&self, path: &str) -> Result<&[String], SnapfigError> {
        self.get_as::<Vec<String>>(path).map(Vec::as_slice)
    }

    pub fn get_int_list(&self, path: &str) -> Result<&[i64], SnapfigError> {
        self.get_as::<Vec<i64>>(path).map(Vec::as_slice)
    }

    pub fn get_double_list(&self, path: &str) -> Result<&[f64], SnapfigError> {
        self.get_as::<Vec<f64>>(path).map(Vec::as_slice)
    }

    pub fn get_record_list(&self, path: &str) -> Result<&[Record], SnapfigError> {
        self.get_as::<Vec<Record>>(path).map(Vec::as_slice)
    }

    pub fn get_record(&self, path: &str) -> Result<&Record, SnapfigError> {
        self.get_as::<Record>(path)
    }

    pub fn get_text_map(&self, path: &str) -> Result<&TextMap, SnapfigError> {
        self.get_as::<TextMap>(path)
    }

    pub fn get_int_map(&self, path: &str) -> Result<&IntMap, SnapfigError> {
        self.get_as::<IntMap>(path)
    }

    /// A new snapshot with `path` set to `value`.
    ///
    /// Fails without touching `self` if the path is undeclared, the value is
    /// of another kind, or the path's validator rejects it.
    pub fn with(&self, path: &str, value: impl Into<Value>) -> Result<Config, SnapfigError> {
        let index = self
            .schema
            .index_of(path)
            .ok_or_else(|| SnapfigError::UnknownPath(path.to_string()))?;
        let updated = self.values[index].with_value(value.into())?;
        check(&updated)?;

        let mut values = self.values.clone();
        values[index] = updated;
        debug!(config = %self.name(), path, "snapshot updated");
        Ok(Config {
            schema: Arc::clone(&self.schema),
            values,
        })
    }

    /// Apply updates in iteration order. The first failure aborts the whole
    /// batch and no partial snapshot escapes.
    pub fn with_all<I, K, V>(&self, updates: I) -> Result<Config, SnapfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        updates
            .into_iter()
            .try_fold(self.clone(), |config, (path, value)| {
                config.with(path.as_ref(), value)
            })
    }

    /// A new snapshot with `path` back at its declared default.
    pub fn reset(&self, path: &str) -> Result<Config, SnapfigError> {
        let default = self.get_or_err(path)?.default_value();
        self.with(path, default)
    }

    /// Validate every entry, collecting `path: message` for each failure.
    pub fn validate(&self) -> ValidationResult {
        ValidationResult::combine(self.values.iter().map(|v| {
            let result = v.validate();
            if result.is_valid() {
                result
            } else {
                let errors = result
                    .into_errors()
                    .into_iter()
                    .map(|e| format!("{}: {e}", v.path()))
                    .collect();
                ValidationResult::invalid_all(errors)
            }
        }))
    }

    /// A view addressing paths relative to `prefix`.
    pub fn section(&self, prefix: &str) -> Section<'_> {
        Section {
            config: self,
            prefix: prefix.to_string(),
        }
    }

    /// Render through the writer and store at `path`.
    pub fn save(&self, path: &Path) -> Result<(), SnapfigError> {
        writer::write(self, path)
    }
}

fn check(value: &ConfigValue) -> Result<(), SnapfigError> {
    let result = value.validate();
    if result.is_valid() {
        Ok(())
    } else {
        Err(SnapfigError::ValidationFailed {
            path: value.path().to_string(),
            errors: result.into_errors(),
        })
    }
}

impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name() && self.values == other.values
    }
}

/// A prefix-scoped lens over a [`Config`].
///
/// Every key is joined to the prefix (`prefix.key`) and forwarded to the
/// snapshot.
#[derive(Debug, Clone)]
pub struct Section<'a> {
    config: &'a Config,
    prefix: String,
}

macro_rules! forward {
    ($($name:ident -> $ret:ty),* $(,)?) => {
        $(
            pub fn $name(&self, key: &str) -> Result<$ret, SnapfigError> {
                self.config.$name(&self.path(key))
            }
        )*
    };
}

impl<'a> Section<'a> {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Full path of `key` within this section.
    pub fn path(&self, key: &str) -> String {
        format!("{}.{key}", self.prefix)
    }

    pub fn section(&self, key: &str) -> Section<'a> {
        Section {
            config: self.config,
            prefix: self.path(key),
        }
    }

    pub fn get(&self, key: &str) -> Option<&'a ConfigValue> {
        self.config.get(&self.path(key))
    }

    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.config.get_value(&self.path(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Entries under this section, at any depth, in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &'a ConfigValue> {
        let needle = format!("{}.", self.prefix);
        self.config
            .all_values()
            .iter()
            .filter(move |v| v.path().starts_with(&needle))
    }

    forward! {
        get_int -> i64,
        get_double -> f64,
        get_text -> &'a str,
        get_bool -> bool,
        get_text_list -> &'a [String],
        get_int_list -> &'a [i64],
        get_double_list -> &'a [f64],
        get_record_list -> &'a [Record],
        get_record -> &'a Record,
        get_text_map -> &'a TextMap,
        get_int_map -> &'a IntMap,
    }

    /// A new snapshot with `prefix.key` set to `value`.
    pub fn with(&self, key: &str, value: impl Into<Value>) -> Result<Config, SnapfigError> {
        self.config.with(&self.path(key), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{abilities_schema, record};

    fn defaults() -> Config {
        Config::defaults(abilities_schema())
    }

    #[test]
    fn defaults_cover_every_declared_path() {
        let config = defaults();
        let schema = abilities_schema();
        assert_eq!(config.all_values().len(), schema.len());
        for v in schema.values() {
            assert_eq!(config.get_value(v.path()), Some(v.default_value()));
        }
    }

    #[test]
    fn typed_getters() {
        let config = defaults();
        assert_eq!(config.get_int("keraunos.cooldown").unwrap(), 10);
        assert_eq!(config.get_double("keraunos.radius").unwrap(), 3.0);
        assert_eq!(config.get_text("motd").unwrap(), "Welcome");
        assert!(config.get_bool("abilities-enabled").unwrap());
        assert_eq!(
            config.get_text_list("keraunos.allowed-items").unwrap(),
            ["DIAMOND_SWORD", "IRON_SWORD"]
        );
        assert_eq!(config.get_int_list("keraunos.damage-steps").unwrap(), [1, 5, 10]);
        assert_eq!(config.get_double_list("medkit.heal-amounts").unwrap(), [2.0, 4.0]);
        assert_eq!(config.get_record_list("medkit.rewards").unwrap().len(), 1);
        assert_eq!(
            config.get_record("medkit.spawn").unwrap().get("y"),
            Some(&serde_yaml::Value::from(64))
        );
        assert_eq!(config.get_text_map("medkit.messages").unwrap()["use"], "Healed!");
        assert_eq!(config.get_int_map("medkit.limits").unwrap()["daily"], 5);
    }

    #[test]
    fn getter_kind_mismatch_names_path() {
        let config = defaults();
        let err = config.get_int("keraunos.allowed-items").unwrap_err();
        match err {
            SnapfigError::KindMismatch {
                path,
                expected,
                actual,
            } => {
                assert_eq!(path, "keraunos.allowed-items");
                assert_eq!(expected, crate::Kind::Int);
                assert_eq!(actual, crate::Kind::TextList);
            }
            other => panic!("Expected KindMismatch, got {other:?}"),
        }
    }

    #[test]
    fn getter_unknown_path() {
        let err = defaults().get_int("keraunos.typo").unwrap_err();
        assert!(matches!(err, SnapfigError::UnknownPath(p) if p == "keraunos.typo"));
    }

    #[test]
    fn with_returns_new_snapshot() {
        let original = defaults();
        let updated = original.with("keraunos.cooldown", 15).unwrap();
        assert_eq!(updated.get_int("keraunos.cooldown").unwrap(), 15);
        assert_eq!(original.get_int("keraunos.cooldown").unwrap(), 10);
    }

    #[test]
    fn with_rejects_out_of_range() {
        let config = defaults().with("keraunos.cooldown", 15).unwrap();
        let err = config.with("keraunos.cooldown", 500).unwrap_err();
        match &err {
            SnapfigError::ValidationFailed { path, errors } => {
                assert_eq!(path, "keraunos.cooldown");
                assert_eq!(errors, &["Value must be between 0 and 300"]);
            }
            other => panic!("Expected ValidationFailed, got {other:?}"),
        }
        assert_eq!(config.get_int("keraunos.cooldown").unwrap(), 15);
    }

    #[test]
    fn with_unknown_path_fails() {
        let err = defaults().with("nope", 1).unwrap_err();
        assert!(matches!(err, SnapfigError::UnknownPath(_)));
    }

    #[test]
    fn with_wrong_kind_fails() {
        let err = defaults().with("motd", 3).unwrap_err();
        assert!(matches!(err, SnapfigError::KindMismatch { .. }));
    }

    #[test]
    fn with_widens_int_for_double_paths() {
        let config = defaults().with("keraunos.radius", 5).unwrap();
        assert_eq!(config.get_double("keraunos.radius").unwrap(), 5.0);
    }

    #[test]
    fn with_all_applies_in_order() {
        let config = defaults()
            .with_all([
                ("keraunos.cooldown", Value::from(20)),
                ("motd", Value::from("Hello")),
                ("keraunos.cooldown", Value::from(25)),
            ])
            .unwrap();
        assert_eq!(config.get_int("keraunos.cooldown").unwrap(), 25);
        assert_eq!(config.get_text("motd").unwrap(), "Hello");
    }

    #[test]
    fn with_all_aborts_on_first_failure() {
        let original = defaults();
        let err = original
            .with_all([
                ("keraunos.cooldown", Value::from(20)),
                ("medkit.charges", Value::from(99)),
            ])
            .unwrap_err();
        assert!(matches!(err, SnapfigError::ValidationFailed { ref path, .. } if path == "medkit.charges"));
        assert_eq!(original.get_int("keraunos.cooldown").unwrap(), 10);
    }

    #[test]
    fn validate_aggregates_across_paths() {
        let schema = Arc::new(abilities_schema());
        let mut values = schema.values().to_vec();
        let cooldown = schema.index_of("keraunos.cooldown").unwrap();
        let motd = schema.index_of("motd").unwrap();
        values[cooldown] = values[cooldown].with_value(Value::Int(-1)).unwrap();
        values[motd] = values[motd].with_value(Value::from("")).unwrap();
        let config = Config::from_values(schema, values);

        let result = config.validate();
        assert!(!result.is_valid());
        assert_eq!(
            result.errors(),
            [
                "keraunos.cooldown: Value must be between 0 and 300",
                "motd: Value cannot be empty",
            ]
        );
    }

    #[test]
    fn defaults_are_valid() {
        assert!(defaults().validate().is_valid());
    }

    #[test]
    fn nested_section_addressing_matches_full_path() {
        let config = defaults();
        assert_eq!(
            config
                .section("keraunos")
                .section("knockback")
                .get_double("vertical")
                .unwrap(),
            config.get_double("keraunos.knockback.vertical").unwrap()
        );
    }

    #[test]
    fn section_with_updates_underlying_path() {
        let config = defaults();
        let updated = config.section("medkit").with("charges", 5).unwrap();
        assert_eq!(updated.get_int("medkit.charges").unwrap(), 5);
    }

    #[test]
    fn section_values_are_scoped() {
        let config = defaults();
        let paths: Vec<&str> = config
            .section("keraunos")
            .section("knockback")
            .values()
            .map(ConfigValue::path)
            .collect();
        assert_eq!(
            paths,
            ["keraunos.knockback.horizontal", "keraunos.knockback.vertical"]
        );
    }

    #[test]
    fn reset_restores_default() {
        let config = defaults().with("medkit.charges", 7).unwrap();
        let reset = config.reset("medkit.charges").unwrap();
        assert_eq!(reset.get_int("medkit.charges").unwrap(), 3);
        assert!(reset.get("medkit.charges").unwrap().is_default());
    }

    #[test]
    fn record_updates() {
        let reward = record(&[("item", "BREAD".into()), ("amount", 4.into())]);
        let config = defaults().with("medkit.rewards", vec![reward.clone()]).unwrap();
        assert_eq!(config.get_record_list("medkit.rewards").unwrap(), [reward]);
    }

    #[test]
    fn equality_compares_values() {
        assert_eq!(defaults(), defaults());
        assert_ne!(defaults(), defaults().with("keraunos.cooldown", 11).unwrap());
    }
}
