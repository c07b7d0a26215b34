//! Config operations: template generation, key lookup, listing, updates, and
//! result types.
//!
//! Provides the logic behind `config gen`, `config list`, `config get`,
//! `config set` and `config unset`, and the `ConfigResult` enum that callers
//! use to display results. Values are shown in YAML flow form.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::error::SnapfigError;
use crate::schema::Schema;
use crate::tree;
use crate::value::{Kind, Value};
use crate::writer::{self, format_inline};

/// Result of a config operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResult {
    /// A rendered defaults-only config file.
    Template(String),
    /// Confirmation that a template was written to a file.
    TemplateWritten { path: PathBuf },
    /// A path's current value and its comment.
    KeyValue {
        key: String,
        value: String,
        doc: Vec<String>,
    },
    /// Confirmation that a value was written.
    ValueSet { key: String, value: String },
    /// Confirmation that a value was reset to its default.
    ValueUnset { key: String, default: String },
    /// Every declared path with its current value, in declaration order.
    Listing { entries: Vec<(String, String)> },
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigResult::Template(t) => write!(f, "{}", t.trim_end()),
            ConfigResult::TemplateWritten { path } => {
                write!(f, "Config template written to {}", path.display())
            }
            ConfigResult::KeyValue { key, value, doc } => {
                for line in doc {
                    writeln!(f, "# {line}")?;
                }
                write!(f, "{key} = {value}")
            }
            ConfigResult::ValueSet { key, value } => write!(f, "Set {key} = {value}"),
            ConfigResult::ValueUnset { key, default } => {
                write!(f, "Unset {key} (default {default})")
            }
            ConfigResult::Listing { entries } => {
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{key} = {value}")?;
                }
                Ok(())
            }
        }
    }
}

/// Render the defaults-only file for `schema`.
pub fn generate_template(schema: &Arc<Schema>) -> String {
    writer::render(&Config::defaults(Arc::clone(schema)))
}

/// Get a value by dotted path, including its comment and default.
pub fn get_value(config: &Config, key: &str) -> Result<ConfigResult, SnapfigError> {
    let entry = config.get_or_err(key)?;

    let mut doc: Vec<String> = entry
        .comment()
        .map(|c| c.lines().map(str::to_string).collect())
        .unwrap_or_default();
    if !entry.is_default() {
        doc.push(format!("Default: {}", format_inline(&entry.default_value())));
    }

    Ok(ConfigResult::KeyValue {
        key: key.into(),
        value: format_inline(&entry.value()),
        doc,
    })
}

/// List every value as dotted path / flow-formatted value pairs.
pub fn list_values(config: &Config) -> ConfigResult {
    let entries = config
        .all_values()
        .iter()
        .map(|entry| (entry.path().to_string(), format_inline(&entry.value())))
        .collect();
    ConfigResult::Listing { entries }
}

/// Parse `raw` (YAML text from the command line) as a value for `key`.
///
/// Text paths take `raw` literally when it is not a YAML scalar, so
/// `config set motd ""` and unbalanced quotes still work.
pub fn parse_value(config: &Config, key: &str, raw: &str) -> Result<Value, SnapfigError> {
    let kind = config.get_or_err(key)?.kind();
    let invalid = |reason: String| SnapfigError::InvalidValue {
        key: key.into(),
        reason,
    };

    let parsed: Result<serde_yaml::Value, _> = serde_yaml::from_str(raw);
    if kind == Kind::Text {
        return match parsed {
            Ok(node @ (serde_yaml::Value::String(_)
            | serde_yaml::Value::Number(_)
            | serde_yaml::Value::Bool(_))) => tree::coerce(kind, &node)
                .map_err(invalid)?
                .ok_or_else(|| invalid("no value".into())),
            _ => Ok(Value::Text(raw.to_string())),
        };
    }

    let node = parsed.map_err(|e| invalid(e.to_string()))?;
    match tree::coerce(kind, &node).map_err(invalid)? {
        Some(value) => Ok(value),
        None => Err(invalid(
            "an empty list reads back as the default; use unset instead".into(),
        )),
    }
}

/// Apply `key = raw` to `config`, returning the updated snapshot.
pub fn set_value(
    config: &Config,
    key: &str,
    raw: &str,
) -> Result<(Config, ConfigResult), SnapfigError> {
    let value = parse_value(config, key, raw)?;
    let display = format_inline(&value);
    let updated = config.with(key, value)?;
    Ok((
        updated,
        ConfigResult::ValueSet {
            key: key.into(),
            value: display,
        },
    ))
}

/// Reset `key` to its default, returning the updated snapshot.
pub fn unset_value(config: &Config, key: &str) -> Result<(Config, ConfigResult), SnapfigError> {
    let updated = config.reset(key)?;
    let default = format_inline(&updated.get_or_err(key)?.value());
    Ok((
        updated,
        ConfigResult::ValueUnset {
            key: key.into(),
            default,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::abilities_schema;

    fn test_config() -> Config {
        Config::defaults(abilities_schema())
    }

    #[test]
    fn generate_template_contains_keys_and_comments() {
        let template = generate_template(&Arc::new(abilities_schema()));
        assert!(template.contains("keraunos:"));
        assert!(template.contains("  knockback:"));
        assert!(template.contains("# Cooldown in seconds"));
        assert!(template.starts_with("# Abilities Configuration"));
    }

    #[test]
    fn get_nested_key() {
        let result = get_value(&test_config(), "keraunos.knockback.horizontal").unwrap();
        match result {
            ConfigResult::KeyValue { value, doc, .. } => {
                assert_eq!(value, "0.8");
                assert!(doc.is_empty());
            }
            other => panic!("Expected KeyValue, got {other:?}"),
        }
    }

    #[test]
    fn get_includes_comment() {
        let result = get_value(&test_config(), "keraunos.cooldown").unwrap();
        match result {
            ConfigResult::KeyValue { value, doc, .. } => {
                assert_eq!(value, "10");
                assert_eq!(doc, vec!["Cooldown in seconds"]);
            }
            other => panic!("Expected KeyValue, got {other:?}"),
        }
    }

    #[test]
    fn get_mentions_default_when_changed() {
        let config = test_config().with("medkit.charges", 5).unwrap();
        let result = get_value(&config, "medkit.charges").unwrap();
        assert_eq!(
            result.to_string(),
            "# Total charges\n# Default: 3\nmedkit.charges = 5"
        );
    }

    #[test]
    fn get_nonexistent_key() {
        let result = get_value(&test_config(), "nonexistent");
        assert!(matches!(result, Err(SnapfigError::UnknownPath(_))));
    }

    #[test]
    fn list_values_in_declaration_order() {
        match list_values(&test_config()) {
            ConfigResult::Listing { entries } => {
                assert_eq!(entries.len(), abilities_schema().len());
                assert_eq!(entries[0], ("abilities-enabled".into(), "true".into()));
                let items = entries
                    .iter()
                    .find(|(k, _)| k == "keraunos.allowed-items")
                    .unwrap();
                assert_eq!(items.1, "[\"DIAMOND_SWORD\", \"IRON_SWORD\"]");
                let motd = entries.last().unwrap();
                assert_eq!(motd, &("motd".into(), "\"Welcome\"".into()));
            }
            other => panic!("Expected Listing, got {other:?}"),
        }
    }

    #[test]
    fn parse_value_per_kind() {
        let config = test_config();
        assert_eq!(parse_value(&config, "keraunos.cooldown", "15").unwrap(), Value::Int(15));
        assert_eq!(
            parse_value(&config, "keraunos.radius", "2").unwrap(),
            Value::Double(2.0)
        );
        assert_eq!(
            parse_value(&config, "keraunos.allowed-items", "[STICK, BONE]").unwrap(),
            Value::from(vec!["STICK", "BONE"])
        );
        assert_eq!(
            parse_value(&config, "medkit.limits", "{daily: 1}").unwrap(),
            Value::IntMap([("daily".to_string(), 1)].into())
        );
    }

    #[test]
    fn parse_value_text_is_lenient() {
        let config = test_config();
        assert_eq!(parse_value(&config, "motd", "hello world").unwrap(), Value::from("hello world"));
        assert_eq!(parse_value(&config, "motd", "42").unwrap(), Value::from("42"));
        assert_eq!(parse_value(&config, "motd", "").unwrap(), Value::from(""));
        assert_eq!(parse_value(&config, "motd", "[a, b]").unwrap(), Value::from("[a, b]"));
    }

    #[test]
    fn parse_value_wrong_shape() {
        let err = parse_value(&test_config(), "keraunos.cooldown", "soon").unwrap_err();
        match err {
            SnapfigError::InvalidValue { key, reason } => {
                assert_eq!(key, "keraunos.cooldown");
                assert!(reason.contains("expected an integer"));
            }
            other => panic!("Expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn parse_value_rejects_empty_list() {
        let err = parse_value(&test_config(), "keraunos.damage-steps", "[]").unwrap_err();
        assert!(matches!(err, SnapfigError::InvalidValue { .. }));
    }

    #[test]
    fn set_value_validates() {
        let config = test_config();
        let (updated, result) = set_value(&config, "keraunos.cooldown", "15").unwrap();
        assert_eq!(updated.get_int("keraunos.cooldown").unwrap(), 15);
        assert_eq!(result.to_string(), "Set keraunos.cooldown = 15");

        let err = set_value(&config, "keraunos.cooldown", "500").unwrap_err();
        assert!(matches!(err, SnapfigError::ValidationFailed { .. }));
    }

    #[test]
    fn unset_value_restores_default() {
        let config = test_config().with("motd", "Bye").unwrap();
        let (updated, result) = unset_value(&config, "motd").unwrap();
        assert_eq!(updated.get_text("motd").unwrap(), "Welcome");
        assert_eq!(result.to_string(), "Unset motd (default \"Welcome\")");
    }

    #[test]
    fn listing_display_format() {
        let result = ConfigResult::Listing {
            entries: vec![
                ("motd".into(), "\"hi\"".into()),
                ("keraunos.cooldown".into(), "10".into()),
            ],
        };
        assert_eq!(format!("{result}"), "motd = \"hi\"\nkeraunos.cooldown = 10");
    }
}
