use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::SnapfigError;
use crate::ops::{self, ConfigResult};
use crate::schema::Schema;
use crate::store::{self, ConfigStore, Located, YamlFileStore};
use crate::tree;
use crate::types::{ConfigAction, SearchPath};
use crate::unknown;
use crate::value::ConfigValue;
use crate::writer;

/// Where the loader finds its file.
#[derive(Debug, Clone, PartialEq)]
enum Target {
    File(PathBuf),
    Search {
        paths: Vec<SearchPath>,
        file_name: String,
        app_name: String,
    },
}

/// Reads a config file against a [`Schema`] and produces [`Config`] snapshots.
///
/// Built once with [`Loader::builder`], then [`load`](Self::load)ed as often
/// as needed. Every load starts from scratch: there is no caching and no
/// diffing against a previous snapshot.
#[derive(Debug, Clone)]
pub struct Loader {
    schema: Arc<Schema>,
    target: Target,
    auto_generate: bool,
    validate_on_load: bool,
    strict: bool,
    store: Arc<dyn ConfigStore>,
}

impl Loader {
    pub fn builder(schema: impl Into<Arc<Schema>>) -> LoaderBuilder {
        LoaderBuilder::new(schema.into())
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// The file this loader reads and writes. With search paths, this is the
    /// first existing candidate, or the first candidate if none exists.
    pub fn path(&self) -> Result<PathBuf, SnapfigError> {
        self.locate().map(|located| located.path)
    }

    fn locate(&self) -> Result<Located, SnapfigError> {
        match &self.target {
            Target::File(path) => Ok(Located {
                path: path.clone(),
                contents: self.store.read(path)?,
            }),
            Target::Search {
                paths,
                file_name,
                app_name,
            } => store::locate(self.store.as_ref(), paths, file_name, app_name),
        }
    }

    /// Load a fresh snapshot.
    ///
    /// A missing file yields the defaults, written out once they pass
    /// validation when auto-generation is on. Missing or malformed values fall back to their
    /// defaults with a warning. With validate-on-load, any validation failure
    /// aborts the load.
    pub fn load(&self) -> Result<Config, SnapfigError> {
        let Located { path, contents } = self.locate()?;

        let missing = contents.is_none();
        let config = match contents {
            Some(text) => self.parse(&path, &text)?,
            None => Config::defaults(Arc::clone(&self.schema)),
        };

        if self.validate_on_load {
            let result = config.validate();
            if !result.is_valid() {
                return Err(SnapfigError::LoadValidationFailed {
                    file: path,
                    errors: result.into_errors(),
                });
            }
        }

        if missing && self.auto_generate {
            writer::write_to(self.store.as_ref(), &config, &path)?;
            info!(config = %self.name(), file = %path.display(), "generated config file from defaults");
        } else if missing {
            debug!(config = %self.name(), file = %path.display(), "no config file, using defaults");
        }
        Ok(config)
    }

    /// Same as [`load`](Self::load); spelled out for hot-reload call sites.
    pub fn reload(&self) -> Result<Config, SnapfigError> {
        self.load()
    }

    /// Reconcile document `text` (read from `path`) against the schema.
    /// Does not validate.
    pub fn parse(&self, path: &Path, text: &str) -> Result<Config, SnapfigError> {
        let root = tree::parse_document(path, text)?;

        if self.strict {
            unknown::validate_unknown_keys(&self.schema, &root, text, path)?;
        } else {
            for err in unknown::find_unknown_keys(&self.schema, &root, text, path) {
                warn!(config = %self.name(), "{err}");
            }
        }

        let values = self
            .schema
            .values()
            .iter()
            .map(|default| populate(default, &root, path))
            .collect();
        Ok(Config::from_values(Arc::clone(&self.schema), values))
    }

    /// Write `config` to this loader's file.
    pub fn save(&self, config: &Config) -> Result<(), SnapfigError> {
        let path = self.path()?;
        writer::write_to(self.store.as_ref(), config, &path)
    }

    /// Handle a `ConfigAction` and print the result to stdout.
    pub fn handle_and_print(&self, action: &ConfigAction) -> Result<(), SnapfigError> {
        let result = self.handle(action)?;
        println!("{result}");
        Ok(())
    }

    /// Handle a `ConfigAction` (gen / list / get / set / unset).
    pub fn handle(&self, action: &ConfigAction) -> Result<ConfigResult, SnapfigError> {
        match action {
            ConfigAction::Gen { output } => {
                let template = ops::generate_template(&self.schema);
                match output {
                    Some(path) => {
                        self.store.write(path, &template)?;
                        Ok(ConfigResult::TemplateWritten { path: path.clone() })
                    }
                    None => Ok(ConfigResult::Template(template)),
                }
            }
            ConfigAction::List => {
                let config = self.load()?;
                Ok(ops::list_values(&config))
            }
            ConfigAction::Get { key } => {
                let config = self.load()?;
                ops::get_value(&config, key)
            }
            ConfigAction::Set { key, value } => {
                let config = self.load()?;
                let (updated, result) = ops::set_value(&config, key, value)?;
                self.save(&updated)?;
                Ok(result)
            }
            ConfigAction::Unset { key } => {
                let config = self.load()?;
                let (updated, result) = ops::unset_value(&config, key)?;
                self.save(&updated)?;
                Ok(result)
            }
        }
    }
}

/// The file's value for `default`'s path, or the default itself.
fn populate(default: &ConfigValue, root: &serde_yaml::Mapping, file: &Path) -> ConfigValue {
    let key = default.path();
    let Some(raw) = tree::lookup(root, key) else {
        warn!(file = %file.display(), key, "missing value, using default");
        return default.clone();
    };

    match tree::coerce(default.kind(), raw) {
        Ok(Some(value)) => match default.with_value(value) {
            Ok(populated) => populated,
            Err(err) => {
                warn!(file = %file.display(), key, reason = %err, "invalid value, using default");
                default.clone()
            }
        },
        Ok(None) => {
            debug!(file = %file.display(), key, "empty list, using default");
            default.clone()
        }
        Err(reason) => {
            warn!(file = %file.display(), key, %reason, "invalid value, using default");
            default.clone()
        }
    }
}

/// Builder for a [`Loader`].
///
/// Either name the file directly with [`file()`](Self::file) or list
/// [`search_path()`](Self::search_path)s to look for
/// [`file_name`](Self::file_name) in.
#[derive(Debug)]
pub struct LoaderBuilder {
    schema: Arc<Schema>,
    file: Option<PathBuf>,
    search_paths: Vec<SearchPath>,
    file_name: Option<String>,
    app_name: Option<String>,
    auto_generate: bool,
    validate_on_load: bool,
    strict: bool,
    store: Option<Arc<dyn ConfigStore>>,
}

impl LoaderBuilder {
    fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            file: None,
            search_paths: Vec::new(),
            file_name: None,
            app_name: None,
            auto_generate: true,
            validate_on_load: true,
            strict: false,
            store: None,
        }
    }

    /// Use exactly this file. Takes precedence over search paths.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Add a directory to search. Directories are checked in the order added.
    pub fn search_path(mut self, path: SearchPath) -> Self {
        self.search_paths.push(path);
        self
    }

    /// Replace the search paths entirely.
    pub fn search_paths(mut self, paths: Vec<SearchPath>) -> Self {
        self.search_paths = paths;
        self
    }

    /// Override the file name looked for in search paths (default: `"{schema name}.yml"`).
    pub fn file_name(mut self, name: &str) -> Self {
        self.file_name = Some(name.to_string());
        self
    }

    /// Application name for [`SearchPath::Platform`] (default: the schema name).
    pub fn app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    /// Write the defaults to disk when the file is missing (default: `true`).
    pub fn auto_generate(mut self, enabled: bool) -> Self {
        self.auto_generate = enabled;
        self
    }

    /// Fail the load if any value breaks its validator (default: `true`).
    pub fn validate_on_load(mut self, enabled: bool) -> Self {
        self.validate_on_load = enabled;
        self
    }

    /// Enable or disable strict mode (default: `false`).
    /// In strict mode, undeclared keys in the file fail the load; otherwise
    /// they are logged and ignored.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Read and write through `store` instead of the local filesystem.
    pub fn store(mut self, store: impl ConfigStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    fn effective_file_name(&self) -> String {
        self.file_name
            .clone()
            .unwrap_or_else(|| format!("{}.yml", self.schema.name()))
    }

    fn effective_app_name(&self) -> String {
        self.app_name
            .clone()
            .unwrap_or_else(|| self.schema.name().to_string())
    }

    pub fn build(self) -> Result<Loader, SnapfigError> {
        let target = match (&self.file, self.search_paths.is_empty()) {
            (Some(path), _) => Target::File(path.clone()),
            (None, false) => Target::Search {
                paths: self.search_paths.clone(),
                file_name: self.effective_file_name(),
                app_name: self.effective_app_name(),
            },
            (None, true) => return Err(SnapfigError::NoFile),
        };

        Ok(Loader {
            schema: self.schema,
            target,
            auto_generate: self.auto_generate,
            validate_on_load: self.validate_on_load,
            strict: self.strict,
            store: self.store.unwrap_or_else(|| Arc::new(YamlFileStore)),
        })
    }

    /// Build and load in one step.
    pub fn load(self) -> Result<Config, SnapfigError> {
        self.build()?.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{MemoryStore, abilities_schema};
    use crate::schema::Declare;
    use crate::validator::Validator;
    use crate::value::Value;
    use std::fs;
    use tempfile::TempDir;

    const FILE: &str = "/plugins/abilities/abilities.yml";

    fn loader(store: &MemoryStore) -> Loader {
        Loader::builder(abilities_schema())
            .file(FILE)
            .store(store.clone())
            .build()
            .unwrap()
    }

    #[test]
    fn builder_defaults() {
        let builder = Loader::builder(abilities_schema());
        assert!(builder.auto_generate);
        assert!(builder.validate_on_load);
        assert!(!builder.strict);
        assert_eq!(builder.effective_file_name(), "abilities.yml");
        assert_eq!(builder.effective_app_name(), "abilities");
    }

    #[test]
    fn build_without_location_fails() {
        let result = Loader::builder(abilities_schema()).build();
        assert!(matches!(result, Err(SnapfigError::NoFile)));
    }

    #[test]
    fn file_overrides_search_paths() {
        let loader = Loader::builder(abilities_schema())
            .search_path(SearchPath::Cwd)
            .file("/x/y.yml")
            .build()
            .unwrap();
        assert_eq!(loader.target, Target::File(PathBuf::from("/x/y.yml")));
    }

    #[test]
    fn missing_file_is_generated_from_defaults() {
        let store = MemoryStore::default();
        let config = loader(&store).load().unwrap();
        assert_eq!(config.get_int("keraunos.cooldown").unwrap(), 10);
        assert_eq!(config, Config::defaults(abilities_schema()));

        let written = store.contents(FILE).unwrap();
        assert!(written.contains("cooldown: 10"));
    }

    #[test]
    fn missing_file_without_auto_generate_is_not_written() {
        let store = MemoryStore::default();
        let loader = Loader::builder(abilities_schema())
            .file(FILE)
            .store(store.clone())
            .auto_generate(false)
            .build()
            .unwrap();
        let config = loader.load().unwrap();
        assert_eq!(config, Config::defaults(abilities_schema()));
        assert_eq!(store.contents(FILE), None);
    }

    #[test]
    fn generated_file_loads_back_to_defaults() {
        let store = MemoryStore::default();
        let loader = loader(&store);
        loader.load().unwrap();
        let reloaded = loader.reload().unwrap();
        assert_eq!(reloaded, Config::defaults(abilities_schema()));
    }

    #[test]
    fn file_values_override_defaults() {
        let store = MemoryStore::with_file(
            FILE,
            "keraunos:\n  cooldown: 42\n  knockback:\n    vertical: 2.5\nmotd: \"Hi\"\n",
        );
        let config = loader(&store).load().unwrap();
        assert_eq!(config.get_int("keraunos.cooldown").unwrap(), 42);
        assert_eq!(config.get_double("keraunos.knockback.vertical").unwrap(), 2.5);
        assert_eq!(config.get_text("motd").unwrap(), "Hi");
        // Absent values keep defaults.
        assert_eq!(config.get_int("medkit.charges").unwrap(), 3);
    }

    #[test]
    fn one_bad_value_falls_back_alone() {
        let store = MemoryStore::with_file(
            FILE,
            "\
abilities-enabled: false
keraunos:
  cooldown: [1, 2]
  radius: 4.5
  allowed-items: [\"STICK\"]
  damage-steps: [2, 4]
medkit:
  target-range: 12.0
  cooldown: 5
  charges: 7
  heal-amounts: [1.5]
  limits:
    daily: 9
motd: \"Hello\"
",
        );
        let config = loader(&store).load().unwrap();
        assert_eq!(config.get_int("keraunos.cooldown").unwrap(), 10);
        assert!(!config.get_bool("abilities-enabled").unwrap());
        assert_eq!(config.get_double("keraunos.radius").unwrap(), 4.5);
        assert_eq!(config.get_text_list("keraunos.allowed-items").unwrap(), ["STICK"]);
        assert_eq!(config.get_int_list("keraunos.damage-steps").unwrap(), [2, 4]);
        assert_eq!(config.get_double("medkit.target-range").unwrap(), 12.0);
        assert_eq!(config.get_int("medkit.cooldown").unwrap(), 5);
        assert_eq!(config.get_int("medkit.charges").unwrap(), 7);
        assert_eq!(config.get_double_list("medkit.heal-amounts").unwrap(), [1.5]);
        assert_eq!(config.get_int_map("medkit.limits").unwrap()["daily"], 9);
        assert_eq!(config.get_text("motd").unwrap(), "Hello");
    }

    #[test]
    fn empty_list_keeps_default() {
        let store = MemoryStore::with_file(FILE, "keraunos:\n  allowed-items: []\n");
        let config = loader(&store).load().unwrap();
        assert_eq!(
            config.get_text_list("keraunos.allowed-items").unwrap(),
            ["DIAMOND_SWORD", "IRON_SWORD"]
        );
    }

    #[test]
    fn null_value_keeps_default() {
        let store = MemoryStore::with_file(FILE, "motd:\n");
        let config = loader(&store).load().unwrap();
        assert_eq!(config.get_text("motd").unwrap(), "Welcome");
    }

    #[test]
    fn validation_failure_aborts_load() {
        let store = MemoryStore::with_file(FILE, "keraunos:\n  cooldown: 500\nmotd: \"\"\n");
        let err = loader(&store).load().unwrap_err();
        match err {
            SnapfigError::LoadValidationFailed { file, errors } => {
                assert_eq!(file, PathBuf::from(FILE));
                assert_eq!(
                    errors,
                    vec![
                        "keraunos.cooldown: Value must be between 0 and 300",
                        "motd: Value cannot be empty",
                    ]
                );
            }
            other => panic!("Expected LoadValidationFailed, got {other:?}"),
        }
    }

    #[test]
    fn invalid_defaults_are_not_generated() {
        let schema = Schema::builder("broken")
            .section("keraunos")
            .int_value_with("cooldown", 500, Validator::range(0, 300), "")
            .build()
            .unwrap();
        let store = MemoryStore::default();
        let err = Loader::builder(schema)
            .file(FILE)
            .store(store.clone())
            .load()
            .unwrap_err();
        match err {
            SnapfigError::LoadValidationFailed { errors, .. } => {
                assert_eq!(errors, vec!["keraunos.cooldown: Value must be between 0 and 300"]);
            }
            other => panic!("Expected LoadValidationFailed, got {other:?}"),
        }
        assert_eq!(store.contents(FILE), None);
    }

    #[test]
    fn scalar_looking_keys_survive_save_and_reload() {
        let schema = Schema::builder("levels")
            .section("levels")
            .int_value("1", 5, "")
            .int_value("true", 6, "")
            .int_value("null", 7, "")
            .build()
            .unwrap();
        let store = MemoryStore::default();
        let loader = Loader::builder(schema)
            .file(FILE)
            .store(store.clone())
            .strict(true)
            .build()
            .unwrap();
        let updated = loader
            .load()
            .unwrap()
            .with_all([("levels.1", 50), ("levels.true", 60), ("levels.null", 70)])
            .unwrap();
        loader.save(&updated).unwrap();
        assert!(store.contents(FILE).unwrap().contains("  \"true\": 60\n"));
        assert_eq!(loader.reload().unwrap(), updated);
    }

    #[test]
    fn validation_failure_tolerated_when_disabled() {
        let store = MemoryStore::with_file(FILE, "keraunos:\n  cooldown: 500\n");
        let config = Loader::builder(abilities_schema())
            .file(FILE)
            .store(store)
            .validate_on_load(false)
            .load()
            .unwrap();
        assert_eq!(config.get_int("keraunos.cooldown").unwrap(), 500);
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn unknown_keys_warn_by_default() {
        let store = MemoryStore::with_file(FILE, "typo: 1\nmotd: \"x\"\n");
        let config = loader(&store).load().unwrap();
        assert_eq!(config.get_text("motd").unwrap(), "x");
    }

    #[test]
    fn unknown_keys_fail_in_strict_mode() {
        let store = MemoryStore::with_file(FILE, "motd: \"x\"\ntypo: 1\n");
        let err = Loader::builder(abilities_schema())
            .file(FILE)
            .store(store)
            .strict(true)
            .load()
            .unwrap_err();
        match err {
            SnapfigError::UnknownKeys(keys) => match &keys[0] {
                SnapfigError::UnknownKey { key, line, .. } => {
                    assert_eq!(key, "typo");
                    assert_eq!(*line, 2);
                }
                other => panic!("Expected UnknownKey, got: {other:?}"),
            },
            other => panic!("Expected UnknownKeys, got: {other:?}"),
        }
    }

    #[test]
    fn malformed_document_is_an_error() {
        let store = MemoryStore::with_file(FILE, "keraunos: [unclosed\n");
        let err = loader(&store).load().unwrap_err();
        assert!(matches!(err, SnapfigError::ParseError { .. }));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let store = MemoryStore::with_file(FILE, "");
        let config = loader(&store).load().unwrap();
        assert_eq!(config, Config::defaults(abilities_schema()));
        // Existing files are never overwritten by a load.
        assert_eq!(store.contents(FILE).unwrap(), "");
    }

    #[test]
    fn update_write_reload_round_trip() {
        let store = MemoryStore::default();
        let loader = loader(&store);
        let config = loader.load().unwrap();
        assert_eq!(config.get_int("keraunos.cooldown").unwrap(), 10);

        let updated = config.with("keraunos.cooldown", 15).unwrap();
        loader.save(&updated).unwrap();
        let reloaded = loader.reload().unwrap();
        assert_eq!(reloaded.get_int("keraunos.cooldown").unwrap(), 15);
        assert_eq!(reloaded, updated);

        let err = reloaded.with("keraunos.cooldown", 500).unwrap_err();
        assert!(err.to_string().contains("Value must be between 0 and 300"));
        assert_eq!(reloaded.get_int("keraunos.cooldown").unwrap(), 15);
    }

    #[test]
    fn search_paths_on_disk() {
        let empty = TempDir::new().unwrap();
        let populated = TempDir::new().unwrap();
        fs::write(
            populated.path().join("abilities.yml"),
            "medkit:\n  charges: 9\n",
        )
        .unwrap();

        let loader = Loader::builder(abilities_schema())
            .search_path(SearchPath::Path(empty.path().to_path_buf()))
            .search_path(SearchPath::Path(populated.path().to_path_buf()))
            .build()
            .unwrap();
        assert_eq!(loader.path().unwrap(), populated.path().join("abilities.yml"));
        assert_eq!(loader.load().unwrap().get_int("medkit.charges").unwrap(), 9);
    }

    #[test]
    fn search_paths_generate_in_first_directory() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let loader = Loader::builder(abilities_schema())
            .search_paths(vec![
                SearchPath::Path(first.path().join("nested")),
                SearchPath::Path(second.path().to_path_buf()),
            ])
            .file_name("custom.yml")
            .build()
            .unwrap();
        loader.load().unwrap();
        assert!(first.path().join("nested").join("custom.yml").exists());
        assert!(!second.path().join("custom.yml").exists());
    }

    #[test]
    fn real_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("abilities.yml");
        let loader = Loader::builder(abilities_schema()).file(&path).build().unwrap();
        let config = loader
            .load()
            .unwrap()
            .with_all([
                ("motd", Value::from("Line \"one\"\nline two")),
                ("keraunos.allowed-items", Value::from(vec!["help", "info"])),
            ])
            .unwrap();
        config.save(&path).unwrap();
        assert_eq!(loader.load().unwrap(), config);
    }
}
