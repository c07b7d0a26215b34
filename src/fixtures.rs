#[cfg(test)]
pub mod test {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    use crate::error::SnapfigError;
    use crate::schema::{Declare, Schema};
    use crate::store::ConfigStore;
    use crate::validator::Validator;
    use crate::value::{IntMap, Record, TextMap};

    pub fn record(fields: &[(&str, serde_yaml::Value)]) -> Record {
        fields
            .iter()
            .map(|(k, v)| (serde_yaml::Value::from(*k), v.clone()))
            .collect()
    }

    /// A schema touching every kind, nested sections, headers and validators.
    pub fn abilities_schema() -> Schema {
        Schema::builder("abilities")
            .header("Abilities Configuration\n\nEdit and reload to apply.")
            .bool_value("abilities-enabled", true, "Master toggle for all abilities")
            .section("keraunos")
            .header("Lightning strike")
            .int_value_with("cooldown", 10, Validator::range(0, 300), "Cooldown in seconds")
            .double_value_with("radius", 3.0, Validator::min(0.0), "Effect radius in blocks")
            .section("knockback")
            .double_value("horizontal", 0.8, "")
            .double_value("vertical", 1.0, "")
            .parent()
            .text_list_with(
                "allowed-items",
                ["DIAMOND_SWORD", "IRON_SWORD"],
                Validator::all_not_empty(),
                "Items that trigger the strike",
            )
            .int_list_with("damage-steps", [1, 5, 10], Validator::all_in_range(0, 100), "")
            .end()
            .section("medkit")
            .double_value_with("target-range", 10.0, Validator::range(1.0, 50.0), "")
            .int_value_with("cooldown", 30, Validator::min(0), "")
            .int_value_with("charges", 3, Validator::range(1, 10), "Total charges")
            .double_list("heal-amounts", [2.0, 4.0], "")
            .record_list(
                "rewards",
                vec![record(&[
                    ("item", "GOLDEN_APPLE".into()),
                    ("amount", 1.into()),
                ])],
                "Items granted on use",
            )
            .text_map(
                "messages",
                TextMap::from([
                    ("use".to_string(), "Healed!".to_string()),
                    ("empty".to_string(), "No charges left".to_string()),
                ]),
                "",
            )
            .int_map(
                "limits",
                IntMap::from([("daily".to_string(), 5), ("hourly".to_string(), 2)]),
                "",
            )
            .record_value(
                "spawn",
                record(&[("world", "world".into()), ("x", 0.into()), ("y", 64.into())]),
                "",
            )
            .end()
            .text_value_with("motd", "Welcome", Validator::not_empty(), "Message of the day")
            .build()
            .unwrap()
    }

    /// A two-value schema for tests that don't care about kinds.
    pub fn small_schema(name: &str) -> Schema {
        Schema::builder(name)
            .section("server")
            .int_value_with("port", 8080, Validator::range(1, 65535), "Listen port")
            .text_value("host", "localhost", "")
            .build()
            .unwrap()
    }

    /// In-memory store; clones share the same files.
    #[derive(Debug, Clone, Default)]
    pub struct MemoryStore {
        files: Arc<Mutex<HashMap<PathBuf, String>>>,
    }

    impl MemoryStore {
        pub fn with_file(path: &str, contents: &str) -> Self {
            let store = Self::default();
            store.insert(path, contents);
            store
        }

        pub fn insert(&self, path: &str, contents: &str) {
            self.files
                .lock()
                .unwrap()
                .insert(PathBuf::from(path), contents.to_string());
        }

        pub fn contents(&self, path: &str) -> Option<String> {
            self.files.lock().unwrap().get(Path::new(path)).cloned()
        }
    }

    impl ConfigStore for MemoryStore {
        fn read(&self, path: &Path) -> Result<Option<String>, SnapfigError> {
            Ok(self.files.lock().unwrap().get(path).cloned())
        }

        fn write(&self, path: &Path, contents: &str) -> Result<(), SnapfigError> {
            self.files
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), contents.to_string());
            Ok(())
        }
    }

    #[test]
    fn abilities_schema_builds() {
        let schema = abilities_schema();
        assert_eq!(schema.name(), "abilities");
        assert!(schema.contains("medkit.spawn"));
    }
}
