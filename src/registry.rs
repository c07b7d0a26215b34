//! Named loaders and their current snapshots.
//!
//! A [`ConfigRegistry`] is owned by the application and passed to whoever
//! needs lookups; there is no global instance. Each entry pairs a [`Loader`]
//! with the last snapshot it produced. Snapshots are handed out as
//! `Arc<Config>` and swapped atomically on reload or [`replace`](ConfigRegistry::replace),
//! so readers holding an older snapshot keep a consistent view.
//!
//! Section lookups borrow the snapshot, so either hold the `Arc` while
//! reading (`let cfg = registry.get(name)?; cfg.section(prefix)`) or read
//! through [`with_section`](ConfigRegistry::with_section).

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{error, info};

use crate::config::{Config, Section};
use crate::error::SnapfigError;
use crate::loader::Loader;
use crate::validation::ValidationResult;

#[derive(Debug)]
struct Entry {
    name: String,
    loader: Loader,
    current: RwLock<Option<Arc<Config>>>,
}

impl Entry {
    fn current(&self) -> Option<Arc<Config>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, config: Arc<Config>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(config);
    }

    fn load(&self) -> Result<Arc<Config>, SnapfigError> {
        let config = Arc::new(self.loader.load()?);
        self.set(Arc::clone(&config));
        Ok(config)
    }
}

/// Registration-ordered set of named configs.
#[derive(Debug, Default)]
pub struct ConfigRegistry {
    entries: Vec<Entry>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `loader` under its schema name.
    pub fn register(&mut self, loader: Loader) -> Result<(), SnapfigError> {
        let name = loader.name().to_string();
        self.register_as(&name, loader)
    }

    /// Register `loader` under `name`. Nothing is loaded yet.
    pub fn register_as(&mut self, name: &str, loader: Loader) -> Result<(), SnapfigError> {
        if self.find(name).is_some() {
            return Err(SnapfigError::DuplicateConfig(name.to_string()));
        }
        self.entries.push(Entry {
            name: name.to_string(),
            loader,
            current: RwLock::new(None),
        });
        Ok(())
    }

    fn find(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    fn entry(&self, name: &str) -> Result<&Entry, SnapfigError> {
        self.find(name)
            .ok_or_else(|| SnapfigError::UnknownConfig(name.to_string()))
    }

    /// Load every entry in registration order.
    ///
    /// A failing entry is logged and reported in the returned list; the
    /// others still load. An entry that fails keeps its previous snapshot.
    pub fn load_all(&self) -> Vec<(String, SnapfigError)> {
        let mut failures = Vec::new();
        for entry in &self.entries {
            if let Err(err) = entry.load() {
                error!(config = %entry.name, error = %err, "failed to load config");
                failures.push((entry.name.clone(), err));
            }
        }
        info!(
            loaded = self.entries.len() - failures.len(),
            failed = failures.len(),
            "loaded configs"
        );
        failures
    }

    /// Reload every entry from disk. Same semantics as [`load_all`](Self::load_all).
    pub fn reload_all(&self) -> Vec<(String, SnapfigError)> {
        self.load_all()
    }

    /// Reload one entry and return its fresh snapshot.
    pub fn reload(&self, name: &str) -> Result<Arc<Config>, SnapfigError> {
        let config = self.entry(name)?.load()?;
        info!(config = %name, "reloaded config");
        Ok(config)
    }

    /// The current snapshot for `name`. Loads it first if it never was.
    pub fn get(&self, name: &str) -> Result<Arc<Config>, SnapfigError> {
        let entry = self.entry(name)?;
        match entry.current() {
            Some(config) => Ok(config),
            None => entry.load(),
        }
    }

    /// Run `f` on the `prefix` section of `name`'s current snapshot.
    pub fn with_section<R>(
        &self,
        name: &str,
        prefix: &str,
        f: impl FnOnce(Section<'_>) -> R,
    ) -> Result<R, SnapfigError> {
        let config = self.get(name)?;
        Ok(f(config.section(prefix)))
    }

    /// Swap in a snapshot derived with [`Config::with`]. Does not write to disk.
    pub fn replace(&self, name: &str, config: Config) -> Result<Arc<Config>, SnapfigError> {
        let entry = self.entry(name)?;
        if config.name() != entry.loader.name() {
            return Err(SnapfigError::InvalidValue {
                key: name.to_string(),
                reason: format!("snapshot belongs to config '{}'", config.name()),
            });
        }
        let config = Arc::new(config);
        entry.set(Arc::clone(&config));
        Ok(config)
    }

    /// Swap in `config` and write it to the entry's file.
    pub fn save(&self, name: &str, config: Config) -> Result<Arc<Config>, SnapfigError> {
        let config = self.replace(name, config)?;
        self.entry(name)?.loader.save(&config)?;
        Ok(config)
    }

    pub fn loader(&self, name: &str) -> Result<&Loader, SnapfigError> {
        self.entry(name).map(|e| &e.loader)
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.find(name).is_some_and(|e| e.current().is_some())
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate every loaded snapshot. Entries never loaded are skipped.
    pub fn validate_all(&self) -> Vec<(String, ValidationResult)> {
        self.entries
            .iter()
            .filter_map(|e| e.current().map(|c| (e.name.clone(), c.validate())))
            .collect()
    }
}
