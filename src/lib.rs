//! Typed, immutable configuration with commented YAML files. Declare a
//! schema in code, load a snapshot, derive new snapshots on change.
//!
//! Snapfig turns a code-defined [`Schema`] into a human-editable YAML file and
//! back. Every value has a dotted path, a kind, a default, an optional inline
//! comment and an optional [`Validator`]. Loading reconciles the file against
//! the schema and hands out a [`Config`]: a snapshot that never changes.
//!
//! ```ignore
//! let schema = Schema::builder("abilities")
//!     .header("Abilities Configuration")
//!     .section("keraunos")
//!         .int_value_with("cooldown", 10, Validator::range(0, 300), "Cooldown in seconds")
//!     .build()?;
//!
//! let loader = Loader::builder(schema).file("plugins/abilities/abilities.yml").build()?;
//! let config = loader.load()?;
//! let faster = config.with("keraunos.cooldown", 5)?;
//! loader.save(&faster)?;
//! ```
//!
//! The first `load()` finds no file, writes one from the defaults and returns
//! cooldown 10. `with` validates and returns a new snapshot; `config` still
//! reports 10.
//!
//! # Schema as source of truth
//!
//! The schema defines which paths exist, their kinds, defaults, validators
//! and comments. Loading, file generation, `config get` and `config set` all
//! derive from it. Declaration order is the only ordering: it drives load
//! order, write order and `config list` order.
//!
//! Sections compose prefixes to any depth. [`section()`](SectionBuilder::section)
//! descends, [`parent()`](SectionBuilder::parent) climbs one level and
//! [`end()`](SectionBuilder::end) returns to the top. Calling `parent()` on a
//! top-level section is a mistake that makes [`build()`](SchemaBuilder::build)
//! fail, as do duplicate paths and a path that is both a value and a section.
//!
//! # Kinds
//!
//! Eleven kinds, closed: integer (`i64`), floating-point (`f64`), text,
//! boolean, lists of text, integers, floats and records, a single record, and
//! text or integer maps. Records are ordered string-keyed YAML mappings
//! ([`Record`]). Each [`ConfigValue`] variant wraps a [`Definition<T>`] of the
//! matching Rust type.
//!
//! # Snapshots
//!
//! A [`Config`] holds exactly one value per declared path. Typed getters
//! (`get_int`, `get_text_list`, ...) fail on an unknown path or on a kind
//! mismatch; they never coerce. [`with()`](Config::with) and
//! [`with_all()`](Config::with_all) validate and return a new snapshot, or an
//! error with the original untouched. [`section()`](Config::section) gives a
//! prefix-scoped view:
//!
//! ```ignore
//! config.section("keraunos").section("knockback").get_double("vertical")?
//! // same as
//! config.get_double("keraunos.knockback.vertical")?
//! ```
//!
//! Snapshots are `Send + Sync`. Which one is current is up to the caller; a
//! [`ConfigRegistry`] keeps named loaders and swaps `Arc<Config>`s atomically.
//!
//! # Loading
//!
//! For every declared path, in order:
//!
//! - **missing** (or `null`): keep the default, log a warning.
//! - **wrong shape**: keep the default, log a warning with the reason. One
//!   bad line never blocks the rest of the file.
//! - **empty list**: keep the default. The file cannot tell "cleared" from
//!   "not given", so both mean "use the default".
//!
//! With validate-on-load (on by default) the assembled snapshot is then
//! validated as a whole, and any failure aborts the load listing every
//! `path: message`.
//!
//! A missing file yields the defaults and, with auto-generation (on by
//! default), is written out once it passes validation. Files are located with
//! [`file()`](LoaderBuilder::file) or a list of [`SearchPath`]s; the first
//! existing `{dir}/{name}.yml` wins.
//!
//! # Strict mode
//!
//! Strict mode is **off by default**: keys in the file that the schema does
//! not declare are logged and ignored. With
//! [`.strict(true)`](LoaderBuilder::strict) they fail the load with the file
//! path, key and line number:
//!
//! ```text
//! Unknown key 'keraunos.cooldwon' in plugins/abilities/abilities.yml (line 7)
//! ```
//!
//! Fields inside record and map values belong to those values and are never
//! reported.
//!
//! # File layout
//!
//! The writer output is deterministic: the header as `#` lines, then one
//! block per top-level section separated by blank lines, intermediate keys
//! written once, comments aligned at column 40. Integer and float lists are
//! inline (`[1, 5, 10]`); text and record lists put one bullet per line.
//! Loading a written file gives back the same snapshot.
//!
//! # Logging
//!
//! Snapfig logs through [`tracing`](https://docs.rs/tracing) and never
//! installs a subscriber. Missing and malformed values and undeclared keys
//! are `warn!`, file generation and registry summaries are `info!`, file I/O
//! and snapshot updates are `debug!`.
//!
//! # Clap adapter
//!
//! The `cli` module (behind the `clap` feature, on by default) provides
//! [`ConfigArgs`], a derive struct to embed in your own subcommand enum.
//! [`into_action()`](ConfigArgs::into_action) turns it into a [`ConfigAction`]
//! and [`Loader::handle()`] runs it. `config set` parses its value as YAML,
//! coerces it to the path's kind, validates it and rewrites the file.
//! To use snapfig without clap:
//!
//! ```toml
//! snapfig = { version = "...", default-features = false }
//! ```
//!
//! # Error handling
//!
//! All fallible operations return [`SnapfigError`]. Errors are user-facing:
//! they name the path or file involved, and validation errors carry every
//! message. See the [`error`] module for the full set.

pub mod error;
pub mod types;

#[cfg(feature = "clap")]
mod cli;
mod config;
mod loader;
mod ops;
mod registry;
mod schema;
mod store;
mod tree;
mod unknown;
mod validation;
mod validator;
mod value;
pub mod writer;

#[cfg(test)]
mod fixtures;

#[cfg(feature = "clap")]
pub use cli::{ConfigArgs, ConfigSubcommand};
pub use config::{Config, Section};
pub use error::SnapfigError;
pub use loader::{Loader, LoaderBuilder};
pub use ops::ConfigResult;
pub use registry::ConfigRegistry;
pub use schema::{Declare, Schema, SchemaBuilder, SectionBuilder};
pub use store::{ConfigStore, YamlFileStore};
pub use types::{ConfigAction, SearchPath};
pub use validation::ValidationResult;
pub use validator::Validator;
pub use value::{ConfigValue, Definition, IntMap, Kind, Record, TextMap, Value, ValueType};
