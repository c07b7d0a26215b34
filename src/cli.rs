//! Clap adapter for snapfig.
//!
//! Compiled only when the `clap` Cargo feature is enabled (on by default).
//! [`ConfigArgs`] and [`ConfigSubcommand`] embed into a clap
//! `#[derive(Parser)]` to give a tool `config gen|list|get|set|unset`
//! subcommands. [`ConfigArgs::into_action()`] converts the parsed arguments
//! into a [`ConfigAction`](crate::ConfigAction), which
//! [`Loader::handle()`](crate::Loader::handle) executes. Without clap, build
//! [`ConfigAction`](crate::ConfigAction) values directly.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::types::ConfigAction;

/// Clap-derived args for the `config` subcommand group.
///
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(subcommand)]
///     command: Commands,
/// }
///
/// #[derive(Subcommand)]
/// enum Commands {
///     Config(ConfigArgs),
/// }
/// ```
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigSubcommand>,
}

/// Available config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Show every configuration path with its current value.
    List,
    /// Write out the configuration file with all defaults.
    Gen {
        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the current value and comment for a path.
    Get {
        /// Dotted path (e.g. "keraunos.cooldown").
        key: String,
    },
    /// Validate a value and write it to the config file.
    Set {
        /// Dotted path (e.g. "keraunos.cooldown").
        key: String,
        /// Value as YAML, e.g. `15`, `"[1, 5, 10]"` or `"{daily: 5}"`.
        value: String,
    },
    /// Reset a path to its default in the config file.
    Unset {
        /// Dotted path (e.g. "keraunos.cooldown").
        key: String,
    },
}

impl ConfigArgs {
    /// Convert clap-parsed args into a framework-agnostic `ConfigAction`.
    ///
    /// Bare `config` (no subcommand) and explicit `config list` both map to
    /// `ConfigAction::List`.
    pub fn into_action(self) -> ConfigAction {
        match self.action {
            None | Some(ConfigSubcommand::List) => ConfigAction::List,
            Some(ConfigSubcommand::Gen { output }) => ConfigAction::Gen { output },
            Some(ConfigSubcommand::Get { key }) => ConfigAction::Get { key },
            Some(ConfigSubcommand::Set { key, value }) => ConfigAction::Set { key, value },
            Some(ConfigSubcommand::Unset { key }) => ConfigAction::Unset { key },
        }
    }
}
