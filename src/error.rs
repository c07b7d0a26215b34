use std::path::PathBuf;

use thiserror::Error;

use crate::value::Kind;

#[derive(Debug, Error)]
pub enum SnapfigError {
    #[error("Unknown key '{key}' in {path} (line {line})")]
    UnknownKey {
        key: String,
        path: PathBuf,
        line: usize,
    },

    #[error("Unknown keys in config file")]
    UnknownKeys(Vec<SnapfigError>),

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid config document {path}: {reason}")]
    InvalidDocument { path: PathBuf, reason: String },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No config value at path: {0}")]
    UnknownPath(String),

    #[error("Value at '{path}' is {actual}, not {expected}")]
    KindMismatch {
        path: String,
        expected: Kind,
        actual: Kind,
    },

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Invalid value for '{path}': {}", errors.join(", "))]
    ValidationFailed { path: String, errors: Vec<String> },

    #[error("Configuration validation failed for {}:\n{}", file.display(), errors.join("\n"))]
    LoadValidationFailed { file: PathBuf, errors: Vec<String> },

    #[error("Path '{0}' is declared more than once")]
    DuplicatePath(String),

    #[error("Path '{path}' conflicts with '{other}': a value cannot also be a section")]
    PathConflict { path: String, other: String },

    #[error("Invalid config path '{0}'")]
    InvalidPath(String),

    #[error("parent() called on top-level section '{0}'")]
    SectionUnderflow(String),

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("No config file configured; call .file() or .search_path() on the builder")]
    NoFile,

    #[error("Unknown config: {0}")]
    UnknownConfig(String),

    #[error("Config '{0}' is already registered")]
    DuplicateConfig(String),
}
