use std::path::PathBuf;

/// Where to search for config files.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPath {
    /// Platform config directory (XDG on Linux, ~/Library/Application Support on macOS).
    Platform,
    /// A subdirectory under the user's home directory, e.g. `Home(".myplugin")`.
    Home(&'static str),
    /// Current working directory.
    Cwd,
    /// An explicit directory.
    Path(PathBuf),
}

/// A config operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    /// Render the defaults-only file, to `output` or as text.
    Gen { output: Option<PathBuf> },
    /// Every path with its current value.
    List,
    Get { key: String },
    /// `value` is YAML text, coerced to the path's kind.
    Set { key: String, value: String },
    /// Put `key` back to its default.
    Unset { key: String },
}
