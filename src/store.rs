//! Text I/O for config files.
//!
//! The loader and writer never touch the filesystem directly; they go through
//! a [`ConfigStore`]. [`YamlFileStore`] is the real implementation. Tests and
//! hosts with unusual storage (bundled resources, remote blobs) can plug in
//! their own.
//!
//! # Locating the file
//!
//! A loader either names its file explicitly or lists [`SearchPath`]s. Each
//! search path resolves to one directory, checked in order for
//! `{dir}/{file_name}`. The first file found wins. When none exists, the
//! first resolvable directory is where the file will be created.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::SnapfigError;
use crate::types::SearchPath;

/// Read and write whole config documents.
pub trait ConfigStore: Send + Sync + fmt::Debug {
    /// The file's text, or `None` if it does not exist. An empty file is
    /// `Some("")`.
    fn read(&self, path: &Path) -> Result<Option<String>, SnapfigError>;

    /// Replace the file's contents, creating parent directories as needed.
    fn write(&self, path: &Path, contents: &str) -> Result<(), SnapfigError>;
}

/// Plain files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFileStore;

impl ConfigStore for YamlFileStore {
    fn read(&self, path: &Path) -> Result<Option<String>, SnapfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                debug!(file = %path.display(), bytes = content.len(), "read config file");
                Ok(Some(content))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SnapfigError::IoError {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), SnapfigError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| SnapfigError::WriteError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(path, contents).map_err(|e| SnapfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(file = %path.display(), bytes = contents.len(), "wrote config file");
        Ok(())
    }
}

/// Resolve a [`SearchPath`] to a concrete directory.
///
/// `app_name` is used by `SearchPath::Platform` to construct the platform-specific
/// config directory (e.g. `~/.config/{app_name}/` on Linux).
///
/// Returns `None` if the path cannot be resolved (e.g. no home directory found).
pub fn resolve_search_path(sp: &SearchPath, app_name: &str) -> Option<PathBuf> {
    match sp {
        SearchPath::Platform => {
            let proj = directories::ProjectDirs::from("", "", app_name)?;
            Some(proj.config_dir().to_path_buf())
        }
        SearchPath::Home(subdir) => {
            let user = directories::UserDirs::new()?;
            Some(user.home_dir().join(subdir))
        }
        SearchPath::Cwd => std::env::current_dir().ok(),
        SearchPath::Path(p) => Some(p.clone()),
    }
}

/// A located config file: where it is (or will be) and its text if it exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    pub path: PathBuf,
    pub contents: Option<String>,
}

/// Check each search path in order for `file_name`.
///
/// Unresolvable search paths are skipped. Fails with [`SnapfigError::NoFile`]
/// only if none resolves at all.
pub fn locate(
    store: &dyn ConfigStore,
    search_paths: &[SearchPath],
    file_name: &str,
    app_name: &str,
) -> Result<Located, SnapfigError> {
    let candidates: Vec<PathBuf> = search_paths
        .iter()
        .filter_map(|sp| resolve_search_path(sp, app_name))
        .map(|dir| dir.join(file_name))
        .collect();

    for path in &candidates {
        if let Some(contents) = store.read(path)? {
            return Ok(Located {
                path: path.clone(),
                contents: Some(contents),
            });
        }
    }

    candidates
        .into_iter()
        .next()
        .map(|path| Located {
            path,
            contents: None,
        })
        .ok_or(SnapfigError::NoFile)
}
