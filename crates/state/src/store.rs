//! Storage of the shutdown record.
//!
//! A store is a single JSON file replaced atomically on every save. There is
//! no locking: two processes saving the same file race and the last rename
//! wins, but a reader never observes a partially written file.

use crate::record::ShutdownState;
use serde::{Deserialize, Serialize};
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

/// Directory (under the user config dir or a deployment root) holding the state file.
pub const STATE_DIR: &str = "trh";

/// File name of the persisted shutdown record.
pub const STATE_FILE: &str = "shutdown_state.json";

#[derive(Error, Debug)]
pub enum StateError {
    /// No per-user configuration directory on this platform
    #[error("could not determine the user configuration directory")]
    NoConfigDir,

    #[error("failed to read state file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("state file {} is malformed: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write state file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to replace state file {}: {source}", .path.display())]
    Rename {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where the shutdown record lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateScope {
    /// One record per operator machine, under the user config directory.
    #[default]
    Global,
    /// One record per deployment root.
    Deployment,
}

impl StateScope {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "global" => Some(Self::Global),
            "deployment" => Some(Self::Deployment),
            _ => None,
        }
    }

    /// Resolve the state file path for this scope.
    pub fn state_path(self, deployment_root: &Path) -> Result<PathBuf, StateError> {
        let dir = match self {
            Self::Global => dirs::config_dir()
                .ok_or(StateError::NoConfigDir)?
                .join(STATE_DIR),
            Self::Deployment => deployment_root.join(format!(".{STATE_DIR}")),
        };
        Ok(dir.join(STATE_FILE))
    }
}

/// Load/save access to the shutdown record.
pub trait StateStore {
    /// Location of the record, for display.
    fn location(&self) -> &Path;

    /// Load the record. A missing record is an empty one, not an error.
    fn load(&self) -> Result<ShutdownState, StateError>;

    /// Replace the record.
    fn save(&self, state: &ShutdownState) -> Result<(), StateError>;
}

/// [`StateStore`] backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location of `scope`.
    pub fn for_scope(scope: StateScope, deployment_root: &Path) -> Result<Self, StateError> {
        Ok(Self::new(scope.state_path(deployment_root)?))
    }

    fn write_error(&self, source: io::Error) -> StateError {
        StateError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl StateStore for FileStateStore {
    fn location(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<ShutdownState, StateError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No state file, starting empty");
                return Ok(ShutdownState::default());
            }
            Err(source) => {
                return Err(StateError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if contents.trim().is_empty() {
            return Ok(ShutdownState::default());
        }

        serde_json::from_str(&contents).map_err(|source| StateError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, state: &ShutdownState) -> Result<(), StateError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| self.write_error(e))?;

        let contents = serde_json::to_vec_pretty(state)
            .map_err(|e| self.write_error(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        // The temp file lives next to the target so the rename stays on one
        // filesystem. Dropping it on error removes it.
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.write_error(e))?;
        tmp.write_all(&contents).map_err(|e| self.write_error(e))?;
        tmp.flush().map_err(|e| self.write_error(e))?;

        tmp.persist(&self.path).map_err(|e| StateError::Rename {
            path: self.path.clone(),
            source: e.error,
        })?;

        debug!(path = %self.path.display(), "State saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LastCommand;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join(STATE_FILE));

        let state = store.load().unwrap();
        assert_eq!(state, ShutdownState::default());
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STATE_FILE);
        std::fs::write(&path, "{\"lastGenAt\": 12").unwrap();

        let result = FileStateStore::new(&path).load();
        assert!(matches!(result, Err(StateError::Malformed { .. })));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("nested").join(STATE_FILE));

        let mut state = ShutdownState {
            data_dir: Some(PathBuf::from("/srv/shutdown")),
            ..Default::default()
        };
        state.record_generate(
            PathBuf::from("/srv/shutdown/generate-assets3.json"),
            Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap(),
        );
        state.record(
            LastCommand::Send,
            Utc.with_ymd_and_hms(2026, 5, 2, 12, 0, 0).unwrap(),
        );

        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), state);
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join(STATE_FILE));

        store.save(&ShutdownState::default()).unwrap();
        store.save(&ShutdownState::default()).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_rename_failure_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the target path makes the rename fail.
        let path = dir.path().join(STATE_FILE);
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        let result = FileStateStore::new(&path).save(&ShutdownState::default());
        assert!(matches!(result, Err(StateError::Rename { .. })));

        // Only the blocking directory remains; the temp file was removed.
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_concurrent_saves_last_writer_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STATE_FILE);

        let first = ShutdownState {
            last_gen_at: Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        let second = ShutdownState {
            last_gen_at: Some(Utc.with_ymd_and_hms(2026, 2, 2, 0, 0, 0).unwrap()),
            ..Default::default()
        };

        for _ in 0..20 {
            let a = FileStateStore::new(&path);
            let b = FileStateStore::new(&path);
            std::thread::scope(|s| {
                s.spawn(|| a.save(&first).unwrap());
                s.spawn(|| b.save(&second).unwrap());
            });

            let loaded = FileStateStore::new(&path).load().unwrap();
            assert!(loaded == first || loaded == second);
        }
    }

    #[test]
    fn test_scope_parse() {
        assert_eq!(StateScope::parse("Deployment"), Some(StateScope::Deployment));
        assert_eq!(StateScope::parse("global"), Some(StateScope::Global));
        assert_eq!(StateScope::parse("cluster"), None);
    }

    #[test]
    fn test_scope_paths() {
        let root = Path::new("/deployments/thanos-sepolia");
        let path = StateScope::Deployment.state_path(root).unwrap();
        assert_eq!(
            path,
            PathBuf::from("/deployments/thanos-sepolia/.trh/shutdown_state.json")
        );

        if let Ok(global) = StateScope::Global.state_path(root) {
            assert!(global.ends_with("trh/shutdown_state.json"));
            assert!(!global.starts_with(root));
        }
    }
}
