use crate::phase::Phase;
use config::{ConfigError, ConfigField};
use state::StateError;
use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShutdownError {
    /// No deployment settings in the deployment root
    #[error("no deployment config at {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// A required deployment setting is missing
    #[error("invalid deployment config: {0} is not set")]
    ConfigInvalid(ConfigField),

    /// Deployment settings exist but cannot be read or parsed
    #[error(transparent)]
    ConfigMalformed(ConfigError),

    #[error("SDK root not found; checked: {}", display_paths(.candidates))]
    SdkNotFound { candidates: Vec<PathBuf> },

    #[error("artifact not found; checked: {}", display_paths(.candidates))]
    ArtifactNotFound { candidates: Vec<PathBuf> },

    /// A phase input produced by an earlier phase does not exist yet
    #[error("{phase} needs {}, which does not exist{}", .path.display(), producer_hint(.phase, .path))]
    MissingPrerequisite { phase: Phase, path: PathBuf },

    /// A phase reported success without producing its output
    #[error("{phase} reported success but {} was not written", .path.display())]
    MissingOutput { phase: Phase, path: PathBuf },

    #[error("deployment contracts file {} has no valid {name} address", .path.display())]
    ContractMissing { name: &'static str, path: PathBuf },

    #[error("failed to read deployment contracts {}: {reason}", .path.display())]
    ContractsUnreadable { path: PathBuf, reason: String },

    /// State file could not be read or written
    #[error(transparent)]
    State(#[from] StateError),

    /// The chain client failed; its message is kept verbatim
    #[error("{phase} failed: {reason:#}")]
    ExternalCallFailed { phase: Phase, reason: eyre::Report },

    #[error("shutdown script {} failed: {reason:#}", .script.display())]
    ScriptFailed { script: PathBuf, reason: eyre::Report },

    #[error("failed to prepare {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ShutdownError {
    pub const fn external(phase: Phase, reason: eyre::Report) -> Self {
        Self::ExternalCallFailed { phase, reason }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<ConfigError> for ShutdownError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound(path) => Self::ConfigNotFound(path),
            ConfigError::Invalid(field) => Self::ConfigInvalid(field),
            other => Self::ConfigMalformed(other),
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn producer_hint(phase: &Phase, path: &std::path::Path) -> String {
    match phase.producer_of(path) {
        Some(producer) => format!("; run `{}` first", producer),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_mapping() {
        let err: ShutdownError = ConfigError::NotFound(PathBuf::from("/d/settings.json")).into();
        assert!(matches!(err, ShutdownError::ConfigNotFound(_)));

        let err: ShutdownError = ConfigError::Invalid(ConfigField::L2ChainId).into();
        assert!(matches!(
            err,
            ShutdownError::ConfigInvalid(ConfigField::L2ChainId)
        ));
        assert_eq!(
            err.to_string(),
            "invalid deployment config: l2_chain_id is not set"
        );
    }

    #[test]
    fn test_missing_prerequisite_hint() {
        let err = ShutdownError::MissingPrerequisite {
            phase: Phase::Register,
            path: PathBuf::from("/data/genstorage-addresses.json"),
        };
        assert_eq!(
            err.to_string(),
            "register needs /data/genstorage-addresses.json, which does not exist; run `deploy-storage` first"
        );
    }

    #[test]
    fn test_external_call_keeps_message() {
        let err = ShutdownError::external(Phase::Generate, eyre::eyre!("rpc timeout"));
        assert_eq!(err.to_string(), "gen failed: rpc timeout");
    }
}
