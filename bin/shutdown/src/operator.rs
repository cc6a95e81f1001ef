use crate::context::ContextOptions;
use serde::{Deserialize, Serialize};
use state::{FileStateStore, StateScope};
use std::path::{Path, PathBuf};

/// Optional operator settings file in the deployment root.
pub const OPERATOR_CONFIG_FILE: &str = "shutdown.toml";

/// Operator overrides for the shutdown tool.
///
/// Every field is optional; command line flags and environment variables take
/// precedence over values from the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperatorConfig {
    /// SDK root, overriding the automatic lookup
    pub sdk_root: Option<PathBuf>,

    /// Working directory for generated artifacts
    pub data_dir: Option<PathBuf>,

    /// Where the shutdown state is kept
    pub state_scope: Option<StateScope>,

    /// Force-withdrawal tool binary
    pub force_withdraw_bin: Option<PathBuf>,

    /// Monolithic shutdown script used by `run --use-script`
    pub script: Option<PathBuf>,
}

impl OperatorConfig {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("failed to read {}: {}", path.display(), e))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| eyre::eyre!("failed to parse {}: {}", path.display(), e))?;

        Ok(config)
    }

    /// Load `explicit` if given (it must exist), otherwise the default file
    /// of the deployment root if present.
    pub fn load(deployment_root: &Path, explicit: Option<&Path>) -> eyre::Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let default = deployment_root.join(OPERATOR_CONFIG_FILE);
        if default.is_file() {
            Self::from_file(default)
        } else {
            Ok(Self::default())
        }
    }
}

/// Values given on the command line or in the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub sdk_root: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub state_scope: Option<StateScope>,
}

/// Everything resolved before a deployment context can be built.
pub struct Setup {
    pub operator: OperatorConfig,
    pub options: ContextOptions,
    pub store: FileStateStore,
}

impl Setup {
    /// Merge `overrides` over the operator file of `deployment_root` and
    /// locate the state file.
    pub fn load(deployment_root: &Path, overrides: Overrides) -> eyre::Result<Self> {
        let operator = OperatorConfig::load(deployment_root, overrides.config.as_deref())?;

        let scope = overrides
            .state_scope
            .or(operator.state_scope)
            .unwrap_or_default();
        let store = FileStateStore::for_scope(scope, deployment_root)?;

        let options = ContextOptions::new(deployment_root)
            .with_sdk_root(overrides.sdk_root.or_else(|| operator.sdk_root.clone()))
            .with_data_dir(overrides.data_dir.or_else(|| operator.data_dir.clone()));

        Ok(Self {
            operator,
            options,
            store,
        })
    }
}
