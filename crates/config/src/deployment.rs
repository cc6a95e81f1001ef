//! Deployment settings stored in the deployment root.

use crate::network::NetworkType;
use serde::{Deserialize, Serialize};
use std::{
    fmt, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// File name of the deployment settings inside a deployment root.
pub const SETTINGS_FILE: &str = "settings.json";

/// Field of [`DeploymentConfig`] checked by [`DeploymentConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    L1RpcUrl,
    L2RpcUrl,
    L1ChainId,
    L2ChainId,
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::L1RpcUrl => "l1_rpc_url",
            Self::L2RpcUrl => "l2_rpc_url",
            Self::L1ChainId => "l1_chain_id",
            Self::L2ChainId => "l2_chain_id",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    /// No settings file in the deployment root
    #[error("deployment config not found at {}", .0.display())]
    NotFound(PathBuf),

    /// Settings file exists but could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Settings file is not valid JSON for [`DeploymentConfig`]
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A required field is empty or zero
    #[error("invalid deployment config: {0} is not set")]
    Invalid(ConfigField),
}

/// Configuration of one rollup deployment.
///
/// Written by the provisioning tooling; read-only here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// L1 RPC endpoint url
    #[serde(default)]
    pub l1_rpc_url: String,

    /// L2 RPC endpoint url
    #[serde(default)]
    pub l2_rpc_url: String,

    /// L1 chain id
    #[serde(default)]
    pub l1_chain_id: u64,

    /// L2 chain id
    #[serde(default)]
    pub l2_chain_id: u64,

    /// Network the deployment runs on; [`Self::network`] falls back to the
    /// default when the file omits it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkType>,

    /// Admin key used to sign L1 transactions (hex, with or without 0x prefix)
    #[serde(default)]
    pub admin_private_key: String,
}

impl DeploymentConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path.to_path_buf()))
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the settings file of a deployment root.
    pub fn load(deployment_root: &Path) -> Result<Self, ConfigError> {
        Self::from_file(deployment_root.join(SETTINGS_FILE))
    }

    /// Configured network, or [`NetworkType::default`] when unset.
    pub fn network(&self) -> NetworkType {
        self.network.unwrap_or_default()
    }

    /// Check the fields every phase relies on.
    ///
    /// Fields are checked in a fixed order and the first violation is
    /// reported: L1 RPC url, L2 RPC url, L1 chain id, L2 chain id.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.l1_rpc_url.trim().is_empty() {
            return Err(ConfigError::Invalid(ConfigField::L1RpcUrl));
        }

        if self.l2_rpc_url.trim().is_empty() {
            return Err(ConfigError::Invalid(ConfigField::L2RpcUrl));
        }

        if self.l1_chain_id == 0 {
            return Err(ConfigError::Invalid(ConfigField::L1ChainId));
        }

        if self.l2_chain_id == 0 {
            return Err(ConfigError::Invalid(ConfigField::L2ChainId));
        }

        Ok(())
    }
}
