//! Network the deployment runs against.
//!
//! The name is handed verbatim to external tooling, so parsing accepts both
//! the lowercase form and the capitalized form older settings files use.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Network type of a rollup deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    #[serde(alias = "Mainnet")]
    Mainnet,
    #[default]
    #[serde(alias = "Testnet")]
    Testnet,
    #[serde(alias = "LocalDevnet", alias = "local-devnet")]
    Devnet,
}

impl NetworkType {
    /// Name passed to scripts and shown in status output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Devnet => "devnet",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
