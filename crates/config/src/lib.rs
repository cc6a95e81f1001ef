//! Deployment configuration for the rollup being shut down.
//!
//! This crate provides:
//! - Network types (mainnet, testnet, devnet)
//! - Loading of the deployment's `settings.json`
//! - Validation of the fields every shutdown phase depends on

pub mod deployment;
pub mod network;

pub use deployment::{ConfigError, ConfigField, DeploymentConfig, SETTINGS_FILE};
pub use network::NetworkType;
