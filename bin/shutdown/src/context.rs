//! Execution context shared by all phases.
//!
//! Building a context runs every precondition of a phase in order and fails
//! on the first one that does not hold:
//! 1. deployment settings exist in the deployment root
//! 2. the settings pass validation
//! 3. the SDK root can be located
//! 4. the deployment log file can be opened
//! 5. the persisted state can be loaded
//!
//! No phase runs on a partially built context.

use crate::{
    artifact::{self, DeploymentContracts},
    error::ShutdownError,
    logging::DeploymentLogger,
    sdk, ui,
};
use alloy_primitives::Address;
use config::{DeploymentConfig, SETTINGS_FILE};
use state::{ShutdownState, StateStore};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default working directory for artifacts, relative to the deployment root.
pub const DEFAULT_DATA_DIR: &str = "shutdown-data";

/// Inputs to context construction.
#[derive(Debug, Clone, Default)]
pub struct ContextOptions {
    /// Deployment root, normally the current directory
    pub deployment_root: PathBuf,
    /// Explicit SDK root, skipping the candidate lookup
    pub sdk_root: Option<PathBuf>,
    /// New artifact directory, persisted with the next state save
    pub data_dir: Option<PathBuf>,
}

impl ContextOptions {
    pub fn new(deployment_root: impl Into<PathBuf>) -> Self {
        Self {
            deployment_root: deployment_root.into(),
            ..Default::default()
        }
    }

    pub fn with_sdk_root(mut self, sdk_root: Option<PathBuf>) -> Self {
        self.sdk_root = sdk_root;
        self
    }

    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        self.data_dir = data_dir;
        self
    }
}

/// Values derived from the deployment on every run; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedContext {
    pub chain_id: u64,
    pub l2_chain_id: u64,
    pub thanos_root: PathBuf,
    pub deployments_path: PathBuf,
}

pub struct DeploymentContext {
    pub root: PathBuf,
    pub config: DeploymentConfig,
    pub derived: DerivedContext,
    pub state: ShutdownState,
    store: Box<dyn StateStore>,
    logger: DeploymentLogger,
}

impl DeploymentContext {
    pub fn build(
        options: &ContextOptions,
        store: Box<dyn StateStore>,
    ) -> Result<Self, ShutdownError> {
        let root = options.deployment_root.clone();

        let config = DeploymentConfig::load(&root)?;
        config.validate()?;

        let thanos_root = sdk::resolve_sdk_root(&root, options.sdk_root.as_deref())?;

        let logger = DeploymentLogger::init(&root, config.l2_chain_id)
            .map_err(|e| ShutdownError::io(root.join(crate::logging::LOG_DIR), e))?;

        if config.network.is_none() {
            let assumed = config.network();
            warn!(network = %assumed, "network missing from settings");
            ui::warning(&format!("network is not set in {SETTINGS_FILE}; assuming {assumed}"));
        }

        let mut state = store.load()?;
        if let Some(data_dir) = &options.data_dir {
            state.data_dir = Some(root.join(data_dir));
        }

        let derived = DerivedContext {
            chain_id: config.l1_chain_id,
            l2_chain_id: config.l2_chain_id,
            deployments_path: sdk::deployments_path(&thanos_root),
            thanos_root,
        };

        info!(
            deployment_root = %root.display(),
            sdk_root = %derived.thanos_root.display(),
            l1_chain_id = derived.chain_id,
            l2_chain_id = derived.l2_chain_id,
            network = %config.network(),
            state_file = %store.location().display(),
            "Deployment context ready"
        );

        Ok(Self {
            root,
            config,
            derived,
            state,
            store,
            logger,
        })
    }

    pub fn sdk_root(&self) -> &Path {
        &self.derived.thanos_root
    }

    pub fn log_path(&self) -> &Path {
        self.logger.path()
    }

    pub fn state_location(&self) -> &Path {
        self.store.location()
    }

    /// Artifact directory: the persisted one, or the default under the root.
    pub fn data_dir(&self) -> PathBuf {
        match &self.state.data_dir {
            Some(dir) => self.root.join(dir),
            None => self.root.join(DEFAULT_DATA_DIR),
        }
    }

    /// Create the artifact directory if needed.
    pub fn ensure_data_dir(&self) -> Result<PathBuf, ShutdownError> {
        let dir = self.data_dir();
        std::fs::create_dir_all(&dir).map_err(|e| ShutdownError::io(&dir, e))?;
        Ok(dir)
    }

    /// Locate the deployment contracts file.
    pub fn contracts_path(&self) -> Result<PathBuf, ShutdownError> {
        let (primary, extras) = artifact::contracts_candidates(
            &self.root,
            &self.derived.deployments_path,
            self.derived.chain_id,
        );
        artifact::resolve(&primary, &extras)
    }

    /// L1 bridge proxy address from the deployment contracts file.
    pub fn bridge_address(&self) -> Result<Address, ShutdownError> {
        let path = self.contracts_path()?;
        let bridge = DeploymentContracts::from_file(&path)?.bridge_proxy()?;
        debug!(bridge = %bridge, contracts = %path.display(), "Resolved bridge proxy");
        Ok(bridge)
    }

    /// Write the state record back to its store.
    pub fn persist(&self) -> Result<(), ShutdownError> {
        self.store.save(&self.state)?;
        debug!(path = %self.store.location().display(), "State persisted");
        Ok(())
    }
}
