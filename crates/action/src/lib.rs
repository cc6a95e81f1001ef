pub mod activate;
pub mod force_withdraw;
pub mod process;
pub mod register;
pub mod tool;

pub use force_withdraw::ForceWithdrawClient;
pub use process::{Invocation, ProcessRunner, ScriptRunner};
pub use tool::ForceWithdrawTool;

use alloy_primitives::{Address, TxHash};
use std::{future::Future, path::Path, path::PathBuf};

/// Input of the snapshot generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    /// First L2 block of the snapshot range (number or tag)
    pub l2_start: String,
    /// Last L2 block of the snapshot range (number or tag)
    pub l2_end: String,
    /// Where the snapshot is written
    pub output: PathBuf,
    /// Skip re-verifying balances against the L2 state
    pub skip_verify: bool,
}

/// Input of the force-withdrawal settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    /// L1 bridge proxy
    pub bridge: Address,
    /// Snapshot produced by generate
    pub input: PathBuf,
    /// Storage contract to settle; zero means every registered position
    pub position: Address,
    /// Estimate gas only, submit nothing
    pub dry_run: bool,
}

/// Chain-side operations of a bridge shutdown.
///
/// Every call is all-or-nothing from the caller's point of view: an `Err`
/// means no output may be trusted.
pub trait ChainClient: Send + Sync {
    /// Snapshot bridge positions and their withdrawable balances.
    fn generate(
        &self,
        request: &GenerateRequest,
    ) -> impl Future<Output = eyre::Result<Outcome>> + Send;

    /// Deploy the L1 storage contracts holding the snapshot, writing their
    /// addresses to `output`.
    fn deploy_storage(
        &self,
        input: &Path,
        output: &Path,
    ) -> impl Future<Output = eyre::Result<Outcome>> + Send;

    /// Register the storage contracts listed in `input` with the bridge.
    fn register(
        &self,
        bridge: Address,
        input: &Path,
    ) -> impl Future<Output = eyre::Result<Outcome>> + Send;

    /// Set the bridge's force-withdrawal switch.
    fn activate(
        &self,
        bridge: Address,
        enable: bool,
    ) -> impl Future<Output = eyre::Result<Outcome>> + Send;

    /// Submit (or estimate) the force-withdrawal claims.
    fn send(&self, request: &SendRequest) -> impl Future<Output = eyre::Result<Outcome>> + Send;
}

/// Result of a chain-side operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Transaction hash, when a single transaction was sent
    pub tx_hash: Option<TxHash>,
    /// Block number where transaction was included
    pub block_number: Option<u64>,
    /// Gas used
    pub gas_used: Option<u64>,
}

impl Outcome {
    /// Outcome of an operation that submitted no transaction of its own.
    pub const fn offchain() -> Self {
        Self {
            tx_hash: None,
            block_number: None,
            gas_used: None,
        }
    }
}
