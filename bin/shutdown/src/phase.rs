//! The shutdown phases.
//!
//! Phases are independent operations tied together by the artifacts they
//! exchange, not by an enforced order: any phase may be re-run on its own.
//! Each phase checks that its input artifacts exist before calling the chain
//! client, checks its output artifacts exist afterwards, and only then records
//! progress and persists the state.

use crate::{context::DeploymentContext, error::ShutdownError, ui::Step};
use action::{ChainClient, GenerateRequest, Outcome, SendRequest};
use alloy_primitives::Address;
use chrono::Utc;
use state::LastCommand;
use std::{
    fmt,
    path::{Path, PathBuf},
};
use tracing::info;

/// Snapshot of bridge positions written by generate.
pub const GENERATE_OUTPUT: &str = "generate-assets3.json";

/// Storage contract addresses written by deploy-storage.
pub const STORAGE_ADDRESSES: &str = "genstorage-addresses.json";

pub const DEFAULT_L2_START: &str = "0";
pub const DEFAULT_L2_END: &str = "latest";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Generate,
    DeployStorage,
    Register,
    Activate,
    Send,
}

impl Phase {
    /// All phases in their intended order.
    pub const ALL: [Self; 5] = [
        Self::Generate,
        Self::DeployStorage,
        Self::Register,
        Self::Activate,
        Self::Send,
    ];

    /// Command name of the phase.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Generate => "gen",
            Self::DeployStorage => "deploy-storage",
            Self::Register => "register",
            Self::Activate => "activate",
            Self::Send => "send",
        }
    }

    /// Default artifact this phase consumes, by file name under the data dir.
    pub const fn input_artifact(self) -> Option<&'static str> {
        match self {
            Self::DeployStorage | Self::Send => Some(GENERATE_OUTPUT),
            Self::Register => Some(STORAGE_ADDRESSES),
            Self::Generate | Self::Activate => None,
        }
    }

    /// Default artifact this phase produces, by file name under the data dir.
    pub const fn output_artifact(self) -> Option<&'static str> {
        match self {
            Self::Generate => Some(GENERATE_OUTPUT),
            Self::DeployStorage => Some(STORAGE_ADDRESSES),
            Self::Register | Self::Activate | Self::Send => None,
        }
    }

    /// Whether the phase signs L1 transactions with the admin key.
    ///
    /// Only signing phases need a key and a verified L1 connection.
    pub const fn signs(self, dry_run: bool) -> bool {
        match self {
            Self::Generate => false,
            Self::Send => !dry_run,
            Self::DeployStorage | Self::Register | Self::Activate => true,
        }
    }

    /// Phase whose default output has the same file name as `path`, when it
    /// is one of this phase's inputs.
    pub fn producer_of(self, path: &Path) -> Option<Self> {
        let input = self.input_artifact()?;
        let file_name = path.file_name()?.to_str()?;
        if file_name != input {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|phase| phase.output_artifact() == Some(input))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// `value` anchored at the deployment root, or `default` when unset.
///
/// The force-withdrawal tool runs from the SDK root, so a relative path has
/// to be made absolute before it is handed over or checked on disk.
fn path_or(root: &Path, value: Option<&Path>, default: PathBuf) -> PathBuf {
    value
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| root.join(p))
        .unwrap_or(default)
}

#[derive(Debug, Clone, Default)]
pub struct GenerateArgs {
    pub l2_start: Option<String>,
    pub l2_end: Option<String>,
    pub output: Option<PathBuf>,
    pub skip_verify: bool,
}

impl GenerateArgs {
    pub fn resolve(&self, root: &Path, data_dir: &Path) -> GenerateRequest {
        GenerateRequest {
            l2_start: non_empty(self.l2_start.as_deref())
                .unwrap_or(DEFAULT_L2_START)
                .to_string(),
            l2_end: non_empty(self.l2_end.as_deref())
                .unwrap_or(DEFAULT_L2_END)
                .to_string(),
            output: path_or(root, self.output.as_deref(), data_dir.join(GENERATE_OUTPUT)),
            skip_verify: self.skip_verify,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeployStorageArgs {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl DeployStorageArgs {
    /// Snapshot to deploy and where the storage addresses go.
    pub fn resolve(&self, root: &Path, data_dir: &Path) -> (PathBuf, PathBuf) {
        (
            path_or(root, self.input.as_deref(), data_dir.join(GENERATE_OUTPUT)),
            path_or(root, self.output.as_deref(), data_dir.join(STORAGE_ADDRESSES)),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterArgs {
    pub input: Option<PathBuf>,
}

impl RegisterArgs {
    pub fn resolve(&self, root: &Path, data_dir: &Path) -> PathBuf {
        path_or(root, self.input.as_deref(), data_dir.join(STORAGE_ADDRESSES))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SendArgs {
    pub input: Option<PathBuf>,
    /// Storage contract to settle; all positions when unset
    pub position: Option<Address>,
    pub dry_run: bool,
}

impl SendArgs {
    pub fn resolve(&self, root: &Path, data_dir: &Path, bridge: Address) -> SendRequest {
        SendRequest {
            bridge,
            input: path_or(root, self.input.as_deref(), data_dir.join(GENERATE_OUTPUT)),
            position: self.position.unwrap_or(Address::ZERO),
            dry_run: self.dry_run,
        }
    }
}

fn require_input(phase: Phase, path: &Path) -> Result<(), ShutdownError> {
    if path.exists() {
        return Ok(());
    }
    Err(ShutdownError::MissingPrerequisite {
        phase,
        path: path.to_path_buf(),
    })
}

fn require_output(phase: Phase, path: &Path) -> Result<(), ShutdownError> {
    if path.exists() {
        return Ok(());
    }
    Err(ShutdownError::MissingOutput {
        phase,
        path: path.to_path_buf(),
    })
}

fn ensure_parent(path: &Path) -> Result<(), ShutdownError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| ShutdownError::io(parent, e))
        }
        _ => Ok(()),
    }
}

fn log_outcome(phase: Phase, outcome: &Outcome) {
    if let Some(tx_hash) = outcome.tx_hash {
        println!("  tx: {}", tx_hash);
        info!(
            phase = %phase,
            tx_hash = %tx_hash,
            block_number = ?outcome.block_number,
            gas_used = ?outcome.gas_used,
            "Transaction confirmed"
        );
    }
}

/// Mark `command` done now and persist.
fn record(ctx: &mut DeploymentContext, command: LastCommand) -> Result<(), ShutdownError> {
    ctx.state.record(command, Utc::now());
    ctx.persist()
}

/// Snapshot bridge positions over an L2 block range. Returns the snapshot path.
pub async fn generate<C: ChainClient>(
    ctx: &mut DeploymentContext,
    client: &C,
    args: &GenerateArgs,
) -> Result<PathBuf, ShutdownError> {
    let step = Step::start(Phase::Generate.name(), "Generating position snapshot");

    let result = async {
        let data_dir = ctx.ensure_data_dir()?;
        let request = args.resolve(&ctx.root, &data_dir);
        ensure_parent(&request.output)?;

        info!(
            l2_start = %request.l2_start,
            l2_end = %request.l2_end,
            output = %request.output.display(),
            skip_verify = request.skip_verify,
            "Generating snapshot"
        );

        let outcome = client
            .generate(&request)
            .await
            .map_err(|e| ShutdownError::external(Phase::Generate, e))?;
        require_output(Phase::Generate, &request.output)?;
        log_outcome(Phase::Generate, &outcome);

        ctx.state.record_generate(request.output.clone(), Utc::now());
        ctx.persist()?;

        Ok::<_, ShutdownError>(request.output)
    }
    .await;

    step.finish(result)
}

/// Deploy the snapshot to L1 storage contracts. Returns the storage-addresses path.
pub async fn deploy_storage<C: ChainClient>(
    ctx: &mut DeploymentContext,
    client: &C,
    args: &DeployStorageArgs,
) -> Result<PathBuf, ShutdownError> {
    let step = Step::start(Phase::DeployStorage.name(), "Deploying snapshot storage contracts");

    let result = async {
        let data_dir = ctx.ensure_data_dir()?;
        let (input, output) = args.resolve(&ctx.root, &data_dir);
        require_input(Phase::DeployStorage, &input)?;
        ensure_parent(&output)?;

        let outcome = client
            .deploy_storage(&input, &output)
            .await
            .map_err(|e| ShutdownError::external(Phase::DeployStorage, e))?;
        require_output(Phase::DeployStorage, &output)?;
        log_outcome(Phase::DeployStorage, &outcome);

        record(ctx, LastCommand::DeployStorage)?;
        Ok::<_, ShutdownError>(output)
    }
    .await;

    step.finish(result)
}

/// Register the deployed storage contracts with the bridge.
pub async fn register<C: ChainClient>(
    ctx: &mut DeploymentContext,
    client: &C,
    args: &RegisterArgs,
) -> Result<(), ShutdownError> {
    let step = Step::start(Phase::Register.name(), "Registering storage contracts with the bridge");

    let result = async {
        let input = args.resolve(&ctx.root, &ctx.data_dir());
        require_input(Phase::Register, &input)?;
        let bridge = ctx.bridge_address()?;

        let outcome = client
            .register(bridge, &input)
            .await
            .map_err(|e| ShutdownError::external(Phase::Register, e))?;
        log_outcome(Phase::Register, &outcome);

        record(ctx, LastCommand::Register)
    }
    .await;

    step.finish(result)
}

/// Turn on force withdrawal at the bridge. There is no way back.
pub async fn activate<C: ChainClient>(
    ctx: &mut DeploymentContext,
    client: &C,
) -> Result<(), ShutdownError> {
    let step = Step::start(Phase::Activate.name(), "Activating force withdrawal on the bridge");

    let result = async {
        let bridge = ctx.bridge_address()?;

        let outcome = client
            .activate(bridge, true)
            .await
            .map_err(|e| ShutdownError::external(Phase::Activate, e))?;
        log_outcome(Phase::Activate, &outcome);

        record(ctx, LastCommand::Activate)
    }
    .await;

    step.finish(result)
}

/// Submit the force-withdrawal claims, or only estimate them in dry-run mode.
pub async fn send<C: ChainClient>(
    ctx: &mut DeploymentContext,
    client: &C,
    args: &SendArgs,
) -> Result<(), ShutdownError> {
    let title = if args.dry_run {
        "Estimating force-withdrawal gas (dry run)"
    } else {
        "Sending force-withdrawal claims"
    };
    let step = Step::start(Phase::Send.name(), title);

    let result = async {
        let bridge = ctx.bridge_address()?;
        let request = args.resolve(&ctx.root, &ctx.data_dir(), bridge);
        require_input(Phase::Send, &request.input)?;

        info!(
            bridge = %request.bridge,
            input = %request.input.display(),
            position = %request.position,
            dry_run = request.dry_run,
            "Sending force withdrawals"
        );

        let outcome = client
            .send(&request)
            .await
            .map_err(|e| ShutdownError::external(Phase::Send, e))?;
        log_outcome(Phase::Send, &outcome);

        let command = if request.dry_run {
            LastCommand::DryRun
        } else {
            LastCommand::Send
        };
        record(ctx, command)
    }
    .await;

    step.finish(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_defaults() {
        let request = GenerateArgs::default().resolve(Path::new("/deploy"), Path::new("/data"));
        assert_eq!(request.l2_start, "0");
        assert_eq!(request.l2_end, "latest");
        assert_eq!(request.output, PathBuf::from("/data/generate-assets3.json"));
        assert!(!request.skip_verify);
    }

    #[test]
    fn test_generate_empty_inputs_use_defaults() {
        let args = GenerateArgs {
            l2_start: Some(String::new()),
            l2_end: Some("  ".to_string()),
            output: Some(PathBuf::new()),
            skip_verify: true,
        };
        let request = args.resolve(Path::new("/deploy"), Path::new("/data"));
        assert_eq!(request.l2_start, "0");
        assert_eq!(request.l2_end, "latest");
        assert_eq!(request.output, PathBuf::from("/data/generate-assets3.json"));
        assert!(request.skip_verify);
    }

    #[test]
    fn test_generate_explicit_inputs() {
        let args = GenerateArgs {
            l2_start: Some("100".to_string()),
            l2_end: Some("2000".to_string()),
            output: Some(PathBuf::from("/tmp/snap.json")),
            skip_verify: false,
        };
        let request = args.resolve(Path::new("/deploy"), Path::new("/data"));
        assert_eq!(request.l2_start, "100");
        assert_eq!(request.l2_end, "2000");
        assert_eq!(request.output, PathBuf::from("/tmp/snap.json"));
    }

    #[test]
    fn test_path_defaults() {
        let root = Path::new("/deploy");
        let data_dir = Path::new("/data");

        let (input, output) = DeployStorageArgs::default().resolve(root, data_dir);
        assert_eq!(input, PathBuf::from("/data/generate-assets3.json"));
        assert_eq!(output, PathBuf::from("/data/genstorage-addresses.json"));

        assert_eq!(
            RegisterArgs::default().resolve(root, data_dir),
            PathBuf::from("/data/genstorage-addresses.json")
        );

        let request = SendArgs::default().resolve(root, data_dir, Address::repeat_byte(1));
        assert_eq!(request.input, PathBuf::from("/data/generate-assets3.json"));
        assert_eq!(request.position, Address::ZERO);
        assert!(!request.dry_run);
    }

    #[test]
    fn test_relative_paths_anchor_at_root() {
        let root = Path::new("/deploy");
        let data_dir = Path::new("/deploy/shutdown-data");

        let args = GenerateArgs {
            output: Some(PathBuf::from("snap.json")),
            ..Default::default()
        };
        assert_eq!(
            args.resolve(root, data_dir).output,
            PathBuf::from("/deploy/snap.json")
        );

        let args = DeployStorageArgs {
            input: Some(PathBuf::from("out/snap.json")),
            output: Some(PathBuf::from("/abs/addresses.json")),
        };
        let (input, output) = args.resolve(root, data_dir);
        assert_eq!(input, PathBuf::from("/deploy/out/snap.json"));
        assert_eq!(output, PathBuf::from("/abs/addresses.json"));

        let args = RegisterArgs {
            input: Some(PathBuf::from("addresses.json")),
        };
        assert_eq!(
            args.resolve(root, data_dir),
            PathBuf::from("/deploy/addresses.json")
        );

        let args = SendArgs {
            input: Some(PathBuf::from("snap.json")),
            ..Default::default()
        };
        assert_eq!(
            args.resolve(root, data_dir, Address::ZERO).input,
            PathBuf::from("/deploy/snap.json")
        );
    }

    #[test]
    fn test_signing_phases() {
        assert!(!Phase::Generate.signs(false));
        assert!(!Phase::Send.signs(true));
        assert!(Phase::Send.signs(false));
        assert!(Phase::DeployStorage.signs(true));
        assert!(Phase::Register.signs(false));
        assert!(Phase::Activate.signs(false));
    }

    #[test]
    fn test_phase_order_and_artifacts() {
        assert_eq!(
            Phase::ALL.map(Phase::name),
            ["gen", "deploy-storage", "register", "activate", "send"]
        );
        assert_eq!(Phase::Generate.output_artifact(), Some(GENERATE_OUTPUT));
        assert_eq!(Phase::Send.input_artifact(), Some(GENERATE_OUTPUT));
        assert_eq!(Phase::Activate.input_artifact(), None);
    }

    #[test]
    fn test_producer_of() {
        assert_eq!(
            Phase::DeployStorage.producer_of(Path::new("/d/generate-assets3.json")),
            Some(Phase::Generate)
        );
        assert_eq!(
            Phase::Register.producer_of(Path::new("/d/genstorage-addresses.json")),
            Some(Phase::DeployStorage)
        );
        assert_eq!(
            Phase::Register.producer_of(Path::new("/d/custom.json")),
            None
        );
    }
}
