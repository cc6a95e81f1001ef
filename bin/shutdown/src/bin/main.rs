//! CLI for shutting down a rollup bridge by force withdrawal.
//!
//! Run from the deployment root. Each phase is its own subcommand:
//! - `gen`: snapshot bridge positions
//! - `deploy-storage`: deploy the snapshot to L1 storage contracts
//! - `register`: register the storage contracts with the bridge
//! - `activate`: turn on force withdrawal (irreversible)
//! - `dry-run` / `send`: estimate or submit the claims
//!
//! `run` chains the phases, `status` reports progress.

use action::{ChainClient, ForceWithdrawClient, ForceWithdrawTool, ProcessRunner};
use alloy_primitives::Address;
use clap::{Args, Parser, Subcommand};
use shutdown::{
    driver::{self, PhaseSelection, RunArgs},
    logging,
    operator::{OperatorConfig, Overrides, Setup},
    phase::{self, DeployStorageArgs, GenerateArgs, RegisterArgs, SendArgs},
    status, DeploymentContext, Phase,
};
use state::StateScope;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "trh-shutdown")]
#[command(about = "Force-withdrawal shutdown of a rollup bridge")]
struct Cli {
    /// Operator settings file (default: shutdown.toml in the current directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SDK root, skipping the automatic lookup
    #[arg(long, env = "THANOS_ROOT", global = true)]
    sdk_root: Option<PathBuf>,

    /// Directory for generated artifacts; remembered for later runs
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Where progress is kept: global or deployment
    #[arg(long, value_parser = parse_scope, global = true)]
    state_scope: Option<StateScope>,

    /// Signing key, overriding the one in settings.json (hex, with or without 0x prefix)
    #[arg(short = 'k', long, env = "PRIVATE_KEY", hide_env_values = true, global = true)]
    private_key: Option<String>,

    /// Force-withdrawal tool binary
    #[arg(long, env = "FORCE_WITHDRAW_BIN", global = true)]
    force_withdraw_bin: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show shutdown progress of the deployment
    Status,

    /// Snapshot bridge positions over an L2 block range
    Gen(GenCmd),

    /// Deploy the snapshot to L1 storage contracts
    DeployStorage {
        /// Snapshot to deploy
        #[arg(long)]
        input: Option<PathBuf>,

        /// Where the storage contract addresses are written
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Register the storage contracts with the bridge
    Register {
        /// Storage contract addresses
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Activate force withdrawal on the bridge (cannot be undone)
    Activate,

    /// Estimate gas of the force-withdrawal claims without sending
    DryRun(SendCmd),

    /// Send the force-withdrawal claims
    Send(SendCmd),

    /// Run all phases, or the selected ones, in order
    Run(RunCmd),
}

#[derive(Args)]
struct GenCmd {
    /// First L2 block
    #[arg(long)]
    l2_start: Option<String>,

    /// Last L2 block
    #[arg(long)]
    l2_end: Option<String>,

    /// Snapshot output file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Skip verifying balances against L2 state
    #[arg(long)]
    skip_verify: bool,
}

impl GenCmd {
    fn into_args(self) -> GenerateArgs {
        GenerateArgs {
            l2_start: self.l2_start,
            l2_end: self.l2_end,
            output: self.output,
            skip_verify: self.skip_verify,
        }
    }
}

#[derive(Args)]
struct SendCmd {
    /// Snapshot produced by gen
    #[arg(long)]
    input: Option<PathBuf>,

    /// Settle a single storage contract instead of all
    #[arg(long)]
    position: Option<String>,
}

impl SendCmd {
    fn into_args(self, dry_run: bool) -> eyre::Result<SendArgs> {
        Ok(SendArgs {
            input: self.input,
            position: parse_position(self.position.as_deref())?,
            dry_run,
        })
    }
}

#[derive(Args)]
struct RunCmd {
    /// Run gen
    #[arg(long = "gen")]
    generate: bool,

    /// Run deploy-storage
    #[arg(long)]
    deploy_storage: bool,

    /// Run register
    #[arg(long)]
    register: bool,

    /// Run activate
    #[arg(long)]
    activate: bool,

    /// Run send
    #[arg(long)]
    send: bool,

    /// Only estimate gas in the send phase
    #[arg(long)]
    dry_run: bool,

    /// Hand the whole shutdown to the SDK's shutdown script instead
    #[arg(long)]
    use_script: bool,

    /// Shutdown script (default: scripts/force-withdraw.sh in the SDK root)
    #[arg(long, requires = "use_script")]
    script: Option<PathBuf>,

    #[command(flatten)]
    snapshot: GenCmd,

    /// Settle a single storage contract instead of all
    #[arg(long)]
    position: Option<String>,
}

impl RunCmd {
    fn into_args(self) -> eyre::Result<RunArgs> {
        Ok(RunArgs {
            selection: PhaseSelection {
                generate: self.generate,
                deploy_storage: self.deploy_storage,
                register: self.register,
                activate: self.activate,
                send: self.send,
            },
            send: SendArgs {
                input: None,
                position: parse_position(self.position.as_deref())?,
                dry_run: self.dry_run,
            },
            generate: self.snapshot.into_args(),
        })
    }
}

fn parse_scope(value: &str) -> Result<StateScope, String> {
    StateScope::parse(value).ok_or_else(|| format!("unknown state scope '{value}'"))
}

fn parse_position(value: Option<&str>) -> eyre::Result<Option<Address>> {
    value
        .map(|v| {
            v.parse::<Address>()
                .map_err(|e| eyre::eyre!("invalid position address '{}': {}", v, e))
        })
        .transpose()
}

/// Phase work resolved from the command line.
enum Job {
    Gen(GenerateArgs),
    DeployStorage(DeployStorageArgs),
    Register(RegisterArgs),
    Activate,
    Send(SendArgs),
    Run(RunArgs),
}

impl Job {
    fn signs(&self) -> bool {
        match self {
            Self::Gen(_) => Phase::Generate.signs(false),
            Self::DeployStorage(_) => Phase::DeployStorage.signs(false),
            Self::Register(_) => Phase::Register.signs(false),
            Self::Activate => Phase::Activate.signs(false),
            Self::Send(args) => Phase::Send.signs(args.dry_run),
            Self::Run(args) => args.signs(),
        }
    }

    async fn execute<C: ChainClient>(
        self,
        ctx: &mut DeploymentContext,
        chain: &C,
    ) -> eyre::Result<()> {
        match self {
            Self::Gen(args) => {
                let output = phase::generate(ctx, chain, &args).await?;
                info!(output = %output.display(), "Snapshot written");
            }
            Self::DeployStorage(args) => {
                let output = phase::deploy_storage(ctx, chain, &args).await?;
                info!(output = %output.display(), "Storage addresses written");
            }
            Self::Register(args) => phase::register(ctx, chain, &args).await?,
            Self::Activate => phase::activate(ctx, chain).await?,
            Self::Send(args) => phase::send(ctx, chain, &args).await?,
            Self::Run(args) => {
                let completed = driver::run(ctx, chain, &args).await?;
                info!(phases = completed.len(), "All selected phases completed");
            }
        }
        Ok(())
    }
}

/// Build the deployment context, applying a signing key given on the
/// command line.
fn open(
    root: &Path,
    overrides: Overrides,
    private_key: Option<String>,
) -> eyre::Result<(DeploymentContext, OperatorConfig)> {
    let setup = Setup::load(root, overrides)?;
    let mut ctx = DeploymentContext::build(&setup.options, Box::new(setup.store))?;
    if let Some(key) = private_key {
        ctx.config.admin_private_key = key;
    }
    Ok((ctx, setup.operator))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    logging::init();

    let cli = Cli::parse();
    let root = std::env::current_dir()?;
    let overrides = Overrides {
        config: cli.config,
        sdk_root: cli.sdk_root,
        data_dir: cli.data_dir,
        state_scope: cli.state_scope,
    };

    let job = match cli.command {
        Command::Status => {
            status::status_in(&root, overrides);
            return Ok(());
        }
        Command::Run(run) if run.use_script => {
            let (ctx, operator) = open(&root, overrides, cli.private_key)?;
            let script = run.script.or(operator.script);
            driver::run_script(&ctx, &ProcessRunner, script.as_deref()).await?;
            return Ok(());
        }
        Command::Gen(cmd) => Job::Gen(cmd.into_args()),
        Command::DeployStorage { input, output } => {
            Job::DeployStorage(DeployStorageArgs { input, output })
        }
        Command::Register { input } => Job::Register(RegisterArgs { input }),
        Command::Activate => Job::Activate,
        Command::DryRun(send) => Job::Send(send.into_args(true)?),
        Command::Send(send) => Job::Send(send.into_args(false)?),
        Command::Run(run) => Job::Run(run.into_args()?),
    };

    let (mut ctx, operator) = open(&root, overrides, cli.private_key)?;

    let mut tool = ForceWithdrawTool::new(
        ctx.sdk_root(),
        &ctx.config.l1_rpc_url,
        &ctx.config.l2_rpc_url,
        &ctx.config.admin_private_key,
    );
    if let Some(bin) = cli.force_withdraw_bin.or(operator.force_withdraw_bin) {
        tool = tool.with_program(root.join(bin));
    }

    // Snapshot work needs neither the key nor a reachable L1 signer.
    if job.signs() {
        let provider = client::connect_wallet(
            &ctx.config.l1_rpc_url,
            &ctx.config.admin_private_key,
            ctx.derived.chain_id,
        )
        .await?;
        job.execute(&mut ctx, &ForceWithdrawClient::new(provider, tool))
            .await
    } else {
        let provider = client::create_provider(&ctx.config.l1_rpc_url)?;
        job.execute(&mut ctx, &ForceWithdrawClient::new(provider, tool))
            .await
    }
}
