//! Running several phases in one invocation.

use crate::{
    artifact,
    context::DeploymentContext,
    error::ShutdownError,
    phase::{self, DeployStorageArgs, GenerateArgs, Phase, RegisterArgs, SendArgs},
    ui::Step,
};
use action::{ChainClient, Invocation, ScriptRunner};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default monolithic shutdown script, relative to the SDK root.
pub const SCRIPT_RELATIVE_PATH: &str = "scripts/force-withdraw.sh";

/// Phases picked on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseSelection {
    pub generate: bool,
    pub deploy_storage: bool,
    pub register: bool,
    pub activate: bool,
    pub send: bool,
}

impl PhaseSelection {
    const fn includes(&self, phase: Phase) -> bool {
        match phase {
            Phase::Generate => self.generate,
            Phase::DeployStorage => self.deploy_storage,
            Phase::Register => self.register,
            Phase::Activate => self.activate,
            Phase::Send => self.send,
        }
    }

    const fn is_empty(&self) -> bool {
        !(self.generate || self.deploy_storage || self.register || self.activate || self.send)
    }

    /// Selected phases in canonical order; every phase when none is selected.
    pub fn phases(&self) -> Vec<Phase> {
        if self.is_empty() {
            return Phase::ALL.to_vec();
        }
        Phase::ALL
            .into_iter()
            .filter(|phase| self.includes(*phase))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub selection: PhaseSelection,
    pub generate: GenerateArgs,
    pub send: SendArgs,
}

impl RunArgs {
    /// Whether any selected phase signs L1 transactions.
    pub fn signs(&self) -> bool {
        self.selection
            .phases()
            .into_iter()
            .any(|phase| phase.signs(self.send.dry_run))
    }
}

/// Run the selected phases in order, stopping at the first failure.
///
/// Artifacts written by one phase become the inputs of the phases that
/// consume them later in the same run. Returns the phases that completed.
pub async fn run<C: ChainClient>(
    ctx: &mut DeploymentContext,
    client: &C,
    args: &RunArgs,
) -> Result<Vec<Phase>, ShutdownError> {
    let phases = args.selection.phases();
    info!(
        phases = ?phases.iter().map(|p| p.name()).collect::<Vec<_>>(),
        "Starting shutdown run"
    );

    let mut snapshot: Option<PathBuf> = args.generate.output.clone();
    let mut storage_addresses: Option<PathBuf> = None;
    let mut completed = Vec::with_capacity(phases.len());

    for current in phases {
        let result = match current {
            Phase::Generate => phase::generate(ctx, client, &args.generate)
                .await
                .map(|output| snapshot = Some(output)),
            Phase::DeployStorage => {
                let deploy = DeployStorageArgs {
                    input: snapshot.clone(),
                    output: None,
                };
                phase::deploy_storage(ctx, client, &deploy)
                    .await
                    .map(|output| storage_addresses = Some(output))
            }
            Phase::Register => {
                let register = RegisterArgs {
                    input: storage_addresses.clone(),
                };
                phase::register(ctx, client, &register).await
            }
            Phase::Activate => phase::activate(ctx, client).await,
            Phase::Send => {
                let send = SendArgs {
                    input: args.send.input.clone().or_else(|| snapshot.clone()),
                    ..args.send.clone()
                };
                phase::send(ctx, client, &send).await
            }
        };

        if let Err(e) = result {
            warn!(
                phase = %current,
                completed = ?completed.iter().map(|p: &Phase| p.name()).collect::<Vec<_>>(),
                "Shutdown run aborted"
            );
            return Err(e);
        }
        completed.push(current);
    }

    info!("Shutdown run finished");
    Ok(completed)
}

/// Delegate the whole shutdown to the SDK's monolithic script.
///
/// The script receives the deployment settings in its environment and the
/// network name as its only argument. The state record is left untouched.
pub async fn run_script<R: ScriptRunner>(
    ctx: &DeploymentContext,
    runner: &R,
    script: Option<&Path>,
) -> Result<(), ShutdownError> {
    let default = ctx.sdk_root().join(SCRIPT_RELATIVE_PATH);
    let script = match script {
        Some(path) => artifact::resolve(&ctx.root.join(path), &[])?,
        None => artifact::resolve(&default, &[])?,
    };

    let network = ctx.config.network().as_str();
    let invocation = Invocation::new(&script)
        .arg(network)
        .env("L1_RPC_URL", &ctx.config.l1_rpc_url)
        .env("L2_RPC_URL", &ctx.config.l2_rpc_url)
        .env("PRIVATE_KEY", &ctx.config.admin_private_key)
        .env("NETWORK", network)
        .current_dir(ctx.sdk_root());

    let step = Step::start("run", "Running shutdown script");
    let result = runner
        .run(&invocation)
        .await
        .map_err(|reason| ShutdownError::ScriptFailed {
            script: script.clone(),
            reason,
        });
    step.finish(result)
}
