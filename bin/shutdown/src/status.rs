//! Read-only report of a deployment's shutdown progress.

use crate::{
    artifact,
    context::{ContextOptions, DeploymentContext},
    operator::{Overrides, Setup},
    phase::{GENERATE_OUTPUT, STORAGE_ADDRESSES},
    ui,
};
use chrono::{DateTime, SecondsFormat, Utc};
use state::{LastCommand, StateStore};
use std::{
    fmt::Write,
    path::{Path, PathBuf},
};
use tracing::warn;

const NEVER: &str = "(never)";

/// A phase artifact and whether it is on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStatus {
    pub label: &'static str,
    pub path: PathBuf,
    pub modified_at: Option<DateTime<Utc>>,
}

impl ArtifactStatus {
    fn probe(label: &'static str, path: PathBuf) -> Self {
        let modified_at = artifact::modified_at(&path);
        Self {
            label,
            path,
            modified_at,
        }
    }

    pub const fn exists(&self) -> bool {
        self.modified_at.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct StatusReport {
    pub deployment_root: PathBuf,
    pub sdk_root: PathBuf,
    pub l1_chain_id: u64,
    pub l2_chain_id: u64,
    pub network: String,
    pub deployments_path: PathBuf,
    pub data_dir: PathBuf,
    pub state_file: PathBuf,
    pub log_file: PathBuf,
    pub last_command: Option<LastCommand>,
    /// Completion time of every tracked command, in phase order
    pub completed: Vec<(LastCommand, Option<DateTime<Utc>>)>,
    pub artifacts: Vec<ArtifactStatus>,
}

impl StatusReport {
    pub fn from_context(ctx: &DeploymentContext) -> Self {
        let data_dir = ctx.data_dir();
        let snapshot = ctx
            .state
            .last_snapshot_path
            .as_ref()
            .map(|path| ctx.root.join(path))
            .unwrap_or_else(|| data_dir.join(GENERATE_OUTPUT));

        let completed = [
            LastCommand::Gen,
            LastCommand::DeployStorage,
            LastCommand::Register,
            LastCommand::Activate,
            LastCommand::DryRun,
            LastCommand::Send,
        ]
        .into_iter()
        .map(|command| (command, ctx.state.completed_at(command)))
        .collect();

        Self {
            deployment_root: ctx.root.clone(),
            sdk_root: ctx.sdk_root().to_path_buf(),
            l1_chain_id: ctx.derived.chain_id,
            l2_chain_id: ctx.derived.l2_chain_id,
            network: ctx.config.network().to_string(),
            deployments_path: ctx.derived.deployments_path.clone(),
            state_file: ctx.state_location().to_path_buf(),
            log_file: ctx.log_path().to_path_buf(),
            last_command: ctx.state.last_command,
            completed,
            artifacts: vec![
                ArtifactStatus::probe("snapshot", snapshot),
                ArtifactStatus::probe("storage addresses", data_dir.join(STORAGE_ADDRESSES)),
            ],
            data_dir,
        }
    }

    /// Completion time of `command`, if recorded.
    pub fn completed_at(&self, command: LastCommand) -> Option<DateTime<Utc>> {
        self.completed
            .iter()
            .find(|(c, _)| *c == command)
            .and_then(|(_, at)| *at)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Deployment:       {}", self.deployment_root.display());
        let _ = writeln!(out, "SDK root:         {}", self.sdk_root.display());
        let _ = writeln!(out, "L1 chain id:      {}", self.l1_chain_id);
        let _ = writeln!(out, "L2 chain id:      {}", self.l2_chain_id);
        let _ = writeln!(out, "Network:          {}", self.network);
        let _ = writeln!(out, "Deployments path: {}", self.deployments_path.display());
        let _ = writeln!(out, "Data dir:         {}", self.data_dir.display());
        let _ = writeln!(out, "State file:       {}", self.state_file.display());
        let _ = writeln!(out, "Log file:         {}", self.log_file.display());
        let _ = writeln!(
            out,
            "Last command:     {}",
            self.last_command.map_or(NEVER, LastCommand::as_str)
        );

        out.push_str("\nProgress:\n");
        for (command, at) in &self.completed {
            let _ = writeln!(out, "  {:<16}{}", command.as_str(), render_time(*at));
        }

        out.push_str("\nArtifacts:\n");
        for artifact in &self.artifacts {
            let state = match artifact.modified_at {
                Some(at) => format!("present, modified {}", render_time(Some(at))),
                None => "missing".to_string(),
            };
            let _ = writeln!(
                out,
                "  {:<18}{} ({})",
                artifact.label,
                artifact.path.display(),
                state
            );
        }
        out
    }
}

fn render_time(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => NEVER.to_string(),
    }
}

#[derive(Debug)]
pub enum StatusOutcome {
    /// The deployment could not be resolved; nothing to report
    NoDeployment { reason: String },
    Report(Box<StatusReport>),
}

/// Report the shutdown progress of the deployment in `options`.
///
/// Never fails: a deployment that cannot be resolved is reported as a
/// warning.
pub fn status(options: &ContextOptions, store: Box<dyn StateStore>) -> StatusOutcome {
    match DeploymentContext::build(options, store) {
        Ok(ctx) => {
            let report = StatusReport::from_context(&ctx);
            print!("{}", report.render());
            StatusOutcome::Report(Box::new(report))
        }
        Err(e) => no_deployment(e.to_string()),
    }
}

/// Report the shutdown progress of the deployment rooted at `deployment_root`.
///
/// Unlike the phases, a broken operator file or an unknown state location is
/// reported as a warning too.
pub fn status_in(deployment_root: &Path, overrides: Overrides) -> StatusOutcome {
    match Setup::load(deployment_root, overrides) {
        Ok(setup) => status(&setup.options, Box::new(setup.store)),
        Err(e) => no_deployment(format!("{e:#}")),
    }
}

fn no_deployment(reason: String) -> StatusOutcome {
    warn!(error = %reason, "No active deployment");
    ui::warning(&format!("no active deployment: {}", reason));
    StatusOutcome::NoDeployment { reason }
}
