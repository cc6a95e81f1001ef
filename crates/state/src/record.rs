//! The shutdown progress record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf};

/// Most recently completed shutdown command, for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LastCommand {
    Gen,
    DeployStorage,
    Register,
    Activate,
    DryRun,
    Send,
}

impl LastCommand {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gen => "gen",
            Self::DeployStorage => "deploy-storage",
            Self::Register => "register",
            Self::Activate => "activate",
            Self::DryRun => "dry-run",
            Self::Send => "send",
        }
    }
}

impl fmt::Display for LastCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress markers of a shutdown, persisted across invocations.
///
/// Markers only ever move forward: recording a command sets its timestamp and
/// `last_command`, nothing clears a timestamp. Chain ids and SDK paths are not
/// part of the record; they are re-derived from the deployment on every run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShutdownState {
    /// Working directory for generated artifacts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_gen_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_deploy_storage_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_register_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activate_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_dry_run_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_send_at: Option<DateTime<Utc>>,

    /// Output of the most recent successful generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_snapshot_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_command: Option<LastCommand>,
}

impl ShutdownState {
    /// Record a successful command at `at`.
    pub fn record(&mut self, command: LastCommand, at: DateTime<Utc>) {
        let slot = match command {
            LastCommand::Gen => &mut self.last_gen_at,
            LastCommand::DeployStorage => &mut self.last_deploy_storage_at,
            LastCommand::Register => &mut self.last_register_at,
            LastCommand::Activate => &mut self.last_activate_at,
            LastCommand::DryRun => &mut self.last_dry_run_at,
            LastCommand::Send => &mut self.last_send_at,
        };
        *slot = Some(at);
        self.last_command = Some(command);
    }

    /// Record a successful generate that wrote `snapshot`.
    pub fn record_generate(&mut self, snapshot: PathBuf, at: DateTime<Utc>) {
        self.record(LastCommand::Gen, at);
        self.last_snapshot_path = Some(snapshot);
    }

    /// Timestamp of the last success of `command`, if any.
    pub const fn completed_at(&self, command: LastCommand) -> Option<DateTime<Utc>> {
        match command {
            LastCommand::Gen => self.last_gen_at,
            LastCommand::DeployStorage => self.last_deploy_storage_at,
            LastCommand::Register => self.last_register_at,
            LastCommand::Activate => self.last_activate_at,
            LastCommand::DryRun => self.last_dry_run_at,
            LastCommand::Send => self.last_send_at,
        }
    }
}
