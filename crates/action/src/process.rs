//! External process execution.
//!
//! The force-withdrawal tool and the monolithic shutdown script both run as
//! child processes. Their output goes straight to the operator's terminal.

use eyre::bail;
use std::{future::Future, path::PathBuf};
use tracing::{debug, info};

/// A program to run with its arguments and environment.
///
/// Environment values may hold key material and are never logged.
#[derive(Clone, Default)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Value of an environment variable set on this invocation.
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.envs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Program and arguments, for logs.
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Runs external programs to completion.
pub trait ScriptRunner: Send + Sync {
    /// Run `invocation` and wait for it. A non-zero exit is an error.
    fn run(&self, invocation: &Invocation) -> impl Future<Output = eyre::Result<()>> + Send;
}

/// [`ScriptRunner`] spawning real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ScriptRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> eyre::Result<()> {
        let mut command = tokio::process::Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(invocation.envs.iter().map(|(k, v)| (k, v)));
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }

        info!(command = %invocation.command_line(), "Running external command");

        let status = command.status().await.map_err(|e| {
            eyre::eyre!(
                "failed to start {}: {}",
                invocation.program.display(),
                e
            )
        })?;

        if !status.success() {
            bail!("{} exited with {}", invocation.program.display(), status);
        }

        debug!(command = %invocation.command_line(), "External command finished");
        Ok(())
    }
}
