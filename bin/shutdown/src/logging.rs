//! Logging setup.
//!
//! The process-wide subscriber writes human-readable events to stdout. Once a
//! deployment is resolved, a deployment-scoped subscriber additionally writes
//! JSON events to a log file named after the deployment, for later audit.

use std::{
    fs::OpenOptions,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

/// Directory inside the deployment root holding shutdown logs.
pub const LOG_DIR: &str = "logs";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the process-wide stdout subscriber.
pub fn init() {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();
}

/// Log file name for a deployment: `shutdown_<deployment root>_<l2 chain id>.log`.
pub fn log_file_name(deployment_root: &Path, l2_chain_id: u64) -> String {
    let root: String = deployment_root
        .display()
        .to_string()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("shutdown_{}_{}.log", root.trim_matches('_'), l2_chain_id)
}

/// Deployment-scoped logger. Events go to stdout and to the log file until
/// it is dropped.
pub struct DeploymentLogger {
    path: PathBuf,
    _guard: DefaultGuard,
}

impl DeploymentLogger {
    pub fn init(deployment_root: &Path, l2_chain_id: u64) -> io::Result<Self> {
        let dir = deployment_root.join(LOG_DIR);
        std::fs::create_dir_all(&dir)?;

        let path = dir.join(log_file_name(deployment_root, l2_chain_id));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        let subscriber = tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt::layer())
            .with(fmt::layer().json().with_writer(Mutex::new(file)));

        let guard = tracing::subscriber::set_default(subscriber);

        Ok(Self {
            path,
            _guard: guard,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
