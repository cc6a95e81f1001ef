//! Locating the SDK checkout next to a deployment.

use crate::error::ShutdownError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable that points at the SDK root explicitly.
pub const SDK_ROOT_ENV: &str = "THANOS_ROOT";

/// File that identifies a directory as the SDK root.
pub const SDK_MARKER: &str = "packages/tokamak/contracts-bedrock/foundry.toml";

/// Where the SDK is looked for, relative to the deployment root, in order.
pub const SDK_CANDIDATES: [&str; 3] = [
    "tokamak-thanos",
    "../tokamak-thanos",
    "../../tokamak-thanos",
];

/// Contract deployment outputs inside the SDK root.
pub const DEPLOYMENTS_DIR: &str = "packages/tokamak/contracts-bedrock/deployments";

/// Resolve the SDK root of a deployment.
///
/// An explicit `override_root` wins when it is an existing directory
/// (relative paths are taken from the deployment root). Otherwise the first
/// candidate containing [`SDK_MARKER`] is used.
pub fn resolve_sdk_root(
    deployment_root: &Path,
    override_root: Option<&Path>,
) -> Result<PathBuf, ShutdownError> {
    if let Some(root) = override_root {
        let root = deployment_root.join(root);
        if root.is_dir() {
            debug!(sdk_root = %root.display(), "Using SDK root override");
            return Ok(normalize(root));
        }
        return Err(ShutdownError::SdkNotFound {
            candidates: vec![root],
        });
    }

    let candidates: Vec<PathBuf> = SDK_CANDIDATES
        .iter()
        .map(|candidate| deployment_root.join(candidate))
        .collect();

    match candidates
        .iter()
        .find(|candidate| candidate.join(SDK_MARKER).is_file())
    {
        Some(found) => Ok(normalize(found.clone())),
        None => Err(ShutdownError::SdkNotFound { candidates }),
    }
}

/// Deployment outputs directory of an SDK root.
pub fn deployments_path(sdk_root: &Path) -> PathBuf {
    sdk_root.join(DEPLOYMENTS_DIR)
}

fn normalize(path: PathBuf) -> PathBuf {
    std::fs::canonicalize(&path).unwrap_or(path)
}
