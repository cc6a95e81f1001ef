//! Locating phase artifacts and the deployment contracts file.

use crate::error::ShutdownError;
use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Contract name of the L1 bridge proxy in the deployment contracts file.
pub const BRIDGE_PROXY: &str = "L1StandardBridgeProxy";

/// Return the first existing path: `primary`, then `extras` in order.
pub fn resolve(primary: &Path, extras: &[PathBuf]) -> Result<PathBuf, ShutdownError> {
    if primary.exists() {
        return Ok(primary.to_path_buf());
    }

    if let Some(found) = extras.iter().find(|path| path.exists()) {
        return Ok(found.clone());
    }

    let mut candidates = Vec::with_capacity(extras.len() + 1);
    candidates.push(primary.to_path_buf());
    candidates.extend(extras.iter().cloned());
    Err(ShutdownError::ArtifactNotFound { candidates })
}

/// File name of the contracts deployed on `l1_chain_id`.
pub fn contracts_file_name(l1_chain_id: u64) -> String {
    format!("{l1_chain_id}-deploy.json")
}

/// Where the deployment contracts file may live: the SDK deployments
/// directory first, then two locations inside the deployment root.
pub fn contracts_candidates(
    deployment_root: &Path,
    deployments_path: &Path,
    l1_chain_id: u64,
) -> (PathBuf, Vec<PathBuf>) {
    let file_name = contracts_file_name(l1_chain_id);
    (
        deployments_path.join(&file_name),
        vec![
            deployment_root.join("deployments").join(&file_name),
            deployment_root.join(&file_name),
        ],
    )
}

/// Logical contract name to L1 address, as written by the contract deployment.
#[derive(Debug, Clone)]
pub struct DeploymentContracts {
    path: PathBuf,
    contracts: BTreeMap<String, serde_json::Value>,
}

impl DeploymentContracts {
    pub fn from_file(path: &Path) -> Result<Self, ShutdownError> {
        let unreadable = |reason: String| ShutdownError::ContractsUnreadable {
            path: path.to_path_buf(),
            reason,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| unreadable(e.to_string()))?;
        let contracts = serde_json::from_str(&contents).map_err(|e| unreadable(e.to_string()))?;

        Ok(Self {
            path: path.to_path_buf(),
            contracts,
        })
    }

    /// Non-zero address of contract `name`.
    pub fn address(&self, name: &'static str) -> Result<Address, ShutdownError> {
        self.contracts
            .get(name)
            .and_then(|value| value.as_str())
            .and_then(|value| value.parse::<Address>().ok())
            .filter(|address| *address != Address::ZERO)
            .ok_or_else(|| ShutdownError::ContractMissing {
                name,
                path: self.path.clone(),
            })
    }

    pub fn bridge_proxy(&self) -> Result<Address, ShutdownError> {
        self.address(BRIDGE_PROXY)
    }
}

/// Modification time of `path`, if it exists.
pub fn modified_at(path: &Path) -> Option<DateTime<Utc>> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_wins() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("primary.json");
        let extra = dir.path().join("extra.json");
        std::fs::write(&primary, "{}").unwrap();
        std::fs::write(&extra, "{}").unwrap();

        assert_eq!(resolve(&primary, &[extra]).unwrap(), primary);
    }

    #[test]
    fn test_first_existing_extra() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("primary.json");
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");
        std::fs::write(&first, "{}").unwrap();
        std::fs::write(&second, "{}").unwrap();

        let found = resolve(&primary, &[dir.path().join("missing.json"), first.clone(), second])
            .unwrap();
        assert_eq!(found, first);
    }

    #[test]
    fn test_nothing_exists() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("primary.json");
        let extra = dir.path().join("extra.json");

        match resolve(&primary, &[extra.clone()]) {
            Err(ShutdownError::ArtifactNotFound { candidates }) => {
                assert_eq!(candidates, vec![primary, extra]);
            }
            other => panic!("expected ArtifactNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_contracts_candidates() {
        let (primary, extras) = contracts_candidates(
            Path::new("/deploy"),
            Path::new("/sdk/deployments"),
            11155111,
        );
        assert_eq!(primary, PathBuf::from("/sdk/deployments/11155111-deploy.json"));
        assert_eq!(
            extras,
            vec![
                PathBuf::from("/deploy/deployments/11155111-deploy.json"),
                PathBuf::from("/deploy/11155111-deploy.json"),
            ]
        );
    }

    #[test]
    fn test_bridge_proxy_address() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1-deploy.json");
        std::fs::write(
            &path,
            r#"{
                "L1StandardBridgeProxy": "0x0909090909090909090909090909090909090909",
                "SystemConfigProxy": "0x0808080808080808080808080808080808080808",
                "L2OutputOracleStartingBlockNumber": 42
            }"#,
        )
        .unwrap();

        let contracts = DeploymentContracts::from_file(&path).unwrap();
        assert_eq!(contracts.bridge_proxy().unwrap(), Address::repeat_byte(9));
        assert!(matches!(
            contracts.address("OptimismPortalProxy"),
            Err(ShutdownError::ContractMissing { .. })
        ));
    }

    #[test]
    fn test_zero_bridge_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1-deploy.json");
        std::fs::write(
            &path,
            r#"{ "L1StandardBridgeProxy": "0x0000000000000000000000000000000000000000" }"#,
        )
        .unwrap();

        let contracts = DeploymentContracts::from_file(&path).unwrap();
        assert!(contracts.bridge_proxy().is_err());
    }

    #[test]
    fn test_modified_at() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        assert!(modified_at(&path).is_none());

        std::fs::write(&path, "{}").unwrap();
        assert!(modified_at(&path).is_some());
    }
}
