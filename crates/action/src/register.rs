//! Register snapshot storage contracts with the bridge.

use crate::Outcome;
use alloy_primitives::Address;
use alloy_provider::Provider;
use binding::bridge::IL1ForceWithdrawBridge;
use serde::Deserialize;
use std::{collections::BTreeMap, path::Path};
use tracing::info;

/// Storage-addresses artifact written by the storage deployment.
///
/// Either a JSON array of addresses or an object mapping a label to an
/// address. Object entries are taken in key order.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StorageAddresses {
    List(Vec<Address>),
    Named(BTreeMap<String, Address>),
}

impl StorageAddresses {
    pub fn from_file(path: &Path) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("failed to read {}: {}", path.display(), e))?;
        let addresses = serde_json::from_str(&contents).map_err(|e| {
            eyre::eyre!("{} is not a storage address list: {}", path.display(), e)
        })?;
        Ok(addresses)
    }

    pub fn into_addresses(self) -> Vec<Address> {
        match self {
            Self::List(addresses) => addresses,
            Self::Named(map) => map.into_values().collect(),
        }
    }
}

/// Input for a register action.
#[derive(Debug, Clone)]
pub struct Register {
    /// L1 bridge proxy
    pub bridge: Address,
    /// Storage contracts to register
    pub positions: Vec<Address>,
}

impl Register {
    pub fn from_file(bridge: Address, path: &Path) -> eyre::Result<Self> {
        Ok(Self {
            bridge,
            positions: StorageAddresses::from_file(path)?.into_addresses(),
        })
    }
}

/// Registers storage contracts with the bridge, skipping ones already known.
pub struct RegisterAction<P> {
    provider: P,
    register: Register,
}

impl<P> RegisterAction<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, register: Register) -> Self {
        Self { provider, register }
    }

    fn validate(&self) -> eyre::Result<()> {
        if self.register.bridge == Address::ZERO {
            eyre::bail!("Bridge must not be zero");
        }

        if self.register.positions.is_empty() {
            eyre::bail!("No storage contracts to register");
        }

        if self.register.positions.contains(&Address::ZERO) {
            eyre::bail!("Storage contract address must not be zero");
        }

        Ok(())
    }

    /// Storage contracts the bridge does not know yet.
    pub async fn pending_positions(&self) -> eyre::Result<Vec<Address>> {
        let contract = IL1ForceWithdrawBridge::new(self.register.bridge, &self.provider);

        let mut pending = Vec::new();
        for position in &self.register.positions {
            if !contract.position(*position).call().await? {
                pending.push(*position);
            }
        }
        Ok(pending)
    }

    pub async fn execute(&self) -> eyre::Result<Outcome> {
        self.validate()?;

        let pending = self.pending_positions().await?;
        if pending.is_empty() {
            info!(
                bridge = %self.register.bridge,
                count = self.register.positions.len(),
                "All storage contracts already registered"
            );
            return Ok(Outcome::offchain());
        }

        let contract = IL1ForceWithdrawBridge::new(self.register.bridge, &self.provider);
        let tx = contract.forceRegistry(pending.clone()).send().await?;

        let tx_hash = *tx.tx_hash();
        let receipt = tx.get_receipt().await?;
        if !receipt.status() {
            eyre::bail!("Transaction {} reverted", tx_hash);
        }

        info!(
            tx_hash = %tx_hash,
            block_number = receipt.block_number,
            gas_used = receipt.gas_used,
            registered = pending.len(),
            "Storage contracts registered."
        );

        Ok(Outcome {
            tx_hash: Some(tx_hash),
            block_number: receipt.block_number,
            gas_used: Some(receipt.gas_used),
        })
    }

    pub fn description(&self) -> String {
        format!(
            "Register {} storage contracts with bridge {}",
            self.register.positions.len(),
            self.register.bridge
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockProvider;

    #[test]
    fn test_parse_address_list() {
        let json = r#"["0x0101010101010101010101010101010101010101",
                       "0x0202020202020202020202020202020202020202"]"#;
        let addresses: StorageAddresses = serde_json::from_str(json).unwrap();
        assert_eq!(
            addresses.into_addresses(),
            vec![Address::repeat_byte(1), Address::repeat_byte(2)]
        );
    }

    #[test]
    fn test_parse_named_addresses() {
        let json = r#"{
            "storage_2": "0x0202020202020202020202020202020202020202",
            "storage_1": "0x0101010101010101010101010101010101010101"
        }"#;
        let addresses: StorageAddresses = serde_json::from_str(json).unwrap();
        assert_eq!(
            addresses.into_addresses(),
            vec![Address::repeat_byte(1), Address::repeat_byte(2)]
        );
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = Register::from_file(
            Address::repeat_byte(9),
            &dir.path().join("genstorage-addresses.json"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_zero_bridge() {
        let register = Register {
            bridge: Address::ZERO,
            positions: vec![Address::repeat_byte(1)],
        };

        let action = RegisterAction::new(MockProvider, register);
        let result = action.validate();
        assert!(result.unwrap_err().to_string().contains("Bridge"));
    }

    #[test]
    fn test_validation_empty_positions() {
        let register = Register {
            bridge: Address::repeat_byte(9),
            positions: vec![],
        };

        let action = RegisterAction::new(MockProvider, register);
        let result = action.validate();
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("No storage contracts"));
    }

    #[test]
    fn test_validation_zero_position() {
        let register = Register {
            bridge: Address::repeat_byte(9),
            positions: vec![Address::repeat_byte(1), Address::ZERO],
        };

        let action = RegisterAction::new(MockProvider, register);
        assert!(action.validate().is_err());
    }

    #[tokio::test]
    async fn test_execute_fails_before_touching_chain() {
        let register = Register {
            bridge: Address::ZERO,
            positions: vec![Address::repeat_byte(1)],
        };

        // MockProvider panics if used; validation must reject first.
        let action = RegisterAction::new(MockProvider, register);
        assert!(action.execute().await.is_err());
    }

    #[test]
    fn test_description() {
        let register = Register {
            bridge: Address::repeat_byte(9),
            positions: vec![Address::repeat_byte(1), Address::repeat_byte(2)],
        };

        let action = RegisterAction::new(MockProvider, register);
        let desc = action.description();
        assert!(desc.contains("Register 2 storage contracts"));
        assert!(desc.contains("0x0909090909090909090909090909090909090909"));
    }
}
