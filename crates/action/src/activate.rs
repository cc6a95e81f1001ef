//! Flip the bridge's force-withdrawal switch.
//!
//! Once active, the bridge disables the normal deposit and withdrawal flows.

use crate::Outcome;
use alloy_primitives::Address;
use alloy_provider::Provider;
use binding::bridge::IL1ForceWithdrawBridge;
use tracing::info;

/// Input for an activate action.
#[derive(Debug, Clone, Copy)]
pub struct Activate {
    /// L1 bridge proxy
    pub bridge: Address,
    /// Requested switch state
    pub enable: bool,
}

pub struct ActivateAction<P> {
    provider: P,
    activate: Activate,
}

impl<P> ActivateAction<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, activate: Activate) -> Self {
        Self { provider, activate }
    }

    /// Whether the switch already has the requested state.
    pub async fn is_completed(&self) -> eyre::Result<bool> {
        let contract = IL1ForceWithdrawBridge::new(self.activate.bridge, &self.provider);
        let active = contract.active().call().await?;
        Ok(active == self.activate.enable)
    }

    pub async fn execute(&self) -> eyre::Result<Outcome> {
        if self.activate.bridge == Address::ZERO {
            eyre::bail!("Bridge must not be zero");
        }

        if self.is_completed().await? {
            info!(
                bridge = %self.activate.bridge,
                enable = self.activate.enable,
                "Force withdrawal switch already set"
            );
            return Ok(Outcome::offchain());
        }

        let contract = IL1ForceWithdrawBridge::new(self.activate.bridge, &self.provider);
        let tx = contract.forceActive(self.activate.enable).send().await?;

        let tx_hash = *tx.tx_hash();
        let receipt = tx.get_receipt().await?;
        if !receipt.status() {
            eyre::bail!("Transaction {} reverted", tx_hash);
        }

        info!(
            tx_hash = %tx_hash,
            block_number = receipt.block_number,
            gas_used = receipt.gas_used,
            enable = self.activate.enable,
            "Force withdrawal switch set."
        );

        Ok(Outcome {
            tx_hash: Some(tx_hash),
            block_number: receipt.block_number,
            gas_used: Some(receipt.gas_used),
        })
    }

    pub fn description(&self) -> String {
        let verb = if self.activate.enable {
            "Activate"
        } else {
            "Deactivate"
        };
        format!("{} force withdrawal on bridge {}", verb, self.activate.bridge)
    }
}
