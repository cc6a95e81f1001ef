//! L1StandardBridge force-withdrawal extension.
//!
//! Once the rollup is decommissioned, the bridge holds a registry of storage
//! contracts (each one a slice of the position snapshot) and a global switch
//! that routes claims through the force-withdrawal path.

use alloy_sol_types::sol;

sol! {
    /// Force-withdrawal surface of the L1StandardBridge proxy.
    #[sol(rpc)]
    interface IL1ForceWithdrawBridge {
        /// Emitted when the force-withdrawal switch changes
        event ForceActivated(bool state);

        /// Emitted when storage contracts are registered
        event ForceRegistered(address[] position);

        /// Whether force withdrawal is active
        function active() external view returns (bool);

        /// Whether a storage contract is registered as a claim source
        function position(address _position) external view returns (bool);

        /// Flip the force-withdrawal switch (owner only)
        function forceActive(bool _state) external;

        /// Register snapshot storage contracts as claim sources (owner only)
        function forceRegistry(address[] calldata _position) external;
    }
}
