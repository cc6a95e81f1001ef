use alloy_network::EthereumWallet;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// Error connecting to the RPC endpoint
    #[error("Connection error: {0}")]
    Connection(String),

    /// Error with private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// The endpoint serves a different chain than the deployment expects
    #[error("Chain id mismatch: expected {expected}, RPC reports {actual}")]
    ChainIdMismatch { expected: u64, actual: u64 },
}

/// Create a provider without signing capability.
pub fn create_provider(rpc_url: &str) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;

    Ok(ProviderBuilder::new().connect_http(url))
}

/// Create a provider with wallet signing capability from a private key.
pub fn create_wallet_provider(
    rpc_url: &str,
    private_key: &str,
) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;

    if private_key.trim().is_empty() {
        return Err(ClientError::InvalidPrivateKey(
            "no private key configured".to_string(),
        ));
    }

    let signer: PrivateKeySigner = private_key
        .trim()
        .parse()
        .map_err(|e| ClientError::InvalidPrivateKey(format!("{}", e)))?;

    let wallet = EthereumWallet::from(signer);

    let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

    Ok(provider)
}

/// Create a signing provider and make sure it talks to `expected_chain_id`.
///
/// Shutdown transactions cannot be undone, so a provider pointed at the wrong
/// network is rejected before anything is signed.
pub async fn connect_wallet(
    rpc_url: &str,
    private_key: &str,
    expected_chain_id: u64,
) -> Result<impl Provider + Clone, ClientError> {
    let provider = create_wallet_provider(rpc_url, private_key)?;

    let actual = provider
        .get_chain_id()
        .await
        .map_err(|e| ClientError::Connection(format!("{}", e)))?;
    ensure_chain_id(expected_chain_id, actual)?;

    info!(chain_id = actual, "Connected to L1");
    Ok(provider)
}

const fn ensure_chain_id(expected: u64, actual: u64) -> Result<(), ClientError> {
    if expected != actual {
        return Err(ClientError::ChainIdMismatch { expected, actual });
    }
    Ok(())
}
