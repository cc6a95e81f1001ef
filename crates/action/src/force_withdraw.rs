//! Production [`ChainClient`].

use crate::{
    activate::{Activate, ActivateAction},
    process::{ProcessRunner, ScriptRunner},
    register::{Register, RegisterAction},
    tool::ForceWithdrawTool,
    ChainClient, GenerateRequest, Outcome, SendRequest,
};
use alloy_primitives::Address;
use alloy_provider::Provider;
use std::path::Path;
use tracing::info;

/// Chain client for the shutdown phases.
///
/// Bridge calls (register, activate) go through the L1 wallet provider.
/// Snapshot work (generate, deploy-storage, send) runs the SDK's
/// force-withdrawal tool.
pub struct ForceWithdrawClient<P, R = ProcessRunner> {
    provider: P,
    tool: ForceWithdrawTool,
    runner: R,
}

impl<P> ForceWithdrawClient<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, tool: ForceWithdrawTool) -> Self {
        Self {
            provider,
            tool,
            runner: ProcessRunner,
        }
    }
}

impl<P, R> ForceWithdrawClient<P, R>
where
    P: Provider + Clone,
    R: ScriptRunner,
{
    pub const fn with_runner(provider: P, tool: ForceWithdrawTool, runner: R) -> Self {
        Self {
            provider,
            tool,
            runner,
        }
    }
}

impl<P, R> ChainClient for ForceWithdrawClient<P, R>
where
    P: Provider + Clone,
    R: ScriptRunner,
{
    async fn generate(&self, request: &GenerateRequest) -> eyre::Result<Outcome> {
        self.runner.run(&self.tool.generate(request)).await?;
        Ok(Outcome::offchain())
    }

    async fn deploy_storage(&self, input: &Path, output: &Path) -> eyre::Result<Outcome> {
        self.runner
            .run(&self.tool.deploy_storage(input, output))
            .await?;
        Ok(Outcome::offchain())
    }

    async fn register(&self, bridge: Address, input: &Path) -> eyre::Result<Outcome> {
        let register = Register::from_file(bridge, input)?;
        let action = RegisterAction::new(self.provider.clone(), register);
        info!("{}", action.description());
        action.execute().await
    }

    async fn activate(&self, bridge: Address, enable: bool) -> eyre::Result<Outcome> {
        let action = ActivateAction::new(self.provider.clone(), Activate { bridge, enable });
        info!("{}", action.description());
        action.execute().await
    }

    async fn send(&self, request: &SendRequest) -> eyre::Result<Outcome> {
        self.runner.run(&self.tool.send(request)).await?;
        Ok(Outcome::offchain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{process::Invocation, test_utils::MockProvider};
    use std::{path::PathBuf, sync::Mutex};

    #[derive(Default)]
    struct RecordingRunner {
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptRunner for RecordingRunner {
        async fn run(&self, invocation: &Invocation) -> eyre::Result<()> {
            self.calls.lock().unwrap().push(invocation.args.clone());
            Ok(())
        }
    }

    fn client() -> ForceWithdrawClient<MockProvider, RecordingRunner> {
        let tool = ForceWithdrawTool::new("/sdk", "http://l1", "http://l2", "0xkey");
        ForceWithdrawClient::with_runner(MockProvider, tool, RecordingRunner::default())
    }

    #[tokio::test]
    async fn test_tool_phases_use_runner() {
        let client = client();

        client
            .generate(&GenerateRequest {
                l2_start: "0".to_string(),
                l2_end: "latest".to_string(),
                output: PathBuf::from("/data/generate-assets3.json"),
                skip_verify: false,
            })
            .await
            .unwrap();
        client
            .deploy_storage(
                Path::new("/data/generate-assets3.json"),
                Path::new("/data/genstorage-addresses.json"),
            )
            .await
            .unwrap();
        client
            .send(&SendRequest {
                bridge: Address::repeat_byte(1),
                input: PathBuf::from("/data/generate-assets3.json"),
                position: Address::ZERO,
                dry_run: true,
            })
            .await
            .unwrap();

        let calls = client.runner.calls.lock().unwrap();
        let subcommands: Vec<&str> = calls.iter().map(|args| args[0].as_str()).collect();
        assert_eq!(subcommands, vec!["generate", "deploy-storage", "send"]);
    }

    #[tokio::test]
    async fn test_register_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = client()
            .register(
                Address::repeat_byte(1),
                &dir.path().join("genstorage-addresses.json"),
            )
            .await;
        assert!(result.is_err());
    }
}
