//! Command lines of the SDK's force-withdrawal tool.
//!
//! Snapshot generation, storage deployment and the claim settlement are done
//! by the tool shipped with the SDK. It reads its endpoints and signing key
//! from the environment.

use crate::{process::Invocation, GenerateRequest, SendRequest};
use std::path::{Path, PathBuf};

/// Location of the tool relative to the SDK root.
pub const TOOL_RELATIVE_PATH: &str = "bin/force-withdraw";

/// Builds invocations of the force-withdrawal tool.
#[derive(Clone)]
pub struct ForceWithdrawTool {
    program: PathBuf,
    sdk_root: PathBuf,
    l1_rpc_url: String,
    l2_rpc_url: String,
    private_key: String,
}

impl ForceWithdrawTool {
    /// Tool at its default location inside `sdk_root`.
    pub fn new(
        sdk_root: impl Into<PathBuf>,
        l1_rpc_url: impl Into<String>,
        l2_rpc_url: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        let sdk_root = sdk_root.into();
        Self {
            program: sdk_root.join(TOOL_RELATIVE_PATH),
            sdk_root,
            l1_rpc_url: l1_rpc_url.into(),
            l2_rpc_url: l2_rpc_url.into(),
            private_key: private_key.into(),
        }
    }

    /// Use a different tool binary.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    fn invocation(&self, subcommand: &str) -> Invocation {
        Invocation::new(&self.program)
            .arg(subcommand)
            .env("L1_RPC_URL", &self.l1_rpc_url)
            .env("L2_RPC_URL", &self.l2_rpc_url)
            .env("PRIVATE_KEY", &self.private_key)
            .current_dir(&self.sdk_root)
    }

    pub fn generate(&self, request: &GenerateRequest) -> Invocation {
        let invocation = self
            .invocation("generate")
            .arg("--l2-start")
            .arg(&request.l2_start)
            .arg("--l2-end")
            .arg(&request.l2_end)
            .arg("--output")
            .arg(path_arg(&request.output));

        if request.skip_verify {
            invocation.arg("--skip-verify")
        } else {
            invocation
        }
    }

    pub fn deploy_storage(&self, input: &Path, output: &Path) -> Invocation {
        self.invocation("deploy-storage")
            .arg("--input")
            .arg(path_arg(input))
            .arg("--output")
            .arg(path_arg(output))
    }

    pub fn send(&self, request: &SendRequest) -> Invocation {
        let invocation = self
            .invocation("send")
            .arg("--bridge")
            .arg(request.bridge.to_string())
            .arg("--input")
            .arg(path_arg(&request.input))
            .arg("--position")
            .arg(request.position.to_string());

        if request.dry_run {
            invocation.arg("--dry-run")
        } else {
            invocation
        }
    }
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}
