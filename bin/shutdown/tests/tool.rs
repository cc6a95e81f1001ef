//! Integration tests running the phases against a real tool process.
#![cfg(unix)]


use action::{ForceWithdrawClient, ForceWithdrawTool, ProcessRunner};
use setup::{settings_json, TestDeployment, DEV_KEY, L1_CHAIN_ID};
use shutdown::{
    phase::{self, GenerateArgs},
    DeploymentContext, Phase,
};
use state::LastCommand;
use std::{os::unix::fs::PermissionsExt, path::PathBuf};

/// Stand-in for the SDK tool: writes the file named by `--output`, relative
/// to its own working directory, and records how it was started.
const TOOL_SCRIPT: &str = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--output" ]; then out="$2"; fi
  shift
done
printf '{"cwd":"%s","key":"%s"}' "$(pwd)" "$PRIVATE_KEY" > "$out"
"#;

fn install_tool(deployment: &TestDeployment) {
    let tool = deployment.sdk_root.join(action::tool::TOOL_RELATIVE_PATH);
    std::fs::create_dir_all(tool.parent().unwrap()).unwrap();
    std::fs::write(&tool, TOOL_SCRIPT).unwrap();
    std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
}

fn tool_for(ctx: &DeploymentContext) -> ForceWithdrawTool {
    ForceWithdrawTool::new(
        ctx.sdk_root(),
        &ctx.config.l1_rpc_url,
        &ctx.config.l2_rpc_url,
        &ctx.config.admin_private_key,
    )
}

#[tokio::test]
async fn test_relative_output_lands_in_deployment_root() {
    let deployment = TestDeployment::new();
    install_tool(&deployment);
    let mut ctx = deployment.context();

    let provider = client::create_wallet_provider(&ctx.config.l1_rpc_url, DEV_KEY).unwrap();
    let chain = ForceWithdrawClient::with_runner(provider, tool_for(&ctx), ProcessRunner);

    let args = GenerateArgs {
        output: Some(PathBuf::from("snap.json")),
        ..Default::default()
    };
    let output = phase::generate(&mut ctx, &chain, &args).await.unwrap();

    assert_eq!(output, deployment.root.join("snap.json"));
    assert!(output.exists());
    assert!(!ctx.sdk_root().join("snap.json").exists());

    // The tool still runs from the SDK root.
    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains(&format!("\"cwd\":\"{}\"", ctx.sdk_root().display())));

    let saved = deployment.saved_state();
    assert_eq!(saved.last_command, Some(LastCommand::Gen));
    assert_eq!(saved.last_snapshot_path, Some(output));
}

#[tokio::test]
async fn test_generate_without_signing_key() {
    let deployment = TestDeployment::new();
    install_tool(&deployment);
    let settings = settings_json("http://127.0.0.1:1", L1_CHAIN_ID).replace(DEV_KEY, "");
    deployment.write_settings(&settings);
    let mut ctx = deployment.context();
    assert!(ctx.config.admin_private_key.is_empty());
    assert!(!Phase::Generate.signs(false));

    // A signing connection is impossible here: no key, no node.
    let wallet = client::connect_wallet(&ctx.config.l1_rpc_url, "", L1_CHAIN_ID).await;
    assert!(wallet.is_err());

    let provider = client::create_provider(&ctx.config.l1_rpc_url).unwrap();
    let chain = ForceWithdrawClient::new(provider, tool_for(&ctx));

    let output = phase::generate(&mut ctx, &chain, &GenerateArgs::default())
        .await
        .unwrap();

    assert_eq!(output, deployment.data_dir().join("generate-assets3.json"));
    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("\"key\":\"\""));
    assert!(deployment.saved_state().last_gen_at.is_some());
}
