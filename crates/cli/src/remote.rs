//! `srcbatch remote`: run a batch spec on the instance.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use srcbatch_api::SourcegraphClient;
use srcbatch_engine::{BatchesService, ExecutionReport, RemoteExecutor};
use srcbatch_types::RemoteExecutionRequest;
use srcbatch_util::{default_config_path, load_config};

use crate::cli::RemoteArgs;
use crate::console::ConsoleProgress;

pub async fn run(args: RemoteArgs) -> Result<ExecutionReport> {
    let config_path = default_config_path();
    let config = load_config(&config_path).with_context(|| format!("read config {}", config_path.display()))?;
    let policy = args
        .poll_policy(&config.poll)
        .with_context(|| format!("invalid poll settings in {}", config_path.display()))?;
    debug!(?policy, "poll policy resolved");

    let raw_spec = read_batch_spec(&args.file).await?;
    let request = RemoteExecutionRequest {
        batch_change_name: args.name.clone(),
        namespace_id: args.namespace.clone(),
        raw_spec,
        flags: args.flags(),
    };

    let client = SourcegraphClient::new_from_env()?;
    info!(endpoint = %client.endpoint, "using Sourcegraph instance");
    let executor = RemoteExecutor::new(BatchesService::new(client), policy);

    let cancel = CancellationToken::new();
    let interrupt = spawn_interrupt_watcher(cancel.clone());
    let mut progress = ConsoleProgress::stderr();
    let result = executor.run(&request, &mut progress, &cancel).await;
    interrupt.abort();

    Ok(result?)
}

async fn read_batch_spec(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        tokio::io::stdin()
            .read_to_string(&mut raw)
            .await
            .context("read batch spec from stdin")?;
        return Ok(raw);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read batch spec {}", path.display()))
}

/// Cancel `token` on the first Ctrl-C.
fn spawn_interrupt_watcher(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received; detaching from the remote execution");
            token.cancel();
        }
    })
}
