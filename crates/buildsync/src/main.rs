use anyhow::{Context, Result};
use buildsync_fetch::ReqwestClient;
use buildsync_pipeline::Coordinator;
use clap::Parser;
use tokio_util::sync::CancellationToken;

mod cli;
mod logging;
mod settings;
mod signal;

use cli::Cli;
use settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbosity());

    let settings = Settings::load(&cli)?;
    let config = settings.run_config()?;
    let client = ReqwestClient::with_options(&settings.client_options()?)
        .context("failed to build HTTP client")?;

    let token = CancellationToken::new();
    let watcher = signal::cancel_on_ctrl_c(token.clone());

    let coordinator = Coordinator::new(client, config)?.with_cancellation(token.clone());
    let result = coordinator.run().await;

    // stop the watcher whatever happened
    token.cancel();
    let _ = watcher.await;
    let report = result.context("run failed")?;

    for failed in &report.failed {
        tracing::debug!(item = failed.id, attempts = failed.attempts, error = %failed.message, "failed item");
    }

    if report.publish_requested() {
        let message = signal::publish_message(&chrono::Local::now());
        match &cli.publish_marker {
            Some(path) => {
                signal::write_publish_marker(path, &message)?;
                tracing::info!(path = %path.display(), %message, "publish marker written");
            }
            None => tracing::info!(%message, "publish requested; pass --publish-marker to record it"),
        }
    }

    Ok(())
}
