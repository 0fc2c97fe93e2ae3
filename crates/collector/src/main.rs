use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use collector::{HttpGithubClient, Ingestor};
use common::{config::AppConfig, logging};
use store::SnapshotStore;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging("info");
    let config = AppConfig::load()?;
    let github = config
        .github
        .as_ref()
        .ok_or_else(|| anyhow!("github credentials not configured"))?;

    let client = Arc::new(HttpGithubClient::new(
        github,
        Duration::from_secs(config.collector.timeout_secs),
    )?);
    let store = SnapshotStore::new(&config.collector.snapshot_dir);

    let ingestor = Ingestor::new(client, store);
    let outcome = ingestor.run().await?;
    info!(
        login = %outcome.profile.login,
        repositories = outcome.repositories.len(),
        commits = outcome.commits.len(),
        pull_requests = outcome.pull_requests.len(),
        "collector finished"
    );
    Ok(())
}
