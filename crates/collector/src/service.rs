use std::sync::Arc;

use common::Result;
use normalizer::models::{CommitRecord, PullRequestRecord, RepositoryRecord, UserProfile};
use store::SnapshotStore;
use tracing::{info, instrument};

use crate::client::GithubClient;
use crate::enumerate::enumerate;
use crate::fetch::{fetch_commits, fetch_pull_requests};

/// Everything one ingestion run produces: the authenticated profile and
/// the three datasets, already persisted as snapshots.
#[derive(Debug, Clone)]
pub struct IngestionOutcome {
    pub profile: UserProfile,
    pub repositories: Vec<RepositoryRecord>,
    pub commits: Vec<CommitRecord>,
    pub pull_requests: Vec<PullRequestRecord>,
}

pub struct Ingestor<C: GithubClient + 'static> {
    client: Arc<C>,
    store: SnapshotStore,
}

impl<C: GithubClient + 'static> Ingestor<C> {
    pub fn new(client: Arc<C>, store: SnapshotStore) -> Self {
        Self { client, store }
    }

    /// One full-refresh run: enumerate, then fetch commits and pull
    /// requests per repository, then replace the snapshots. Per-repository
    /// failures degrade the datasets; only a rejected credential aborts.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<IngestionOutcome> {
        let enumeration = enumerate(self.client.as_ref()).await?;

        let mut commits = Vec::new();
        let mut pull_requests = Vec::new();
        for repo in &enumeration.repositories {
            let repo_commits = fetch_commits(self.client.as_ref(), repo).await;
            let repo_pulls = fetch_pull_requests(self.client.as_ref(), repo).await;
            info!(
                repo = %repo.name,
                commits = repo_commits.len(),
                pull_requests = repo_pulls.len(),
                "repository ingested"
            );
            commits.extend(repo_commits);
            pull_requests.extend(repo_pulls);
        }

        self.store.write_repositories(&enumeration.repositories)?;
        self.store.write_commits(&commits)?;
        self.store.write_pull_requests(&pull_requests)?;

        info!(
            repositories = enumeration.repositories.len(),
            commits = commits.len(),
            pull_requests = pull_requests.len(),
            snapshot_dir = %self.store.dir().display(),
            "ingestion run complete"
        );
        Ok(IngestionOutcome {
            profile: enumeration.profile,
            repositories: enumeration.repositories,
            commits,
            pull_requests,
        })
    }
}
