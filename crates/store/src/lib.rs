//! CSV snapshot persistence for the three ingestion datasets.
//!
//! Every run is a full refresh: a snapshot is written to a temp file in
//! the target directory and atomically renamed over any prior version,
//! so readers never observe a partially written file.

use std::fs;
use std::path::{Path, PathBuf};

use common::{AppError, Result};
use normalizer::{CommitRecord, PullRequestRecord, RepositoryRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::info;

pub const REPOS_SNAPSHOT: &str = "repos_info.csv";
pub const COMMITS_SNAPSHOT: &str = "commits_info.csv";
pub const PULL_REQUESTS_SNAPSHOT: &str = "pull_requests_info.csv";

const REPO_HEADER: &[&str] = &[
    "ID",
    "Name",
    "Description",
    "Created At",
    "Updated At",
    "Owner Login",
    "License",
    "Has Wiki",
    "Forks Count",
    "Open Issues Count",
    "Stargazers Count",
    "Watchers Count",
    "Repository URL",
    "Commits URL",
    "Languages URL",
    "Pulls URL",
    "Languages",
    "Contributors",
];

const COMMIT_HEADER: &[&str] = &[
    "Repo Id",
    "Commit Id",
    "Date",
    "Message",
    "Author Name",
    "Author Email",
];

const PULL_REQUEST_HEADER: &[&str] = &[
    "Repo Name",
    "PR Number",
    "Title",
    "Author Login",
    "State",
    "Created At",
    "Updated At",
    "Merged At",
    "Issue Id",
    "Author Name",
    "Author Email",
];

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write_repositories(&self, rows: &[RepositoryRecord]) -> Result<()> {
        self.write(REPOS_SNAPSHOT, REPO_HEADER, rows)
    }

    pub fn write_commits(&self, rows: &[CommitRecord]) -> Result<()> {
        self.write(COMMITS_SNAPSHOT, COMMIT_HEADER, rows)
    }

    pub fn write_pull_requests(&self, rows: &[PullRequestRecord]) -> Result<()> {
        self.write(PULL_REQUESTS_SNAPSHOT, PULL_REQUEST_HEADER, rows)
    }

    pub fn load_repositories(&self) -> Result<Vec<RepositoryRecord>> {
        self.load(REPOS_SNAPSHOT)
    }

    pub fn load_commits(&self) -> Result<Vec<CommitRecord>> {
        self.load(COMMITS_SNAPSHOT)
    }

    pub fn load_pull_requests(&self) -> Result<Vec<PullRequestRecord>> {
        self.load(PULL_REQUESTS_SNAPSHOT)
    }

    fn write<T: Serialize>(&self, name: &str, header: &[&str], rows: &[T]) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(AppError::snapshot)?;
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(AppError::snapshot)?;
        {
            // The header is written explicitly so an empty dataset still
            // produces a well-formed snapshot.
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(tmp.as_file_mut());
            writer.write_record(header).map_err(AppError::snapshot)?;
            for row in rows {
                writer.serialize(row).map_err(AppError::snapshot)?;
            }
            writer.flush().map_err(AppError::snapshot)?;
        }
        let target = self.dir.join(name);
        tmp.persist(&target).map_err(AppError::snapshot)?;
        info!(snapshot = name, rows = rows.len(), "snapshot written");
        Ok(())
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let path = self.dir.join(name);
        let mut reader = csv::Reader::from_path(&path).map_err(AppError::snapshot)?;
        let mut rows = Vec::new();
        for result in reader.deserialize() {
            rows.push(result.map_err(AppError::snapshot)?);
        }
        Ok(rows)
    }
}
