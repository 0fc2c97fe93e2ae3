use std::fmt::Debug;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// Error taxonomy for the ingestion-to-metrics pipeline.
///
/// Only `Authentication` is fatal to a run; the remaining variants are
/// contained at the smallest scope that produced them (one record, one
/// page, one repository) and reported through logging.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("authentication rejected: {0}")]
    Authentication(String),
    #[error("fetch failed: {0}")]
    TransientFetch(#[source] anyhow::Error),
    #[error("malformed record: {0}")]
    MalformedRecord(String),
    #[error("data integrity: {0}")]
    DataIntegrity(String),
    #[error("snapshot error: {0}")]
    Snapshot(#[source] anyhow::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn auth(detail: impl Into<String>) -> Self {
        Self::Authentication(detail.into())
    }

    pub fn fetch(err: impl Into<anyhow::Error>) -> Self {
        Self::TransientFetch(err.into())
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedRecord(detail.into())
    }

    pub fn integrity(detail: impl Into<String>) -> Self {
        Self::DataIntegrity(detail.into())
    }

    pub fn snapshot(err: impl Into<anyhow::Error>) -> Self {
        Self::Snapshot(err.into())
    }
}
