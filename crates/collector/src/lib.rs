pub mod client;
pub mod enumerate;
pub mod fetch;
pub mod service;

pub use client::{GithubApiError, GithubClient, HttpGithubClient};
pub use enumerate::{enumerate, Enumeration};
pub use service::{IngestionOutcome, Ingestor};
