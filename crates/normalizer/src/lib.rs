pub mod models;
pub mod payloads;
pub mod transform;

pub use models::{CommitRecord, PullRequestRecord, RepositoryRecord, UserProfile};
pub use payloads::{CommitPayload, PullRequestPayload, RepoPayload, UserProfilePayload};
pub use transform::{
    normalize_commit, normalize_profile, normalize_pull_request, normalize_repository,
    NOT_AVAILABLE,
};
