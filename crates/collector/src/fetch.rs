use common::{AppError, Result};
use normalizer::models::{CommitRecord, PullRequestRecord, RepositoryRecord};
use normalizer::payloads::{CommitPayload, PullRequestPayload};
use normalizer::{normalize_commit, normalize_pull_request, NOT_AVAILABLE};
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::client::GithubClient;

/// The host API's page size. A page with fewer items than this is the
/// last one; a page with exactly this many items requires fetching the
/// next page to find the end.
pub const PAGE_SIZE: usize = 30;

/// Walk a paginated collection, normalizing each item. Ends on the first
/// short page or on the first failed page request; a failed page keeps
/// whatever was already collected. Malformed items are skipped, never
/// fatal to the page.
pub async fn paginate<T, F>(
    client: &dyn GithubClient,
    url: &Url,
    repo: &str,
    resource: &str,
    mut normalize: F,
) -> Vec<T>
where
    F: FnMut(Value) -> Result<T>,
{
    let mut records = Vec::new();
    let mut page = 1u32;
    loop {
        let items = match client.list_page(url, page).await {
            Ok(items) => items,
            Err(err) => {
                warn!(
                    repo,
                    resource,
                    page,
                    error = %err,
                    "page fetch failed; keeping partial results"
                );
                break;
            }
        };
        let fetched = items.len();
        for item in items {
            match normalize(item) {
                Ok(record) => records.push(record),
                Err(err) => warn!(repo, resource, error = %err, "skipping malformed record"),
            }
        }
        if fetched < PAGE_SIZE {
            break;
        }
        page += 1;
    }
    records
}

pub async fn fetch_commits(
    client: &dyn GithubClient,
    repo: &RepositoryRecord,
) -> Vec<CommitRecord> {
    let Some(url) = endpoint_url(&repo.commits_url, "{/sha}") else {
        warn!(repo = %repo.name, "no usable commits endpoint; skipping commits");
        return Vec::new();
    };
    let repo_id = repo.id;
    paginate(client, &url, &repo.name, "commits", move |item| {
        let payload: CommitPayload = serde_json::from_value(item)
            .map_err(|err| AppError::malformed(format!("commit payload: {err}")))?;
        normalize_commit(&payload, repo_id)
    })
    .await
}

pub async fn fetch_pull_requests(
    client: &dyn GithubClient,
    repo: &RepositoryRecord,
) -> Vec<PullRequestRecord> {
    let Some(mut url) = endpoint_url(&repo.pulls_url, "{/number}") else {
        warn!(repo = %repo.name, "no usable pulls endpoint; skipping pull requests");
        return Vec::new();
    };
    url.query_pairs_mut().append_pair("state", "all");
    let repo_name = repo.name.clone();
    paginate(client, &url, &repo.name, "pulls", move |item| {
        let payload: PullRequestPayload = serde_json::from_value(item)
            .map_err(|err| AppError::malformed(format!("pull request payload: {err}")))?;
        normalize_pull_request(&payload, &repo_name)
    })
    .await
}

/// Endpoint templates from the repository record carry a placeholder
/// segment (`{/sha}`, `{/number}`) that must be stripped before use.
fn endpoint_url(template: &str, placeholder: &str) -> Option<Url> {
    if template.is_empty() || template == NOT_AVAILABLE {
        return None;
    }
    Url::parse(&template.replace(placeholder, "")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_strips_placeholder() {
        let url = endpoint_url(
            "https://api.github.com/repos/o/r/commits{/sha}",
            "{/sha}",
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/repos/o/r/commits");
    }

    #[test]
    fn endpoint_url_rejects_marker_and_garbage() {
        assert!(endpoint_url(NOT_AVAILABLE, "{/sha}").is_none());
        assert!(endpoint_url("", "{/sha}").is_none());
        assert!(endpoint_url("not a url", "{/sha}").is_none());
    }
}
