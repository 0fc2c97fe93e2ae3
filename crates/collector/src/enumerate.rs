use common::{AppError, Result};
use normalizer::models::{RepositoryRecord, UserProfile};
use normalizer::payloads::{RepoPayload, UserProfilePayload};
use normalizer::{normalize_profile, normalize_repository};
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

use crate::client::GithubClient;
use crate::fetch::PAGE_SIZE;

#[derive(Debug, Clone)]
pub struct Enumeration {
    pub profile: UserProfile,
    pub repositories: Vec<RepositoryRecord>,
}

/// List everything the authenticated identity owns. Only a rejected
/// credential aborts; a repository that cannot be resolved is logged and
/// skipped so the rest still enumerate.
pub async fn enumerate(client: &dyn GithubClient) -> Result<Enumeration> {
    let profile_value = client.get_authenticated_user().await?;
    let profile_payload: UserProfilePayload = serde_json::from_value(profile_value)
        .map_err(|err| AppError::malformed(format!("user profile payload: {err}")))?;
    let profile = normalize_profile(&profile_payload);
    info!(login = %profile.login, "authenticated");

    let mut repositories = Vec::new();
    let mut page = 1u32;
    loop {
        let items = match client.list_repositories(page).await {
            Ok(items) => items,
            Err(err) => {
                warn!(page, error = %err, "repository listing failed; keeping partial results");
                break;
            }
        };
        let fetched = items.len();
        for item in items {
            match build_repository(client, item).await {
                Ok(record) => repositories.push(record),
                Err(err) => warn!(error = %err, "skipping repository"),
            }
        }
        if fetched < PAGE_SIZE {
            break;
        }
        page += 1;
    }

    info!(count = repositories.len(), "enumerated repositories");
    Ok(Enumeration {
        profile,
        repositories,
    })
}

async fn build_repository(client: &dyn GithubClient, item: Value) -> Result<RepositoryRecord> {
    let payload: RepoPayload = serde_json::from_value(item)
        .map_err(|err| AppError::malformed(format!("repository payload: {err}")))?;
    let languages = resolve_languages(client, &payload).await;
    let contributors = resolve_contributors(client, &payload).await;
    normalize_repository(&payload, &languages, &contributors)
}

/// Comma-joined language names, empty when none or on failure.
async fn resolve_languages(client: &dyn GithubClient, payload: &RepoPayload) -> String {
    let Some(url) = payload
        .languages_url
        .as_deref()
        .and_then(|u| Url::parse(u).ok())
    else {
        return String::new();
    };
    match client.get_resource(&url).await {
        Ok(Value::Object(map)) => map.keys().cloned().collect::<Vec<_>>().join(", "),
        Ok(_) => String::new(),
        Err(err) => {
            warn!(repo = %payload.name, error = %err, "language lookup failed");
            String::new()
        }
    }
}

/// Comma-joined contributor logins, paginated like every other
/// collection; a failed page keeps the logins collected so far.
async fn resolve_contributors(client: &dyn GithubClient, payload: &RepoPayload) -> String {
    let Some(url) = payload
        .contributors_url
        .as_deref()
        .and_then(|u| Url::parse(u).ok())
    else {
        return String::new();
    };
    let logins = crate::fetch::paginate(client, &url, &payload.name, "contributors", |item| {
        item.get("login")
            .and_then(Value::as_str)
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::malformed("contributor missing login"))
    })
    .await;
    logins.join(", ")
}
