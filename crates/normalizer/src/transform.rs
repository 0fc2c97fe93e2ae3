use common::{AppError, Result};

use crate::models::{CommitRecord, PullRequestRecord, RepositoryRecord, UserProfile};
use crate::payloads::{CommitPayload, PullRequestPayload, RepoPayload, UserProfilePayload};

/// Marker substituted for absent optional fields. Required fields are
/// never defaulted; their absence is a `MalformedRecord` error.
pub const NOT_AVAILABLE: &str = "N/A";

fn or_na(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn normalize_repository(
    payload: &RepoPayload,
    languages: &str,
    contributors: &str,
) -> Result<RepositoryRecord> {
    let owner_login = payload
        .owner
        .as_ref()
        .map(|o| o.login.clone())
        .ok_or_else(|| AppError::malformed(format!("repo {} missing owner", payload.id)))?;

    Ok(RepositoryRecord {
        id: payload.id,
        name: payload.name.clone(),
        description: payload
            .description
            .clone()
            .unwrap_or_else(|| "No description".to_string()),
        created_at: or_na(payload.created_at.as_deref()),
        updated_at: or_na(payload.updated_at.as_deref()),
        owner_login,
        license: payload
            .license
            .as_ref()
            .and_then(|l| l.name.clone())
            .unwrap_or_else(|| "None".to_string()),
        has_wiki: payload.has_wiki,
        forks_count: payload.forks_count,
        open_issues_count: payload.open_issues_count,
        stargazers_count: payload.stargazers_count,
        watchers_count: payload.watchers_count,
        html_url: or_na(payload.html_url.as_deref()),
        commits_url: or_na(payload.commits_url.as_deref()),
        languages_url: or_na(payload.languages_url.as_deref()),
        pulls_url: or_na(payload.pulls_url.as_deref()),
        languages: languages.to_string(),
        contributors: contributors.to_string(),
    })
}

pub fn normalize_commit(payload: &CommitPayload, repo_id: i64) -> Result<CommitRecord> {
    let sha = payload
        .sha
        .clone()
        .ok_or_else(|| AppError::malformed("commit missing sha"))?;
    let detail = payload
        .commit
        .as_ref()
        .ok_or_else(|| AppError::malformed(format!("commit {sha} missing commit detail")))?;
    let date = detail
        .committer
        .as_ref()
        .and_then(|c| c.date.clone())
        .ok_or_else(|| AppError::malformed(format!("commit {sha} missing committer date")))?;
    let author_name = detail
        .author
        .as_ref()
        .and_then(|a| a.name.clone())
        .ok_or_else(|| AppError::malformed(format!("commit {sha} missing author name")))?;

    Ok(CommitRecord {
        repo_id,
        sha,
        date,
        message: detail
            .message
            .clone()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        author_name,
        author_email: or_na(detail.author.as_ref().and_then(|a| a.email.as_deref())),
    })
}

pub fn normalize_pull_request(
    payload: &PullRequestPayload,
    repo_name: &str,
) -> Result<PullRequestRecord> {
    let number = payload
        .number
        .ok_or_else(|| AppError::malformed(format!("pull request in {repo_name} missing number")))?;
    let author_login = payload
        .user
        .as_ref()
        .and_then(|u| u.login.clone())
        .ok_or_else(|| AppError::malformed(format!("pull request #{number} missing author login")))?;
    let created_at = payload
        .created_at
        .clone()
        .ok_or_else(|| AppError::malformed(format!("pull request #{number} missing created_at")))?;

    Ok(PullRequestRecord {
        repo_name: repo_name.to_string(),
        number,
        title: or_na(payload.title.as_deref()),
        author_login,
        state: or_na(payload.state.as_deref()),
        created_at,
        updated_at: or_na(payload.updated_at.as_deref()),
        merged_at: payload.merged_at.clone().filter(|m| !m.is_empty()),
        issue_id: issue_id_from_url(payload.issue_url.as_deref()),
        author_name: or_na(payload.user.as_ref().and_then(|u| u.name.as_deref())),
        author_email: or_na(payload.user.as_ref().and_then(|u| u.email.as_deref())),
    })
}

pub fn normalize_profile(payload: &UserProfilePayload) -> UserProfile {
    UserProfile {
        login: payload.login.clone(),
        name: or_na(payload.name.as_deref()),
        email: or_na(payload.email.as_deref()),
        company: or_na(payload.company.as_deref()),
        location: or_na(payload.location.as_deref()),
        bio: or_na(payload.bio.as_deref()),
        blog: or_na(payload.blog.as_deref()),
        avatar_url: or_na(payload.avatar_url.as_deref()),
        url: or_na(payload.url.as_deref()),
        followers: payload.followers,
        following: payload.following,
        public_repos: payload.public_repos,
        public_gists: payload.public_gists,
        created_at: or_na(payload.created_at.as_deref()),
        updated_at: or_na(payload.updated_at.as_deref()),
    }
}

/// The issue id is the trailing path segment of the issue URL.
fn issue_id_from_url(issue_url: Option<&str>) -> String {
    issue_url
        .and_then(|url| url.trim_end_matches('/').rsplit('/').next())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
