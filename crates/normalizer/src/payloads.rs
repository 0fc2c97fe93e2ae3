use serde::Deserialize;

/// Raw API payloads. Every field the pipeline merely copies is optional
/// here; the transforms decide which absences are fatal for a record.

#[derive(Debug, Clone, Deserialize)]
pub struct RepoPayload {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub owner: Option<OwnerRef>,
    pub license: Option<LicenseRef>,
    #[serde(default)]
    pub has_wiki: bool,
    #[serde(default)]
    pub forks_count: i64,
    #[serde(default)]
    pub open_issues_count: i64,
    #[serde(default)]
    pub stargazers_count: i64,
    #[serde(default)]
    pub watchers_count: i64,
    pub html_url: Option<String>,
    pub commits_url: Option<String>,
    pub languages_url: Option<String>,
    pub pulls_url: Option<String>,
    pub contributors_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnerRef {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LicenseRef {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitPayload {
    pub sha: Option<String>,
    pub commit: Option<CommitDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub author: Option<GitSignature>,
    pub committer: Option<GitSignature>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitSignature {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestPayload {
    pub number: Option<i64>,
    pub title: Option<String>,
    pub user: Option<PullAuthorRef>,
    pub state: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub merged_at: Option<String>,
    pub issue_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullAuthorRef {
    pub login: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfilePayload {
    pub login: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub blog: Option<String>,
    pub avatar_url: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub followers: i64,
    #[serde(default)]
    pub following: i64,
    #[serde(default)]
    pub public_repos: i64,
    #[serde(default)]
    pub public_gists: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}
