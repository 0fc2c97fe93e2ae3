use serde::{Deserialize, Serialize};

/// One enumerated repository. Serde renames double as the snapshot
/// column headers, so field order here is the column order on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepositoryRecord {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Created At")]
    pub created_at: String,
    #[serde(rename = "Updated At")]
    pub updated_at: String,
    #[serde(rename = "Owner Login")]
    pub owner_login: String,
    #[serde(rename = "License")]
    pub license: String,
    #[serde(rename = "Has Wiki")]
    pub has_wiki: bool,
    #[serde(rename = "Forks Count")]
    pub forks_count: i64,
    #[serde(rename = "Open Issues Count")]
    pub open_issues_count: i64,
    #[serde(rename = "Stargazers Count")]
    pub stargazers_count: i64,
    #[serde(rename = "Watchers Count")]
    pub watchers_count: i64,
    #[serde(rename = "Repository URL")]
    pub html_url: String,
    #[serde(rename = "Commits URL")]
    pub commits_url: String,
    #[serde(rename = "Languages URL")]
    pub languages_url: String,
    #[serde(rename = "Pulls URL")]
    pub pulls_url: String,
    #[serde(rename = "Languages")]
    pub languages: String,
    #[serde(rename = "Contributors")]
    pub contributors: String,
}

/// One commit, flattened. Timestamps stay as the API's strings; the
/// aggregator owns parsing so that snapshot round-trips are lossless.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitRecord {
    #[serde(rename = "Repo Id")]
    pub repo_id: i64,
    #[serde(rename = "Commit Id")]
    pub sha: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Author Name")]
    pub author_name: String,
    #[serde(rename = "Author Email")]
    pub author_email: String,
}

/// One pull request, flattened. `merged_at` is the only field whose
/// nullness gates downstream aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PullRequestRecord {
    #[serde(rename = "Repo Name")]
    pub repo_name: String,
    #[serde(rename = "PR Number")]
    pub number: i64,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Author Login")]
    pub author_login: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Created At")]
    pub created_at: String,
    #[serde(rename = "Updated At")]
    pub updated_at: String,
    #[serde(rename = "Merged At")]
    pub merged_at: Option<String>,
    #[serde(rename = "Issue Id")]
    pub issue_id: String,
    #[serde(rename = "Author Name")]
    pub author_name: String,
    #[serde(rename = "Author Email")]
    pub author_email: String,
}

/// Attributes of the authenticated account, returned by the orchestrator
/// alongside the datasets. Not persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub login: String,
    pub name: String,
    pub email: String,
    pub company: String,
    pub location: String,
    pub bio: String,
    pub blog: String,
    pub avatar_url: String,
    pub url: String,
    pub followers: i64,
    pub following: i64,
    pub public_repos: i64,
    pub public_gists: i64,
    pub created_at: String,
    pub updated_at: String,
}
