use std::sync::Mutex;

use async_trait::async_trait;
use collector::client::GithubClient;
use collector::fetch::{fetch_commits, PAGE_SIZE};
use common::{AppError, Result};
use normalizer::models::RepositoryRecord;
use serde_json::{json, Value};
use url::Url;

fn commit_item(sha: &str) -> Value {
    json!({
        "sha": sha,
        "commit": {
            "author": {"name": "Jane Doe", "email": "jane@example.com", "date": "2024-03-01T10:00:00Z"},
            "committer": {"date": "2024-03-01T10:00:00Z"},
            "message": "work"
        }
    })
}

fn commit_page(start: usize, len: usize) -> Vec<Value> {
    (start..start + len)
        .map(|i| commit_item(&format!("sha{i}")))
        .collect()
}

fn repo() -> RepositoryRecord {
    RepositoryRecord {
        id: 1,
        name: "widget".into(),
        description: "No description".into(),
        created_at: "2020-01-01T00:00:00Z".into(),
        updated_at: "2024-01-01T00:00:00Z".into(),
        owner_login: "jdoe".into(),
        license: "None".into(),
        has_wiki: true,
        forks_count: 0,
        open_issues_count: 0,
        stargazers_count: 0,
        watchers_count: 0,
        html_url: "https://example.com/jdoe/widget".into(),
        commits_url: "https://api.example.com/repos/jdoe/widget/commits{/sha}".into(),
        languages_url: "https://api.example.com/repos/jdoe/widget/languages".into(),
        pulls_url: "https://api.example.com/repos/jdoe/widget/pulls{/number}".into(),
        languages: String::new(),
        contributors: String::new(),
    }
}

/// Serves scripted pages for the commits collection and records which
/// page numbers were requested.
struct PagedClient {
    pages: Vec<Vec<Value>>,
    fail_page: Option<u32>,
    requested: Mutex<Vec<u32>>,
}

impl PagedClient {
    fn new(pages: Vec<Vec<Value>>) -> Self {
        Self {
            pages,
            fail_page: None,
            requested: Mutex::new(Vec::new()),
        }
    }

    fn failing_at(mut self, page: u32) -> Self {
        self.fail_page = Some(page);
        self
    }

    fn requested_pages(&self) -> Vec<u32> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl GithubClient for PagedClient {
    async fn get_authenticated_user(&self) -> Result<Value> {
        Ok(json!({"login": "jdoe"}))
    }

    async fn list_repositories(&self, _page: u32) -> Result<Vec<Value>> {
        Ok(Vec::new())
    }

    async fn get_resource(&self, _url: &Url) -> Result<Value> {
        Ok(json!({}))
    }

    async fn list_page(&self, _url: &Url, page: u32) -> Result<Vec<Value>> {
        self.requested.lock().unwrap().push(page);
        if self.fail_page == Some(page) {
            return Err(AppError::fetch(anyhow::anyhow!("boom")));
        }
        Ok(self
            .pages
            .get((page - 1) as usize)
            .cloned()
            .unwrap_or_default())
    }
}

#[tokio::test]
async fn exactly_full_page_fetches_the_next_one() {
    let client = PagedClient::new(vec![commit_page(0, PAGE_SIZE), commit_page(PAGE_SIZE, 1)]);
    let records = fetch_commits(&client, &repo()).await;
    assert_eq!(records.len(), PAGE_SIZE + 1);
    assert_eq!(client.requested_pages(), vec![1, 2]);
}

#[tokio::test]
async fn short_page_ends_pagination() {
    let client = PagedClient::new(vec![commit_page(0, PAGE_SIZE - 1)]);
    let records = fetch_commits(&client, &repo()).await;
    assert_eq!(records.len(), PAGE_SIZE - 1);
    assert_eq!(client.requested_pages(), vec![1]);
}

#[tokio::test]
async fn empty_first_page_yields_no_records() {
    let client = PagedClient::new(vec![Vec::new()]);
    let records = fetch_commits(&client, &repo()).await;
    assert!(records.is_empty());
    assert_eq!(client.requested_pages(), vec![1]);
}

#[tokio::test]
async fn failed_page_keeps_earlier_pages() {
    let client =
        PagedClient::new(vec![commit_page(0, PAGE_SIZE), commit_page(PAGE_SIZE, 5)]).failing_at(2);
    let records = fetch_commits(&client, &repo()).await;
    assert_eq!(records.len(), PAGE_SIZE);
    assert_eq!(client.requested_pages(), vec![1, 2]);
}

#[tokio::test]
async fn malformed_item_is_skipped_not_fatal() {
    let mut page = commit_page(0, 2);
    page.insert(1, json!({"commit": {"message": "no sha"}}));
    let client = PagedClient::new(vec![page]);
    let records = fetch_commits(&client, &repo()).await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].sha, "sha0");
    assert_eq!(records[1].sha, "sha1");
}
