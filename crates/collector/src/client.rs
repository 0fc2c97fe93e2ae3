use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use common::config::GithubConfig;
use common::{AppError, Result};
use http::{header, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum GithubApiError {
    #[error("github api error: {status} for {endpoint}")]
    Http {
        status: StatusCode,
        endpoint: String,
    },
}

impl GithubApiError {
    pub fn status(status: StatusCode, endpoint: impl Into<String>) -> Self {
        Self::Http {
            status,
            endpoint: endpoint.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match *self {
            GithubApiError::Http { status, .. } => status,
        }
    }
}

/// Blocking-order access to the hosting API. All implementations are
/// invoked strictly sequentially; rate-limit friendliness comes from the
/// callers never overlapping requests.
#[async_trait]
pub trait GithubClient: Send + Sync {
    async fn get_authenticated_user(&self) -> Result<Value>;

    /// One page of the authenticated user's repositories.
    async fn list_repositories(&self, page: u32) -> Result<Vec<Value>>;

    /// A single non-paginated resource, e.g. a language breakdown.
    async fn get_resource(&self, url: &Url) -> Result<Value>;

    /// One page of a paginated collection addressed by a full URL.
    async fn list_page(&self, url: &Url, page: u32) -> Result<Vec<Value>>;
}

pub struct HttpGithubClient {
    http: reqwest::Client,
    base: Url,
    token: String,
    user_agent: String,
}

impl HttpGithubClient {
    pub fn new(config: &GithubConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AppError::fetch)?;
        let base = Url::parse(&config.api_base)
            .map_err(|err| AppError::Other(anyhow!("invalid api base: {err}")))?;
        Ok(Self {
            http,
            base,
            token: config.token.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    fn join(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|err| AppError::Other(anyhow!("invalid endpoint path: {err}")))
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        let endpoint = url.path().trim_start_matches('/').to_string();
        debug!(endpoint = %endpoint, "dispatching GitHub request");
        let response = self
            .http
            .get(url)
            .header(header::USER_AGENT, self.user_agent.clone())
            .header(header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(AppError::fetch)?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(GithubApiError::status(status, endpoint)));
        }
        response.json().await.map_err(AppError::fetch)
    }

    async fn get_json_array(&self, url: Url) -> Result<Vec<Value>> {
        let value = self.get_json(url).await?;
        match value {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            _ => Err(AppError::Other(anyhow!("expected array response"))),
        }
    }

    fn with_page(url: &Url, page: u32) -> Url {
        let mut paged = url.clone();
        paged.query_pairs_mut().append_pair("page", &page.to_string());
        paged
    }
}

#[async_trait]
impl GithubClient for HttpGithubClient {
    async fn get_authenticated_user(&self) -> Result<Value> {
        let url = self.join("user")?;
        match self.get_json(url).await {
            Err(AppError::TransientFetch(err)) => {
                // A rejected credential is fatal; everything else stays a
                // per-call fetch failure.
                if let Some(api_err) = err.downcast_ref::<GithubApiError>() {
                    let status = api_err.status_code();
                    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                        return Err(AppError::auth(format!(
                            "credential rejected with status {status}"
                        )));
                    }
                }
                Err(AppError::TransientFetch(err))
            }
            other => other,
        }
    }

    async fn list_repositories(&self, page: u32) -> Result<Vec<Value>> {
        let url = Self::with_page(&self.join("user/repos")?, page);
        self.get_json_array(url).await
    }

    async fn get_resource(&self, url: &Url) -> Result<Value> {
        self.get_json(url.clone()).await
    }

    async fn list_page(&self, url: &Url, page: u32) -> Result<Vec<Value>> {
        self.get_json_array(Self::with_page(url, page)).await
    }
}
