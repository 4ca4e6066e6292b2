use std::time::Duration;

use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::Token;
use crate::error::{CiStepsError, Result};

use super::pagination::next_page_url;
use super::types::{GitHubJob, GitHubRunUsage};

/// Rate-limited and 5xx requests are retried exactly this many times.
const MAX_RETRIES: u32 = 1;
const SERVER_ERROR_DELAY_SECONDS: u64 = 1;
const DEFAULT_RATE_LIMIT_DELAY_SECONDS: u64 = 60;
const MAX_RATE_LIMIT_DELAY_SECONDS: u64 = 15 * 60;
const API_VERSION: &str = "2022-11-28";

/// GitHub REST API client scoped to a single repository.
pub struct GitHubClient {
    client: Client,
    api_url: Url,
    owner: String,
    repo: String,
    per_page: u8,
    /// Wait before retrying a 403 that only names a secondary limit in its body
    secondary_limit_delay: Duration,
    network_retry_delay: Duration,
}

impl GitHubClient {
    /// Create a new GitHub API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - GitHub API base URL (e.g., "https://api.github.com")
    /// * `owner` - Repository owner/organization
    /// * `repo` - Repository name
    /// * `token` - GitHub access token
    /// * `per_page` - Items requested per list page
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL or token cannot be used.
    pub fn new(
        base_url: &str,
        owner: String,
        repo: String,
        token: Token,
        per_page: u8,
    ) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
            .map_err(|e| CiStepsError::Config(format!("Invalid token: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let client = Client::builder()
            .user_agent(concat!("cisteps/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| CiStepsError::Config(format!("Failed to create HTTP client: {e}")))?;

        let api_url = Url::parse(base_url)
            .map_err(|e| CiStepsError::Config(format!("Invalid base URL: {e}")))?;

        if api_url.cannot_be_a_base() {
            return Err(CiStepsError::Config(format!(
                "Invalid base URL: {base_url}"
            )));
        }

        Ok(Self {
            client,
            api_url,
            owner,
            repo,
            per_page: per_page.clamp(1, 100),
            secondary_limit_delay: Duration::from_secs(DEFAULT_RATE_LIMIT_DELAY_SECONDS),
            network_retry_delay: Duration::from_secs(SERVER_ERROR_DELAY_SECONDS),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Build `{base}/repos/{owner}/{repo}/actions/{segments...}`.
    fn actions_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                CiStepsError::Config(format!("Invalid base URL: {}", self.api_url))
            })?;
            path.pop_if_empty()
                .extend(["repos", self.owner.as_str(), self.repo.as_str(), "actions"])
                .extend(segments);
        }
        Ok(url)
    }

    fn first_page(&self, mut url: Url) -> Url {
        url.query_pairs_mut()
            .append_pair("per_page", &self.per_page.to_string())
            .append_pair("page", "1");
        url
    }

    /// First page of `GET /repos/{owner}/{repo}/actions/workflows`.
    pub fn workflows_url(&self) -> Result<Url> {
        Ok(self.first_page(self.actions_url(&["workflows"])?))
    }

    /// First page of a workflow's runs on `branch`.
    pub fn workflow_runs_url(&self, workflow_id: u64, branch: &str) -> Result<Url> {
        let mut url = self.actions_url(&["workflows", &workflow_id.to_string(), "runs"])?;
        url.query_pairs_mut()
            .append_pair("branch", branch)
            .append_pair("exclude_pull_requests", "true");
        Ok(self.first_page(url))
    }

    /// Fetch billable usage for a workflow run.
    pub async fn workflow_run_usage(&self, run_id: u64) -> Result<GitHubRunUsage> {
        let url = self.actions_url(&["runs", &run_id.to_string(), "timing"])?;
        self.get_json(&url).await
    }

    /// Fetch a single job with its steps.
    pub async fn job(&self, job_id: u64) -> Result<GitHubJob> {
        let url = self.actions_url(&["jobs", &job_id.to_string()])?;
        self.get_json(&url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let response = self.get(url).await?;
        Ok(response.json().await?)
    }

    /// Fetch one page and the URL of the page after it, if any.
    pub(super) async fn get_page<T: DeserializeOwned>(&self, url: &Url) -> Result<(T, Option<Url>)> {
        let response = self.get(url).await?;
        let next = next_page_url(response.headers());
        Ok((response.json().await?, next))
    }

    /// Issue a GET, retrying once on rate limits, server errors and transport
    /// failures.
    async fn get(&self, url: &Url) -> Result<Response> {
        let mut retry_count = 0;
        loop {
            debug!("GET {url}");
            let response = match self.client.get(url.clone()).send().await {
                Ok(response) => response,
                Err(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                    if retry_count >= MAX_RETRIES {
                        return Err(e.into());
                    }
                    warn!(
                        "Network error ({e}), retrying in {}s ({}/{})...",
                        self.network_retry_delay.as_secs(),
                        retry_count + 1,
                        MAX_RETRIES
                    );
                    tokio::time::sleep(self.network_retry_delay).await;
                    retry_count += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            let header_delay =
                retry_delay(status, response.headers(), chrono::Utc::now().timestamp());
            let delay = match header_delay {
                Some(delay) => delay,
                None => {
                    let message = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unable to read error response".to_string());
                    if status != StatusCode::FORBIDDEN || !is_secondary_rate_limit(&message) {
                        return Err(CiStepsError::ApiError {
                            status: status.as_u16(),
                            message,
                        });
                    }
                    self.secondary_limit_delay
                }
            };

            if retry_count >= MAX_RETRIES {
                return Err(CiStepsError::ApiErrorAfterRetries {
                    status: status.as_u16(),
                    retries: MAX_RETRIES,
                });
            }

            warn!(
                "GitHub API error (status {status}) for {url}. Retrying after {} seconds ({}/{})...",
                delay.as_secs(),
                retry_count + 1,
                MAX_RETRIES
            );

            tokio::time::sleep(delay).await;
            retry_count += 1;
        }
    }
}

/// Secondary rate limits are sometimes reported only in the 403 body.
fn is_secondary_rate_limit(body: &str) -> bool {
    body.to_ascii_lowercase().contains("secondary rate limit")
}

/// How long to wait before retrying a failed response, or `None` if it is not
/// retryable.
///
/// Secondary rate limits carry `retry-after`; primary limits report
/// `x-ratelimit-remaining: 0` and an epoch `x-ratelimit-reset`.
fn retry_delay(status: StatusCode, headers: &HeaderMap, now: i64) -> Option<Duration> {
    if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
        let seconds = if let Some(retry_after) = header_i64(headers, RETRY_AFTER.as_str()) {
            retry_after
        } else if header_i64(headers, "x-ratelimit-remaining") == Some(0) {
            header_i64(headers, "x-ratelimit-reset")
                .map_or(DEFAULT_RATE_LIMIT_DELAY_SECONDS as i64, |reset| reset - now)
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            DEFAULT_RATE_LIMIT_DELAY_SECONDS as i64
        } else {
            return None;
        };

        #[allow(clippy::cast_sign_loss)]
        let seconds = seconds.clamp(0, MAX_RATE_LIMIT_DELAY_SECONDS as i64) as u64;
        return Some(Duration::from_secs(seconds));
    }

    if status.is_server_error() {
        return Some(Duration::from_secs(SERVER_ERROR_DELAY_SECONDS));
    }

    None
}

fn header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}
