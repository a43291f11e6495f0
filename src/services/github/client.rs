use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, LINK, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use url::Url;

use super::graphql::{self, ContributedToData, GraphQlResponse, SearchData, SEARCH_PAGE_SIZE};
use super::{Connection, EventPage, GitHubApi, SearchNode};
use crate::error::{ApiError, RetryPolicy};
use crate::models::entity::{Issue, PullRequest};
use crate::models::event::RawEvent;
use crate::models::repository::Repository;
use crate::utils::config::Config;
use crate::utils::http_client::create_http_client;

const BASE_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(30);
const MAX_SERVER_HINT: Duration = Duration::from_secs(60);

/// GitHub REST + GraphQL client authenticated with a personal access token
pub struct GitHubClient {
    http: Client,
    token: String,
    api_base_url: String,
    graphql_url: String,
    max_retries: u32,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Ok(Self {
            http: create_http_client(Duration::from_secs(config.http_timeout_secs))?,
            token: config.github_token.clone(),
            api_base_url: config.api_base_url.clone(),
            graphql_url: config.graphql_url.clone(),
            max_retries: config.max_retries,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    /// Send the request built by `build`, retrying transient failures with
    /// exponential backoff.
    async fn send<F>(&self, build: F) -> Result<Response, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        let build = &build;
        retry_with(self.max_retries, move || async move {
            match self.authorized(build()).send().await {
                Ok(response) if response.status().is_success() => Ok(response),
                Ok(response) => Err(status_error(response).await),
                Err(e) => Err(ApiError::Request(e)),
            }
        })
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<(T, HeaderMap), ApiError> {
        let url = format!("{}{}", self.api_base_url, path);
        let response = self.send(|| self.http.get(&url).query(query)).await?;
        let headers = response.headers().clone();
        let body = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("GET {}: {}", path, e)))?;
        Ok((body, headers))
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ApiError> {
        let body = json!({
            "query": query,
            "variables": variables,
        });
        let response = self
            .send(|| self.http.post(&self.graphql_url).json(&body))
            .await?;
        let response: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("GraphQL response: {}", e)))?;
        response.into_data()
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn authenticated_user(&self) -> Result<String, ApiError> {
        let (user, _): (GitHubUser, _) = self.get_json("/user", &[]).await?;
        Ok(user.login)
    }

    async fn list_user_events(
        &self,
        user: &str,
        page: u32,
        per_page: u32,
    ) -> Result<EventPage, ApiError> {
        let (events, headers): (Vec<RawEvent>, _) = self
            .get_json(
                &format!("/users/{}/events", user),
                &[("per_page", per_page.to_string()), ("page", page.to_string())],
            )
            .await?;

        log::info!("📥 Fetched {} events from GitHub (page {})", events.len(), page);

        Ok(EventPage {
            events,
            next_page: next_page(&headers),
        })
    }

    async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository, ApiError> {
        let (repo, _) = self
            .get_json(&format!("/repos/{}/{}", owner, name), &[])
            .await?;
        Ok(repo)
    }

    async fn get_issue(&self, owner: &str, name: &str, number: u64) -> Result<Issue, ApiError> {
        let (issue, _) = self
            .get_json(&format!("/repos/{}/{}/issues/{}", owner, name, number), &[])
            .await?;
        Ok(issue)
    }

    async fn get_pull_request(
        &self,
        owner: &str,
        name: &str,
        number: u64,
    ) -> Result<PullRequest, ApiError> {
        let (pr, _): (PullRequest, _) = self
            .get_json(&format!("/repos/{}/{}/pulls/{}", owner, name, number), &[])
            .await?;
        Ok(pr.normalized())
    }

    async fn search_contributions(
        &self,
        query: &str,
        after: Option<&str>,
    ) -> Result<Connection<SearchNode>, ApiError> {
        let data: SearchData = self
            .graphql(
                &graphql::search_query(),
                json!({
                    "searchQuery": query,
                    "first": SEARCH_PAGE_SIZE,
                    "after": after,
                }),
            )
            .await?;
        Ok(data.into_connection())
    }

    async fn repositories_contributed_to(
        &self,
        user: &str,
        after: Option<&str>,
    ) -> Result<Connection<Repository>, ApiError> {
        let data: ContributedToData = self
            .graphql(
                &graphql::contributed_to_query(),
                json!({
                    "login": user,
                    "first": SEARCH_PAGE_SIZE,
                    "after": after,
                }),
            )
            .await?;
        data.into_connection(user)
    }
}

/// Run `attempt` until it succeeds, fails for good or `max_retries`
/// retries are used up.
async fn retry_with<F, Fut, T>(max_retries: u32, mut attempt: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut retries = 0;
    loop {
        let err = match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        match err.retry_policy() {
            RetryPolicy::Retryable { after } if retries < max_retries => {
                let delay = backoff_delay(retries, after);
                retries += 1;
                let cause = std::error::Error::source(&err)
                    .map(|source| format!(": {}", source))
                    .unwrap_or_default();
                log::warn!(
                    "⏳ GitHub request failed ({}{}), retrying in {:?} (attempt {}/{})",
                    err,
                    cause,
                    delay,
                    retries,
                    max_retries
                );
                tokio::time::sleep(delay).await;
            }
            _ => return Err(err),
        }
    }
}

async fn status_error(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let retry_after = retry_after_hint(response.headers(), Utc::now().timestamp());
    let body = response.text().await.unwrap_or_default();
    ApiError::Status {
        status,
        body,
        retry_after,
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Delay the server asks for: `Retry-After`, or the reset time of an
/// exhausted rate limit.
fn retry_after_hint(headers: &HeaderMap, now: i64) -> Option<Duration> {
    if let Some(secs) = header_str(headers, RETRY_AFTER.as_str()).and_then(|v| v.parse::<u64>().ok()) {
        return Some(Duration::from_secs(secs));
    }
    if header_str(headers, "x-ratelimit-remaining") == Some("0") {
        let reset: i64 = header_str(headers, "x-ratelimit-reset")?.parse().ok()?;
        return Some(Duration::from_secs((reset - now).max(0) as u64));
    }
    None
}

fn backoff_delay(attempt: u32, hint: Option<Duration>) -> Duration {
    match hint {
        Some(hint) => hint.min(MAX_SERVER_HINT),
        None => (BASE_BACKOFF * 2u32.saturating_pow(attempt)).min(MAX_BACKOFF),
    }
}

/// Page number of the `rel="next"` target of a `Link` header
fn next_page(headers: &HeaderMap) -> Option<u32> {
    let link = header_str(headers, LINK.as_str())?;
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        if !params.split(';').any(|param| param.trim() == "rel=\"next\"") {
            return None;
        }
        let target = target.trim().trim_start_matches('<').trim_end_matches('>');
        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}
