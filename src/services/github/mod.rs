pub mod client;
pub mod graphql;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::entity::{Issue, PullRequest};
use crate::models::event::RawEvent;
use crate::models::repository::Repository;

pub use client::GitHubClient;

/// One page of a user's activity feed, newest event first
#[derive(Debug, Clone, Default)]
pub struct EventPage {
    pub events: Vec<RawEvent>,
    /// Page number to request next; `None` on the last page
    pub next_page: Option<u32>,
}

/// One page of a GraphQL connection
#[derive(Debug, Clone)]
pub struct Connection<T> {
    pub nodes: Vec<T>,
    /// Cursor of the following page; `None` on the last page
    pub end_cursor: Option<String>,
}

/// Issue or pull request returned by the contribution search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchNode {
    Issue { issue: Issue, repo: Repository },
    PullRequest { pull_request: PullRequest, repo: Repository },
}

/// The slice of the GitHub API the aggregation passes read from.
///
/// Implemented over HTTP by [`GitHubClient`]; tests use an in-memory fake.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Login of the user the token belongs to
    async fn authenticated_user(&self) -> Result<String, ApiError>;

    /// `GET /users/{user}/events`, 1-based `page`
    async fn list_user_events(
        &self,
        user: &str,
        page: u32,
        per_page: u32,
    ) -> Result<EventPage, ApiError>;

    async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository, ApiError>;

    async fn get_issue(&self, owner: &str, name: &str, number: u64) -> Result<Issue, ApiError>;

    async fn get_pull_request(
        &self,
        owner: &str,
        name: &str,
        number: u64,
    ) -> Result<PullRequest, ApiError>;

    /// GraphQL issue search (covers pull requests too)
    async fn search_contributions(
        &self,
        query: &str,
        after: Option<&str>,
    ) -> Result<Connection<SearchNode>, ApiError>;

    /// GraphQL `repositoriesContributedTo` of `user`
    async fn repositories_contributed_to(
        &self,
        user: &str,
        after: Option<&str>,
    ) -> Result<Connection<Repository>, ApiError>;
}
