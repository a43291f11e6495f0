//! In-memory [`GitHubApi`] used by the pipeline tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::{Connection, EventPage, GitHubApi, SearchNode};
use crate::error::ApiError;
use crate::models::entity::{Issue, PullRequest};
use crate::models::event::RawEvent;
use crate::models::repository::Repository;

#[derive(Default)]
pub struct FakeGitHub {
    login: String,
    pages: Vec<Vec<RawEvent>>,
    failing_pages: HashSet<u32>,
    repositories: HashMap<String, Repository>,
    issues: HashMap<(String, u64), Issue>,
    pull_requests: HashMap<(String, u64), PullRequest>,
    search_pages: Vec<Vec<SearchNode>>,
    contributed: Vec<Repository>,
    calls: Mutex<Vec<String>>,
}

fn not_found(what: String) -> ApiError {
    ApiError::Status {
        status: 404,
        body: format!("{} Not Found", what),
        retry_after: None,
    }
}

impl FakeGitHub {
    pub fn new(login: &str) -> Self {
        Self {
            login: login.to_string(),
            ..Self::default()
        }
    }

    pub fn with_page(mut self, events: Vec<RawEvent>) -> Self {
        self.pages.push(events);
        self
    }

    /// Make the request for 1-based `page` fail with a server error
    pub fn with_failing_page(mut self, page: u32) -> Self {
        self.failing_pages.insert(page);
        self
    }

    pub fn with_repository(mut self, repo: Repository) -> Self {
        self.repositories.insert(repo.identifier().to_string(), repo);
        self
    }

    pub fn with_issue(mut self, repo: &str, issue: Issue) -> Self {
        self.issues.insert((repo.to_string(), issue.number), issue);
        self
    }

    pub fn with_pull_request(mut self, repo: &str, pr: PullRequest) -> Self {
        self.pull_requests.insert((repo.to_string(), pr.number), pr);
        self
    }

    pub fn with_search_page(mut self, nodes: Vec<SearchNode>) -> Self {
        self.search_pages.push(nodes);
        self
    }

    pub fn with_contributed(mut self, repos: Vec<Repository>) -> Self {
        self.contributed = repos;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn cursor_index(after: Option<&str>) -> usize {
    after.and_then(|c| c.parse().ok()).unwrap_or(0)
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn authenticated_user(&self) -> Result<String, ApiError> {
        self.record("user".to_string());
        Ok(self.login.clone())
    }

    async fn list_user_events(
        &self,
        user: &str,
        page: u32,
        per_page: u32,
    ) -> Result<EventPage, ApiError> {
        self.record(format!("events {} page={} per_page={}", user, page, per_page));
        if self.failing_pages.contains(&page) {
            return Err(ApiError::Status {
                status: 502,
                body: "Bad Gateway".to_string(),
                retry_after: None,
            });
        }
        let index = page as usize - 1;
        Ok(EventPage {
            events: self.pages.get(index).cloned().unwrap_or_default(),
            next_page: (index + 1 < self.pages.len()).then(|| page + 1),
        })
    }

    async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository, ApiError> {
        let full_name = format!("{}/{}", owner, name);
        self.record(format!("repo {}", full_name));
        self.repositories
            .get(&full_name)
            .cloned()
            .ok_or_else(|| not_found(full_name))
    }

    async fn get_issue(&self, owner: &str, name: &str, number: u64) -> Result<Issue, ApiError> {
        let full_name = format!("{}/{}", owner, name);
        self.record(format!("issue {}#{}", full_name, number));
        self.issues
            .get(&(full_name.clone(), number))
            .cloned()
            .ok_or_else(|| not_found(format!("{}#{}", full_name, number)))
    }

    async fn get_pull_request(
        &self,
        owner: &str,
        name: &str,
        number: u64,
    ) -> Result<PullRequest, ApiError> {
        let full_name = format!("{}/{}", owner, name);
        self.record(format!("pull {}#{}", full_name, number));
        self.pull_requests
            .get(&(full_name.clone(), number))
            .cloned()
            .ok_or_else(|| not_found(format!("{}#{}", full_name, number)))
    }

    async fn search_contributions(
        &self,
        query: &str,
        after: Option<&str>,
    ) -> Result<Connection<SearchNode>, ApiError> {
        self.record(format!("search {}", query));
        let index = cursor_index(after);
        Ok(Connection {
            nodes: self.search_pages.get(index).cloned().unwrap_or_default(),
            end_cursor: (index + 1 < self.search_pages.len()).then(|| (index + 1).to_string()),
        })
    }

    async fn repositories_contributed_to(
        &self,
        user: &str,
        after: Option<&str>,
    ) -> Result<Connection<Repository>, ApiError> {
        self.record(format!("contributed {}", user));
        let nodes = if after.is_none() {
            self.contributed.clone()
        } else {
            Vec::new()
        };
        Ok(Connection {
            nodes,
            end_cursor: None,
        })
    }
}
