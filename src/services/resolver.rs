use crate::error::{Error, Result};
use crate::models::entity::{Issue, PullRequest};
use crate::models::repository::Repository;
use crate::services::github::GitHubApi;
use crate::utils::cancel::Cancellation;
use crate::utils::validators::split_repo_name;

/// Fetches the current state of repositories, issues and pull requests.
///
/// Every call hits the API; results are never cached, so a record always
/// reflects the state at the time the event was processed.
pub struct Resolver<'a> {
    api: &'a dyn GitHubApi,
}

impl<'a> Resolver<'a> {
    pub fn new(api: &'a dyn GitHubApi) -> Self {
        Self { api }
    }

    /// Resolve a repository from its `owner/name` identifier
    pub async fn repository(&self, identifier: &str, cancel: &Cancellation) -> Result<Repository> {
        let (owner, name) = split_repo_name(identifier)?;
        cancel
            .run(async {
                self.api
                    .get_repository(owner, name)
                    .await
                    .map_err(|e| Error::resolution(format!("repository {}", identifier), e))
            })
            .await
    }

    pub async fn issue(
        &self,
        repo: &Repository,
        number: u64,
        cancel: &Cancellation,
    ) -> Result<Issue> {
        let identifier = repo.identifier();
        let (owner, name) = split_repo_name(identifier)?;
        cancel
            .run(async {
                self.api
                    .get_issue(owner, name, number)
                    .await
                    .map_err(|e| Error::resolution(format!("issue {}#{}", identifier, number), e))
            })
            .await
    }

    pub async fn pull_request(
        &self,
        repo: &Repository,
        number: u64,
        cancel: &Cancellation,
    ) -> Result<PullRequest> {
        let identifier = repo.identifier();
        let (owner, name) = split_repo_name(identifier)?;
        cancel
            .run(async {
                self.api.get_pull_request(owner, name, number).await.map_err(|e| {
                    Error::resolution(format!("pull request {}#{}", identifier, number), e)
                })
            })
            .await
    }
}
