use serde::Serialize;

use super::entity::{Comment, Issue, PullRequest};
use super::language_tally::LanguageTally;
use super::repository::Repository;
use super::store::EntityStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PullRequestWithRepository {
    pub pull_request: PullRequest,
    pub repo: Repository,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueWithRepository {
    pub issue: Issue,
    /// Set when the issue was collected from a comment event; the entry is
    /// then keyed by the comment id.
    pub comment: Option<Comment>,
    pub repo: Repository,
}

/// Result of one aggregation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContributionAggregate {
    pull_requests: EntityStore<PullRequestWithRepository>,
    issues: EntityStore<IssueWithRepository>,
    languages: LanguageTally,
    contributed_repositories: Vec<Repository>,
}

impl ContributionAggregate {
    pub fn new(
        pull_requests: EntityStore<PullRequestWithRepository>,
        issues: EntityStore<IssueWithRepository>,
        languages: LanguageTally,
    ) -> Self {
        Self {
            pull_requests,
            issues,
            languages,
            contributed_repositories: Vec::new(),
        }
    }

    pub fn with_contributed_repositories(mut self, repositories: Vec<Repository>) -> Self {
        self.contributed_repositories = repositories;
        self
    }

    pub fn pull_requests(&self) -> &EntityStore<PullRequestWithRepository> {
        &self.pull_requests
    }

    pub fn issues(&self) -> &EntityStore<IssueWithRepository> {
        &self.issues
    }

    pub fn languages(&self) -> &LanguageTally {
        &self.languages
    }

    pub fn contributed_repositories(&self) -> &[Repository] {
        &self.contributed_repositories
    }
}
