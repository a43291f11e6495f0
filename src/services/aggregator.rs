use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::models::aggregate::{ContributionAggregate, IssueWithRepository, PullRequestWithRepository};
use crate::models::language_tally::LanguageTally;
use crate::models::repository::Repository;
use crate::models::store::EntityStore;
use crate::services::collector::{Collected, EventCollector};
use crate::services::github::graphql::contribution_search;
use crate::services::github::{GitHubApi, SearchNode};
use crate::services::pagination::EventFeed;
use crate::utils::cancel::Cancellation;

/// Builds a [`ContributionAggregate`] for one user in a single pass.
///
/// Each call starts from empty stores. A failure anywhere in the pass is
/// returned as is and the partial aggregate is dropped.
pub struct ContributionAggregator<'a> {
    api: &'a dyn GitHubApi,
    per_page: u32,
}

impl<'a> ContributionAggregator<'a> {
    pub fn new(api: &'a dyn GitHubApi, per_page: u32) -> Self {
        Self { api, per_page }
    }

    /// The configured user, or the owner of the token when none is configured
    pub async fn resolve_user(&self, configured: Option<&str>, cancel: &Cancellation) -> Result<String> {
        if let Some(user) = configured {
            return Ok(user.to_string());
        }
        let user = cancel
            .run(async {
                self.api
                    .authenticated_user()
                    .await
                    .map_err(|e| Error::transport("getting authenticated user", e))
            })
            .await?;
        log::info!("👤 Aggregating contributions of authenticated user {}", user);
        Ok(user)
    }

    /// Walk the activity feed of `user` back to `earliest`.
    pub async fn aggregate(
        &self,
        user: &str,
        earliest: DateTime<Utc>,
        cancel: &Cancellation,
    ) -> Result<ContributionAggregate> {
        log::info!("🔍 Collecting events of {} since {}", user, earliest);

        let mut feed = EventFeed::new(self.api, user, earliest, self.per_page);
        let mut collector = EventCollector::new(self.api);
        let (mut duplicates, mut skipped) = (0, 0);

        while let Some(event) = feed.next_event(cancel).await? {
            match collector.collect(&event, cancel).await? {
                Collected::Stored => {}
                Collected::Duplicate => duplicates += 1,
                Collected::Skipped => skipped += 1,
            }
        }

        let aggregate = collector.finish();
        log::info!(
            "📊 Collected {} issues and {} pull requests from {} page(s) ({} duplicate, {} skipped events, {})",
            aggregate.issues().len(),
            aggregate.pull_requests().len(),
            feed.pages_fetched(),
            duplicates,
            skipped,
            if feed.reached_cutoff() { "stopped at cutoff" } else { "end of feed" }
        );
        Ok(aggregate)
    }

    /// Build the aggregate from the GraphQL contribution search instead of
    /// the activity feed. Search results already carry current state, so no
    /// further resolution happens.
    pub async fn aggregate_from_search(
        &self,
        user: &str,
        earliest: DateTime<Utc>,
        cancel: &Cancellation,
    ) -> Result<ContributionAggregate> {
        let query = contribution_search(user, earliest);
        log::info!("🔍 Searching contributions: {}", query);

        let mut pull_requests = EntityStore::new();
        let mut issues = EntityStore::new();
        let mut languages = LanguageTally::new();
        let mut after: Option<String> = None;

        loop {
            let page = cancel
                .run(async {
                    self.api
                        .search_contributions(&query, after.as_deref())
                        .await
                        .map_err(|e| Error::transport(format!("searching contributions of {}", user), e))
                })
                .await?;

            for node in page.nodes {
                match node {
                    SearchNode::Issue { issue, repo } if issue.updated_at > earliest => {
                        let language = repo.language.clone();
                        issues.insert_if_absent(
                            issue.id,
                            IssueWithRepository {
                                issue,
                                comment: None,
                                repo,
                            },
                        );
                        languages.increment(language.as_deref());
                    }
                    SearchNode::PullRequest { pull_request, repo }
                        if pull_request.updated_at > earliest =>
                    {
                        let language = repo.language.clone();
                        pull_requests.insert_if_absent(
                            pull_request.id,
                            PullRequestWithRepository { pull_request, repo },
                        );
                        languages.increment(language.as_deref());
                    }
                    _ => {}
                }
            }

            match page.end_cursor {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        let repositories = self.contributed_repositories(user, cancel).await?;
        log::info!(
            "📊 Found {} issues, {} pull requests and {} contributed repositories",
            issues.len(),
            pull_requests.len(),
            repositories.len()
        );

        Ok(ContributionAggregate::new(pull_requests, issues, languages)
            .with_contributed_repositories(repositories))
    }

    async fn contributed_repositories(&self, user: &str, cancel: &Cancellation) -> Result<Vec<Repository>> {
        let mut repositories = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let page = cancel
                .run(async {
                    self.api
                        .repositories_contributed_to(user, after.as_deref())
                        .await
                        .map_err(|e| {
                            Error::transport(format!("listing repositories {} contributed to", user), e)
                        })
                })
                .await?;
            repositories.extend(page.nodes);
            match page.end_cursor {
                Some(cursor) => after = Some(cursor),
                None => return Ok(repositories),
            }
        }
    }
}
