use crate::error::Result;
use crate::models::aggregate::{ContributionAggregate, IssueWithRepository, PullRequestWithRepository};
use crate::models::entity::{Comment, State};
use crate::models::event::{EventKind, EventPayload, IssueRef, RawEvent};
use crate::models::language_tally::LanguageTally;
use crate::models::repository::Repository;
use crate::models::store::EntityStore;
use crate::services::github::GitHubApi;
use crate::services::resolver::Resolver;
use crate::utils::cancel::Cancellation;

/// What happened to one event fed to [`EventCollector::collect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collected {
    /// First event for this identity; its entity was stored
    Stored,
    /// The identity was already stored by an earlier event
    Duplicate,
    /// Event kind outside the contribution summary
    Skipped,
}

/// Classifies feed events, resolves what they reference and stores it.
///
/// Events must be fed in feed order: the first event for an identity wins.
pub struct EventCollector<'a> {
    resolver: Resolver<'a>,
    pull_requests: EntityStore<PullRequestWithRepository>,
    issues: EntityStore<IssueWithRepository>,
    languages: LanguageTally,
}

impl<'a> EventCollector<'a> {
    pub fn new(api: &'a dyn GitHubApi) -> Self {
        Self {
            resolver: Resolver::new(api),
            pull_requests: EntityStore::new(),
            issues: EntityStore::new(),
            languages: LanguageTally::new(),
        }
    }

    pub async fn collect(&mut self, event: &RawEvent, cancel: &Cancellation) -> Result<Collected> {
        let repo = self.resolver.repository(&event.repo.name, cancel).await?;

        if event.kind() == EventKind::Other {
            log::debug!("Skipping {} {}", event.event_type, event.id);
            return Ok(Collected::Skipped);
        }

        let inserted = match event.decode()? {
            EventPayload::Issues(payload) => {
                self.collect_issue(&payload.issue, None, &repo, cancel).await?
            }
            EventPayload::IssueComment(payload) => {
                self.collect_issue(&payload.issue, Some(payload.comment), &repo, cancel)
                    .await?
            }
            EventPayload::PullRequest(payload) => {
                let pull_request = self
                    .resolver
                    .pull_request(&repo, payload.pull_request.number, cancel)
                    .await?;
                log_stale_state(
                    &pull_request.html_url,
                    payload.pull_request.state,
                    pull_request.state,
                );
                self.pull_requests.insert_if_absent(
                    pull_request.id,
                    PullRequestWithRepository {
                        pull_request,
                        repo: repo.clone(),
                    },
                )
            }
            EventPayload::Ignored => return Ok(Collected::Skipped),
        };

        self.languages.increment(repo.language.as_deref());

        if inserted {
            Ok(Collected::Stored)
        } else {
            log::debug!("Event {} references an already collected entity", event.id);
            Ok(Collected::Duplicate)
        }
    }

    /// Store an issue under its own id, or under the comment id when it was
    /// reached through a comment.
    async fn collect_issue(
        &mut self,
        issue_ref: &IssueRef,
        comment: Option<Comment>,
        repo: &Repository,
        cancel: &Cancellation,
    ) -> Result<bool> {
        let issue = self.resolver.issue(repo, issue_ref.number, cancel).await?;
        log_stale_state(&issue.html_url, issue_ref.state, issue.state);

        let key = comment.as_ref().map_or(issue.id, |comment| comment.id);
        Ok(self.issues.insert_if_absent(
            key,
            IssueWithRepository {
                issue,
                comment,
                repo: repo.clone(),
            },
        ))
    }

    pub fn finish(self) -> ContributionAggregate {
        ContributionAggregate::new(self.pull_requests, self.issues, self.languages)
    }
}

fn log_stale_state(subject: &str, from_event: Option<State>, current: State) {
    if let Some(stale) = from_event.filter(|stale| *stale != current) {
        log::debug!("{}: event says {}, now {}", subject, stale, current);
    }
}
