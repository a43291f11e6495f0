use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::models::event::RawEvent;
use crate::services::github::GitHubApi;
use crate::utils::cancel::Cancellation;

/// Newest-first walk over a user's activity feed.
///
/// The feed is assumed to be ordered newest-first across and within pages,
/// so the first event at or before `earliest` ends the walk: no later event
/// is yielded and no further page is requested.
pub struct EventFeed<'a> {
    api: &'a dyn GitHubApi,
    user: String,
    per_page: u32,
    earliest: DateTime<Utc>,
    buffered: VecDeque<RawEvent>,
    next_page: Option<u32>,
    pages_fetched: u32,
    reached_cutoff: bool,
}

impl<'a> EventFeed<'a> {
    pub fn new(api: &'a dyn GitHubApi, user: &str, earliest: DateTime<Utc>, per_page: u32) -> Self {
        Self {
            api,
            user: user.to_string(),
            per_page,
            earliest,
            buffered: VecDeque::new(),
            next_page: Some(1),
            pages_fetched: 0,
            reached_cutoff: false,
        }
    }

    /// Next event newer than the cutoff, or `None` once the cutoff or the
    /// last page has been reached.
    pub async fn next_event(&mut self, cancel: &Cancellation) -> Result<Option<RawEvent>> {
        loop {
            if self.reached_cutoff {
                return Ok(None);
            }

            if let Some(event) = self.buffered.pop_front() {
                if event.created_at <= self.earliest {
                    log::info!(
                        "⏹️  Reached cutoff {} at event {} ({}) after {} page(s)",
                        self.earliest,
                        event.id,
                        event.created_at,
                        self.pages_fetched
                    );
                    self.reached_cutoff = true;
                    self.buffered.clear();
                    self.next_page = None;
                    return Ok(None);
                }
                return Ok(Some(event));
            }

            let Some(page) = self.next_page else {
                return Ok(None);
            };

            let fetched = cancel
                .run(async {
                    self.api
                        .list_user_events(&self.user, page, self.per_page)
                        .await
                        .map_err(|e| {
                            Error::transport(
                                format!("listing events of {} (page {})", self.user, page),
                                e,
                            )
                        })
                })
                .await?;

            self.pages_fetched += 1;
            self.next_page = if fetched.events.is_empty() {
                None
            } else {
                fetched.next_page
            };
            self.buffered.extend(fetched.events);
        }
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    pub fn reached_cutoff(&self) -> bool {
        self.reached_cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_fixtures::{at, push_event};
    use crate::services::github::fake::FakeGitHub;

    const REPO: &str = "acme/widgets";

    async fn drain(feed: &mut EventFeed<'_>) -> Result<Vec<String>> {
        let cancel = Cancellation::none();
        let mut ids = Vec::new();
        while let Some(event) = feed.next_event(&cancel).await? {
            ids.push(event.id);
        }
        Ok(ids)
    }

    #[tokio::test]
    async fn test_walks_all_pages() {
        let api = FakeGitHub::new("octocat")
            .with_page(vec![push_event("a", REPO, at(50)), push_event("b", REPO, at(40))])
            .with_page(vec![push_event("c", REPO, at(30))]);
        let mut feed = EventFeed::new(&api, "octocat", at(0), 2);

        assert_eq!(drain(&mut feed).await.unwrap(), vec!["a", "b", "c"]);
        assert_eq!(feed.pages_fetched(), 2);
        assert!(!feed.reached_cutoff());
        assert_eq!(
            api.calls(),
            vec!["events octocat page=1 per_page=2", "events octocat page=2 per_page=2"]
        );
    }

    #[tokio::test]
    async fn test_cutoff_stops_paging() {
        // Event "d" is at the cutoff; "e" and page 3 must never be reached.
        let api = FakeGitHub::new("octocat")
            .with_page(vec![push_event("a", REPO, at(50)), push_event("b", REPO, at(40))])
            .with_page(vec![
                push_event("c", REPO, at(30)),
                push_event("d", REPO, at(20)),
                push_event("e", REPO, at(25)),
            ])
            .with_page(vec![push_event("f", REPO, at(15))]);
        let mut feed = EventFeed::new(&api, "octocat", at(20), 10);

        assert_eq!(drain(&mut feed).await.unwrap(), vec!["a", "b", "c"]);
        assert!(feed.reached_cutoff());
        assert_eq!(api.calls_starting_with("events"), 2);

        let next = feed.next_event(&Cancellation::none()).await.unwrap();
        assert!(next.is_none());
        assert_eq!(api.calls_starting_with("events"), 2);
    }

    #[tokio::test]
    async fn test_empty_page_ends_feed() {
        let api = FakeGitHub::new("octocat").with_page(vec![]);
        let mut feed = EventFeed::new(&api, "octocat", at(0), 10);

        assert!(drain(&mut feed).await.unwrap().is_empty());
        assert_eq!(feed.pages_fetched(), 1);
    }

    #[tokio::test]
    async fn test_page_failure_is_transport_error() {
        let api = FakeGitHub::new("octocat")
            .with_page(vec![push_event("a", REPO, at(50))])
            .with_page(vec![push_event("b", REPO, at(40))])
            .with_failing_page(2);
        let mut feed = EventFeed::new(&api, "octocat", at(0), 1);
        let cancel = Cancellation::none();

        assert!(feed.next_event(&cancel).await.unwrap().is_some());
        match feed.next_event(&cancel).await {
            Err(Error::Transport { context, .. }) => {
                assert_eq!(context, "listing events of octocat (page 2)")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancelled_feed() {
        let api = FakeGitHub::new("octocat").with_page(vec![push_event("a", REPO, at(50))]);
        let mut feed = EventFeed::new(&api, "octocat", at(0), 10);
        let (handle, cancel) = Cancellation::new();
        handle.cancel();

        assert!(matches!(feed.next_event(&cancel).await, Err(Error::Cancelled)));
        assert!(api.calls().is_empty());
    }
}
