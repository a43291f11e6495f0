use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::entity::{Comment, State};
use crate::error::{Error, Result};

/// One entry of `GET /users/{user}/events`.
///
/// The payload is kept raw until the event is classified, since its shape
/// depends on `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub created_at: DateTime<Utc>,
    pub repo: EventRepo,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Repository reference embedded in an event; `name` is `owner/name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRepo {
    pub id: i64,
    pub name: String,
}

/// Event kinds the collector understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Issues,
    IssueComment,
    PullRequest,
    Other,
}

impl EventKind {
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "IssuesEvent" => EventKind::Issues,
            "IssueCommentEvent" => EventKind::IssueComment,
            "PullRequestEvent" => EventKind::PullRequest,
            _ => EventKind::Other,
        }
    }
}

/// Issue as referenced from an event payload.
///
/// Only the identity is trusted; `state` may be stale and is kept for logging.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IssueRef {
    pub id: i64,
    pub number: u64,
    #[serde(default)]
    pub state: Option<State>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PullRequestRef {
    pub id: i64,
    pub number: u64,
    #[serde(default)]
    pub state: Option<State>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IssuesPayload {
    #[serde(default)]
    pub action: String,
    pub issue: IssueRef,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IssueCommentPayload {
    #[serde(default)]
    pub action: String,
    pub issue: IssueRef,
    pub comment: Comment,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PullRequestPayload {
    #[serde(default)]
    pub action: String,
    pub pull_request: PullRequestRef,
}

/// Decoded payload of an event
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    Issues(IssuesPayload),
    IssueComment(IssueCommentPayload),
    PullRequest(PullRequestPayload),
    Ignored,
}

impl RawEvent {
    pub fn kind(&self) -> EventKind {
        EventKind::from_type(&self.event_type)
    }

    /// Decode the payload according to the event's kind.
    /// Unhandled kinds decode to [`EventPayload::Ignored`] without looking at the payload.
    pub fn decode(&self) -> Result<EventPayload> {
        match self.kind() {
            EventKind::Issues => self.decode_payload().map(EventPayload::Issues),
            EventKind::IssueComment => self.decode_payload().map(EventPayload::IssueComment),
            EventKind::PullRequest => self.decode_payload().map(EventPayload::PullRequest),
            EventKind::Other => Ok(EventPayload::Ignored),
        }
    }

    fn decode_payload<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.payload).map_err(|source| Error::PayloadDecodeFailed {
            event_id: self.id.clone(),
            kind: self.event_type.clone(),
            source,
        })
    }
}
