use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an issue or pull request.
///
/// REST responses use lowercase (`"open"`), GraphQL uses uppercase (`"OPEN"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    #[serde(alias = "OPEN")]
    Open,
    #[serde(alias = "CLOSED")]
    Closed,
    #[serde(alias = "MERGED")]
    Merged,
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            State::Open => write!(f, "open"),
            State::Closed => write!(f, "closed"),
            State::Merged => write!(f, "merged"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Stable id, distinct from the repository-local `number`
    pub id: i64,
    pub number: u64,
    pub title: String,
    pub state: State,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: i64,
    pub number: u64,
    pub title: String,
    pub state: State,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub merged: bool,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// REST reports merged pull requests as `closed` plus a `merged` flag;
    /// fold that into [`State::Merged`].
    pub fn normalized(mut self) -> Self {
        if self.merged || self.merged_at.is_some() {
            self.state = State::Merged;
            self.merged = true;
        }
        self
    }
}

/// Issue comment carried in an `IssueCommentEvent` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    #[serde(default)]
    pub body: String,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
}
