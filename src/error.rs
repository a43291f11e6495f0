use std::time::Duration;

use thiserror::Error;

/// Whether a failed API call may be attempted again, and after what delay.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryPolicy {
    /// `after` is the server's hint (`Retry-After`, `x-ratelimit-reset`), if any.
    Retryable { after: Option<Duration> },
    NonRetryable,
}

/// Failure of a single call against the GitHub REST or GraphQL API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed")]
    Request(#[from] reqwest::Error),

    #[error("GitHub API returned status {status}: {body}")]
    Status {
        status: u16,
        body: String,
        retry_after: Option<Duration>,
    },

    #[error("GitHub GraphQL errors: {0}")]
    GraphQl(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            ApiError::Request(e) if e.is_timeout() || e.is_connect() => {
                RetryPolicy::Retryable { after: None }
            }
            ApiError::Status {
                status,
                retry_after,
                ..
            } if *status == 429 || *status >= 500 || retry_after.is_some() => {
                RetryPolicy::Retryable {
                    after: *retry_after,
                }
            }
            _ => RetryPolicy::NonRetryable,
        }
    }
}

/// Errors that abort an aggregation pass.
///
/// There is no per-event recovery: whatever was collected before the failure
/// is discarded by the caller.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid repository identifier {0:?}: expected exactly one '/' between owner and name")]
    InvalidRepoIdentifier(String),

    #[error("{context}")]
    Transport {
        context: String,
        #[source]
        source: ApiError,
    },

    #[error("resolving {target}")]
    ResolutionFailed {
        target: String,
        #[source]
        source: ApiError,
    },

    #[error("decoding {kind} payload of event {event_id}")]
    PayloadDecodeFailed {
        event_id: String,
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("aggregation cancelled")]
    Cancelled,

    #[error("aggregation deadline exceeded")]
    DeadlineExceeded,
}

impl Error {
    pub fn transport(context: impl Into<String>, source: ApiError) -> Self {
        Error::Transport {
            context: context.into(),
            source,
        }
    }

    pub fn resolution(target: impl Into<String>, source: ApiError) -> Self {
        Error::ResolutionFailed {
            target: target.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
