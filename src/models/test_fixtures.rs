//! Record builders shared by the unit tests.

use chrono::{DateTime, TimeZone, Utc};

use super::entity::{Comment, Issue, PullRequest, State};
use super::event::{EventRepo, RawEvent};
use super::repository::Repository;

pub fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, minute, 0).unwrap()
}

pub fn repository(full_name: &str, language: Option<&str>) -> Repository {
    let name = full_name.rsplit('/').next().unwrap_or(full_name).to_string();
    Repository {
        id: full_name.len() as i64,
        name,
        full_name: Some(full_name.to_string()),
        language: language.map(str::to_string),
        description: None,
        stargazers_count: 0,
        html_url: Some(format!("https://github.com/{}", full_name)),
    }
}

pub fn issue(id: i64, number: u64, state: State) -> Issue {
    Issue {
        id,
        number,
        title: format!("Issue #{}", number),
        state,
        html_url: format!("https://github.com/acme/widgets/issues/{}", number),
        created_at: at(0),
        updated_at: at(1),
        closed_at: None,
    }
}

pub fn pull_request(id: i64, number: u64, state: State) -> PullRequest {
    PullRequest {
        id,
        number,
        title: format!("PR #{}", number),
        state,
        html_url: format!("https://github.com/acme/widgets/pull/{}", number),
        created_at: at(0),
        updated_at: at(1),
        merged: state == State::Merged,
        merged_at: None,
    }
}

pub fn comment(id: i64) -> Comment {
    Comment {
        id,
        body: "Same here".to_string(),
        html_url: format!("https://github.com/acme/widgets/issues/5#issuecomment-{}", id),
        created_at: at(2),
    }
}

fn raw_event(
    id: &str,
    event_type: &str,
    repo: &str,
    created_at: DateTime<Utc>,
    payload: serde_json::Value,
) -> RawEvent {
    RawEvent {
        id: id.to_string(),
        event_type: event_type.to_string(),
        created_at,
        repo: EventRepo {
            id: 1,
            name: repo.to_string(),
        },
        payload,
    }
}

pub fn issues_event(id: &str, repo: &str, created_at: DateTime<Utc>, issue: &Issue, stale: State) -> RawEvent {
    raw_event(
        id,
        "IssuesEvent",
        repo,
        created_at,
        serde_json::json!({
            "action": "opened",
            "issue": {"id": issue.id, "number": issue.number, "state": stale, "title": issue.title}
        }),
    )
}

pub fn issue_comment_event(
    id: &str,
    repo: &str,
    created_at: DateTime<Utc>,
    issue: &Issue,
    comment: &Comment,
) -> RawEvent {
    raw_event(
        id,
        "IssueCommentEvent",
        repo,
        created_at,
        serde_json::json!({
            "action": "created",
            "issue": {"id": issue.id, "number": issue.number},
            "comment": comment
        }),
    )
}

pub fn pull_request_event(
    id: &str,
    repo: &str,
    created_at: DateTime<Utc>,
    pr: &PullRequest,
    stale: State,
) -> RawEvent {
    raw_event(
        id,
        "PullRequestEvent",
        repo,
        created_at,
        serde_json::json!({
            "action": "opened",
            "number": pr.number,
            "pull_request": {"id": pr.id, "number": pr.number, "state": stale}
        }),
    )
}

pub fn push_event(id: &str, repo: &str, created_at: DateTime<Utc>) -> RawEvent {
    raw_event(
        id,
        "PushEvent",
        repo,
        created_at,
        serde_json::json!({"ref": "refs/heads/main", "size": 1}),
    )
}
