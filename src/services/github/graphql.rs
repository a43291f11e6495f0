//! GraphQL queries for the contribution search path and their response types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{Connection, SearchNode};
use crate::error::ApiError;
use crate::models::entity::{Issue, PullRequest, State};
use crate::models::repository::Repository;

pub const SEARCH_PAGE_SIZE: u32 = 100;

const REPOSITORY_FIELDS: &str = r#"
    fragment RepositoryFields on Repository {
        databaseId
        name
        nameWithOwner
        description
        stargazerCount
        url
        primaryLanguage {
            name
        }
    }
"#;

const SEARCH_QUERY: &str = r#"
    query($searchQuery: String!, $first: Int!, $after: String) {
        search(query: $searchQuery, type: ISSUE, first: $first, after: $after) {
            pageInfo {
                hasNextPage
                endCursor
            }
            edges {
                node {
                    __typename
                    ... on Issue {
                        databaseId
                        number
                        title
                        state
                        url
                        createdAt
                        updatedAt
                        closedAt
                        repository {
                            ...RepositoryFields
                        }
                    }
                    ... on PullRequest {
                        databaseId
                        number
                        title
                        state
                        merged
                        url
                        createdAt
                        updatedAt
                        mergedAt
                        repository {
                            ...RepositoryFields
                        }
                    }
                }
            }
        }
    }
"#;

const CONTRIBUTED_TO_QUERY: &str = r#"
    query($login: String!, $first: Int!, $after: String) {
        user(login: $login) {
            repositoriesContributedTo(
                first: $first,
                after: $after,
                includeUserRepositories: true,
                contributionTypes: [COMMIT, ISSUE, PULL_REQUEST, REPOSITORY]
            ) {
                pageInfo {
                    hasNextPage
                    endCursor
                }
                edges {
                    node {
                        ...RepositoryFields
                    }
                }
            }
        }
    }
"#;

pub fn search_query() -> String {
    format!("{}{}", SEARCH_QUERY, REPOSITORY_FIELDS)
}

pub fn contributed_to_query() -> String {
    format!("{}{}", CONTRIBUTED_TO_QUERY, REPOSITORY_FIELDS)
}

/// Search string for everything `user` authored that changed since `since`
pub fn contribution_search(user: &str, since: DateTime<Utc>) -> String {
    format!("author:{} updated:>={}", user, since.format("%Y-%m-%d"))
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

impl<T> GraphQlResponse<T> {
    pub fn into_data(self) -> Result<T, ApiError> {
        if let Some(errors) = self.errors.filter(|errors| !errors.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(ApiError::GraphQl(messages.join("; ")));
        }
        self.data
            .ok_or_else(|| ApiError::Decode("no data in GraphQL response".to_string()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Edge<T> {
    node: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionData<T> {
    page_info: PageInfo,
    edges: Vec<Edge<T>>,
}

impl<T> ConnectionData<T> {
    fn into_connection<U>(self, convert: impl Fn(T) -> Option<U>) -> Connection<U> {
        Connection {
            nodes: self
                .edges
                .into_iter()
                .filter_map(|edge| edge.node)
                .filter_map(convert)
                .collect(),
            end_cursor: if self.page_info.has_next_page {
                self.page_info.end_cursor
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct LanguageNode {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNode {
    database_id: i64,
    name: String,
    name_with_owner: String,
    description: Option<String>,
    #[serde(default)]
    stargazer_count: u64,
    url: String,
    primary_language: Option<LanguageNode>,
}

impl From<RepositoryNode> for Repository {
    fn from(node: RepositoryNode) -> Self {
        Repository {
            id: node.database_id,
            name: node.name,
            full_name: Some(node.name_with_owner),
            language: node.primary_language.map(|l| l.name),
            description: node.description,
            stargazers_count: node.stargazer_count,
            html_url: Some(node.url),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueNode {
    database_id: i64,
    number: u64,
    title: String,
    state: State,
    url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    repository: RepositoryNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestNode {
    database_id: i64,
    number: u64,
    title: String,
    state: State,
    #[serde(default)]
    merged: bool,
    url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
    repository: RepositoryNode,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum SearchNodeData {
    Issue(IssueNode),
    PullRequest(PullRequestNode),
    #[serde(other)]
    Other,
}

impl SearchNodeData {
    fn into_search_node(self) -> Option<SearchNode> {
        match self {
            SearchNodeData::Issue(node) => Some(SearchNode::Issue {
                issue: Issue {
                    id: node.database_id,
                    number: node.number,
                    title: node.title,
                    state: node.state,
                    html_url: node.url,
                    created_at: node.created_at,
                    updated_at: node.updated_at,
                    closed_at: node.closed_at,
                },
                repo: node.repository.into(),
            }),
            SearchNodeData::PullRequest(node) => Some(SearchNode::PullRequest {
                pull_request: PullRequest {
                    id: node.database_id,
                    number: node.number,
                    title: node.title,
                    state: node.state,
                    html_url: node.url,
                    created_at: node.created_at,
                    updated_at: node.updated_at,
                    merged: node.merged,
                    merged_at: node.merged_at,
                }
                .normalized(),
                repo: node.repository.into(),
            }),
            SearchNodeData::Other => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
    search: ConnectionData<SearchNodeData>,
}

impl SearchData {
    pub fn into_connection(self) -> Connection<SearchNode> {
        self.search.into_connection(SearchNodeData::into_search_node)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributorNode {
    repositories_contributed_to: ConnectionData<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
pub struct ContributedToData {
    user: Option<ContributorNode>,
}

impl ContributedToData {
    pub fn into_connection(self, login: &str) -> Result<Connection<Repository>, ApiError> {
        let user = self
            .user
            .ok_or_else(|| ApiError::Decode(format!("user {} not found", login)))?;
        Ok(user
            .repositories_contributed_to
            .into_connection(|node| Some(Repository::from(node))))
    }
}
