use serde::{Deserialize, Serialize};

/// Repository as returned by `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: i64,
    pub name: String,
    /// `owner/name`
    #[serde(default)]
    pub full_name: Option<String>,
    /// Primary language detected by GitHub
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl Repository {
    /// Identifier to resolve this repository by: `full_name` when known,
    /// otherwise the bare `name` (which the event feed fills with `owner/name`).
    pub fn identifier(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.name)
    }
}
