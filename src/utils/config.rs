use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::utils::validators::{validate_api_url, validate_username};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_EVENTS_PER_PAGE: u32 = 10;

#[derive(Clone)]
pub struct Config {
    pub github_token: String,
    /// User whose feed is aggregated; `None` means the authenticated user
    pub username: Option<String>,
    pub api_base_url: String,
    pub graphql_url: String,
    pub events_per_page: u32,
    pub http_timeout_secs: u64,
    pub max_retries: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let github_token = lookup("GITHUB_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| Error::Config("GITHUB_TOKEN must be set".to_string()))?;

        let username = match lookup("GITHUB_USER").filter(|user| !user.is_empty()) {
            Some(user) => {
                validate_username(&user)?;
                Some(user)
            }
            None => None,
        };

        let api_base_url = validate_api_url(
            &lookup("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        )?;
        let graphql_url = match lookup("GITHUB_GRAPHQL_URL") {
            Some(url) => validate_api_url(&url)?,
            None => default_graphql_url(&api_base_url),
        };

        let events_per_page = parse_var(&lookup, "EVENTS_PER_PAGE", DEFAULT_EVENTS_PER_PAGE)?;
        if !(1..=100).contains(&events_per_page) {
            return Err(Error::Config(format!(
                "EVENTS_PER_PAGE must be between 1 and 100, got {}",
                events_per_page
            )));
        }

        Ok(Config {
            github_token,
            username,
            api_base_url,
            graphql_url,
            events_per_page,
            http_timeout_secs: parse_var(&lookup, "HTTP_TIMEOUT_SECS", 30)?,
            max_retries: parse_var(&lookup, "HTTP_MAX_RETRIES", 3)?,
        })
    }
}

/// GitHub Enterprise serves REST under `/api/v3` and GraphQL at `/api/graphql`.
fn default_graphql_url(api_base_url: &str) -> String {
    let base = api_base_url.strip_suffix("/v3").unwrap_or(api_base_url);
    format!("{}/graphql", base)
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("github_token", &"***")
            .field("username", &self.username)
            .field("api_base_url", &self.api_base_url)
            .field("graphql_url", &self.graphql_url)
            .field("events_per_page", &self.events_per_page)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} must be a number, got {:?}", key, raw))),
        None => Ok(default),
    }
}
