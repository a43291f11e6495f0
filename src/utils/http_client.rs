use reqwest::{Client, ClientBuilder};
use std::time::Duration;

pub const USER_AGENT: &str = concat!("activity-readme/", env!("CARGO_PKG_VERSION"));

/// Create a configured HTTP client for the GitHub REST and GraphQL APIs
pub fn create_http_client(timeout: Duration) -> reqwest::Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}
