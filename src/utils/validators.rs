use url::Url;

use crate::error::{Error, Result};

/// Split an `owner/name` repository identifier.
///
/// Exactly one separator with a non-empty owner and name is accepted.
pub fn split_repo_name(identifier: &str) -> Result<(&str, &str)> {
    let mut parts = identifier.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
            Ok((owner, name))
        }
        _ => Err(Error::InvalidRepoIdentifier(identifier.to_string())),
    }
}

/// Validate an API base URL and return it without a trailing slash
pub fn validate_api_url(url_str: &str) -> Result<String> {
    let url = Url::parse(url_str)
        .map_err(|e| Error::Config(format!("Invalid URL {:?}: {}", url_str, e)))?;

    // Only allow http and https schemes
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::Config(format!(
            "URL must use http or https scheme, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(Error::Config(format!("URL must have a host: {}", url_str)));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Validate username (alphanumeric and hyphens, 1-39 chars, GitHub rules)
pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() || username.len() > 39 {
        return Err(Error::Config(
            "Username must be between 1 and 39 characters".to_string(),
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(Error::Config(format!(
            "Username can only contain alphanumeric characters and hyphens: {:?}",
            username
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_repo_name() {
        assert_eq!(split_repo_name("test/foo").unwrap(), ("test", "foo"));

        for bad in ["test/foo/", "owner/name/extra", "test", "/foo", "test/", ""] {
            match split_repo_name(bad) {
                Err(Error::InvalidRepoIdentifier(id)) => assert_eq!(id, bad),
                other => panic!("{:?} should be rejected, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_validate_api_url() {
        assert_eq!(
            validate_api_url("https://api.github.com").unwrap(),
            "https://api.github.com"
        );
        assert_eq!(
            validate_api_url("http://localhost:3000/api/v3/").unwrap(),
            "http://localhost:3000/api/v3"
        );
        assert!(validate_api_url("ftp://example.com").is_err());
        assert!(validate_api_url("not-a-url").is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("octocat").is_ok());
        assert!(validate_username("my-user-123").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username(&"a".repeat(40)).is_err());
        assert!(validate_username("user@example").is_err());
    }
}
