use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use minijinja::Environment;
use serde::Serialize;
use std::path::Path;

use crate::models::aggregate::{ContributionAggregate, IssueWithRepository, PullRequestWithRepository};
use crate::models::language_tally::LanguageShare;
use crate::models::repository::Repository;

/// Values exposed to the README template
#[derive(Debug, Serialize)]
struct TemplateContext<'a> {
    user: &'a str,
    generated_at: String,
    issues: Vec<&'a IssueWithRepository>,
    pull_requests: Vec<&'a PullRequestWithRepository>,
    languages: Vec<LanguageShare>,
    contributed_repositories: &'a [Repository],
}

impl<'a> TemplateContext<'a> {
    fn new(aggregate: &'a ContributionAggregate, user: &'a str, generated_at: DateTime<Utc>) -> Self {
        let mut issues: Vec<_> = aggregate.issues().values().collect();
        issues.sort_by(|a, b| b.issue.updated_at.cmp(&a.issue.updated_at));

        let mut pull_requests: Vec<_> = aggregate.pull_requests().values().collect();
        pull_requests.sort_by(|a, b| b.pull_request.updated_at.cmp(&a.pull_request.updated_at));

        Self {
            user,
            generated_at: generated_at.to_rfc3339(),
            issues,
            pull_requests,
            languages: aggregate.languages().ranked(),
            contributed_repositories: aggregate.contributed_repositories(),
        }
    }
}

/// Render the template stored at `template_path`
pub fn render(
    template_path: &Path,
    aggregate: &ContributionAggregate,
    user: &str,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    let source = std::fs::read_to_string(template_path)
        .with_context(|| format!("reading template {}", template_path.display()))?;
    render_template(&source, aggregate, user, generated_at)
        .with_context(|| format!("rendering template {}", template_path.display()))
}

pub fn render_template(
    source: &str,
    aggregate: &ContributionAggregate,
    user: &str,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    let mut env = Environment::new();
    env.add_filter("to_lower", |value: String| value.to_lowercase());

    let context = TemplateContext::new(aggregate, user, generated_at);
    env.render_str(source, &context)
        .map_err(|e| anyhow!("template error: {:#}", e))
}
