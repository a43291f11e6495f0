mod error;
mod models;
mod services;
mod utils;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Months, Utc};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;

use services::aggregator::ContributionAggregator;
use services::github::GitHubClient;
use services::renderer;
use utils::cancel::Cancellation;
use utils::config::Config;
use utils::validators::validate_username;

#[derive(Parser, Debug)]
#[command(name = "activity-readme", version, about = "Render a profile README from recent GitHub activity")]
struct Args {
    /// Template rendered with the collected contributions
    #[arg(long, value_name = "FILE")]
    template_file: PathBuf,

    /// Where the rendered README is written
    #[arg(long, value_name = "FILE")]
    out: PathBuf,

    /// User to aggregate (default: GITHUB_USER, then the token's owner)
    #[arg(long)]
    user: Option<String>,

    /// How many months of activity to collect
    #[arg(long, default_value_t = 1)]
    months: u32,

    /// Exact cutoff as an RFC 3339 timestamp; overrides --months
    #[arg(long, value_name = "TIMESTAMP")]
    since: Option<DateTime<Utc>>,

    /// Events per page (default: EVENTS_PER_PAGE)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    per_page: Option<u32>,

    /// Where contributions are read from
    #[arg(long, value_enum, default_value_t = Source::Events)]
    source: Source,

    /// Abort the whole pass after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Source {
    /// Walk the public activity feed and resolve every referenced entity
    Events,
    /// Use the GraphQL contribution search
    Search,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        log::error!("❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    log::debug!("Loaded configuration: {:?}", config);

    if let Some(user) = &args.user {
        validate_username(user)?;
    }
    let earliest = cutoff(args.since, args.months, Utc::now())?;
    let per_page = args.per_page.unwrap_or(config.events_per_page);

    let client = GitHubClient::new(&config).context("creating GitHub client")?;

    let (handle, mut cancel) = Cancellation::new();
    if let Some(secs) = args.timeout_secs {
        cancel = cancel.with_deadline(Instant::now() + Duration::from_secs(secs));
    }
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("🛑 Interrupted, cancelling");
            handle.cancel();
        }
    });

    let aggregator = ContributionAggregator::new(&client, per_page);
    let configured_user = args.user.as_deref().or(config.username.as_deref());
    let user = aggregator.resolve_user(configured_user, &cancel).await?;

    let aggregate = match args.source {
        Source::Events => aggregator.aggregate(&user, earliest, &cancel).await?,
        Source::Search => aggregator.aggregate_from_search(&user, earliest, &cancel).await?,
    };

    let rendered = renderer::render(&args.template_file, &aggregate, &user, Utc::now())?;
    std::fs::write(&args.out, rendered)
        .with_context(|| format!("writing {}", args.out.display()))?;

    log::info!("✅ Wrote {}", args.out.display());
    Ok(())
}

/// Oldest instant still collected: `since` when given, else `months` before `now`.
fn cutoff(since: Option<DateTime<Utc>>, months: u32, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    if let Some(since) = since {
        return Ok(since);
    }
    now.checked_sub_months(Months::new(months))
        .ok_or_else(|| anyhow!("cannot go back {} months from {}", months, now))
}
