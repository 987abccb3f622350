use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use statscrawl::cli::run_cmd::{self, RunOptions};
use statscrawl::config::Config;
use statscrawl::driver::Job;
use statscrawl::types::Category;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "statscrawl", version, about = "Scrape statistics tables by season and category")]
struct Cli {
    /// Config file (JSON). Defaults to ~/.statscrawl/config.json if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Render pages in headless Chrome instead of plain HTTP.
    #[arg(long, global = true)]
    browser: bool,

    /// Write the dataset JSON here instead of stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    /// Also write per-player career totals (JSON) here.
    #[arg(long, global = true)]
    players: Option<PathBuf>,

    /// Audit log path (JSONL).
    #[arg(long, global = true)]
    audit_log: Option<PathBuf>,

    /// Do not write an audit log.
    #[arg(long, global = true)]
    no_audit: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,

    /// Suppress the summary.
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-season stats tables, trying each URL variant.
    Seasons(SeasonArgs),
    /// Paginated record lists from the configured start URLs.
    Records(FilterArgs),
    /// Seasons, then records.
    Run(SeasonArgs),
}

#[derive(Args)]
struct SeasonArgs {
    /// First season (inclusive).
    #[arg(long)]
    from: Option<i32>,
    /// Last season (inclusive).
    #[arg(long)]
    to: Option<i32>,
    #[command(flatten)]
    filter: FilterArgs,
}

#[derive(Args)]
struct FilterArgs {
    /// Restrict to these categories (repeatable).
    #[arg(long = "category")]
    categories: Vec<Category>,
}

impl FilterArgs {
    fn keeps(&self, category: &Category) -> bool {
        self.categories.is_empty() || self.categories.contains(category)
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn season_jobs(config: &mut Config, args: &SeasonArgs) -> Vec<Job> {
    if let Some(from) = args.from {
        config.seasons.start = from;
    }
    if let Some(to) = args.to {
        config.seasons.end = to;
    }
    if !args.filter.categories.is_empty() {
        config.seasons.categories = args.filter.categories.clone();
    }
    Job::seasons(&config.seasons)
}

fn record_jobs(config: &Config, filter: &FilterArgs) -> Vec<Job> {
    let sources: Vec<_> = config
        .records
        .iter()
        .filter(|source| filter.keeps(&source.category))
        .cloned()
        .collect();
    Job::records(&sources)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let mut config = Config::resolve(cli.config.as_deref())?;
    if cli.browser {
        config.fetch.browser = true;
    }

    let jobs = match &cli.command {
        Commands::Seasons(args) => season_jobs(&mut config, args),
        Commands::Records(filter) => record_jobs(&config, filter),
        Commands::Run(args) => {
            let mut jobs = season_jobs(&mut config, args);
            jobs.extend(record_jobs(&config, &args.filter));
            jobs
        }
    };

    let options = RunOptions {
        out: cli.out,
        players: cli.players,
        audit_log: cli.audit_log,
        no_audit: cli.no_audit,
        quiet: cli.quiet,
    };
    run_cmd::run(&config, jobs, &options).await
}
