use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use cookie_refresher::{
    client::HttpFetcher,
    config::{default_base_dir, Config},
    handlers::{exit_code_for, exit_code_for_report, run_update},
    staging::GitCli,
};
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Refresh the access cookie in the upstream playlist and stage the result.
#[derive(Parser, Debug)]
#[command(name = "cookie-refresher")]
#[command(version, about, long_about = None)]
struct Cli {
    /// URL of the source JSON document
    #[arg(long)]
    url: Option<String>,

    /// Directory the default output and repository paths are resolved from
    /// [default: directory of this executable]
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Output file (default: <base-dir>/../data/playlist.json)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Git working tree root (default: <base-dir>/../)
    #[arg(long)]
    repo: Option<PathBuf>,

    /// Cookie lifetime in seconds
    #[arg(long)]
    ttl: Option<u64>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Signature placed in the `hmac` token field
    #[arg(long, env = "COOKIE_SIGNATURE", hide_env_values = true)]
    signature: Option<String>,

    /// Cookie name prefix; pass an empty string to write the bare token
    #[arg(long)]
    cookie_name: Option<String>,

    /// Exit non-zero when the working tree cannot be inspected
    #[arg(long)]
    strict_staging: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn into_config(self) -> Config {
        let base = self.base_dir.unwrap_or_else(default_base_dir);
        let mut config = Config::from_base_dir(&base);
        if let Some(url) = self.url {
            config.source_url = url;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(repo) = self.repo {
            config.repo_root = repo;
        }
        if let Some(ttl) = self.ttl {
            config.token_ttl_secs = ttl;
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = timeout;
        }
        if let Some(signature) = self.signature {
            config.signature = signature;
        }
        if let Some(name) = self.cookie_name {
            config.cookie_name = Some(name).filter(|n| !n.is_empty());
        }
        config.strict_staging = self.strict_staging;
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = cli.into_config();
    let fetcher = HttpFetcher::new(
        config.source_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    );
    let vcs = GitCli::new(config.repo_root.clone());
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    match run_update(&config, &fetcher, &vcs, now).await {
        Ok(report) => ExitCode::from(exit_code_for_report(&report, config.strict_staging)),
        Err(e) => {
            error!("{}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}
