//! wikidump CLI
//!
//! Mirrors a Confluence wiki into a git-tracked directory of sanitized HTML.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wikidump::{
    error::{AppError, Result},
    models::{Config, PublishOutcome},
    pipeline,
    services::{GitPublisher, HttpContentApi, Publisher, SanitizePolicy, Sanitizer},
    storage::{LocalStorage, page_relative_path},
    utils::http,
};

/// wikidump - Confluence wiki mirror
#[derive(Parser, Debug)]
#[command(
    name = "wikidump",
    version,
    about = "Mirror a Confluence wiki into a git repository"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "wikidump.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mirror every page, then commit and push the output directory
    Sync {
        /// Output directory (default: output.dir from the config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write pages only; skip git add/commit/push
        #[arg(long)]
        no_commit: bool,

        /// Commit but do not push
        #[arg(long)]
        no_push: bool,

        /// Print the run report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Print the sanitized form of a local HTML file
    Sanitize {
        /// HTML file to clean
        file: PathBuf,
    },

    /// Print the output path a page link maps to
    Path {
        /// Web UI link of the page, e.g. /display/SPACE/Home
        webui: String,

        /// Base URL (default: source.base_url from the config)
        #[arg(long)]
        base: Option<String>,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Apply CLI overrides, then run one mirror pass.
async fn sync(
    mut config: Config,
    output: Option<PathBuf>,
    no_commit: bool,
    no_push: bool,
    json: bool,
) -> Result<()> {
    if let Some(dir) = output {
        config.output.dir = dir;
    }
    if no_commit {
        config.git.enabled = false;
    }
    if no_push {
        config.git.push = false;
    }
    config.validate()?;

    log::info!(
        "Mirroring {} into {}",
        config.source.base_url,
        config.output.dir.display()
    );

    let client = http::create_async_client(&config.crawler)?;
    let api = HttpContentApi::new(client);
    let sanitizer = Sanitizer::new(SanitizePolicy::wiki_export());
    let storage = LocalStorage::from_config(&config.output);
    let git = GitPublisher::new(&config.output.dir, &config.git);
    let publisher: Option<&dyn Publisher> = config.git.enabled.then_some(&git as &dyn Publisher);

    let report = tokio::select! {
        result = pipeline::run_sync(&config, &api, &sanitizer, &storage, publisher) => result?,
        _ = tokio::signal::ctrl_c() => {
            log::warn!("Interrupted; in-flight pages abandoned");
            return Err(AppError::Interrupted);
        }
    };

    let elapsed = report.finished_at - report.started_at;
    log::info!(
        "Mirrored {} pages from {} listing pages in {:.1}s",
        report.pages_written,
        report.listing_pages,
        elapsed.num_milliseconds() as f64 / 1000.0
    );
    match report.publish {
        PublishOutcome::Committed { pushed: true } => log::info!("Committed and pushed"),
        PublishOutcome::Committed { pushed: false } => log::info!("Committed (push disabled)"),
        PublishOutcome::NothingToCommit { pushed: true } => {
            log::info!("No changes to commit; pushed earlier commits")
        }
        PublishOutcome::NothingToCommit { pushed: false } => log::info!("No changes to commit"),
        PublishOutcome::Skipped => log::info!("Commit step skipped"),
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    log::debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Sync {
            output,
            no_commit,
            no_push,
            json,
        } => sync(config, output, no_commit, no_push, json).await?,

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("Start URL: {}", config.source.start_url());
            log::info!(
                "Fan-out: {} concurrent, timeout {}s",
                config.crawler.max_concurrent,
                config.crawler.timeout_secs
            );
            log::info!("Output: {}", config.output.dir.display());
            if config.git.enabled {
                log::info!(
                    "Git: commit to {}/{} (push: {})",
                    config.git.remote,
                    config.git.branch,
                    config.git.push
                );
            } else {
                log::info!("Git: disabled");
            }
            log::info!("✓ Config OK");

            let effective = toml::to_string_pretty(&config)
                .map_err(|e| AppError::config(format!("cannot render config: {e}")))?;
            print!("{}", effective);
        }

        Command::Sanitize { file } => {
            let raw = tokio::fs::read_to_string(&file).await?;
            let sanitizer = Sanitizer::new(SanitizePolicy::wiki_export());
            print!("{}", sanitizer.sanitize(&raw));
        }

        Command::Path { webui, base } => {
            let base = base.unwrap_or_else(|| config.source.base_url.clone());
            let relative = page_relative_path(&base, &webui)?;
            println!("{}", config.output.dir.join(relative).display());
        }
    }

    Ok(())
}
