use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use newsrelay::{ArticleRepository, Config, Database, RelayService, RelayUpdater, Result};

#[derive(Parser, Debug)]
#[command(name = "newsrelay")]
#[command(about = "Forward topic-filtered news from RSS feeds to Telegram channels")]
#[command(version)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Poll sources on the configured interval until Ctrl-C (default)
    Run,
    /// Run a single polling cycle and exit
    Once,
    /// Check that source sites are reachable
    Check,
    /// Show how many articles were forwarded per topic
    Stats,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let command = args.command.unwrap_or(Command::Run);

    let mut config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", args.config.display());
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    if let Err(e) = newsrelay::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        newsrelay::logging::init_console_only(&config.logging.level);
    }

    info!("newsrelay {}", env!("CARGO_PKG_VERSION"));

    match execute(command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(command: Command, config: &Config) -> Result<()> {
    // Statistics only need the database.
    if command != Command::Stats {
        config.validate()?;
    }

    let db = Database::open(&config.database.path).await?;

    match command {
        Command::Stats => print_stats(&db).await,
        Command::Check => {
            let service = RelayService::from_config(config, db)?;
            let health = service.check_sources().await;
            for h in &health {
                match (h.reachable, h.status) {
                    (true, Some(status)) => println!("OK    {:<24} {} ({})", h.name, h.url, status),
                    _ => println!(
                        "FAIL  {:<24} {} ({})",
                        h.name,
                        h.url,
                        h.error.as_deref().unwrap_or("no response")
                    ),
                }
            }
            let unreachable = health.iter().filter(|h| !h.reachable).count();
            println!("{} of {} sources reachable", health.len() - unreachable, health.len());
            Ok(())
        }
        Command::Once => {
            let service = RelayService::from_config(config, db)?;
            let report = service.run_once().await;
            println!("{report}");
            Ok(())
        }
        Command::Run => {
            let service = Arc::new(RelayService::from_config(config, db)?);
            let updater = RelayUpdater::with_interval(service, config.poller.interval_secs);
            updater.run(shutdown_signal()).await;
            Ok(())
        }
    }
}

async fn print_stats(db: &Database) -> Result<()> {
    let repo = ArticleRepository::new(db.pool());
    let total = repo.count().await?;
    println!("Forwarded articles: {total}");
    for entry in repo.count_by_category().await? {
        println!("  #{:<20} {}", entry.category, entry.count);
    }
    for article in repo.list_recent(5).await? {
        println!(
            "  {} [{}] {}",
            article.sent_at.format("%Y-%m-%d %H:%M"),
            article.source_name,
            article.title
        );
    }
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    }
}
