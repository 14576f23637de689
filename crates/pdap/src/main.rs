//! pdap - command-line client for the PDAP data sources API.

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::Style;

mod commands;
mod navigator;

use commands::{auth, config, route, search, sources, user};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// pdap - search and contribute police data sources
#[derive(Parser)]
#[command(name = "pdap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// API base URL (default: from config, then http://localhost:8080)
    #[arg(long, global = true, env = "PDAP_API_BASE_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in, sign out and manage tokens
    Auth(auth::AuthArgs),

    /// Account management
    User(user::UserArgs),

    /// Look up and submit data sources
    Sources(sources::SourcesArgs),

    /// Search data sources and manage followed searches
    Search(search::SearchArgs),

    /// Check where navigating to an app path would land
    Route(route::RouteArgs),

    /// Inspect and edit configuration
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Console (human-readable, stderr) + rotating JSON file
    let filter = if cli.verbose {
        "pdap=debug,pdap_client=debug,pdap_session=debug,pdap_router=debug,pdap_config=debug,warn"
    } else {
        "pdap=info,pdap_client=info,pdap_session=info,pdap_router=info,pdap_config=info,warn"
    };

    let log_dir = pdap_config::xdg_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "pdap.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "pdap=trace,pdap_client=trace,pdap_session=trace,pdap_router=trace,pdap_config=trace,info",
                )),
        )
        .init();

    let ctx = commands::Context {
        api_url: cli.api_url,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    if let Err(e) = run(cli.command, &ctx).await {
        let red = Style::new().red();
        eprintln!("{} {:#}", red.apply_to("Error:"), e);
        // exit() skips destructors; flush the file log first
        drop(guard);
        std::process::exit(1);
    }
}

async fn run(command: Commands, ctx: &commands::Context) -> Result<()> {
    match command {
        Commands::Auth(args) => auth::run(args, ctx).await,
        Commands::User(args) => user::run(args, ctx).await,
        Commands::Sources(args) => sources::run(args, ctx).await,
        Commands::Search(args) => search::run(args, ctx).await,
        Commands::Route(args) => route::run(args, ctx).await,
        Commands::Config(args) => config::run(args, ctx).await,
    }
}
