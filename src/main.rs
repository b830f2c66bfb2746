use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use concord::cli::{AppContext, Cli, Commands};

fn main() -> Result<()> {
    // Honor CONCORD_LOG (e.g. CONCORD_LOG=debug) without polluting stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CONCORD_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Search(args) => concord::core::search_run(args, &ctx),
        Commands::Init(args) => concord::infra::config::init(args, &ctx),
        Commands::Completions(args) => concord::completion::run(args),
    }
}
