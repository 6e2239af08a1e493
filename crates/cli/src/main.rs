//! agent-kit CLI: drives the agent runtime from a project's `.agent-kit/`
//! configuration.

mod commands;

use ak_core::config::load_config;
use clap::{Parser, Subcommand};
use commands::{ListArgs, RunArgs};
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

/// Agent lifecycle and task-dispatch runtime
#[derive(Parser, Debug)]
#[command(name = "agent-kit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start every configured agent and dispatch tasks read from stdin
    Run(RunArgs),

    /// Show the configured agents
    List(ListArgs),
}

impl Commands {
    fn root(&self) -> &Path {
        match self {
            Self::Run(args) => args.root.as_path(),
            Self::List(args) => args.root.as_path(),
        }
    }
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // RUST_LOG wins over the configured level. Until the config is loaded
    // only RUST_LOG applies, so loader diagnostics need it.
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new("warn")));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(cli.command.root()).await?;
    if !from_env {
        filter_handle.reload(EnvFilter::try_new(&config.runtime.log_level)?)?;
    }

    match cli.command {
        Commands::Run(args) => args.execute(&config).await,
        Commands::List(args) => args.execute(&config),
    }
}
