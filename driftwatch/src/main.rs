// driftwatch/src/main.rs

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn init_tracing(json: bool) {
    // RUST_LOG=info driftwatch run ... to follow every stage
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Commands::Run {
            project_dir,
            events,
            source,
            key,
        } => commands::run::execute(project_dir, events, source, key).await,

        Commands::Analyze {
            reference,
            current,
            project_dir,
            format,
            output,
            fail_on_drift,
        } => commands::analyze::execute(
            reference,
            current,
            project_dir,
            format,
            output,
            fail_on_drift,
        ),

        Commands::Inspect { file, limit } => commands::inspect::execute(file, limit),
    }
}
