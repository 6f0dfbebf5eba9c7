use anyhow::Result;
use clap::Parser;
use stagecraft_demos::FirstCube;
use stagecraft_runtime::Stage;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "first-cube", about = "A spinning cube")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON file overriding renderer options
    #[arg(short, long)]
    options: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("first-cube starting");

    let stage = FirstCube::new();
    let options = stage.options().merge_file(cli.options.as_deref())?;
    stagecraft_runtime::run(stage, options)?;

    Ok(())
}
