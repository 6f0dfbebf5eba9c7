use anyhow::Result;
use clap::Parser;
use stagecraft_demos::ModelViewer;
use stagecraft_runtime::Stage;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "model-viewer", about = "Orbit around a glTF model")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON file overriding renderer options
    #[arg(short, long)]
    options: Option<PathBuf>,

    /// Model to load (.gltf or .glb)
    #[arg(default_value = ModelViewer::DEFAULT_MODEL)]
    model: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!(model = %cli.model.display(), "model-viewer starting");

    let stage = ModelViewer::with_model(cli.model);
    let options = stage.options().merge_file(cli.options.as_deref())?;
    stagecraft_runtime::run(stage, options)?;

    Ok(())
}
