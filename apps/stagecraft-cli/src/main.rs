use clap::{Parser, Subcommand};
use stagecraft_demos::{FirstCube, ModelViewer};
use stagecraft_render::{DebugTextRenderer, Renderer};
use stagecraft_runtime::Stage;
use stagecraft_scene::SceneSummary;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stagecraft-cli", about = "Headless tools for the stagecraft demos")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Load a glTF/GLB model and print its scene
    Inspect {
        /// Model file (.gltf or .glb)
        path: PathBuf,
        /// Print every node, not just the summary
        #[arg(short, long)]
        tree: bool,
    },
    /// Step the spinning cube through frames without a window
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u32,
        /// Simulated display refresh rate
        #[arg(long, default_value = "60")]
        fps: f64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("stagecraft-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", stagecraft_common::crate_info());
            println!("scene: {}", stagecraft_scene::crate_info());
            println!("assets: {}", stagecraft_assets::crate_info());
            println!("input: {}", stagecraft_input::crate_info());
            println!("render: {}", stagecraft_render::crate_info());
            println!("runtime: {}", stagecraft_runtime::crate_info());
            println!("demos: {}", stagecraft_demos::crate_info());
        }
        Commands::Inspect { path, tree } => {
            tracing::info!(path = %path.display(), "loading model");
            let model = stagecraft_assets::load_gltf(&path)?;
            let name = model.name.clone();
            let mut viewer = ModelViewer::new();
            viewer.add_model(model);

            println!("Model: {name} ({})", path.display());
            println!("{}", SceneSummary::of(viewer.scene()));
            match viewer.scene().bounding_box() {
                Some(bounds) => {
                    let size = bounds.size();
                    let center = bounds.center();
                    println!(
                        "Bounds: center=({:.3}, {:.3}, {:.3}) size=({:.3}, {:.3}, {:.3})",
                        center.x, center.y, center.z, size.x, size.y, size.z
                    );
                }
                None => println!("Bounds: empty"),
            }
            if tree {
                print!("{}", DebugTextRenderer::new().render(viewer.scene(), viewer.camera()));
            }
        }
        Commands::Simulate { frames, fps } => {
            anyhow::ensure!(fps > 0.0, "fps must be positive");
            let mut stage = FirstCube::new();
            let frame_ms = 1000.0 / fps;
            tracing::debug!(frames, fps, frame_ms, "simulating first cube");
            for frame in 0..frames {
                stage.update(frame as f64 * frame_ms);
            }
            let r = stage.rotation();
            println!("Simulated {frames} frames at {fps} fps");
            println!("Cube rotation: x={:.4} y={:.4} z={:.4} rad", r.x, r.y, r.z);
            print!("{}", DebugTextRenderer::new().render(stage.scene(), stage.camera()));
        }
    }

    Ok(())
}

