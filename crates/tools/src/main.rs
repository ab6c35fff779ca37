use std::env;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use foundation::math::Vec2;
use foundation::time::TimeMs;
use scene::camera::Viewport;
use tools::{
    FrameRequest, ToolError, WORLD_ENV_VAR, WorldSource, inspect, menu_layout, render_frame,
    simulate_singularity, to_json,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "parallax", about = "Inspect and drive a parallax world offline")]
struct Cli {
    /// World document. Defaults to $PARALLAX_WORLD, then the bundled demo.
    #[arg(long, global = true)]
    world: Option<PathBuf>,

    /// Standalone stage config; overrides any config embedded in the world.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Summarize panels, connections and sweep order.
    Inspect,
    /// Render one frame as JSON.
    Frame {
        #[arg(long, default_value_t = 0.0)]
        scroll: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        rotation: f64,
        #[arg(long, default_value_t = 1280.0)]
        width: f64,
        #[arg(long, default_value_t = 800.0)]
        height: f64,
        /// Put this panel into focus mode first.
        #[arg(long)]
        expand: Option<String>,
    },
    /// Run the singularity sequence and sample it at every deadline.
    Singularity {
        #[arg(long, default_value_t = 0)]
        start_ms: u64,
    },
    /// Print the orbital menu layout.
    Menu {
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        y: f64,
        /// Lay out the collapsed menu instead of the open one.
        #[arg(long)]
        closed: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), ToolError> {
    let source = WorldSource::resolve(cli.world, env::var(WORLD_ENV_VAR).ok());
    let doc = source.load()?;
    let config = match &cli.config {
        Some(path) => formats::load_stage_config(path)?,
        None => doc.stage_config(),
    };
    info!(?source, panels = doc.panels.len(), "world loaded");

    let out = match cli.command {
        Command::Inspect => to_json(&inspect(&doc)?, cli.pretty)?,
        Command::Frame {
            scroll,
            rotation,
            width,
            height,
            expand,
        } => {
            let request = FrameRequest {
                scroll,
                rotation_deg: rotation,
                viewport: Viewport::new(width, height),
                expand,
            };
            to_json(&render_frame(&doc, config, &request)?, cli.pretty)?
        }
        Command::Singularity { start_ms } => to_json(
            &simulate_singularity(&doc, config, TimeMs::from_millis(start_ms))?,
            cli.pretty,
        )?,
        Command::Menu { x, y, closed } => {
            to_json(&menu_layout(&config, Vec2::new(x, y), !closed), cli.pretty)?
        }
    };
    println!("{out}");
    Ok(())
}
