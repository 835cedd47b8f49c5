#![deny(unsafe_code)]
//! CLI binary for the particle-sphere visualizations.
//!
//! Subcommands:
//! - `list`: print available visualizations and their parameter schemas
//! - `render <viz>`: run a visualization headlessly for N ticks, write a PNG
//! - `trace <viz>`: run headlessly, print one JSON line of state per tick

mod error;
mod script;

use clap::{Args, Parser, Subcommand};
use error::CliError;
use particle_sphere_core::color::Srgb;
use particle_sphere_core::params::check_params;
use particle_sphere_core::{HeadlessSurface, Mount, Seed, Visualization};
use particle_sphere_engines::VisualizationKind;
use script::EventScript;
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "particle-sphere", about = "Particle sphere visualization CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log debug events to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Options shared by every command that runs a visualization.
#[derive(Args)]
struct RunArgs {
    /// Visualization name (e.g. "sprite-sphere"). Optional with --seed-file.
    visualization: Option<String>,

    /// Number of frames to run.
    #[arg(short, long, default_value_t = 120)]
    ticks: usize,

    /// Seconds per frame.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// PRNG seed for deterministic output.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Visualization parameters as a JSON string.
    #[arg(long, default_value = "{}")]
    params: String,

    /// Pointer events, e.g. "enter@0,leave@60" or "down@5,move:12:-4@6,up@8".
    #[arg(short, long, default_value = "")]
    events: String,

    /// Load the run from a JSON seed file; overrides the name, --ticks, --dt,
    /// --seed, --params, the image size, and the background.
    #[arg(long)]
    seed_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// List available visualizations.
    List,
    /// Run a visualization and write a PNG snapshot of the final frame.
    Render {
        #[command(flatten)]
        run: RunArgs,

        /// Image width in pixels.
        #[arg(short = 'W', long, default_value_t = 300)]
        width: usize,

        /// Image height in pixels.
        #[arg(short = 'H', long, default_value_t = 300)]
        height: usize,

        /// Background color as hex.
        #[arg(long, default_value = "#0a0a12")]
        background: String,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,
    },
    /// Run a visualization and print its state after every tick as JSON lines.
    Trace {
        #[command(flatten)]
        run: RunArgs,
    },
}

/// Resolves the run description from a seed file or from flags.
fn load_seed(run: &RunArgs) -> Result<Seed, CliError> {
    let seed = match &run.seed_file {
        Some(path) => read_seed_file(path)?,
        None => {
            let name = run
                .visualization
                .as_deref()
                .ok_or(CliError::MissingVisualization)?;
            let params = serde_json::from_str(&run.params).map_err(CliError::Params)?;
            let mut seed = Seed::new(name, run.seed);
            seed.params = params;
            seed.ticks = run.ticks;
            seed.dt = run.dt;
            seed
        }
    };
    seed.validate()?;
    Ok(seed)
}

fn read_seed_file(path: &Path) -> Result<Seed, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::ReadSeedFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::SeedFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Constructs the visualization and rejects unknown or mistyped parameter overrides.
fn build(seed: &Seed) -> Result<VisualizationKind, CliError> {
    let viz = VisualizationKind::from_name(&seed.visualization, seed.seed, &seed.params)?;
    check_params(&seed.params, &viz.param_schema())?;
    Ok(viz)
}

/// Pointer coordinates in scripts are resolved against the visualization's container.
fn container_size(viz: &VisualizationKind) -> f64 {
    viz.params()
        .get("container")
        .and_then(serde_json::Value::as_f64)
        .unwrap_or(300.0)
}

/// Mounts `viz` on a headless surface and runs `seed.ticks` frames, feeding
/// scripted pointer events before each. `on_tick` sees the state after every frame.
fn drive(
    seed: &Seed,
    viz: &mut VisualizationKind,
    script: &EventScript,
    mut on_tick: impl FnMut(usize, &VisualizationKind) -> Result<(), CliError>,
) -> Result<(), CliError> {
    let mut surface = HeadlessSurface::new();
    let mut mount = Mount::attach(&mut surface, viz).ok_or(CliError::Detached)?;
    for tick in 0..seed.ticks {
        for event in script.at(tick) {
            mount.pointer(event);
        }
        let Some(id) = mount.pending_frame() else {
            break;
        };
        mount.frame(id, seed.dt)?;
        on_tick(tick, mount.visualization())?;
    }
    let presented = mount.surface().presented();
    mount.cancel();
    info!(
        ticks = seed.ticks,
        seconds = seed.duration(),
        presented,
        "run finished"
    );
    Ok(())
}

fn trace_line(tick: usize, viz: &VisualizationKind) -> serde_json::Value {
    let rotation = viz.rotation();
    let mut line = serde_json::json!({
        "tick": tick,
        "rotation": {"x": rotation.x_deg, "y": rotation.y_deg},
    });
    if let Some(field) = viz.field() {
        line["blend"] = field.blend().into();
        line["target"] = field.target().into();
        line["phase"] = serde_json::to_value(field.phase()).unwrap_or_default();
        line["transitioning"] = field.phase().is_transitioning().into();
        line["speed"] = field.speed().into();
    }
    line
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let names = VisualizationKind::list_visualizations();
            if cli.json {
                let mut schemas = serde_json::Map::new();
                for name in names {
                    let viz = VisualizationKind::from_name(name, 0, &serde_json::json!({}))?;
                    schemas.insert(name.to_string(), viz.param_schema());
                }
                let info = serde_json::json!({
                    "visualizations": names,
                    "params": schemas,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Visualizations:");
                for name in names {
                    println!("  {name}");
                }
            }
        }
        Command::Render {
            run,
            width,
            height,
            background,
            output,
        } => {
            let seed = load_seed(&run)?;
            let (width, height, background) = if run.seed_file.is_some() {
                (seed.width, seed.height, seed.background)
            } else {
                let background = Srgb::from_hex(&background).map_err(CliError::Background)?;
                (width, height, background)
            };
            let mut viz = build(&seed)?;
            let script = EventScript::parse(&run.events, container_size(&viz))?;
            drive(&seed, &mut viz, &script, |_, _| Ok(()))?;

            particle_sphere_engines::snapshot::write_png(
                &viz.frame(),
                width,
                height,
                background,
                &output,
            )?;

            if cli.json {
                let info = serde_json::json!({
                    "visualization": seed.visualization,
                    "width": width,
                    "height": height,
                    "ticks": seed.ticks,
                    "dt": seed.dt,
                    "seed": seed.seed,
                    "events": script.len(),
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} ({width}x{height}, {} ticks, seed {}) -> {}",
                    seed.visualization,
                    seed.ticks,
                    seed.seed,
                    output.display()
                );
            }
        }
        Command::Trace { run } => {
            let seed = load_seed(&run)?;
            let mut viz = build(&seed)?;
            let script = EventScript::parse(&run.events, container_size(&viz))?;
            drive(&seed, &mut viz, &script, |tick, viz| {
                println!("{}", serde_json::to_string(&trace_line(tick, viz))?);
                Ok(())
            })?;
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let default_directive = if cli.verbose {
        "particle_sphere=debug"
    } else {
        "particle_sphere=info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()),
        )
        .init();

    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
