#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Skirmish scenarios and exports minimap layers.

mod layer_transfer;
mod scenario;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use skirmish_core::{CellCoord, Event};
use skirmish_minimap::{add_static_resources, terrain_bitmap, MinimapLayers, PixelBuffer};
use skirmish_world::query;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use layer_transfer::LayerSnapshot;
use scenario::{Scenario, Simulation};

/// Runs Skirmish scenarios and renders their minimap.
#[derive(Debug, Parser)]
#[command(name = "skirmish", version, about, long_about = None)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Render the static terrain and resource preview of a scenario map.
    Preview {
        /// Scenario TOML file.
        scenario: PathBuf,
        /// Size the image to the map bounds instead of a power-of-two square.
        #[arg(long)]
        actual_size: bool,
        /// Write raw BGRA bytes here instead of printing an encoded string.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run a scenario for a number of frames and render every minimap layer.
    Simulate {
        /// Scenario TOML file.
        scenario: PathBuf,
        /// Number of frames to run.
        #[arg(long)]
        frames: u32,
        /// Directory receiving one `.bgra` file per layer plus `summary.json`.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Convert an encoded layer string back into raw BGRA bytes.
    Decode {
        /// Encoded layer produced by `preview` or `simulate`.
        encoded: String,
        /// Destination of the raw BGRA bytes.
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct SimulationSummary {
    frames: u32,
    captures: usize,
    rejected_commands: usize,
    actors: Vec<ActorSummary>,
}

#[derive(Debug, Serialize)]
struct ActorSummary {
    id: u32,
    name: String,
    kind: String,
    owner: u32,
    owner_name: Option<String>,
    location: CellCoord,
    alive: bool,
    in_world: bool,
    activity: Option<&'static str>,
    cargo: Option<CargoSummary>,
}

#[derive(Debug, Serialize)]
struct CargoSummary {
    capacity: u32,
    passengers: Vec<u32>,
}

/// Entry point for the Skirmish command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        CliCommand::Preview {
            scenario,
            actual_size,
            output,
        } => preview(&scenario, actual_size, output.as_deref()),
        CliCommand::Simulate {
            scenario,
            frames,
            output_dir,
        } => simulate(&scenario, frames, output_dir.as_deref()),
        CliCommand::Decode { encoded, output } => decode(&encoded, &output),
    }
}

fn init_tracing(fallback: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .with_context(|| format!("invalid log filter `{fallback}`"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn preview(path: &Path, actual_size: bool, output: Option<&Path>) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let map = scenario.build_map()?;
    let rules = scenario.build_ruleset()?;

    let terrain =
        terrain_bitmap(&map, &rules, actual_size).context("failed to rasterize terrain")?;
    let buffer =
        add_static_resources(&map, &rules, &terrain).context("failed to rasterize resources")?;
    info!(
        width = buffer.width(),
        height = buffer.height(),
        "rendered map preview"
    );

    match output {
        Some(output) => write_layer(output, &buffer),
        None => {
            println!("{}", LayerSnapshot::from_buffer(&buffer).encode());
            Ok(())
        }
    }
}

fn simulate(path: &Path, frames: u32, output_dir: Option<&Path>) -> Result<()> {
    if frames == 0 {
        bail!("--frames must be at least 1");
    }
    let Simulation {
        mut world,
        mut activities,
        names,
    } = Scenario::load(path)?.build()?;

    let mut captures = 0;
    let mut rejected_commands = 0;
    for frame in 0..frames {
        let mut events = Vec::new();
        activities.run_frame(&mut world, &mut events);
        for event in &events {
            match event {
                Event::ActorCaptured(notice) => {
                    captures += 1;
                    info!(frame, target = %notice.target, capturer = %notice.capturer, "actor captured");
                }
                Event::CommandRejected { command, reason } => {
                    rejected_commands += 1;
                    debug!(frame, ?command, %reason, "command rejected");
                }
                _ => {}
            }
        }
        info!(
            frame,
            events = events.len(),
            busy = activities.busy_count(),
            "frame complete"
        );
    }

    let layers = MinimapLayers::render(&world).context("failed to rasterize minimap layers")?;
    let summary = SimulationSummary {
        frames,
        captures,
        rejected_commands,
        actors: query::actors(&world)
            .map(|actor| ActorSummary {
                id: actor.id().get(),
                name: names.get(&actor.id()).cloned().unwrap_or_default(),
                kind: actor.kind().to_owned(),
                owner: actor.owner().get(),
                owner_name: query::player(&world, actor.owner())
                    .map(|player| player.name.clone()),
                location: actor.location(),
                alive: actor.is_alive(),
                in_world: actor.is_in_world(),
                activity: activities.current(actor.id()),
                cargo: actor.cargo().map(|cargo| CargoSummary {
                    capacity: cargo.capacity(),
                    passengers: cargo.passengers().iter().map(|id| id.get()).collect(),
                }),
            })
            .collect(),
    };
    let summary = serde_json::to_string_pretty(&summary).context("failed to encode summary")?;

    let named_layers = [
        ("terrain", &layers.terrain),
        ("custom_terrain", &layers.custom_terrain),
        ("actors", &layers.actors),
        ("shroud", &layers.shroud),
    ];
    match output_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            for (name, buffer) in named_layers {
                write_layer(&dir.join(format!("{name}.bgra")), buffer)?;
            }
            let summary_path = dir.join("summary.json");
            fs::write(&summary_path, summary)
                .with_context(|| format!("failed to write {}", summary_path.display()))?;
            info!(dir = %dir.display(), "exported simulation");
        }
        None => {
            for (name, buffer) in named_layers {
                println!("{name} {}", LayerSnapshot::from_buffer(buffer).encode());
            }
            println!("{summary}");
        }
    }
    Ok(())
}

fn decode(encoded: &str, output: &Path) -> Result<()> {
    let snapshot = LayerSnapshot::decode(encoded).context("failed to decode layer string")?;
    fs::write(output, &snapshot.bgra)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(
        width = snapshot.width,
        height = snapshot.height,
        output = %output.display(),
        "decoded layer"
    );
    Ok(())
}

fn write_layer(path: &Path, buffer: &PixelBuffer) -> Result<()> {
    fs::write(path, buffer.to_bgra_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), "wrote layer");
    Ok(())
}
