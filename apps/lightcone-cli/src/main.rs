use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use glam::{DQuat, DVec3};
use tracing_subscriber::EnvFilter;

use lightcone_common::{PhysicalConstants, SpacetimeState};
use lightcone_geometry::{ConformalMap, Geometry, Schwarzschild, StochasticSchwarzschild};
use lightcone_kernel::SceneConfig;
use lightcone_optics::OpticalDelaySolver;
use lightcone_tools::SceneInspector;

#[derive(Parser)]
#[command(name = "lightcone-cli", about = "CLI tool for lightcone spacetime simulations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version, crate info and physical constants
    Info {
        /// Show SI constants instead of natural units
        #[arg(long)]
        si: bool,
    },
    /// Compute the optical time offset of an object relative to a resting observer
    Delay {
        /// Object position relative to the observer, as x,y,z
        #[arg(short, long, value_parser = parse_vec3, allow_hyphen_values = true)]
        position: DVec3,
        /// Object velocity, as x,y,z
        #[arg(short = 'u', long, value_parser = parse_vec3, default_value = "0,0,0", allow_hyphen_values = true)]
        velocity: DVec3,
        /// Signal speed
        #[arg(short, long, default_value = "1.0")]
        c: f64,
    },
    /// Tick a black hole in natural units until it evaporates
    Evaporate {
        /// Initial horizon radius, in Planck lengths
        #[arg(short, long)]
        radius: f64,
        #[arg(short, long, value_enum, default_value = "schwarzschild")]
        kind: EvaporationKind,
        /// World time per tick, in Planck times
        #[arg(long, default_value = "1000.0")]
        dt: f64,
        /// Seed for the stochastic law
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Stop after this many ticks even if the body survives
        #[arg(long, default_value = "100000")]
        max_ticks: u64,
        /// Print every n-th tick
        #[arg(long, default_value = "1")]
        every: u64,
    },
    /// Step a scene file and report what the observer sees
    Run {
        /// YAML or JSON scene file
        #[arg(short, long)]
        scene: PathBuf,
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "10")]
        ticks: u64,
        /// World time per tick
        #[arg(long, default_value = "0.1")]
        dt: f64,
        /// Emit one JSON frame per tick instead of a summary
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum EvaporationKind {
    Schwarzschild,
    Stochastic,
}

fn parse_vec3(text: &str) -> Result<DVec3, String> {
    let parts: Vec<f64> = text
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid number in `{text}`: {e}"))?;
    match parts.as_slice() {
        [x, y, z] => Ok(DVec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got `{text}`")),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info { si } => {
            println!("lightcone-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", lightcone_common::crate_info());
            println!("geometry: {}", lightcone_geometry::crate_info());
            println!("optics: {}", lightcone_optics::crate_info());
            println!("tools: {}", lightcone_tools::crate_info());
            let k = if si {
                PhysicalConstants::si()
            } else {
                PhysicalConstants::natural()
            };
            println!("c = {:e}", k.speed_of_light);
            println!("G = {:e}", k.gravitational_constant);
            println!("hbar = {:e}", k.reduced_planck);
            println!("planck length = {:e}", k.planck_length);
            println!("planck time = {:e}", k.planck_time);
            println!("planck mass = {:e}", k.planck_mass);
            println!("planck charge = {:e}", k.planck_charge);
        }
        Commands::Delay {
            position,
            velocity,
            c,
        } => {
            anyhow::ensure!(c.is_finite() && c > 0.0, "signal speed must be positive");
            let solver = OpticalDelaySolver::new(DQuat::IDENTITY, c);
            let offset = solver.offset(position, velocity);
            println!("offset = {offset}");
            println!(
                "seen at = {}",
                lightcone_optics::optical_position(position, velocity, offset)
            );
            println!(
                "doppler = {}",
                lightcone_optics::doppler_factor(velocity, position, c)
            );
        }
        Commands::Evaporate {
            radius,
            kind,
            dt,
            seed,
            max_ticks,
            every,
        } => {
            anyhow::ensure!(radius.is_finite() && radius > 0.0, "radius must be positive");
            let base = Schwarzschild::new(radius);
            let mut geometry: Geometry = match kind {
                EvaporationKind::Schwarzschild => base.into(),
                EvaporationKind::Stochastic => StochasticSchwarzschild::new(base, seed).into(),
            };
            let mut state = SpacetimeState::default();
            state.observer.position = DVec3::new(0.0, 0.0, radius * 1e3);

            println!("tick\tworld_time\tradius");
            let mut tick = 0;
            while tick < max_ticks {
                state.advance(dt);
                tick += 1;
                let report = geometry.evolve(&mut state);
                if tick % every.max(1) == 0 || report.radius_after == 0.0 {
                    println!(
                        "{tick}\t{:.6e}\t{:.6e}",
                        state.total_world_time(),
                        report.radius_after
                    );
                }
                if report.radius_after == 0.0 {
                    tracing::info!(tick, world_time = state.total_world_time(), "fully evaporated");
                    break;
                }
            }
        }
        Commands::Run {
            scene,
            ticks,
            dt,
            json,
        } => {
            let config = SceneConfig::from_path(&scene)
                .with_context(|| format!("loading scene {}", scene.display()))?;
            let mut world = config.build().context("building scene")?;
            for _ in 0..ticks {
                let frame = world.step(dt);
                if json {
                    println!("{}", serde_json::to_string(&frame)?);
                }
            }
            if !json {
                println!("{}", SceneInspector::summary(&world));
                for geometry in SceneInspector::list_geometries(&world) {
                    println!("  {geometry}");
                }
                for id in SceneInspector::list_objects(&world) {
                    if let Some(info) = SceneInspector::inspect_object(&world, id) {
                        println!("  {info}");
                    }
                }
            }
        }
    }

    Ok(())
}
