use std::path::PathBuf;
use std::time::{Instant, SystemTime};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use axite_common::GridCoord;
use axite_gen::GenConfig;
use axite_persist::WorldFileStore;
use axite_service::GameService;
use axite_tools::WorldInspector;

#[derive(Parser)]
#[command(name = "axite-cli", about = "CLI for the axite world simulation")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Generate a world and print its census
    Generate {
        /// RNG seed for a reproducible world
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Half the side length of the generated square
        #[arg(long, default_value = "50")]
        half_extent: i32,
    },
    /// Run a mining session against a fresh world
    Simulate {
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Number of mining actions to perform
        #[arg(short, long, default_value = "200")]
        actions: usize,
    },
    /// Spawn an obelisk event and report where it landed
    Event {
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
    /// Trigger a genesis shift and show the before/after census
    Shift {
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
    /// Generate a world and persist a snapshot to disk
    Save {
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Store directory
        #[arg(short, long)]
        path: PathBuf,
    },
    /// Load the latest persisted world and print its census
    Load {
        /// Store directory
        #[arg(short, long)]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("axite-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("default grid: {0}x{0}", GenConfig::default().half_extent * 2);
        }
        Commands::Generate { seed, half_extent } => {
            let svc = service_with(seed, half_extent);
            println!("{}", WorldInspector::summary(svc.world()));
        }
        Commands::Simulate { seed, actions } => {
            let mut svc = service_with(seed, 50);
            println!("Mining session: seed={seed}, actions={actions}");

            let mut performed = 0;
            let mut looted = 0u32;
            while performed < actions {
                // Always hit the minable tile closest to the origin, the
                // way a player works outward from spawn.
                let Some(target) = nearest_minable(&svc) else {
                    println!("World exhausted after {performed} actions");
                    break;
                };
                let res = svc.mine(target.x, target.y, "0xcli");
                performed += 1;
                if let Some(loot) = res.loot {
                    looted += loot.amount;
                    println!("  [{target}] depleted: +{} {}", loot.amount, loot.kind);
                }
            }
            println!("Total loot: {looted}");
            println!("{}", WorldInspector::summary(svc.world()));
        }
        Commands::Event { seed } => {
            let mut svc = service_with(seed, 50);
            match svc.spawn_event() {
                Some(at) => {
                    let info = WorldInspector::inspect_tile(svc.world(), at)
                        .expect("spawned tile exists");
                    println!("Obelisk raised: {info}");
                }
                None => println!("Event skipped: no eligible tile"),
            }
        }
        Commands::Shift { seed } => {
            let mut svc = service_with(seed, 50);
            println!("Before: {}", WorldInspector::summary(svc.world()));
            let bulletin = svc.genesis_shift(SystemTime::now());
            println!("{}", bulletin.text);
            println!("After:  {}", WorldInspector::summary(svc.world()));
        }
        Commands::Save { seed, path } => {
            let mut svc = service_with(seed, 50);
            let mut store = WorldFileStore::open(&path)?;
            svc.drain_events();
            store.take_snapshot(svc.world())?;
            store.verify_integrity()?;
            println!(
                "Saved snapshot {} to {}",
                store.meta().snapshot_count,
                path.display()
            );
        }
        Commands::Load { path } => {
            let store = WorldFileStore::open(&path)?;
            store.verify_integrity()?;
            let world = store.load_latest()?;
            println!("{}", WorldInspector::summary(&world));
        }
    }

    Ok(())
}

fn service_with(seed: u64, half_extent: i32) -> GameService {
    let config = GenConfig {
        half_extent,
        rng_seed: Some(seed),
        ..GenConfig::default()
    };
    GameService::new(config, SystemTime::now(), Instant::now())
}

/// The minable tile closest to the origin, ties broken by coordinate order.
fn nearest_minable(svc: &GameService) -> Option<GridCoord> {
    svc.tiles()
        .into_iter()
        .filter(|t| t.minable())
        .min_by_key(|t| (t.coord.chebyshev(GridCoord::ORIGIN), t.coord))
        .map(|t| t.coord)
}
