//! Headless runner for the Centring battle layer.
//!
//! Plays one battle at a fixed frame rate without a renderer and prints
//! the outcome. Useful for tuning configs and reproducing seeds.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level as LogLevel};
use tracing_subscriber::FmtSubscriber;

use centring_core::{Battle, BattleConfig, Level, Rect, Viewport};

/// Runs a Centring battle without a renderer
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Level to play (1-8; level 1 has no battle)
    #[arg(short, long, default_value_t = 3)]
    level: u8,

    /// Simulated seconds to run
    #[arg(short, long, default_value_t = 30.0)]
    seconds: f32,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 800.0)]
    height: f32,

    /// Frames per simulated second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Keep spawns clear of a centred box this many pixels across
    #[arg(long)]
    ui_box: Option<f32>,

    /// JSON battle config overriding the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the final snapshot as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { LogLevel::DEBUG } else { LogLevel::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to install logger")
}

fn load_config(path: Option<&PathBuf>) -> Result<BattleConfig> {
    let Some(path) = path else {
        return Ok(BattleConfig::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    BattleConfig::from_json(&json).with_context(|| format!("invalid config {}", path.display()))
}

#[derive(Default)]
struct Totals {
    shots: usize,
    hits: usize,
    specials: usize,
    culled: usize,
    spawned: usize,
    events: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let level = Level::new(args.level).context("level out of range")?;
    anyhow::ensure!(args.fps > 0, "fps must be positive");
    anyhow::ensure!(
        args.seconds.is_finite() && args.seconds >= 0.0,
        "seconds must be a non-negative number"
    );
    let config = load_config(args.config.as_ref())?;
    let viewport = Viewport::new(args.width, args.height);
    let forbidden = args
        .ui_box
        .map(|size| vec![Rect::around(viewport.center(), size / 2.0)])
        .unwrap_or_default();

    let mut battle = Battle::with_config(config, args.seed).context("config rejected")?;
    battle.start(level, viewport, forbidden);
    if !battle.is_running() {
        info!(%level, "nothing to simulate");
    }

    #[allow(clippy::cast_precision_loss)]
    let dt = 1.0 / args.fps as f32;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let frames = (args.seconds * args.fps as f32).round() as u64;

    let mut totals = Totals::default();
    for _ in 0..frames {
        let stats = battle.step(dt);
        totals.shots += stats.shots;
        totals.hits += stats.hits;
        totals.specials += usize::from(stats.special_triggered);
        totals.culled += stats.culled;
        totals.spawned += stats.spawned;
        totals.events += battle.take_events().len();
    }

    let snapshot = battle.snapshot();
    if args.json {
        let json = serde_json::to_string_pretty(&snapshot).context("failed to encode snapshot")?;
        println!("{json}");
        return Ok(());
    }

    println!("level {level}, seed {}, {frames} frames ({:.2} s)", args.seed, snapshot.clock);
    println!(
        "red {} / blue {} (target {})",
        snapshot.tally.red,
        snapshot.tally.blue,
        battle.target_count()
    );
    println!(
        "shots {}, hits {}, specials {}, culled {}, spawned {}",
        totals.shots, totals.hits, totals.specials, totals.culled, totals.spawned
    );
    println!(
        "{} events, {} projectiles and {} effects in flight",
        totals.events,
        snapshot.projectiles.len(),
        snapshot.effects.len()
    );
    Ok(())
}
