#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots Tower Mini, windowed or headless.

mod headless;
mod host;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use glam::Vec2;
use tower_mini_core::Rules;
use tower_mini_rendering::{palette, Presentation, RenderingBackend, Scene};
use tower_mini_rendering_macroquad::MacroquadBackend;
use tower_mini_system_simulation::Simulation;
use tracing::info;
use tracing_subscriber::EnvFilter;

use self::host::Host;

const WINDOW_TITLE: &str = "Tower Mini";

/// Single-lane tower defence with thirty escalating levels.
#[derive(Debug, Parser)]
#[command(name = "tower-mini", version)]
struct Args {
    /// Level to start at. Skips the level-select screen.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    level: Option<u32>,

    /// TOML file overriding the default rules. Missing keys keep their defaults.
    #[arg(long, value_name = "PATH")]
    rules: Option<PathBuf>,

    /// Run without a window for the given number of simulated seconds.
    #[arg(long, value_name = "SECONDS")]
    headless: Option<f32>,

    /// Frame step in seconds used by headless runs.
    #[arg(long, value_name = "SECONDS", default_value_t = 1.0 / 60.0)]
    fixed_dt: f32,

    /// Synchronise presentation with the display (`true`) or render uncapped (`false`).
    #[arg(long)]
    vsync: Option<bool>,

    /// Log the frame rate once per second.
    #[arg(long)]
    show_fps: bool,

    /// Draw primitive shapes only, without loading sprites.
    #[arg(long)]
    no_sprites: bool,

    /// Sprite manifest to load instead of `assets/manifest.toml`.
    #[arg(long, value_name = "PATH")]
    sprite_manifest: Option<PathBuf>,

    /// Default log filter. `RUST_LOG` takes precedence when set.
    #[arg(long, value_name = "FILTER", default_value = "info")]
    log_level: String,
}

/// Entry point for the Tower Mini command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let rules = match &args.rules {
        Some(path) => load_rules(path)?,
        None => Rules::default(),
    };

    if let Some(seconds) = args.headless {
        let (duration, step) = headless_timing(seconds, args.fixed_dt)?;
        let summary = headless::run(
            Simulation::new(rules),
            args.level.unwrap_or(1),
            duration,
            step,
        );
        info!(%summary, "headless run finished");
        println!("{summary}");
        return Ok(());
    }

    run_windowed(&args, rules)
}

/// Converts the headless flags into a run length and a non-zero frame step.
fn headless_timing(seconds: f32, fixed_dt: f32) -> Result<(Duration, Duration)> {
    let duration = Duration::try_from_secs_f32(seconds)
        .with_context(|| format!("--headless {seconds} is not a usable number of seconds"))?;
    let step = Duration::try_from_secs_f32(fixed_dt)
        .with_context(|| format!("--fixed-dt {fixed_dt} is not a usable frame step"))?;
    ensure!(
        !step.is_zero(),
        "--fixed-dt {fixed_dt} rounds down to a zero frame step"
    );
    Ok((duration, step))
}

fn run_windowed(args: &Args, rules: Rules) -> Result<()> {
    let mut backend = MacroquadBackend::new()
        .with_show_fps(args.show_fps)
        .with_sprite_loading(!args.no_sprites);
    if let Some(enabled) = args.vsync {
        backend = backend.with_vsync(enabled);
    }
    if let Some(manifest) = &args.sprite_manifest {
        backend = backend.with_sprite_manifest(manifest);
    }

    let window_size = Vec2::new(rules.play_area.width, rules.play_area.height);
    let presentation = Presentation::new(
        WINDOW_TITLE,
        window_size,
        palette::FIELD,
        Scene::level_select(),
    );

    let mut host = Host::new(Simulation::new(rules));
    if let Some(level) = args.level {
        host.start(level);
    }

    backend
        .run(presentation, move |dt, input, scene| host.frame(dt, input, scene))
        .context("rendering backend stopped with an error")
}

fn init_logging(default_filter: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .with_context(|| format!("invalid log filter `{default_filter}`"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to install the log subscriber: {error}"))
}

fn load_rules(path: &Path) -> Result<Rules> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read rules from {}", path.display()))?;
    let rules = parse_rules(&contents)
        .with_context(|| format!("invalid rules in {}", path.display()))?;
    info!(path = %path.display(), "loaded rules");
    Ok(rules)
}

fn parse_rules(contents: &str) -> Result<Rules> {
    let rules: Rules = toml::from_str(contents).context("failed to parse rules toml")?;
    rules.validate()?;
    Ok(rules)
}
