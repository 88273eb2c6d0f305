#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the tile collision demo.

use std::{fmt, path::PathBuf, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use tile_collisions_core::{Command, Event, InputModel, Key, KeySet, KeyboardState, PixelPoint};
use tile_collisions_rendering::{
    ActorPresentation, Color, FrameControl, Presentation, RenderingBackend, Scene,
    TilePresentation,
};
use tile_collisions_rendering_macroquad::MacroquadBackend;
use tile_collisions_world::{self as world, query, LevelConfig, World};
use tracing::{debug, info, trace};
use tracing_subscriber::EnvFilter;

const WINDOW_TITLE: &str = "Tile Based Collisions";
const WINDOW_SIZE: (u32, u32) = (1280, 720);
const CLEAR_COLOR: Color = Color::new(0.1, 0.1, 0.1, 1.0);
const TILE_COLOR: Color = Color::new(0.47, 0.53, 0.6, 1.0);
const ACTOR_COLOR: Color = Color::new(0.9, 0.22, 0.27, 1.0);
const TEXT_COLOR: Color = Color::WHITE;
const GROUNDED_HIGHLIGHT: Color = Color::new(0.2, 0.9, 0.3, 0.5);
const AIRBORNE_HIGHLIGHT: Color = Color::new(0.9, 0.8, 0.2, 0.5);

/// Chance per headless frame that each key is held.
const HEADLESS_KEY_ODDS: [(Key, f64); 7] = [
    (Key::Left, 0.3),
    (Key::Right, 0.4),
    (Key::Jump, 0.1),
    (Key::Drop, 0.05),
    (Key::SpeedUp, 0.02),
    (Key::SpeedDown, 0.02),
    (Key::Reset, 0.002),
];

/// Command-line arguments for the tile collision demo.
#[derive(Debug, Parser)]
#[command(
    name = "tile-collisions",
    about = "Walk a box through a tile map of solids, platforms and slopes"
)]
struct CliArgs {
    /// Level description in TOML. The built-in demo level is used when omitted.
    #[arg(long, value_name = "PATH")]
    level: Option<PathBuf>,
    /// Simulate with random input instead of opening a window.
    #[arg(long)]
    headless: bool,
    /// Number of frames simulated in headless mode.
    #[arg(long, default_value_t = 600)]
    frames: u32,
    /// Seed for the headless input generator.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Start with the debug overlay hidden.
    #[arg(long)]
    hide_debug: bool,
    /// Controls whether vertical sync is enabled.
    #[arg(long, value_enum)]
    vsync: Option<VsyncMode>,
    /// Log filter directives, for example `info` or `tile_collisions_world=debug`.
    #[arg(long, value_name = "FILTER", default_value = "info")]
    log_filter: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum VsyncMode {
    On,
    Off,
}

/// Entry point for the tile collision command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_filter)?;

    let level = match &args.level {
        Some(path) => LevelConfig::load(path)
            .with_context(|| format!("failed to load level {}", path.display()))?,
        None => LevelConfig::default(),
    };
    let world = World::from_level(&level).context("failed to build world from level")?;

    if args.headless {
        let summary = run_headless(world, args.frames, args.seed)?;
        println!("{summary}");
        return Ok(());
    }

    run_windowed(world, args.hide_debug, args.vsync)
}

fn init_tracing(filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(filter)
        .with_context(|| format!("invalid log filter `{filter}`"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to install tracing subscriber: {error}"))
}

fn run_windowed(mut world: World, hide_debug: bool, vsync: Option<VsyncMode>) -> Result<()> {
    let tiles = TilePresentation::from_map(query::tile_map(&world), TILE_COLOR);
    let actor = ActorPresentation::new(query::snapshot(&world).bounds, ACTOR_COLOR);
    let mut scene = Scene::new(tiles, actor);
    scene.debug_visible = !hide_debug;
    let presentation = Presentation::new(WINDOW_TITLE, WINDOW_SIZE, CLEAR_COLOR, scene);

    let mut backend = MacroquadBackend::new();
    if let Some(mode) = vsync {
        backend = backend.with_vsync(mode == VsyncMode::On);
    }

    info!("starting windowed session");
    let mut events = Vec::new();
    backend.run(presentation, move |dt, keyboard, scene| {
        if keyboard.is_pressed(Key::ToggleDebug) {
            scene.debug_visible = !scene.debug_visible;
            debug!(visible = scene.debug_visible, "toggled debug overlay");
        }

        events.clear();
        world::apply(
            &mut world,
            Command::Step {
                dt,
                input: keyboard,
            },
            &mut events,
        );
        for event in &events {
            trace!(?event, "world event");
        }

        let snapshot = query::snapshot(&world);
        scene.actor.bounds = snapshot.bounds;
        scene.overlay.clear();
        let highlight = if snapshot.contacts.grounded {
            GROUNDED_HIGHLIGHT
        } else {
            AIRBORNE_HIGHLIGHT
        };
        scene.overlay.push_rect(snapshot.bounds, highlight);
        scene.overlay.push_readout(&snapshot, TEXT_COLOR);

        if keyboard.is_down(Key::Exit) {
            info!("exit requested");
            FrameControl::Exit
        } else {
            FrameControl::Continue
        }
    })
}

/// Outcome of a headless session.
#[derive(Clone, Debug, PartialEq, Eq)]
struct HeadlessSummary {
    frames: u32,
    final_position: PixelPoint,
    jumps: u32,
    landings: u32,
    digest: String,
}

impl fmt::Display for HeadlessSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "frames: {}", self.frames)?;
        writeln!(
            f,
            "final position: ({}, {})",
            self.final_position.x, self.final_position.y
        )?;
        writeln!(f, "jumps: {}", self.jumps)?;
        writeln!(f, "landings: {}", self.landings)?;
        write!(f, "digest: {}", self.digest)
    }
}

/// Drives the world with seeded random input, checking that the actor stays
/// inside the map and hashing its state after every frame.
fn run_headless(mut world: World, frames: u32, seed: u64) -> Result<HeadlessSummary> {
    let frame_rate = query::actor(&world).tuning().frame_rate;
    let dt = Duration::try_from_secs_f64(1.0 / f64::from(frame_rate))
        .with_context(|| format!("frame rate {frame_rate} does not give a usable frame time"))?;
    let (width, height) = {
        let map = query::tile_map(&world);
        (map.pixel_width(), map.pixel_height())
    };

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut keyboard = KeyboardState::new();
    let mut hasher = Sha256::new();
    let mut events = Vec::new();
    let mut jumps = 0;
    let mut landings = 0;

    info!(frames, seed, "starting headless session");
    for frame in 0..frames {
        keyboard.poll(random_keys(&mut rng));
        events.clear();
        world::apply(
            &mut world,
            Command::Step {
                dt,
                input: keyboard,
            },
            &mut events,
        );

        for event in &events {
            match event {
                Event::Jumped { .. } => jumps += 1,
                Event::Landed { .. } => landings += 1,
                _ => {}
            }
        }

        let snapshot = query::snapshot(&world);
        let bounds = snapshot.bounds;
        if bounds.x < 0 || bounds.y < 0 || bounds.right() > width || bounds.bottom() > height {
            bail!("actor left the map on frame {frame}: {bounds:?}");
        }

        hasher.update(bounds.x.to_le_bytes());
        hasher.update(bounds.y.to_le_bytes());
        hasher.update(snapshot.velocity_x.to_le_bytes());
        hasher.update(snapshot.velocity_y.to_le_bytes());
        hasher.update([
            u8::from(snapshot.contacts.grounded),
            u8::from(snapshot.contacts.on_platform),
            u8::from(snapshot.contacts.on_slope),
        ]);
    }

    let summary = HeadlessSummary {
        frames,
        final_position: query::snapshot(&world).bounds.position(),
        jumps,
        landings,
        digest: format!("{:x}", hasher.finalize()),
    };
    info!(digest = %summary.digest, "headless session finished");
    Ok(summary)
}

fn random_keys(rng: &mut impl Rng) -> KeySet {
    HEADLESS_KEY_ODDS
        .iter()
        .filter(|(_, odds)| rng.gen_bool(*odds))
        .map(|(key, _)| *key)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_collisions_core::TileMap;
    use tile_collisions_world::ActorTuning;

    fn demo_world() -> World {
        World::from_level(&LevelConfig::default()).expect("demo level")
    }

    #[test]
    fn headless_sessions_are_deterministic() {
        let first = run_headless(demo_world(), 300, 42).expect("first run");
        let second = run_headless(demo_world(), 300, 42).expect("second run");

        assert_eq!(first, second);
        assert_eq!(first.digest.len(), 64);
    }

    #[test]
    fn zero_frames_leave_actor_at_start() {
        let summary = run_headless(demo_world(), 0, 7).expect("empty run");

        assert_eq!(summary.final_position, PixelPoint::new(16, 16));
        assert_eq!(summary.jumps, 0);
        assert_eq!(summary.landings, 0);
    }

    #[test]
    fn summary_lists_digest_last() {
        let summary = run_headless(demo_world(), 10, 1).expect("short run");
        let rendered = summary.to_string();

        assert!(rendered.starts_with("frames: 10\n"));
        assert!(rendered.ends_with(&format!("digest: {}", summary.digest)));
    }

    #[test]
    fn unusable_frame_rate_is_an_error() {
        let map = TileMap::from_rows(2, &["0,0", "1,1"], 16).expect("valid map");
        let tuning = ActorTuning {
            frame_rate: 1.0e-30,
            ..ActorTuning::default()
        };
        let world = World::new(map, PixelPoint::new(0, 0), tuning);

        let error = run_headless(world, 1, 0).expect_err("frame time overflows");

        assert!(error.to_string().contains("frame rate"));
    }

    #[test]
    fn arguments_parse_with_defaults() {
        let args = CliArgs::try_parse_from(["tile-collisions", "--headless", "--seed", "9"])
            .expect("valid arguments");

        assert!(args.headless);
        assert_eq!(args.seed, 9);
        assert_eq!(args.frames, 600);
        assert_eq!(args.vsync, None);
        assert_eq!(args.log_filter, "info");
    }

    #[test]
    fn vsync_accepts_on_and_off() {
        let args = CliArgs::try_parse_from(["tile-collisions", "--vsync", "off"])
            .expect("valid arguments");

        assert_eq!(args.vsync, Some(VsyncMode::Off));
        assert!(CliArgs::try_parse_from(["tile-collisions", "--vsync", "maybe"]).is_err());
    }
}
