#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state: one tile map and the actor moving through it.

mod actor;
mod level;

use tile_collisions_core::{Command, Event, PixelPoint, TileMap};
use tracing::debug;

pub use actor::{Actor, ActorTuning};
pub use level::{LevelConfig, LevelError};

/// Represents the authoritative world state.
#[derive(Clone, Debug)]
pub struct World {
    tile_map: TileMap,
    actor: Actor,
    frame_index: u64,
}

impl World {
    /// Creates a world with the actor at rest at `start`.
    #[must_use]
    pub fn new(tile_map: TileMap, start: PixelPoint, tuning: ActorTuning) -> Self {
        Self {
            tile_map,
            actor: Actor::new(start, tuning),
            frame_index: 0,
        }
    }

    /// Validates `config` and builds the world it describes.
    pub fn from_level(config: &LevelConfig) -> Result<Self, LevelError> {
        config.validate()?;
        let tile_map = config.tile_map()?;
        debug!(
            columns = tile_map.columns(),
            rows = tile_map.rows(),
            tile_size = tile_map.tile_size(),
            "loaded level"
        );
        Ok(Self::new(tile_map, config.start_position(), config.actor))
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Step { dt, input } => {
            let _ = world
                .actor
                .update(&world.tile_map, dt, &input, out_events);
            out_events.push(Event::FrameAdvanced {
                frame: world.frame_index,
                dt,
            });
            world.frame_index = world.frame_index.saturating_add(1);
        }
        Command::Reset => {
            world.actor.reset();
            out_events.push(Event::ActorReset {
                position: world.actor.start(),
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tile_collisions_core::{ActorSnapshot, TileMap};

    use super::{Actor, World};

    /// Provides read-only access to the tile map.
    #[must_use]
    pub fn tile_map(world: &World) -> &TileMap {
        &world.tile_map
    }

    /// Provides read-only access to the actor.
    #[must_use]
    pub fn actor(world: &World) -> &Actor {
        &world.actor
    }

    /// Captures the actor's debug readout.
    #[must_use]
    pub fn snapshot(world: &World) -> ActorSnapshot {
        world.actor.snapshot()
    }

    /// Number of frames simulated so far.
    #[must_use]
    pub fn frame_index(world: &World) -> u64 {
        world.frame_index
    }
}
