//! Level files: the tile rows, start position and actor tuning of a session.

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tile_collisions_core::{MapError, PixelPoint, TileMap, DEFAULT_TILE_SIZE};

use crate::ActorTuning;

const DEMO_COLUMNS: u32 = 16;
const DEMO_START: [i32; 2] = [16, 16];
const DEMO_ROWS: [&str; 9] = [
    "0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0",
    "0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0",
    "0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0",
    "0,0,0,0,0,0,0,0,3,6,7,0,0,0,0,0",
    "1,1,1,1,8,8,8,1,1,1,1,1,8,8,8,1",
    "0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0",
    "0,0,0,0,0,0,0,0,0,0,4,5,3,0,0,0",
    "0,0,4,5,1,3,0,0,0,2,1,1,1,6,7,0",
    "1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1",
];

/// Errors raised while loading or validating a level.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The level file could not be read.
    #[error("failed to read level file {path}")]
    Read {
        /// Path that was requested.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The level file is not valid TOML for a level.
    #[error("failed to parse level toml")]
    Parse(#[from] toml::de::Error),
    /// The tile rows do not form a valid map.
    #[error("invalid tile map")]
    Map(#[from] MapError),
    /// The actor must have a positive size.
    #[error("actor size must be positive (received {width}x{height})")]
    InvalidActorSize {
        /// Configured width.
        width: i32,
        /// Configured height.
        height: i32,
    },
    /// The speed floor must keep the actor moving.
    #[error("minimum move speed must be positive (received {min_speed})")]
    InvalidSpeedFloor {
        /// Configured floor.
        min_speed: f32,
    },
    /// Velocities are scaled by the reference frame rate, which must be positive.
    #[error("reference frame rate must be positive (received {frame_rate})")]
    InvalidFrameRate {
        /// Configured frame rate.
        frame_rate: f32,
    },
}

/// Serialisable description of a level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelConfig {
    /// Edge length of a tile in pixels.
    #[serde(default = "default_tile_size")]
    pub tile_size: i32,
    /// Number of tile columns.
    pub columns: u32,
    /// Top-left start position of the actor as `[x, y]`.
    pub start: [i32; 2],
    /// Top-to-bottom rows of comma-separated tile codes.
    pub rows: Vec<String>,
    /// Actor movement constants.
    #[serde(default)]
    pub actor: ActorTuning,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            columns: DEMO_COLUMNS,
            start: DEMO_START,
            rows: DEMO_ROWS.iter().map(|row| (*row).to_owned()).collect(),
            actor: ActorTuning::default(),
        }
    }
}

impl LevelConfig {
    /// Reads and validates a level file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| LevelError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates a level from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, LevelError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the actor tuning and builds the tile map once to surface map errors.
    pub fn validate(&self) -> Result<(), LevelError> {
        let actor = &self.actor;
        if actor.width <= 0 || actor.height <= 0 {
            return Err(LevelError::InvalidActorSize {
                width: actor.width,
                height: actor.height,
            });
        }
        if actor.min_speed.is_nan() || actor.min_speed <= 0.0 {
            return Err(LevelError::InvalidSpeedFloor {
                min_speed: actor.min_speed,
            });
        }
        if actor.frame_rate.is_nan() || actor.frame_rate <= 0.0 {
            return Err(LevelError::InvalidFrameRate {
                frame_rate: actor.frame_rate,
            });
        }
        let _ = self.tile_map()?;
        Ok(())
    }

    /// Builds the tile map described by the rows.
    pub fn tile_map(&self) -> Result<TileMap, LevelError> {
        Ok(TileMap::from_rows(self.columns, self.rows.as_slice(), self.tile_size)?)
    }

    /// Start position of the actor.
    #[must_use]
    pub const fn start_position(&self) -> PixelPoint {
        PixelPoint::new(self.start[0], self.start[1])
    }
}

const fn default_tile_size() -> i32 {
    DEFAULT_TILE_SIZE
}
