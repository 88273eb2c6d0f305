#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tile collision engine.
//!
//! This crate defines the tile map and its classification table, the
//! keyboard model adapters poll each frame, and the message surface between
//! adapters and the authoritative world. Adapters submit [`Command`] values,
//! the world executes them via its `apply` entry point and broadcasts
//! [`Event`] values describing notable contact changes.

mod input;
mod tiles;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use input::{InputModel, Key, KeySet, KeyboardState};
pub use tiles::{MapError, SlopeShape, TileCode, TileKind, TileMap, DEFAULT_TILE_SIZE};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by one frame using the polled keyboard.
    Step {
        /// Wall-clock duration of the frame being simulated.
        dt: Duration,
        /// Keyboard state polled for this frame.
        input: KeyboardState,
    },
    /// Returns the actor to its start position without touching velocity or contacts.
    Reset,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A frame finished resolving.
    FrameAdvanced {
        /// Zero-based index of the completed frame.
        frame: u64,
        /// Duration that was simulated.
        dt: Duration,
    },
    /// The actor was moved back to its start position.
    ActorReset {
        /// Restored top-left position.
        position: PixelPoint,
    },
    /// A jump impulse was applied.
    Jumped {
        /// Position the jump started from.
        from: PixelPoint,
    },
    /// The actor was nudged below the platform it stood on.
    DroppedThroughPlatform {
        /// Position after the nudge.
        position: PixelPoint,
    },
    /// The actor became grounded this frame.
    Landed {
        /// Contacts established by the landing.
        contacts: ContactFlags,
    },
    /// The actor lost ground contact this frame.
    LeftGround,
}

/// Integer pixel position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Horizontal coordinate, increasing to the right.
    pub x: i32,
    /// Vertical coordinate, increasing downwards.
    pub y: i32,
}

impl PixelPoint {
    /// Creates a new pixel position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in integer pixels anchored at its top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Horizontal extent.
    pub width: i32,
    /// Vertical extent.
    pub height: i32,
}

impl PixelRect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner.
    #[must_use]
    pub const fn position(&self) -> PixelPoint {
        PixelPoint::new(self.x, self.y)
    }

    /// Exclusive right edge.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Reports whether the interiors of the two rectangles overlap. Touching
    /// edges do not count as an intersection.
    #[must_use]
    pub const fn intersects(&self, other: &PixelRect) -> bool {
        other.x < self.right()
            && self.x < other.right()
            && other.y < self.bottom()
            && self.y < other.bottom()
    }
}

/// Contact flags maintained by collision resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactFlags {
    /// Standing on a solid tile, a platform or a slope.
    pub grounded: bool,
    /// Standing on a one-way platform and on no solid tile.
    pub on_platform: bool,
    /// Standing inside the ramp zone of a slope.
    pub on_slope: bool,
}

/// Per-frame readout of the actor consumed by debug presentation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    /// Bounding box after resolution.
    pub bounds: PixelRect,
    /// Horizontal move speed in pixels per reference frame.
    pub move_speed: f32,
    /// Contacts after resolution.
    pub contacts: ContactFlags,
    /// Horizontal displacement applied this frame.
    pub velocity_x: i32,
    /// Vertical displacement applied this frame.
    pub velocity_y: i32,
}
