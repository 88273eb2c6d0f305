#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for tile collision adapters.

use std::time::Duration;

use anyhow::Result as AnyResult;
use glam::Vec2;
use thiserror::Error;
use tile_collisions_core::{ActorSnapshot, KeyboardState, PixelRect, TileCode, TileKind, TileMap};

/// Thickness of the drawn platform strip as a fraction of the tile size.
const PLATFORM_THICKNESS: f32 = 0.25;

/// Screen-space origin of the first readout line.
const READOUT_ORIGIN: Vec2 = Vec2::new(10.0, 10.0);
/// Vertical distance between readout lines in screen pixels.
const READOUT_LINE_SPACING: f32 = 40.0;
/// Font scale applied to readout lines.
const READOUT_SCALE: f32 = 2.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

/// Outline of the collision shape of a tile in pixels relative to the tile's
/// top-left corner, listed clockwise. Void tiles have no outline.
#[must_use]
pub fn tile_polygon(code: TileCode, tile_size: i32) -> Option<Vec<Vec2>> {
    let size = tile_size as f32;
    let mut points = match code.kind() {
        TileKind::Void => return None,
        TileKind::Solid => vec![
            Vec2::ZERO,
            Vec2::new(size, 0.0),
            Vec2::new(size, size),
            Vec2::new(0.0, size),
        ],
        TileKind::Platform => {
            let thickness = size * PLATFORM_THICKNESS;
            vec![
                Vec2::ZERO,
                Vec2::new(size, 0.0),
                Vec2::new(size, thickness),
                Vec2::new(0.0, thickness),
            ]
        }
        TileKind::Slope(shape) => {
            let (near, far) = shape.edge_heights(tile_size);
            vec![
                Vec2::new(0.0, near as f32),
                Vec2::new(size, far as f32),
                Vec2::new(size, size),
                Vec2::new(0.0, size),
            ]
        }
    };

    // Ramps reaching the tile bottom on one edge collapse to triangles.
    points.dedup();
    if points.len() > 1 && points.first() == points.last() {
        let _ = points.pop();
    }
    Some(points)
}

/// The five readout lines of the debug overlay.
#[must_use]
pub fn debug_lines(snapshot: &ActorSnapshot) -> [String; 5] {
    [
        format!("Player speed: {} px per frame", snapshot.move_speed),
        format!("Is grounded: {}", snapshot.contacts.grounded),
        format!("Is standing on platform: {}", snapshot.contacts.on_platform),
        format!("Is standing on slope: {}", snapshot.contacts.on_slope),
        format!(
            "Velocity: ({}, {})",
            snapshot.velocity_x, snapshot.velocity_y
        ),
    ]
}

/// Describes the tile layer of the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct TilePresentation {
    columns: u32,
    rows: u32,
    tile_size: i32,
    codes: Vec<TileCode>,
    /// Fill color for tile shapes.
    pub color: Color,
}

impl TilePresentation {
    /// Creates a tile layer from row-major codes.
    pub fn new(
        columns: u32,
        rows: u32,
        tile_size: i32,
        codes: Vec<TileCode>,
        color: Color,
    ) -> Result<Self, RenderingError> {
        if tile_size <= 0 {
            return Err(RenderingError::InvalidTileSize { tile_size });
        }
        let expected = columns as usize * rows as usize;
        if codes.len() != expected {
            return Err(RenderingError::TileCountMismatch {
                expected,
                actual: codes.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            tile_size,
            codes,
            color,
        })
    }

    /// Copies the codes of `map` into a tile layer.
    #[must_use]
    pub fn from_map(map: &TileMap, color: Color) -> Self {
        Self {
            columns: map.columns(),
            rows: map.rows(),
            tile_size: map.tile_size(),
            codes: map.codes().to_vec(),
            color,
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Edge length of a tile in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> i32 {
        self.tile_size
    }

    /// Width of the layer in pixels.
    #[must_use]
    pub fn pixel_width(&self) -> f32 {
        self.columns as f32 * self.tile_size as f32
    }

    /// Height of the layer in pixels.
    #[must_use]
    pub fn pixel_height(&self) -> f32 {
        self.rows as f32 * self.tile_size as f32
    }

    /// Outlines of every non-void tile as `(tile origin, outline)` in pixels.
    pub fn outlines(&self) -> impl Iterator<Item = (Vec2, Vec<Vec2>)> + '_ {
        let columns = self.columns as usize;
        let size = self.tile_size as f32;
        self.codes.iter().enumerate().filter_map(move |(index, code)| {
            let origin = Vec2::new((index % columns) as f32 * size, (index / columns) as f32 * size);
            tile_polygon(*code, self.tile_size).map(|outline| (origin, outline))
        })
    }
}

/// Describes the actor drawn on top of the tiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorPresentation {
    /// Bounding box in pixels.
    pub bounds: PixelRect,
    /// Fill color.
    pub color: Color,
}

impl ActorPresentation {
    /// Creates a new actor descriptor.
    #[must_use]
    pub const fn new(bounds: PixelRect, color: Color) -> Self {
        Self { bounds, color }
    }
}

/// Single debug drawing request.
#[derive(Clone, Debug, PartialEq)]
pub enum OverlayRequest {
    /// Text drawn in screen space.
    Text {
        /// Content of the line.
        text: String,
        /// Top-left position in screen pixels.
        position: Vec2,
        /// Text color.
        color: Color,
        /// Font scale.
        scale: f32,
    },
    /// Filled rectangle drawn in map pixels.
    Rect {
        /// Area to fill.
        rect: PixelRect,
        /// Fill color.
        color: Color,
    },
}

/// Debug drawing requests accumulated by the frame loop and drawn once per frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DebugOverlay {
    requests: Vec<OverlayRequest>,
}

impl DebugOverlay {
    /// Queues a line of text.
    pub fn push_text(&mut self, text: impl Into<String>, position: Vec2, color: Color, scale: f32) {
        self.requests.push(OverlayRequest::Text {
            text: text.into(),
            position,
            color,
            scale,
        });
    }

    /// Queues a filled rectangle.
    pub fn push_rect(&mut self, rect: PixelRect, color: Color) {
        self.requests.push(OverlayRequest::Rect { rect, color });
    }

    /// Queues the actor readout lines at their fixed screen positions.
    pub fn push_readout(&mut self, snapshot: &ActorSnapshot, color: Color) {
        for (index, line) in debug_lines(snapshot).into_iter().enumerate() {
            let position = READOUT_ORIGIN + Vec2::new(0.0, index as f32 * READOUT_LINE_SPACING);
            self.push_text(line, position, color, READOUT_SCALE);
        }
    }

    /// Drops every queued request.
    pub fn clear(&mut self) {
        self.requests.clear();
    }

    /// Iterates over the queued requests in submission order.
    pub fn iter(&self) -> impl Iterator<Item = &OverlayRequest> {
        self.requests.iter()
    }

    /// Number of queued requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Reports whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// Scene description consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Tile layer.
    pub tiles: TilePresentation,
    /// Actor drawn above the tiles.
    pub actor: ActorPresentation,
    /// Debug requests for the current frame.
    pub overlay: DebugOverlay,
    /// Whether the overlay is drawn.
    pub debug_visible: bool,
}

impl Scene {
    /// Creates a new scene with an empty, visible overlay.
    #[must_use]
    pub fn new(tiles: TilePresentation, actor: ActorPresentation) -> Self {
        Self {
            tiles,
            actor,
            overlay: DebugOverlay::default(),
            debug_visible: true,
        }
    }
}

/// Top-level description of the window and its initial scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Initial window size in screen pixels.
    pub window_size: (u32, u32),
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, window_size: (u32, u32), clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            window_size,
            clear_color,
            scene,
        }
    }
}

/// Decision returned by the frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Keep running.
    Continue,
    /// Close the window after this frame.
    Exit,
}

/// Rendering backends capable of presenting a scene.
pub trait RenderingBackend {
    /// Runs the rendering backend until the callback asks to exit.
    ///
    /// The backend polls the keyboard once per frame and hands the frame
    /// delta and keyboard state to `update_scene`, which mutates the scene
    /// before it is drawn.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, KeyboardState, &mut Scene) -> FrameControl + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum RenderingError {
    /// Tiles must have a positive edge length.
    #[error("tile size must be positive (received {tile_size})")]
    InvalidTileSize {
        /// Provided tile size.
        tile_size: i32,
    },
    /// The code list must cover the grid exactly.
    #[error("expected {expected} tile codes but received {actual}")]
    TileCountMismatch {
        /// Cells in the grid.
        expected: usize,
        /// Codes supplied.
        actual: usize,
    },
}
