//! Tile codes, their collision classification and the immutable tile map.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::PixelRect;

/// Edge length of a square tile in the demo level, measured in pixels.
pub const DEFAULT_TILE_SIZE: i32 = 16;

/// Delimiter separating tile codes within a single map row.
const ROW_DELIMITER: char = ',';

/// Small integer identifying the content of a single map cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCode(u8);

impl TileCode {
    /// Empty space that never blocks anything.
    pub const VOID: Self = Self(0);
    /// Fully solid block.
    pub const SOLID: Self = Self(1);
    /// One-way platform that only blocks descending actors from above.
    pub const PLATFORM: Self = Self(8);

    /// Wraps a raw tile code.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Raw numeric value of the code.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Parses a single map cell, falling back to [`TileCode::VOID`] when the
    /// text is not a valid code.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        text.trim().parse::<u8>().map(Self).unwrap_or(Self::VOID)
    }

    /// Collision classification of the code.
    #[must_use]
    pub const fn kind(self) -> TileKind {
        TileKind::classify(self)
    }

    /// Reports whether the code is one of the slope tiles.
    #[must_use]
    pub const fn is_slope(self) -> bool {
        self.kind().slope().is_some()
    }

    /// Reports whether the code is a slope whose vertical side faces right-moving actors.
    #[must_use]
    pub const fn is_x_flipped(self) -> bool {
        match self.kind().slope() {
            Some(shape) => shape.is_x_flipped(),
            None => false,
        }
    }

    /// Heights of the slope's left and right edges measured down from the
    /// tile top. Non-slope codes report `(0, 0)`.
    #[must_use]
    pub const fn slope_edge_heights(self, tile_size: i32) -> (i32, i32) {
        match self.kind().slope() {
            Some(shape) => shape.edge_heights(tile_size),
            None => (0, 0),
        }
    }
}

/// Height of a slope edge relative to the top of its tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum EdgeHeight {
    /// Flush with the tile's top face.
    Top,
    /// Half a tile below the top face.
    Middle,
    /// Flush with the tile's bottom face.
    Bottom,
}

impl EdgeHeight {
    const fn scaled(self, tile_size: i32) -> i32 {
        match self {
            Self::Top => 0,
            Self::Middle => tile_size / 2,
            Self::Bottom => tile_size,
        }
    }
}

/// Geometry of a ramp tile: the heights of its two edges and the side that
/// presents a vertical face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlopeShape {
    near: EdgeHeight,
    far: EdgeHeight,
    x_flipped: bool,
}

impl SlopeShape {
    const fn new(near: EdgeHeight, far: EdgeHeight, x_flipped: bool) -> Self {
        Self {
            near,
            far,
            x_flipped,
        }
    }

    /// Whether the tile is the horizontal mirror of the unflipped shape.
    #[must_use]
    pub const fn is_x_flipped(&self) -> bool {
        self.x_flipped
    }

    /// Edge heights in pixels as `(near, far)`.
    #[must_use]
    pub const fn edge_heights(&self, tile_size: i32) -> (i32, i32) {
        (self.near.scaled(tile_size), self.far.scaled(tile_size))
    }

    /// Reports whether an actor travelling horizontally with the sign of
    /// `direction` runs into the vertical side of the slope rather than onto
    /// its ramp.
    #[must_use]
    pub const fn blocks_horizontal(&self, direction: i32) -> bool {
        if direction > 0 {
            self.x_flipped
        } else {
            !self.x_flipped
        }
    }
}

/// Collision classification of a tile code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Empty space.
    Void,
    /// Fully solid block.
    Solid,
    /// Ramp tile described by its shape.
    Slope(SlopeShape),
    /// One-way platform.
    Platform,
}

impl TileKind {
    /// Classifies a tile code. Codes outside the known table are void.
    #[must_use]
    pub const fn classify(code: TileCode) -> Self {
        use EdgeHeight::{Bottom, Middle, Top};

        match code.get() {
            1 => Self::Solid,
            2 => Self::Slope(SlopeShape::new(Bottom, Top, false)),
            3 => Self::Slope(SlopeShape::new(Top, Bottom, true)),
            4 => Self::Slope(SlopeShape::new(Bottom, Middle, false)),
            5 => Self::Slope(SlopeShape::new(Middle, Top, false)),
            6 => Self::Slope(SlopeShape::new(Top, Middle, true)),
            7 => Self::Slope(SlopeShape::new(Middle, Bottom, true)),
            8 => Self::Platform,
            _ => Self::Void,
        }
    }

    /// Slope geometry when the tile is a ramp.
    #[must_use]
    pub const fn slope(&self) -> Option<SlopeShape> {
        match self {
            Self::Slope(shape) => Some(*shape),
            _ => None,
        }
    }
}

/// Reasons a tile map cannot be constructed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MapError {
    /// The column count must be positive.
    #[error("tile map must have at least one column")]
    ZeroColumns,
    /// At least one row string is required.
    #[error("tile map must have at least one row")]
    NoRows,
    /// Tiles must have a positive edge length.
    #[error("tile size must be positive (received {tile_size})")]
    InvalidTileSize {
        /// Rejected tile size.
        tile_size: i32,
    },
    /// The map's pixel extent does not fit the coordinate space.
    #[error("a {columns}x{rows} map of {tile_size}px tiles exceeds the pixel coordinate range")]
    TooLarge {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: usize,
        /// Requested tile size.
        tile_size: i32,
    },
}

/// Fixed grid of tile codes shared read-only by collision and presentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    columns: u32,
    rows: u32,
    tile_size: i32,
    tiles: Vec<TileCode>,
}

impl TileMap {
    /// Builds a map from top-to-bottom rows of comma-separated tile codes.
    ///
    /// Cells that fail to parse become void, short rows leave their remaining
    /// cells void and surplus cells in long rows are ignored.
    pub fn from_rows<S>(columns: u32, rows: &[S], tile_size: i32) -> Result<Self, MapError>
    where
        S: AsRef<str>,
    {
        if columns == 0 {
            return Err(MapError::ZeroColumns);
        }
        if rows.is_empty() {
            return Err(MapError::NoRows);
        }
        if tile_size <= 0 {
            return Err(MapError::InvalidTileSize { tile_size });
        }

        let too_large = MapError::TooLarge {
            columns,
            rows: rows.len(),
            tile_size,
        };
        let row_count = u32::try_from(rows.len()).map_err(|_| too_large.clone())?;
        let fits = |count: u32| {
            i32::try_from(count)
                .ok()
                .and_then(|count| count.checked_mul(tile_size))
                .is_some()
        };
        if !fits(columns) || !fits(row_count) {
            return Err(too_large);
        }

        let width = columns as usize;
        let mut tiles = vec![TileCode::VOID; width * rows.len()];
        for (row_index, row) in rows.iter().enumerate() {
            let start = row_index * width;
            let cells = &mut tiles[start..start + width];
            for (cell, text) in cells.iter_mut().zip(row.as_ref().split(ROW_DELIMITER)) {
                *cell = TileCode::parse(text);
            }
        }

        Ok(Self {
            columns,
            rows: row_count,
            tile_size,
            tiles,
        })
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

    /// Width of the whole map in pixels.
    #[must_use]
    pub const fn pixel_width(&self) -> i32 {
        self.columns as i32 * self.tile_size
    }

    /// Height of the whole map in pixels.
    #[must_use]
    pub const fn pixel_height(&self) -> i32 {
        self.rows as i32 * self.tile_size
    }

    /// Code stored at the given cell. Callers clamp indices first.
    #[must_use]
    pub fn tile_at(&self, column: u32, row: u32) -> TileCode {
        debug_assert!(
            column < self.columns && row < self.rows,
            "tile lookup ({column}, {row}) outside {}x{} map",
            self.columns,
            self.rows
        );
        self.tiles[row as usize * self.columns as usize + column as usize]
    }

    /// Classification of the code stored at the given cell.
    #[must_use]
    pub fn kind_at(&self, column: u32, row: u32) -> TileKind {
        self.tile_at(column, row).kind()
    }

    /// Column containing the pixel coordinate `x`, which may lie outside the map.
    #[must_use]
    pub const fn column_of(&self, x: i32) -> i32 {
        x.div_euclid(self.tile_size)
    }

    /// Row containing the pixel coordinate `y`, which may lie outside the map.
    #[must_use]
    pub const fn row_of(&self, y: i32) -> i32 {
        y.div_euclid(self.tile_size)
    }

    /// Clamps a candidate column into `0..columns`.
    #[must_use]
    pub fn clamp_column(&self, column: i32) -> u32 {
        column.clamp(0, self.columns as i32 - 1) as u32
    }

    /// Clamps a candidate row into `0..rows`.
    #[must_use]
    pub fn clamp_row(&self, row: i32) -> u32 {
        row.clamp(0, self.rows as i32 - 1) as u32
    }

    /// Pixel rectangle covered by the given cell.
    #[must_use]
    pub const fn tile_rect(&self, column: u32, row: u32) -> PixelRect {
        PixelRect::new(
            column as i32 * self.tile_size,
            row as i32 * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }

    /// Iterates over every cell as `(column, row, code)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, TileCode)> + '_ {
        let columns = self.columns as usize;
        self.tiles.iter().enumerate().map(move |(index, code)| {
            ((index % columns) as u32, (index / columns) as u32, *code)
        })
    }

    /// Row-major slice of every tile code.
    #[must_use]
    pub fn codes(&self) -> &[TileCode] {
        &self.tiles
    }
}
