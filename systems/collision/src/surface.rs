//! Post-move contact passes: ground detection and slope following.

use tile_collisions_core::{ContactFlags, PixelRect, SlopeShape, TileKind, TileMap};

use crate::column_span;

/// Detects a solid tile or platform flush beneath the box and snaps onto it.
///
/// The grounded and platform flags are always cleared first; a rising box
/// (`velocity_y < 0`) is then left airborne. A platform keeps scanning in
/// case a solid tile is also underfoot, and solid ground wins.
pub fn check_ground(
    map: &TileMap,
    bounds: &mut PixelRect,
    velocity_y: i32,
    contacts: &mut ContactFlags,
) {
    contacts.grounded = false;
    contacts.on_platform = false;
    if velocity_y < 0 {
        return;
    }

    let (first_column, last_column) = column_span(map, *bounds);
    let row = map.clamp_row(map.row_of(bounds.bottom()));

    for column in first_column..=last_column {
        let tile = map.tile_rect(column, row);
        if tile.y != bounds.bottom() {
            continue;
        }

        match map.kind_at(column, row) {
            TileKind::Platform => {
                contacts.grounded = true;
                contacts.on_platform = true;
                bounds.y = tile.y - bounds.height;
            }
            TileKind::Solid => {
                contacts.grounded = true;
                contacts.on_platform = false;
                bounds.y = tile.y - bounds.height;
                break;
            }
            TileKind::Void | TileKind::Slope(_) => {}
        }
    }
}

/// Glues the box to any slope under its bottom edge.
///
/// Scans the row holding the bottom edge and the row beneath it. Every
/// matched slope snaps the box onto its surface and grounds it; the first
/// ramp match also marks the box as on a slope and ends the scan.
pub fn follow_slope(
    map: &TileMap,
    bounds: &mut PixelRect,
    velocity_y: i32,
    contacts: &mut ContactFlags,
) {
    contacts.on_slope = false;
    if velocity_y < 0 {
        return;
    }

    let tile_size = map.tile_size();
    let (first_column, last_column) = column_span(map, *bounds);
    let close_row = map.row_of(bounds.bottom() - 1);
    let rows = map.clamp_row(close_row)..=map.clamp_row(close_row + 1);

    for row in rows {
        for column in first_column..=last_column {
            let TileKind::Slope(shape) = map.kind_at(column, row) else {
                continue;
            };
            let tile = map.tile_rect(column, row);

            let relative_bottom = bounds.bottom() - tile.y;
            if !(0..=tile_size).contains(&relative_bottom) {
                continue;
            }

            let relative_x = bounds.x as f32 + bounds.width as f32 / 2.0 - tile.x as f32;
            let Some(zone) = SlopeZone::locate(shape, relative_x, bounds.width, tile_size) else {
                continue;
            };

            bounds.y = tile.y + zone.surface(shape, relative_x, tile_size) - bounds.height;
            contacts.grounded = true;
            if zone == SlopeZone::Ramp {
                contacts.on_slope = true;
                return;
            }
        }
    }
}

/// Where the centre of a box sits relative to a slope tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlopeZone {
    /// Centre overhangs the left edge; the box rests at the left edge height.
    NearPlateau,
    /// Centre overhangs the right edge; the box rests at the right edge height.
    FarPlateau,
    /// Centre lies over the tile; the box follows the interpolated ramp.
    Ramp,
}

impl SlopeZone {
    /// Classifies a box centre `relative_x` pixels right of the tile's left
    /// edge. The plateaus extend half the box width past each edge. The
    /// right plateau starts exactly at the edge for unflipped slopes and
    /// just after it for flipped ones. Returns `None` outside every zone.
    #[must_use]
    pub fn locate(
        shape: SlopeShape,
        relative_x: f32,
        width: i32,
        tile_size: i32,
    ) -> Option<Self> {
        let overhang = width as f32 / 2.0;
        let size = tile_size as f32;

        let near_plateau = relative_x >= -overhang && relative_x < 0.0;
        let far_plateau = if shape.is_x_flipped() {
            relative_x > size && relative_x <= size + overhang
        } else {
            relative_x >= size && relative_x < size + overhang
        };

        if near_plateau {
            Some(Self::NearPlateau)
        } else if far_plateau {
            Some(Self::FarPlateau)
        } else if (0.0..=size).contains(&relative_x) {
            Some(Self::Ramp)
        } else {
            None
        }
    }

    /// Surface depth below the tile top for a box centred at `relative_x`.
    #[must_use]
    pub fn surface(self, shape: SlopeShape, relative_x: f32, tile_size: i32) -> i32 {
        let (near, far) = shape.edge_heights(tile_size);
        match self {
            Self::NearPlateau => near,
            Self::FarPlateau => far,
            Self::Ramp => {
                let fraction = relative_x / tile_size as f32;
                (near as f32 + (far - near) as f32 * fraction) as i32
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_collisions_core::TileCode;

    fn map(rows: &[&str]) -> TileMap {
        let columns = rows[0].split(',').count() as u32;
        TileMap::from_rows(columns, rows, 16).expect("valid map")
    }

    fn shape(code: u8) -> SlopeShape {
        TileCode::new(code).kind().slope().expect("slope code")
    }

    #[test]
    fn ground_snaps_onto_flush_solid() {
        let map = map(&["0,0", "1,1"]);
        let mut bounds = PixelRect::new(4, 0, 16, 16);
        let mut contacts = ContactFlags::default();

        check_ground(&map, &mut bounds, 0, &mut contacts);

        assert!(contacts.grounded);
        assert!(!contacts.on_platform);
        assert_eq!(bounds.y, 0);
    }

    #[test]
    fn gap_below_is_not_ground() {
        let map = map(&["0,0", "0,0", "1,1"]);
        let mut bounds = PixelRect::new(0, 14, 16, 16);
        let mut contacts = ContactFlags {
            grounded: true,
            on_platform: true,
            on_slope: false,
        };

        check_ground(&map, &mut bounds, 1, &mut contacts);

        assert_eq!(contacts, ContactFlags::default());
        assert_eq!(bounds.y, 14);
    }

    #[test]
    fn solid_ground_overrides_platform() {
        let map = map(&["0,0,0", "8,1,0"]);
        let mut bounds = PixelRect::new(8, 0, 16, 16);
        let mut contacts = ContactFlags::default();

        check_ground(&map, &mut bounds, 0, &mut contacts);

        assert!(contacts.grounded);
        assert!(!contacts.on_platform);
    }

    #[test]
    fn platform_alone_sets_platform_flag() {
        let map = map(&["0,0,0", "8,8,0"]);
        let mut bounds = PixelRect::new(8, 0, 16, 16);
        let mut contacts = ContactFlags::default();

        check_ground(&map, &mut bounds, 3, &mut contacts);

        assert!(contacts.grounded);
        assert!(contacts.on_platform);
    }

    #[test]
    fn rising_box_clears_ground_flags() {
        let map = map(&["0,0", "1,1"]);
        let mut bounds = PixelRect::new(0, 0, 16, 16);
        let mut contacts = ContactFlags {
            grounded: true,
            on_platform: true,
            on_slope: true,
        };

        check_ground(&map, &mut bounds, -1, &mut contacts);
        follow_slope(&map, &mut bounds, -1, &mut contacts);

        assert_eq!(contacts, ContactFlags::default());
    }

    #[test]
    fn zones_follow_orientation_boundaries() {
        let rising = shape(2);
        let falling = shape(3);

        assert_eq!(SlopeZone::locate(rising, -8.0, 16, 16), Some(SlopeZone::NearPlateau));
        assert_eq!(SlopeZone::locate(rising, -0.5, 16, 16), Some(SlopeZone::NearPlateau));
        assert_eq!(SlopeZone::locate(rising, 0.0, 16, 16), Some(SlopeZone::Ramp));
        assert_eq!(SlopeZone::locate(rising, 16.0, 16, 16), Some(SlopeZone::FarPlateau));
        assert_eq!(SlopeZone::locate(rising, 24.0, 16, 16), None);

        assert_eq!(SlopeZone::locate(falling, 16.0, 16, 16), Some(SlopeZone::Ramp));
        assert_eq!(SlopeZone::locate(falling, 24.0, 16, 16), Some(SlopeZone::FarPlateau));
        assert_eq!(SlopeZone::locate(falling, -8.5, 16, 16), None);
    }

    #[test]
    fn ramp_surface_interpolates_edge_heights() {
        let falling = shape(3);
        let shallow = shape(4);

        assert_eq!(SlopeZone::Ramp.surface(falling, 8.0, 16), 8);
        assert_eq!(SlopeZone::Ramp.surface(falling, 3.0, 16), 3);
        assert_eq!(SlopeZone::Ramp.surface(shallow, 8.0, 16), 12);
        assert_eq!(SlopeZone::NearPlateau.surface(shallow, -4.0, 16), 16);
        assert_eq!(SlopeZone::FarPlateau.surface(shallow, 20.0, 16), 8);
    }

    #[test]
    fn box_over_ramp_centre_sits_halfway_down() {
        let map = map(&["0,0,0", "0,3,0", "1,1,1"]);
        let mut bounds = PixelRect::new(16, 5, 16, 16);
        let mut contacts = ContactFlags::default();

        follow_slope(&map, &mut bounds, 0, &mut contacts);

        assert_eq!(bounds.y, 8);
        assert!(contacts.grounded);
        assert!(contacts.on_slope);
    }

    #[test]
    fn ramp_ends_reach_edge_heights() {
        let map = map(&["0,0,0", "0,3,0", "1,1,1"]);

        let mut left = PixelRect::new(8, 5, 16, 16);
        let mut contacts = ContactFlags::default();
        follow_slope(&map, &mut left, 0, &mut contacts);
        assert_eq!(left.y, 0);
        assert!(contacts.on_slope);

        let mut right = PixelRect::new(24, 5, 16, 16);
        let mut contacts = ContactFlags::default();
        follow_slope(&map, &mut right, 0, &mut contacts);
        assert_eq!(right.y, 16);
        assert!(contacts.on_slope);
    }

    #[test]
    fn plateau_grounds_without_slope_flag() {
        let map = map(&["0,0,0", "0,2,0", "1,1,1"]);
        let mut bounds = PixelRect::new(24, 5, 16, 16);
        let mut contacts = ContactFlags::default();

        follow_slope(&map, &mut bounds, 0, &mut contacts);

        assert_eq!(bounds.y, 0);
        assert!(contacts.grounded);
        assert!(!contacts.on_slope);
    }

    #[test]
    fn plateau_match_keeps_scanning_for_a_ramp() {
        let map = map(&["0,0,0,0", "0,2,2,0", "1,1,1,1"]);
        let mut bounds = PixelRect::new(24, 5, 16, 16);
        let mut contacts = ContactFlags::default();

        follow_slope(&map, &mut bounds, 0, &mut contacts);

        assert_eq!(bounds.y, 16);
        assert!(contacts.grounded);
        assert!(contacts.on_slope);
    }

    #[test]
    fn first_ramp_under_the_box_wins() {
        // The second ramp would put the box at y == 8.
        let map = map(&["0,0,0,0", "0,3,5,0", "1,1,1,1"]);
        let mut bounds = PixelRect::new(24, 5, 16, 16);
        let mut contacts = ContactFlags::default();

        follow_slope(&map, &mut bounds, 0, &mut contacts);

        assert_eq!(bounds.y, 16);
        assert!(contacts.on_slope);
    }

    #[test]
    fn slope_far_below_is_ignored() {
        let map = map(&["0,0", "0,0", "0,2"]);
        let mut bounds = PixelRect::new(16, 0, 16, 16);
        let mut contacts = ContactFlags::default();

        follow_slope(&map, &mut bounds, 4, &mut contacts);

        assert_eq!(bounds.y, 0);
        assert_eq!(contacts, ContactFlags::default());
    }
}
