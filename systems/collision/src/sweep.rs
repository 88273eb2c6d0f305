//! Swept nearest-contact queries along a single axis.

use tile_collisions_core::{PixelRect, TileKind, TileMap};

use crate::column_span;

/// Finds the nearest tile that blocks a horizontal move of `velocity_x`
/// pixels and returns the velocity that leaves the box flush against it.
///
/// Columns are scanned from the leading edge outwards and, within a column,
/// rows from the bottom of the box to its top. While `on_slope` is set the
/// bottom row is ignored so the ramp being climbed cannot snag the box.
/// Platforms never block sideways and slopes block only with their vertical
/// side; such tiles are skipped without ending the scan.
#[must_use]
pub fn nearest_horizontal_contact(
    map: &TileMap,
    bounds: PixelRect,
    velocity_x: i32,
    on_slope: bool,
) -> Option<i32> {
    if velocity_x == 0 {
        return None;
    }

    let direction = velocity_x.signum();
    let distance = velocity_x.saturating_abs().min(map.pixel_width());
    let (sweep, close, far) = if direction > 0 {
        (
            PixelRect::new(bounds.right(), bounds.y, distance, bounds.height),
            map.column_of(bounds.right()),
            map.column_of(bounds.right() + distance),
        )
    } else {
        (
            PixelRect::new(bounds.x - distance, bounds.y, distance, bounds.height),
            map.column_of(bounds.x),
            map.column_of(bounds.x - distance),
        )
    };
    let top_row = map.clamp_row(map.row_of(bounds.y));
    let bottom_row = map.clamp_row(map.row_of(bounds.bottom() - 1));

    for column in travel_order(map.clamp_column(close), map.clamp_column(far)) {
        for row in (top_row..=bottom_row).rev() {
            if on_slope && row == bottom_row {
                continue;
            }

            let blocks = match map.kind_at(column, row) {
                TileKind::Solid => true,
                TileKind::Slope(shape) => shape.blocks_horizontal(direction),
                TileKind::Void | TileKind::Platform => false,
            };
            if !blocks {
                continue;
            }

            let tile = map.tile_rect(column, row);
            if !sweep.intersects(&tile) {
                continue;
            }

            return Some(if direction > 0 {
                tile.x - sweep.x
            } else {
                tile.right() - sweep.right()
            });
        }
    }

    None
}

/// Finds the nearest tile that blocks a vertical move of `velocity_y`
/// pixels and returns the velocity that leaves the box flush against it.
///
/// Rows are scanned from the leading edge outwards, each across the box's
/// full column span. Slopes only stop a box rising into them from fully
/// underneath; falling onto a ramp is left to slope following. Platforms
/// only stop a box descending onto them from at or above their top face.
#[must_use]
pub fn nearest_vertical_contact(map: &TileMap, bounds: PixelRect, velocity_y: i32) -> Option<i32> {
    if velocity_y == 0 {
        return None;
    }

    let direction = velocity_y.signum();
    let distance = velocity_y.saturating_abs().min(map.pixel_height());
    let (sweep, close, far) = if direction > 0 {
        (
            PixelRect::new(bounds.x, bounds.bottom(), bounds.width, distance),
            map.row_of(bounds.bottom()),
            map.row_of(bounds.bottom() + distance),
        )
    } else {
        (
            PixelRect::new(bounds.x, bounds.y - distance, bounds.width, distance),
            map.row_of(bounds.y),
            map.row_of(bounds.y - distance),
        )
    };
    let (first_column, last_column) = column_span(map, bounds);

    for row in travel_order(map.clamp_row(close), map.clamp_row(far)) {
        for column in first_column..=last_column {
            let tile = map.tile_rect(column, row);
            let blocks = match map.kind_at(column, row) {
                TileKind::Void => false,
                TileKind::Solid => true,
                TileKind::Slope(_) => direction < 0 && bounds.y >= tile.bottom(),
                TileKind::Platform => direction > 0 && bounds.bottom() <= tile.y,
            };
            if !blocks || !sweep.intersects(&tile) {
                continue;
            }

            return Some(if direction > 0 {
                tile.y - sweep.y
            } else {
                tile.bottom() - sweep.bottom()
            });
        }
    }

    None
}

/// Indices from `close` to `far` inclusive, in that order.
fn travel_order(close: u32, far: u32) -> impl Iterator<Item = u32> {
    let forward = close <= far;
    let span = close.abs_diff(far);
    (0..=span).map(move |step| if forward { close + step } else { close - step })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(rows: &[&str]) -> TileMap {
        let columns = rows[0].split(',').count() as u32;
        TileMap::from_rows(columns, rows, 16).expect("valid map")
    }

    #[test]
    fn travel_order_runs_in_both_directions() {
        assert_eq!(travel_order(1, 3).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(travel_order(3, 1).collect::<Vec<_>>(), vec![3, 2, 1]);
        assert_eq!(travel_order(2, 2).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn zero_velocity_has_no_contact() {
        let map = map(&["1,1", "1,1"]);
        let bounds = PixelRect::new(0, 0, 16, 16);

        assert_eq!(nearest_horizontal_contact(&map, bounds, 0, false), None);
        assert_eq!(nearest_vertical_contact(&map, bounds, 0), None);
    }

    #[test]
    fn nearest_column_wins() {
        let map = map(&["0,0,1,1"]);
        let bounds = PixelRect::new(0, 0, 16, 16);

        assert_eq!(nearest_horizontal_contact(&map, bounds, 40, false), Some(16));
    }

    #[test]
    fn leftward_contact_is_flush_with_right_face() {
        let map = map(&["1,0,0"]);
        let bounds = PixelRect::new(20, 0, 16, 16);

        assert_eq!(nearest_horizontal_contact(&map, bounds, -10, false), Some(-4));
    }

    #[test]
    fn bottom_row_is_ignored_while_on_slope() {
        let map = map(&["0,0,0", "0,0,1"]);
        let bounds = PixelRect::new(0, 16, 16, 16);

        assert_eq!(nearest_horizontal_contact(&map, bounds, 20, false), Some(16));
        assert_eq!(nearest_horizontal_contact(&map, bounds, 20, true), None);
    }

    #[test]
    fn slope_blocks_only_from_its_vertical_side() {
        let ramp_ahead = map(&["0,2"]);
        assert_eq!(
            nearest_horizontal_contact(&ramp_ahead, PixelRect::new(0, 0, 16, 16), 8, false),
            None
        );

        let wall_ahead = map(&["2,0"]);
        assert_eq!(
            nearest_horizontal_contact(&wall_ahead, PixelRect::new(16, 0, 16, 16), -8, false),
            Some(0)
        );
    }

    #[test]
    fn ramp_side_does_not_hide_a_wall_behind_it() {
        let map = map(&["0,0,2,1"]);
        let bounds = PixelRect::new(8, 0, 16, 16);

        assert_eq!(nearest_horizontal_contact(&map, bounds, 40, false), Some(24));
    }

    #[test]
    fn platforms_never_block_horizontally() {
        let map = map(&["0,8,8"]);

        assert_eq!(
            nearest_horizontal_contact(&map, PixelRect::new(0, 0, 16, 16), 30, false),
            None
        );
    }

    #[test]
    fn slopes_only_block_rising_boxes_from_below() {
        let map = map(&["0", "2", "0"]);

        assert_eq!(
            nearest_vertical_contact(&map, PixelRect::new(0, 32, 16, 16), -10),
            Some(0)
        );
        assert_eq!(
            nearest_vertical_contact(&map, PixelRect::new(0, 0, 16, 16), 10),
            None
        );
    }

    #[test]
    fn slopes_let_embedded_boxes_rise() {
        let map = map(&["0", "2", "0"]);

        assert_eq!(
            nearest_vertical_contact(&map, PixelRect::new(0, 31, 16, 16), -10),
            None
        );
    }

    #[test]
    fn platforms_block_only_from_above() {
        let map = map(&["0", "8", "0", "0"]);

        assert_eq!(
            nearest_vertical_contact(&map, PixelRect::new(0, 0, 16, 16), 5),
            Some(0)
        );
        assert_eq!(
            nearest_vertical_contact(&map, PixelRect::new(0, 8, 16, 16), 4),
            None
        );
        assert_eq!(
            nearest_vertical_contact(&map, PixelRect::new(0, 32, 16, 16), -20),
            None
        );
    }

    #[test]
    fn extreme_velocities_still_find_the_nearest_contact() {
        let walls = map(&["1,0,0,1"]);
        let bounds = PixelRect::new(20, 0, 16, 16);

        assert_eq!(nearest_horizontal_contact(&walls, bounds, i32::MAX, false), Some(12));
        assert_eq!(nearest_horizontal_contact(&walls, bounds, i32::MIN, false), Some(-4));

        let shaft = map(&["1", "0", "0", "1"]);
        let bounds = PixelRect::new(0, 20, 16, 16);

        assert_eq!(nearest_vertical_contact(&shaft, bounds, i32::MAX), Some(12));
        assert_eq!(nearest_vertical_contact(&shaft, bounds, i32::MIN), Some(-4));
    }

    #[test]
    fn rising_box_stops_under_ceiling() {
        let map = map(&["1", "0", "0"]);

        assert_eq!(
            nearest_vertical_contact(&map, PixelRect::new(0, 30, 16, 16), -20),
            Some(-14)
        );
    }
}
