#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Axis-separated swept collision resolution against a tile map.
//!
//! A frame is resolved in a fixed order: the horizontal sweep, the X
//! displacement and its clamp to the map, the vertical sweep, the Y
//! displacement and its clamp, then the ground check and finally slope
//! following. The horizontal sweep therefore always sees the row span from
//! before the vertical move, and slope following gets the last word on the
//! vertical position.

mod surface;
mod sweep;

use glam::{IVec2, Vec2};
use tile_collisions_core::{ContactFlags, PixelRect, TileMap};
use tracing::trace;

pub use surface::{check_ground, follow_slope, SlopeZone};
pub use sweep::{nearest_horizontal_contact, nearest_vertical_contact};

/// Fractional velocity carried from one frame to the next so that slow
/// speeds still integrate to whole pixels over time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SubPixel {
    remainder: Vec2,
}

impl SubPixel {
    /// Adds `velocity` to the remainder and removes the whole-pixel part,
    /// truncated toward zero, which is returned as this frame's step.
    pub fn integrate(&mut self, velocity: Vec2) -> IVec2 {
        self.remainder += velocity;
        let whole = Vec2::new(self.remainder.x.trunc(), self.remainder.y.trunc());
        self.remainder -= whole;
        if !self.remainder.is_finite() {
            self.remainder = Vec2::ZERO;
        }
        IVec2::new(whole.x as i32, whole.y as i32)
    }

    /// Fraction still waiting to be applied.
    #[must_use]
    pub const fn remainder(&self) -> Vec2 {
        self.remainder
    }
}

/// Mutable state of a body resolved against the map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyState {
    /// Bounding box in pixels.
    pub bounds: PixelRect,
    /// Sub-pixel remainder accumulated across frames.
    pub sub_pixel: SubPixel,
    /// Contacts established by the last resolution.
    pub contacts: ContactFlags,
}

impl BodyState {
    /// Creates a body at rest with no contacts.
    #[must_use]
    pub fn new(bounds: PixelRect) -> Self {
        Self {
            bounds,
            sub_pixel: SubPixel::default(),
            contacts: ContactFlags::default(),
        }
    }
}

/// Outcome of resolving a single frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Whole-pixel velocity left after both sweeps, before the map-bound clamps.
    pub velocity: IVec2,
    /// Contacts at the end of the frame.
    pub contacts: ContactFlags,
}

/// Resolves one frame of `velocity` for `body`.
pub fn resolve(map: &TileMap, body: &mut BodyState, velocity: Vec2) -> Resolution {
    // No step can usefully exceed the map; capping it keeps later sums in range.
    let mut step = body.sub_pixel.integrate(velocity);
    step.x = step.x.clamp(-map.pixel_width(), map.pixel_width());
    step.y = step.y.clamp(-map.pixel_height(), map.pixel_height());

    if let Some(contact) =
        nearest_horizontal_contact(map, body.bounds, step.x, body.contacts.on_slope)
    {
        step.x = contact;
    }
    body.bounds.x += step.x;
    clamp_horizontal(map, &mut body.bounds);

    if let Some(contact) = nearest_vertical_contact(map, body.bounds, step.y) {
        step.y = contact;
    }
    body.bounds.y += step.y;
    clamp_vertical(map, &mut body.bounds);

    check_ground(map, &mut body.bounds, step.y, &mut body.contacts);
    follow_slope(map, &mut body.bounds, step.y, &mut body.contacts);

    trace!(
        x = body.bounds.x,
        y = body.bounds.y,
        step_x = step.x,
        step_y = step.y,
        grounded = body.contacts.grounded,
        on_platform = body.contacts.on_platform,
        on_slope = body.contacts.on_slope,
        "resolved frame"
    );

    Resolution {
        velocity: step,
        contacts: body.contacts,
    }
}

/// Keeps the box horizontally within `[0, map width]`.
pub fn clamp_horizontal(map: &TileMap, bounds: &mut PixelRect) {
    bounds.x = clamp_axis(bounds.x, map.pixel_width() - bounds.width);
}

/// Keeps the box vertically within `[0, map height]`.
pub fn clamp_vertical(map: &TileMap, bounds: &mut PixelRect) {
    bounds.y = clamp_axis(bounds.y, map.pixel_height() - bounds.height);
}

// A box larger than the map pins to the origin instead of panicking.
fn clamp_axis(value: i32, max: i32) -> i32 {
    value.min(max).max(0)
}

/// First and last map column overlapped by the box, clamped to the map.
fn column_span(map: &TileMap, bounds: PixelRect) -> (u32, u32) {
    let first = map.clamp_column(map.column_of(bounds.x));
    let last = map
        .clamp_column(map.column_of(bounds.right() - 1))
        .max(first);
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_pixel_truncates_toward_zero() {
        let mut sub_pixel = SubPixel::default();

        assert_eq!(sub_pixel.integrate(Vec2::new(1.75, -1.75)), IVec2::new(1, -1));
        assert_eq!(sub_pixel.remainder(), Vec2::new(0.75, -0.75));
        assert_eq!(sub_pixel.integrate(Vec2::new(0.25, -0.25)), IVec2::new(1, -1));
        assert_eq!(sub_pixel.remainder(), Vec2::ZERO);
    }

    #[test]
    fn sub_pixel_keeps_signed_remainder_when_reversing() {
        let mut sub_pixel = SubPixel::default();

        assert_eq!(sub_pixel.integrate(Vec2::new(0.5, 0.0)), IVec2::ZERO);
        assert_eq!(sub_pixel.integrate(Vec2::new(-0.75, 0.0)), IVec2::ZERO);
        assert_eq!(sub_pixel.remainder(), Vec2::new(-0.25, 0.0));
        assert_eq!(sub_pixel.integrate(Vec2::new(-0.75, 0.0)), IVec2::new(-1, 0));
    }

    #[test]
    fn sub_pixel_drops_non_finite_remainder() {
        let mut sub_pixel = SubPixel::default();

        let step = sub_pixel.integrate(Vec2::new(f32::INFINITY, f32::NEG_INFINITY));

        assert_eq!(step, IVec2::new(i32::MAX, i32::MIN));
        assert_eq!(sub_pixel.remainder(), Vec2::ZERO);
        assert_eq!(sub_pixel.integrate(Vec2::new(1.5, 0.0)), IVec2::new(1, 0));
    }

    #[test]
    fn clamp_pins_oversized_boxes_to_origin() {
        let map = TileMap::from_rows(1, &["0"], 16).expect("valid map");
        let mut bounds = PixelRect::new(5, 5, 32, 32);

        clamp_horizontal(&map, &mut bounds);
        clamp_vertical(&map, &mut bounds);

        assert_eq!(bounds.position(), tile_collisions_core::PixelPoint::new(0, 0));
    }

    #[test]
    fn huge_steps_are_capped_to_the_map() {
        let map = TileMap::from_rows(3, &["0,0,0", "0,0,0"], 16).expect("valid map");
        let mut body = BodyState::new(PixelRect::new(16, 0, 16, 16));

        let resolution = resolve(&map, &mut body, Vec2::new(3.0e9, -3.0e9));

        assert_eq!(resolution.velocity, IVec2::new(48, -32));
        assert_eq!(body.bounds.position(), tile_collisions_core::PixelPoint::new(32, 0));
    }

    #[test]
    fn column_span_covers_straddled_columns() {
        let map = TileMap::from_rows(4, &["0,0,0,0"], 16).expect("valid map");

        assert_eq!(column_span(&map, PixelRect::new(16, 0, 16, 16)), (1, 1));
        assert_eq!(column_span(&map, PixelRect::new(8, 0, 16, 16)), (0, 1));
        assert_eq!(column_span(&map, PixelRect::new(-40, 0, 16, 16)), (0, 0));
        assert_eq!(column_span(&map, PixelRect::new(60, 0, 16, 16)), (3, 3));
    }
}
