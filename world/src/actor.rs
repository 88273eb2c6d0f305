//! The controllable actor and its per-frame update sequence.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tile_collisions_core::{
    ActorSnapshot, Event, InputModel, Key, PixelPoint, PixelRect, TileMap,
    DEFAULT_TILE_SIZE,
};
use tile_collisions_system_collision::{resolve, BodyState};
use tracing::debug;

/// Movement constants of the actor. Velocities are expressed per reference
/// frame and scaled by the elapsed time on every update.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActorTuning {
    /// Width of the bounding box in pixels.
    pub width: i32,
    /// Height of the bounding box in pixels.
    pub height: i32,
    /// Horizontal speed at start-up.
    pub move_speed: f32,
    /// Change applied to the speed by one speed key press.
    pub speed_step: f32,
    /// Lowest speed the actor can be slowed to.
    pub min_speed: f32,
    /// Downward acceleration added each reference frame while airborne.
    pub gravity: f32,
    /// Vertical velocity set by a jump.
    pub jump_velocity: f32,
    /// Frames per second the per-frame constants are tuned for.
    pub frame_rate: f32,
}

impl Default for ActorTuning {
    fn default() -> Self {
        Self {
            width: DEFAULT_TILE_SIZE,
            height: DEFAULT_TILE_SIZE,
            move_speed: 2.0,
            speed_step: 0.25,
            min_speed: 0.25,
            gravity: 0.75,
            jump_velocity: -10.0,
            frame_rate: 60.0,
        }
    }
}

/// Single rigid body steered by the keyboard.
#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    body: BodyState,
    velocity: Vec2,
    move_speed: f32,
    start: PixelPoint,
    tuning: ActorTuning,
}

impl Actor {
    /// Creates an actor at rest at `start`.
    #[must_use]
    pub fn new(start: PixelPoint, tuning: ActorTuning) -> Self {
        let bounds = PixelRect::new(start.x, start.y, tuning.width, tuning.height);
        Self {
            body: BodyState::new(bounds),
            velocity: Vec2::ZERO,
            move_speed: tuning.move_speed,
            start,
            tuning,
        }
    }

    /// Advances the actor by one frame of `dt` using the polled `input`,
    /// pushing any notable transitions onto `out_events`.
    pub fn update(
        &mut self,
        map: &TileMap,
        dt: Duration,
        input: &impl InputModel,
        out_events: &mut Vec<Event>,
    ) -> ActorSnapshot {
        let frame_scale = dt.as_secs_f32() * self.tuning.frame_rate;

        if input.is_pressed(Key::Reset) {
            self.reset();
            out_events.push(Event::ActorReset {
                position: self.start,
            });
        }

        let speed_presses =
            i32::from(input.is_pressed(Key::SpeedUp)) - i32::from(input.is_pressed(Key::SpeedDown));
        self.move_speed = (self.move_speed + speed_presses as f32 * self.tuning.speed_step)
            .max(self.tuning.min_speed);

        let axis = i32::from(input.is_down(Key::Right)) - i32::from(input.is_down(Key::Left));
        self.velocity.x = axis as f32 * self.move_speed * frame_scale;

        let contacts = self.body.contacts;
        if contacts.grounded {
            self.velocity.y = 0.0;
        } else {
            self.velocity.y += self.tuning.gravity * frame_scale;
        }

        if input.is_pressed(Key::Jump) && contacts.grounded {
            self.velocity.y = self.tuning.jump_velocity;
            let from = self.body.bounds.position();
            debug!(x = from.x, y = from.y, "actor jumped");
            out_events.push(Event::Jumped { from });
        }

        if input.is_pressed(Key::Drop) && contacts.on_platform {
            self.body.bounds.y += 1;
            let position = self.body.bounds.position();
            debug!(x = position.x, y = position.y, "actor dropped through platform");
            out_events.push(Event::DroppedThroughPlatform { position });
        }

        let resolution = resolve(map, &mut self.body, self.velocity);
        self.velocity = resolution.velocity.as_vec2();

        match (contacts.grounded, resolution.contacts.grounded) {
            (false, true) => {
                debug!(
                    on_platform = resolution.contacts.on_platform,
                    on_slope = resolution.contacts.on_slope,
                    "actor landed"
                );
                out_events.push(Event::Landed {
                    contacts: resolution.contacts,
                });
            }
            (true, false) => out_events.push(Event::LeftGround),
            _ => {}
        }

        self.snapshot()
    }

    /// Moves the actor back to its start position. Velocity, the sub-pixel
    /// remainder and contact flags are left untouched.
    pub fn reset(&mut self) {
        self.body.bounds.x = self.start.x;
        self.body.bounds.y = self.start.y;
        debug!(x = self.start.x, y = self.start.y, "actor reset");
    }

    /// Debug readout of the actor's current state.
    #[must_use]
    pub fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            bounds: self.body.bounds,
            move_speed: self.move_speed,
            contacts: self.body.contacts,
            velocity_x: self.velocity.x as i32,
            velocity_y: self.velocity.y as i32,
        }
    }

    /// Position restored by a reset.
    #[must_use]
    pub const fn start(&self) -> PixelPoint {
        self.start
    }

    /// Movement constants the actor was created with.
    #[must_use]
    pub const fn tuning(&self) -> &ActorTuning {
        &self.tuning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_collisions_core::{KeySet, KeyboardState};

    const FRAME: Duration = Duration::from_nanos(16_666_667);

    fn floor_map() -> TileMap {
        TileMap::from_rows(3, &["0,0,0", "0,0,0", "0,0,0", "1,1,1"], 16).expect("valid map")
    }

    #[test]
    fn held_direction_moves_at_current_speed() {
        let map = floor_map();
        let mut actor = Actor::new(PixelPoint::new(0, 32), ActorTuning::default());
        let mut keyboard = KeyboardState::new();
        let mut events = Vec::new();

        keyboard.poll(KeySet::EMPTY.with(Key::Right));
        let snapshot = actor.update(&map, FRAME, &keyboard, &mut events);

        assert_eq!(snapshot.velocity_x, 2);
        assert_eq!(snapshot.bounds.x, 2);
        assert!(snapshot.contacts.grounded);
        assert_eq!(events, vec![Event::Landed { contacts: snapshot.contacts }]);
    }

    #[test]
    fn opposing_directions_cancel() {
        let map = floor_map();
        let mut actor = Actor::new(PixelPoint::new(16, 32), ActorTuning::default());
        let mut keyboard = KeyboardState::new();

        keyboard.poll(KeySet::EMPTY.with(Key::Left).with(Key::Right));
        let snapshot = actor.update(&map, FRAME, &keyboard, &mut Vec::new());

        assert_eq!(snapshot.velocity_x, 0);
        assert_eq!(snapshot.bounds.x, 16);
    }

    #[test]
    fn tuning_defaults_match_reference_feel() {
        let tuning = ActorTuning::default();

        assert_eq!((tuning.width, tuning.height), (16, 16));
        assert_eq!(tuning.move_speed, 2.0);
        assert_eq!(tuning.min_speed, 0.25);
        assert_eq!(tuning.jump_velocity, -10.0);
    }

    #[test]
    fn reset_leaves_motion_untouched() {
        let map = floor_map();
        let mut actor = Actor::new(PixelPoint::new(16, 0), ActorTuning::default());
        let mut keyboard = KeyboardState::new();

        for _ in 0..4 {
            keyboard.poll(KeySet::EMPTY.with(Key::Right));
            let _ = actor.update(&map, FRAME, &keyboard, &mut Vec::new());
        }
        let before = actor.snapshot();
        actor.reset();
        let after = actor.snapshot();

        assert_eq!(after.bounds.position(), PixelPoint::new(16, 0));
        assert_eq!(after.velocity_x, before.velocity_x);
        assert_eq!(after.velocity_y, before.velocity_y);
        assert_eq!(after.contacts, before.contacts);
    }
}
