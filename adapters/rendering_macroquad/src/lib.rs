#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the tile collision demo.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.

use std::time::Duration;

use anyhow::Result;
use glam::Vec2;
use macroquad::input::{is_key_down, KeyCode};
use macroquad::math::Vec2 as MacroquadVec2;
use tile_collisions_core::{Key, KeySet, KeyboardState, PixelRect};
use tile_collisions_rendering::{
    ActorPresentation, Color, DebugOverlay, FrameControl, OverlayRequest, Presentation,
    RenderingBackend, Scene, TilePresentation,
};
use tracing::{debug, info};

/// Base font size in screen pixels before the request's scale is applied.
const BASE_FONT_SIZE: f32 = 16.0;

/// Physical keys and the logical key each one drives.
pub const KEY_BINDINGS: [(KeyCode, Key); 12] = [
    (KeyCode::A, Key::Left),
    (KeyCode::Left, Key::Left),
    (KeyCode::D, Key::Right),
    (KeyCode::Right, Key::Right),
    (KeyCode::Up, Key::SpeedUp),
    (KeyCode::Down, Key::SpeedDown),
    (KeyCode::W, Key::Jump),
    (KeyCode::Space, Key::Jump),
    (KeyCode::S, Key::Drop),
    (KeyCode::R, Key::Reset),
    (KeyCode::F3, Key::ToggleDebug),
    (KeyCode::Escape, Key::Exit),
];

/// Collects the logical keys whose physical bindings report being held.
pub fn keys_down(is_down: impl Fn(KeyCode) -> bool) -> KeySet {
    KEY_BINDINGS
        .iter()
        .filter(|(code, _)| is_down(*code))
        .map(|(_, key)| *key)
        .collect()
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        self.with_swap_interval(Some(i32::from(enabled)))
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, KeyboardState, &mut Scene) -> FrameControl + 'static,
    {
        let Presentation {
            window_title,
            window_size,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(window_size.0).unwrap_or(i32::MAX),
            window_height: i32::try_from(window_size.1).unwrap_or(i32::MAX),
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = self.swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        info!(
            width = window_size.0,
            height = window_size.1,
            "opening macroquad window"
        );

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let mut keyboard = KeyboardState::new();
            let background = to_macroquad_color(clear_color);

            loop {
                keyboard.poll(keys_down(is_key_down));

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let control = update_scene(frame_dt, keyboard, &mut scene);

                macroquad::window::clear_background(background);
                let metrics = SceneMetrics::from_tiles(
                    &scene.tiles,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                draw_tiles(&scene.tiles, &metrics);
                draw_actor(&scene.actor, &metrics);
                if scene.debug_visible {
                    draw_overlay(&scene.overlay, &metrics);
                }

                if control == FrameControl::Exit {
                    debug!("frame loop exit requested");
                    break;
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Mapping from map pixels to screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    offset: Vec2,
}

impl SceneMetrics {
    /// Fits the map inside the screen, centred. Scales of one or more are
    /// floored to whole numbers so tiles stay pixel exact.
    fn from_tiles(tiles: &TilePresentation, screen_width: f32, screen_height: f32) -> Self {
        let world_width = tiles.pixel_width();
        let world_height = tiles.pixel_height();
        let fit = if world_width <= 0.0 || world_height <= 0.0 {
            1.0
        } else {
            (screen_width / world_width).min(screen_height / world_height)
        };
        let scale = if fit >= 1.0 { fit.floor() } else { fit };

        let offset = Vec2::new(
            ((screen_width - world_width * scale) * 0.5).max(0.0),
            ((screen_height - world_height * scale) * 0.5).max(0.0),
        );

        Self { scale, offset }
    }

    fn to_screen(&self, point: Vec2) -> Vec2 {
        self.offset + point * self.scale
    }

    fn rect_to_screen(&self, rect: PixelRect) -> (Vec2, Vec2) {
        let origin = self.to_screen(Vec2::new(rect.x as f32, rect.y as f32));
        let size = Vec2::new(rect.width as f32, rect.height as f32) * self.scale;
        (origin, size)
    }
}

fn draw_tiles(tiles: &TilePresentation, metrics: &SceneMetrics) {
    let color = to_macroquad_color(tiles.color);
    for (origin, outline) in tiles.outlines() {
        let Some((first, rest)) = outline.split_first() else {
            continue;
        };
        let anchor = to_macroquad_vec(metrics.to_screen(origin + *first));
        for pair in rest.windows(2) {
            macroquad::shapes::draw_triangle(
                anchor,
                to_macroquad_vec(metrics.to_screen(origin + pair[0])),
                to_macroquad_vec(metrics.to_screen(origin + pair[1])),
                color,
            );
        }
    }
}

fn draw_actor(actor: &ActorPresentation, metrics: &SceneMetrics) {
    let (origin, size) = metrics.rect_to_screen(actor.bounds);
    macroquad::shapes::draw_rectangle(
        origin.x,
        origin.y,
        size.x,
        size.y,
        to_macroquad_color(actor.color),
    );
}

fn draw_overlay(overlay: &DebugOverlay, metrics: &SceneMetrics) {
    for request in overlay.iter() {
        match request {
            OverlayRequest::Rect { rect, color } => {
                let (origin, size) = metrics.rect_to_screen(*rect);
                macroquad::shapes::draw_rectangle(
                    origin.x,
                    origin.y,
                    size.x,
                    size.y,
                    to_macroquad_color(*color),
                );
            }
            OverlayRequest::Text {
                text,
                position,
                color,
                scale,
            } => {
                let font_size = BASE_FONT_SIZE * scale;
                // Text is anchored at its baseline.
                let _ = macroquad::text::draw_text(
                    text,
                    position.x,
                    position.y + font_size,
                    font_size,
                    to_macroquad_color(*color),
                );
            }
        }
    }
}

fn to_macroquad_vec(point: Vec2) -> MacroquadVec2 {
    MacroquadVec2::new(point.x, point.y)
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
