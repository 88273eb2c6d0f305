//! Edge-triggered keyboard model polled once per frame by adapters.

use serde::{Deserialize, Serialize};

/// Logical keys understood by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Walk towards decreasing x.
    Left,
    /// Walk towards increasing x.
    Right,
    /// Raise the horizontal move speed by one step.
    SpeedUp,
    /// Lower the horizontal move speed by one step.
    SpeedDown,
    /// Jump while grounded.
    Jump,
    /// Drop through the one-way platform underfoot.
    Drop,
    /// Return the actor to its start position.
    Reset,
    /// Show or hide the debug overlay.
    ToggleDebug,
    /// Leave the frame loop.
    Exit,
}

impl Key {
    /// Every key in declaration order.
    pub const ALL: [Key; 9] = [
        Key::Left,
        Key::Right,
        Key::SpeedUp,
        Key::SpeedDown,
        Key::Jump,
        Key::Drop,
        Key::Reset,
        Key::ToggleDebug,
        Key::Exit,
    ];

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// Set of keys held down at a single poll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeySet(u16);

impl KeySet {
    /// Set with no keys held.
    pub const EMPTY: Self = Self(0);

    /// Returns a copy of the set with `key` added.
    #[must_use]
    pub const fn with(self, key: Key) -> Self {
        Self(self.0 | key.bit())
    }

    /// Reports whether `key` is part of the set.
    #[must_use]
    pub const fn contains(&self, key: Key) -> bool {
        self.0 & key.bit() != 0
    }

    /// Reports whether no key is held.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<Key> for KeySet {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

/// Read-only key queries consumed by the actor each frame.
pub trait InputModel {
    /// Whether the key is currently held.
    fn is_down(&self, key: Key) -> bool;

    /// Whether the key went down since the previous poll.
    fn is_pressed(&self, key: Key) -> bool;

    /// Whether the key came up since the previous poll.
    fn is_released(&self, key: Key) -> bool;
}

/// Keyboard state tracking the current and immediately preceding poll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyboardState {
    previous: KeySet,
    current: KeySet,
}

impl KeyboardState {
    /// Creates a keyboard with nothing held in either poll.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            previous: KeySet::EMPTY,
            current: KeySet::EMPTY,
        }
    }

    /// Records a new poll. Must be called exactly once per frame so that
    /// edges are measured against the preceding frame.
    pub fn poll(&mut self, down: KeySet) {
        self.previous = self.current;
        self.current = down;
    }
}

impl InputModel for KeyboardState {
    fn is_down(&self, key: Key) -> bool {
        self.current.contains(key)
    }

    fn is_pressed(&self, key: Key) -> bool {
        !self.previous.contains(key) && self.current.contains(key)
    }

    fn is_released(&self, key: Key) -> bool {
        self.previous.contains(key) && !self.current.contains(key)
    }
}
