//! Raw input boundary polled by the device components once per tick.

use std::collections::HashSet;

use glam::Vec2;
use log::warn;
use parking_lot::{Mutex, RwLock};

use super::keys::{KeyCode, MouseButton};

/// Maximum number of key events buffered between two polls.
pub const KEY_BUFFER_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Pressed,
    Released,
}

/// Discrete key transition reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub kind: KeyEventKind,
}

/// Mouse state accumulated since the previous poll.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MouseSnapshot {
    pub position: Vec2,
    pub delta: Vec2,
    pub left: bool,
    pub right: bool,
    pub middle: bool,
    pub wheel: i32,
}

/// Gamepad slot, matching the four XInput user indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerIndex {
    One,
    Two,
    Three,
    Four,
}

impl PlayerIndex {
    pub const ALL: [PlayerIndex; 4] = [Self::One, Self::Two, Self::Three, Self::Four];

    pub fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
            Self::Three => 2,
            Self::Four => 3,
        }
    }
}

/// XInput-style button bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GamepadButtons(pub u16);

impl GamepadButtons {
    pub const DPAD_UP: Self = Self(0x0001);
    pub const DPAD_DOWN: Self = Self(0x0002);
    pub const DPAD_LEFT: Self = Self(0x0004);
    pub const DPAD_RIGHT: Self = Self(0x0008);
    pub const START: Self = Self(0x0010);
    pub const BACK: Self = Self(0x0020);
    pub const LEFT_THUMB: Self = Self(0x0040);
    pub const RIGHT_THUMB: Self = Self(0x0080);
    pub const LEFT_SHOULDER: Self = Self(0x0100);
    pub const RIGHT_SHOULDER: Self = Self(0x0200);
    pub const A: Self = Self(0x1000);
    pub const B: Self = Self(0x2000);
    pub const X: Self = Self(0x4000);
    pub const Y: Self = Self(0x8000);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for GamepadButtons {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Raw reading of a connected gamepad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GamepadSnapshot {
    pub buttons: GamepadButtons,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub left_thumb: [i16; 2],
    pub right_thumb: [i16; 2],
}

/// Raw reading of a joystick, axes in `[-1000, 1000]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JoystickSnapshot {
    pub x: i32,
    pub y: i32,
    pub buttons: Vec<bool>,
}

/// Platform input layer.
///
/// Only keyboard and mouse are mandatory; a source without gamepads or a
/// joystick keeps the defaults and those devices report as absent.
pub trait InputSource: Send + Sync {
    /// Moves every buffered key event into `events`, oldest first.
    fn drain_key_events(&self, events: &mut Vec<KeyEvent>);

    /// Returns the mouse state and resets the accumulated delta and wheel.
    fn poll_mouse(&self) -> MouseSnapshot;

    fn set_mouse_position(&self, position: Vec2);

    /// `None` means the slot has no controller connected.
    fn gamepad_state(&self, _player: PlayerIndex) -> Option<GamepadSnapshot> {
        None
    }

    /// Motor speeds in `[0, 1]`.
    fn set_vibration(&self, _player: PlayerIndex, _left: f32, _right: f32) {}

    fn joystick_attached(&self) -> bool {
        false
    }

    fn poll_joystick(&self) -> Option<JoystickSnapshot> {
        None
    }
}

/// Thread-safe input queue fed by the host window.
#[derive(Debug, Default)]
pub struct QueuedInput {
    held_keys: Mutex<HashSet<KeyCode>>,
    key_events: Mutex<Vec<KeyEvent>>,
    mouse: RwLock<MouseSnapshot>,
    gamepads: RwLock<[Option<GamepadSnapshot>; 4]>,
    vibration: RwLock<[(f32, f32); 4]>,
    joystick: RwLock<Option<JoystickSnapshot>>,
}

impl QueuedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a key press; auto-repeat of an already held key is ignored.
    /// The key only counts as held once its event made it into the buffer.
    pub fn set_key_down(&self, key: KeyCode) {
        let mut held = self.held_keys.lock();
        if !held.contains(&key)
            && self.push_key_event(KeyEvent {
                key,
                kind: KeyEventKind::Pressed,
            })
        {
            held.insert(key);
        }
    }

    /// Records a key release. A release dropped by a full buffer leaves the
    /// key held, so the next release is delivered instead.
    pub fn set_key_up(&self, key: KeyCode) {
        let mut held = self.held_keys.lock();
        if held.contains(&key)
            && self.push_key_event(KeyEvent {
                key,
                kind: KeyEventKind::Released,
            })
        {
            held.remove(&key);
        }
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.held_keys.lock().contains(&key)
    }

    /// Queues `event`, returning `false` when the buffer is full.
    fn push_key_event(&self, event: KeyEvent) -> bool {
        let mut events = self.key_events.lock();
        if events.len() >= KEY_BUFFER_CAPACITY {
            warn!("key buffer full, dropping {:?}", event);
            return false;
        }
        events.push(event);
        true
    }

    pub fn set_mouse_button(&self, button: MouseButton, down: bool) {
        let mut mouse = self.mouse.write();
        match button {
            MouseButton::LEFT => mouse.left = down,
            MouseButton::RIGHT => mouse.right = down,
            MouseButton::MIDDLE => mouse.middle = down,
            _ => {}
        }
    }

    /// Moves the cursor, accumulating the movement into the next poll's delta.
    pub fn move_cursor(&self, position: Vec2) {
        let mut mouse = self.mouse.write();
        let previous = mouse.position;
        mouse.delta += position - previous;
        mouse.position = position;
    }

    pub fn scroll(&self, turns: i32) {
        self.mouse.write().wheel += turns;
    }

    pub fn set_gamepad(&self, player: PlayerIndex, state: Option<GamepadSnapshot>) {
        self.gamepads.write()[player.index()] = state;
    }

    /// Last motor speeds requested for `player`.
    pub fn vibration(&self, player: PlayerIndex) -> (f32, f32) {
        self.vibration.read()[player.index()]
    }

    pub fn set_joystick(&self, state: Option<JoystickSnapshot>) {
        *self.joystick.write() = state;
    }
}

impl InputSource for QueuedInput {
    fn drain_key_events(&self, events: &mut Vec<KeyEvent>) {
        events.append(&mut self.key_events.lock());
    }

    fn poll_mouse(&self) -> MouseSnapshot {
        let mut mouse = self.mouse.write();
        let snapshot = *mouse;
        mouse.delta = Vec2::ZERO;
        mouse.wheel = 0;
        snapshot
    }

    fn set_mouse_position(&self, position: Vec2) {
        self.mouse.write().position = position;
    }

    fn gamepad_state(&self, player: PlayerIndex) -> Option<GamepadSnapshot> {
        self.gamepads.read()[player.index()]
    }

    fn set_vibration(&self, player: PlayerIndex, left: f32, right: f32) {
        self.vibration.write()[player.index()] = (left, right);
    }

    fn joystick_attached(&self) -> bool {
        self.joystick.read().is_some()
    }

    fn poll_joystick(&self) -> Option<JoystickSnapshot> {
        self.joystick.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::NamedKey;

    #[test]
    fn queued_input_reports_transitions_once() {
        let input = QueuedInput::new();
        let space = KeyCode::Named(NamedKey::Space);
        input.set_key_down(space);
        input.set_key_down(space);
        assert!(input.is_key_down(space));
        input.set_key_up(space);
        assert!(!input.is_key_down(space));

        let mut events = Vec::new();
        input.drain_key_events(&mut events);
        assert_eq!(
            events,
            vec![
                KeyEvent {
                    key: space,
                    kind: KeyEventKind::Pressed
                },
                KeyEvent {
                    key: space,
                    kind: KeyEventKind::Released
                },
            ]
        );
        events.clear();
        input.drain_key_events(&mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn key_buffer_is_bounded() {
        let input = QueuedInput::new();
        for index in 0..=KEY_BUFFER_CAPACITY {
            let key = KeyCode::Character(char::from_u32(0x100 + index as u32).unwrap());
            input.set_key_down(key);
        }
        let mut events = Vec::new();
        input.drain_key_events(&mut events);
        assert_eq!(events.len(), KEY_BUFFER_CAPACITY);
    }

    #[test]
    fn dropped_key_events_leave_held_keys_untouched() {
        let input = QueuedInput::new();
        let space = KeyCode::Named(NamedKey::Space);
        input.set_key_down(space);
        for index in 0..KEY_BUFFER_CAPACITY {
            let key = KeyCode::Character(char::from_u32(0x100 + index as u32).unwrap());
            input.set_key_down(key);
        }
        let overflow = KeyCode::Character(char::from_u32(0x100).unwrap());
        assert!(input.is_key_down(overflow));
        let last = 0x100 + KEY_BUFFER_CAPACITY as u32 - 1;
        let dropped = KeyCode::Character(char::from_u32(last).unwrap());
        assert!(!input.is_key_down(dropped));

        input.set_key_up(space);
        assert!(input.is_key_down(space));

        let mut events = Vec::new();
        input.drain_key_events(&mut events);
        input.set_key_up(space);
        events.clear();
        input.drain_key_events(&mut events);
        assert_eq!(
            events,
            vec![KeyEvent {
                key: space,
                kind: KeyEventKind::Released,
            }]
        );
        assert!(!input.is_key_down(space));
    }

    #[test]
    fn mouse_delta_is_consumed_by_poll() {
        let input = QueuedInput::new();
        input.move_cursor(Vec2::new(10.0, 5.0));
        input.move_cursor(Vec2::new(12.0, 9.0));
        input.scroll(2);
        input.set_mouse_button(MouseButton::LEFT, true);

        let first = input.poll_mouse();
        assert_eq!(first.position, Vec2::new(12.0, 9.0));
        assert_eq!(first.delta, Vec2::new(12.0, 9.0));
        assert_eq!(first.wheel, 2);
        assert!(first.left);

        let second = input.poll_mouse();
        assert_eq!(second.delta, Vec2::ZERO);
        assert_eq!(second.wheel, 0);
        assert!(second.left);
    }

    #[test]
    fn gamepad_buttons_mask() {
        let buttons = GamepadButtons::A | GamepadButtons::DPAD_UP;
        assert!(buttons.contains(GamepadButtons::A));
        assert!(buttons.contains(GamepadButtons::DPAD_UP));
        assert!(!buttons.contains(GamepadButtons::B));
    }
}
