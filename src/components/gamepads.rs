use std::sync::Arc;
use std::time::Duration;

use log::debug;
use parking_lot::Mutex;

use crate::core::{Component, FrameContext, Injection, ServiceDependency, ServiceRegistry};
use crate::error::FrameworkError;
use crate::input::thumbstick::{LEFT_THUMB_DEADZONE, RIGHT_THUMB_DEADZONE};
use crate::input::{
    normalize_stick, ButtonState, DirectionalState, GamepadButtons, GamepadSnapshot, InputSource,
    PlayerIndex, ThumbstickState, TimedAnalogButtonState, TimedButtonState,
};
use crate::tools::easing::{ease_in, EasingType};
use crate::tools::math::saturate;
use crate::tools::Dirtyable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VibrationMotor {
    LeftLow,
    RightHigh,
}

/// Controller state for one player slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamepadState {
    pub player: PlayerIndex,
    pub connected: bool,
    pub dpad: DirectionalState,
    pub left_stick: ThumbstickState,
    pub right_stick: ThumbstickState,
    pub a: TimedButtonState,
    pub b: TimedButtonState,
    pub x: TimedButtonState,
    pub y: TimedButtonState,
    pub left_shoulder: TimedButtonState,
    pub right_shoulder: TimedButtonState,
    pub left_trigger: TimedAnalogButtonState,
    pub right_trigger: TimedAnalogButtonState,
    pub start: ButtonState,
    pub back: ButtonState,
}

impl GamepadState {
    pub fn new(player: PlayerIndex) -> Self {
        Self {
            player,
            connected: false,
            dpad: DirectionalState::default(),
            left_stick: ThumbstickState::default(),
            right_stick: ThumbstickState::default(),
            a: TimedButtonState::default(),
            b: TimedButtonState::default(),
            x: TimedButtonState::default(),
            y: TimedButtonState::default(),
            left_shoulder: TimedButtonState::default(),
            right_shoulder: TimedButtonState::default(),
            left_trigger: TimedAnalogButtonState::default(),
            right_trigger: TimedAnalogButtonState::default(),
            start: ButtonState::default(),
            back: ButtonState::default(),
        }
    }

    fn next_state(self, raw: &GamepadSnapshot, elapsed: Duration) -> Self {
        let held = |button: GamepadButtons| raw.buttons.contains(button);
        let [left_x, left_y] = raw.left_thumb;
        let [right_x, right_y] = raw.right_thumb;
        Self {
            player: self.player,
            connected: true,
            left_shoulder: self
                .left_shoulder
                .next_state(held(GamepadButtons::LEFT_SHOULDER), elapsed),
            right_shoulder: self
                .right_shoulder
                .next_state(held(GamepadButtons::RIGHT_SHOULDER), elapsed),
            left_trigger: self
                .left_trigger
                .next_state(f32::from(raw.left_trigger) / 255.0, elapsed),
            right_trigger: self
                .right_trigger
                .next_state(f32::from(raw.right_trigger) / 255.0, elapsed),
            start: self.start.next_state(held(GamepadButtons::START)),
            back: self.back.next_state(held(GamepadButtons::BACK)),
            a: self.a.next_state(held(GamepadButtons::A), elapsed),
            b: self.b.next_state(held(GamepadButtons::B), elapsed),
            x: self.x.next_state(held(GamepadButtons::X), elapsed),
            y: self.y.next_state(held(GamepadButtons::Y), elapsed),
            dpad: self.dpad.next_state(
                held(GamepadButtons::DPAD_UP),
                held(GamepadButtons::DPAD_DOWN),
                held(GamepadButtons::DPAD_LEFT),
                held(GamepadButtons::DPAD_RIGHT),
                elapsed,
            ),
            left_stick: self.left_stick.next_state(
                normalize_stick(left_x, left_y, LEFT_THUMB_DEADZONE),
                held(GamepadButtons::LEFT_THUMB),
                elapsed,
            ),
            right_stick: self.right_stick.next_state(
                normalize_stick(right_x, right_y, RIGHT_THUMB_DEADZONE),
                held(GamepadButtons::RIGHT_THUMB),
                elapsed,
            ),
        }
    }
}

/// A vibration request fading from its maximum to zero over its duration.
#[derive(Debug, Clone, Copy, PartialEq)]
struct MotorState {
    maximum: f32,
    duration: Duration,
    easing: EasingType,
    elapsed: Duration,
}

impl MotorState {
    fn new(amount: f32, duration: Duration, easing: EasingType) -> Self {
        Self {
            maximum: saturate(f64::from(amount)) as f32,
            duration,
            easing,
            elapsed: Duration::ZERO,
        }
    }

    /// Current amount, or `None` once the request has run its course.
    fn advance(&mut self, elapsed: Duration) -> Option<f32> {
        if self.duration.is_zero() || self.elapsed > self.duration {
            return None;
        }
        let remaining = 1.0 - self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.elapsed += elapsed;
        Some(ease_in(remaining, self.easing) as f32 * self.maximum)
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    state: GamepadState,
    left_motor: Option<MotorState>,
    right_motor: Option<MotorState>,
    /// Motor speeds last sent to the device.
    output: Dirtyable<(f32, f32)>,
}

impl Slot {
    fn new(player: PlayerIndex) -> Self {
        Self {
            state: GamepadState::new(player),
            left_motor: None,
            right_motor: None,
            output: Dirtyable::new((0.0, 0.0)),
        }
    }

    fn update(&mut self, source: &dyn InputSource, elapsed: Duration) {
        let player = self.state.player;
        let Some(raw) = source.gamepad_state(player) else {
            if self.state.connected {
                debug!("gamepad {:?} disconnected", player);
            }
            *self = Slot::new(player);
            return;
        };

        let left = advance_motor(&mut self.left_motor, elapsed);
        let right = advance_motor(&mut self.right_motor, elapsed);
        self.output.set_if_changed((left, right));
        if self.output.is_dirty() {
            source.set_vibration(player, left, right);
            self.output.clean();
        }

        self.state = self.state.next_state(&raw, elapsed);
    }
}

fn advance_motor(motor: &mut Option<MotorState>, elapsed: Duration) -> f32 {
    match motor.as_mut().and_then(|state| state.advance(elapsed)) {
        Some(amount) => amount,
        None => {
            *motor = None;
            0.0
        }
    }
}

/// Up to four XInput-style controllers.
pub trait GamepadsService: Send + Sync {
    fn state(&self, player: PlayerIndex) -> GamepadState;

    /// Starts a vibration on `motor` that eases from `amount` down to zero,
    /// replacing any vibration already running on it.
    fn vibrate(
        &self,
        player: PlayerIndex,
        motor: VibrationMotor,
        amount: f32,
        duration: Duration,
        easing: EasingType,
    );
}

pub struct GamepadBank {
    slots: Mutex<[Slot; 4]>,
}

impl GamepadBank {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(PlayerIndex::ALL.map(Slot::new)),
        }
    }

    pub fn poll(&self, source: &dyn InputSource, elapsed: Duration) {
        for slot in self.slots.lock().iter_mut() {
            slot.update(source, elapsed);
        }
    }
}

impl Default for GamepadBank {
    fn default() -> Self {
        Self::new()
    }
}

impl GamepadsService for GamepadBank {
    fn state(&self, player: PlayerIndex) -> GamepadState {
        self.slots.lock()[player.index()].state
    }

    fn vibrate(
        &self,
        player: PlayerIndex,
        motor: VibrationMotor,
        amount: f32,
        duration: Duration,
        easing: EasingType,
    ) {
        let request = Some(MotorState::new(amount, duration, easing));
        let mut slots = self.slots.lock();
        let slot = &mut slots[player.index()];
        match motor {
            VibrationMotor::LeftLow => slot.left_motor = request,
            VibrationMotor::RightHigh => slot.right_motor = request,
        }
    }
}

#[derive(Default)]
pub struct Gamepads {
    bank: Arc<GamepadBank>,
    source: Option<Arc<dyn InputSource>>,
}

impl Component for Gamepads {
    fn name(&self) -> &'static str {
        "Gamepads"
    }

    fn register_services(&self, registry: &mut ServiceRegistry) {
        let service: Arc<dyn GamepadsService> = self.bank.clone();
        registry.register(service);
    }

    fn dependencies(&self) -> Vec<ServiceDependency> {
        vec![ServiceDependency::required::<dyn InputSource>()]
    }

    fn inject(&mut self, services: &mut Injection<'_>) -> Result<(), FrameworkError> {
        self.source = Some(services.require::<dyn InputSource>()?);
        Ok(())
    }

    fn update(&mut self, _context: &mut FrameContext<'_>, elapsed: Duration) {
        if let Some(source) = &self.source {
            self.bank.poll(source.as_ref(), elapsed);
        }
    }
}
