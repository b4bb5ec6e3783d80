use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use parking_lot::Mutex;

use crate::core::{Component, FrameContext, Injection, ServiceDependency, ServiceRegistry};
use crate::error::FrameworkError;
use crate::input::InputSource;

/// The device is polled at 10 Hz regardless of the update rate.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Axes report values in `[-AXIS_RANGE, AXIS_RANGE]`.
pub const AXIS_RANGE: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoystickDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Legacy joystick queries. Every query answers `false` until the device
/// produced a reading.
pub trait JoystickService: Send + Sync {
    /// Whether `button` is the lowest-numbered button down in this tick's poll.
    fn button_down(&self, button: usize) -> bool;

    fn any_button_down(&self) -> bool;

    /// True when the stick is pushed fully towards `direction`. A positive
    /// answer recenters the stored axes, so it is reported once per push.
    fn direction_down(&self, direction: JoystickDirection) -> bool;
}

#[derive(Debug, Default)]
struct Reading {
    ready: bool,
    x: i32,
    y: i32,
    button_down: Option<usize>,
}

#[derive(Debug, Default)]
pub struct JoystickState {
    reading: Mutex<Reading>,
}

impl JoystickService for JoystickState {
    fn button_down(&self, button: usize) -> bool {
        let reading = self.reading.lock();
        reading.ready && reading.button_down == Some(button)
    }

    fn any_button_down(&self) -> bool {
        let reading = self.reading.lock();
        reading.ready && reading.button_down.is_some()
    }

    fn direction_down(&self, direction: JoystickDirection) -> bool {
        let mut reading = self.reading.lock();
        if !reading.ready {
            return false;
        }
        let at_extreme = match direction {
            JoystickDirection::Up => reading.y == -AXIS_RANGE,
            JoystickDirection::Down => reading.y == AXIS_RANGE,
            JoystickDirection::Left => reading.x == -AXIS_RANGE,
            JoystickDirection::Right => reading.x == AXIS_RANGE,
        };
        if at_extreme {
            reading.x = 0;
            reading.y = 0;
        }
        at_extreme
    }
}

#[derive(Default)]
pub struct Joystick {
    state: Arc<JoystickState>,
    source: Option<Arc<dyn InputSource>>,
    attached: bool,
    since_poll: Duration,
}

impl Component for Joystick {
    fn name(&self) -> &'static str {
        "Joystick"
    }

    fn register_services(&self, registry: &mut ServiceRegistry) {
        let service: Arc<dyn JoystickService> = self.state.clone();
        registry.register(service);
    }

    fn dependencies(&self) -> Vec<ServiceDependency> {
        vec![ServiceDependency::required::<dyn InputSource>()]
    }

    fn inject(&mut self, services: &mut Injection<'_>) -> Result<(), FrameworkError> {
        self.source = Some(services.require::<dyn InputSource>()?);
        Ok(())
    }

    fn initialize(&mut self) {
        self.attached = self
            .source
            .as_ref()
            .is_some_and(|source| source.joystick_attached());
        if !self.attached {
            warn!("no joystick attached, joystick queries will report nothing");
        }
    }

    fn update(&mut self, _context: &mut FrameContext<'_>, elapsed: Duration) {
        self.state.reading.lock().button_down = None;

        self.since_poll += elapsed;
        if self.since_poll < POLL_INTERVAL {
            return;
        }
        self.since_poll = Duration::ZERO;

        if !self.attached {
            return;
        }
        let Some(snapshot) = self.source.as_ref().and_then(|source| source.poll_joystick()) else {
            debug!("joystick poll failed");
            return;
        };
        let mut reading = self.state.reading.lock();
        reading.ready = true;
        reading.x = snapshot.x.clamp(-AXIS_RANGE, AXIS_RANGE);
        reading.y = snapshot.y.clamp(-AXIS_RANGE, AXIS_RANGE);
        reading.button_down = snapshot.buttons.iter().position(|down| *down);
    }

    fn dispose(&mut self) {
        self.attached = false;
        self.source = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Bootstrap, Core, RunMode};
    use crate::input::{JoystickSnapshot, QueuedInput};
    use crate::settings::EngineSettings;

    const TICK: Duration = Duration::from_millis(50);

    fn joystick_core(input: &Arc<QueuedInput>) -> (Core, Arc<dyn JoystickService>) {
        let mut core = Core::new(EngineSettings::default());
        let source: Arc<dyn InputSource> = input.clone();
        core.register_service(source);
        core.initialize(Bootstrap::new().auto_load::<Joystick>(RunMode::Always))
            .unwrap();
        let joystick = core.get_service::<dyn JoystickService>().unwrap();
        (core, joystick)
    }

    #[test]
    fn absent_joystick_answers_false() {
        let input = Arc::new(QueuedInput::new());
        let (mut core, joystick) = joystick_core(&input);
        for _ in 0..5 {
            core.update(TICK).unwrap();
        }
        assert!(!joystick.any_button_down());
        assert!(!joystick.direction_down(JoystickDirection::Up));
    }

    #[test]
    fn polls_at_ten_hertz() {
        let input = Arc::new(QueuedInput::new());
        input.set_joystick(Some(JoystickSnapshot {
            x: 0,
            y: 0,
            buttons: vec![false, true, true],
        }));
        let (mut core, joystick) = joystick_core(&input);

        core.update(TICK).unwrap();
        assert!(!joystick.any_button_down());

        core.update(TICK).unwrap();
        assert!(joystick.any_button_down());
        assert!(joystick.button_down(1));
        assert!(!joystick.button_down(2));

        core.update(TICK).unwrap();
        assert!(!joystick.any_button_down());
    }

    #[test]
    fn direction_query_consumes_the_reading() {
        let input = Arc::new(QueuedInput::new());
        input.set_joystick(Some(JoystickSnapshot {
            x: 1000,
            y: -1500,
            buttons: Vec::new(),
        }));
        let (mut core, joystick) = joystick_core(&input);
        core.update(POLL_INTERVAL).unwrap();

        assert!(!joystick.direction_down(JoystickDirection::Left));
        assert!(joystick.direction_down(JoystickDirection::Up));
        assert!(!joystick.direction_down(JoystickDirection::Right));
    }
}
