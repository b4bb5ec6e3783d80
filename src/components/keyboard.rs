use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::core::{Component, FrameContext, Injection, ServiceDependency, ServiceRegistry};
use crate::error::FrameworkError;
use crate::input::{ButtonState, InputSource, KeyCode, KeyEvent, KeyEventKind};

/// Per-key state of the keyboard for the current tick.
pub trait KeyboardService: Send + Sync {
    /// Keys never seen, or released before the previous tick, are `Up`.
    fn key_state(&self, key: KeyCode) -> ButtonState;

    fn key_from_name(&self, name: &str) -> Option<KeyCode> {
        KeyCode::from_name(name)
    }

    fn keys_in(&self, state: ButtonState) -> Vec<KeyCode>;

    fn down(&self) -> Vec<KeyCode> {
        self.keys_in(ButtonState::Down)
    }

    fn pressed(&self) -> Vec<KeyCode> {
        self.keys_in(ButtonState::Pressed)
    }

    fn released(&self) -> Vec<KeyCode> {
        self.keys_in(ButtonState::Released)
    }
}

/// Sparse key map: only keys that are not `Up` are stored.
#[derive(Debug, Default)]
pub struct KeyboardState {
    keys: RwLock<HashMap<KeyCode, ButtonState>>,
}

impl KeyboardState {
    /// Ages last tick's edges and applies the newly polled events.
    pub fn apply(&self, events: &[KeyEvent]) {
        let mut keys = self.keys.write();
        keys.retain(|_, state| match state {
            ButtonState::Released | ButtonState::Up => false,
            ButtonState::Pressed => {
                *state = ButtonState::Down;
                true
            }
            ButtonState::Down => true,
        });
        for event in events {
            let state = match event.kind {
                KeyEventKind::Pressed => ButtonState::Pressed,
                KeyEventKind::Released => ButtonState::Released,
            };
            keys.insert(event.key, state);
        }
    }
}

impl KeyboardService for KeyboardState {
    fn key_state(&self, key: KeyCode) -> ButtonState {
        self.keys
            .read()
            .get(&key)
            .copied()
            .unwrap_or(ButtonState::Up)
    }

    fn keys_in(&self, state: ButtonState) -> Vec<KeyCode> {
        let mut keys = self
            .keys
            .read()
            .iter()
            .filter(|(_, key_state)| **key_state == state)
            .map(|(key, _)| *key)
            .collect::<Vec<_>>();
        keys.sort();
        keys
    }
}

/// Polls key events from the input source once per tick.
#[derive(Default)]
pub struct Keyboard {
    state: Arc<KeyboardState>,
    source: Option<Arc<dyn InputSource>>,
    events: Vec<KeyEvent>,
}

impl Component for Keyboard {
    fn name(&self) -> &'static str {
        "Keyboard"
    }

    fn register_services(&self, registry: &mut ServiceRegistry) {
        let service: Arc<dyn KeyboardService> = self.state.clone();
        registry.register(service);
    }

    fn dependencies(&self) -> Vec<ServiceDependency> {
        vec![ServiceDependency::required::<dyn InputSource>()]
    }

    fn inject(&mut self, services: &mut Injection<'_>) -> Result<(), FrameworkError> {
        self.source = Some(services.require::<dyn InputSource>()?);
        Ok(())
    }

    fn update(&mut self, _context: &mut FrameContext<'_>, _elapsed: Duration) {
        let Some(source) = &self.source else {
            return;
        };
        self.events.clear();
        source.drain_key_events(&mut self.events);
        self.state.apply(&self.events);
    }
}
