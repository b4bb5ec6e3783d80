//! Glue shared by the `cubica` binary: platform key mapping, logging-backed
//! rendering and a small diagnostics component.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::trace;

use crate::components::{
    DebuggingBagService, GamepadsService, KeyboardService, MouseService, VibrationMotor,
};
use crate::core::{Component, Core, FrameContext, Injection, ServiceDependency};
use crate::error::FrameworkError;
use crate::input::{ButtonState, KeyCode, MouseButton, NamedKey, PlayerIndex};
use crate::render::{Color, RenderHooks, TextRenderer};
use crate::tools::EasingType;

/// Text output that goes to the log instead of the screen.
#[derive(Debug, Default)]
pub struct LogTextRenderer;

impl TextRenderer for LogTextRenderer {
    fn draw_text(&self, text: &str, x: i32, y: i32, color: Color) {
        trace!("text at ({x}, {y}) alpha {:.2}: {text}", color.a);
    }
}

/// Render hooks that only count presented frames.
#[derive(Debug, Default)]
pub struct FrameCounter {
    frames: Arc<AtomicU64>,
}

impl FrameCounter {
    pub fn new(frames: Arc<AtomicU64>) -> Self {
        Self { frames }
    }
}

impl RenderHooks for FrameCounter {
    fn end_frame(&mut self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    fn release(&mut self) {
        trace!(
            "render hooks released after {} frame(s)",
            self.frames.load(Ordering::Relaxed)
        );
    }
}

/// Reports input state to the debugging bag and exits on Escape.
#[derive(Default)]
pub struct Diagnostics {
    keyboard: Option<Arc<dyn KeyboardService>>,
    mouse: Option<Arc<dyn MouseService>>,
    gamepads: Option<Arc<dyn GamepadsService>>,
    bag: Option<Arc<dyn DebuggingBagService>>,
    ticks: u64,
}

impl Component for Diagnostics {
    fn name(&self) -> &'static str {
        "Diagnostics"
    }

    fn order(&self) -> i32 {
        100
    }

    fn dependencies(&self) -> Vec<ServiceDependency> {
        vec![
            ServiceDependency::required::<dyn KeyboardService>(),
            ServiceDependency::optional::<dyn MouseService>(),
            ServiceDependency::optional::<dyn GamepadsService>(),
            ServiceDependency::optional::<dyn DebuggingBagService>(),
        ]
    }

    fn inject(&mut self, services: &mut Injection<'_>) -> Result<(), FrameworkError> {
        self.keyboard = Some(services.require::<dyn KeyboardService>()?);
        self.mouse = services.optional::<dyn MouseService>();
        self.gamepads = services.optional::<dyn GamepadsService>();
        self.bag = services.optional::<dyn DebuggingBagService>();
        Ok(())
    }

    fn update(&mut self, context: &mut FrameContext<'_>, _elapsed: Duration) {
        self.ticks += 1;
        let Some(keyboard) = &self.keyboard else {
            return;
        };

        if let Some(bag) = &self.bag {
            bag.put("tick", &self.ticks);
            let held = keyboard.down();
            if !held.is_empty() {
                bag.put("keys", &format!("{held:?}"));
            }
            if let Some(mouse) = &self.mouse {
                let position = mouse.position();
                bag.put("mouse", &format!("{:.0}, {:.0}", position.x, position.y));
            }
        }

        if let Some(gamepads) = &self.gamepads {
            let pad = gamepads.state(PlayerIndex::One);
            if pad.connected && pad.a.state == ButtonState::Pressed {
                gamepads.vibrate(
                    PlayerIndex::One,
                    VibrationMotor::LeftLow,
                    1.0,
                    Duration::from_millis(500),
                    EasingType::Quadratic,
                );
            }
        }

        if keyboard.key_state(KeyCode::Named(NamedKey::Escape)) == ButtonState::Pressed {
            context.exit();
        }
    }
}

pub fn print_summary(core: &Core, frames: u64) {
    println!("Ran {frames} frame(s)");
    println!("Components:");
    for name in core.component_names() {
        println!(" - {name}");
    }
}

pub fn mouse_button(button: winit::event::MouseButton) -> MouseButton {
    use winit::event::MouseButton as Button;
    match button {
        Button::Left => MouseButton::LEFT,
        Button::Right => MouseButton::RIGHT,
        Button::Middle => MouseButton::MIDDLE,
        Button::Other(index) => MouseButton::new(index.min(u16::from(u8::MAX)) as u8),
    }
}

pub fn map_keycode(code: winit::event::VirtualKeyCode) -> Option<KeyCode> {
    use winit::event::VirtualKeyCode as Key;
    Some(match code {
        Key::Space => KeyCode::Named(NamedKey::Space),
        Key::Return => KeyCode::Named(NamedKey::Enter),
        Key::NumpadEnter => KeyCode::Named(NamedKey::NumpadEnter),
        Key::Tab => KeyCode::Named(NamedKey::Tab),
        Key::Left => KeyCode::Named(NamedKey::Left),
        Key::Right => KeyCode::Named(NamedKey::Right),
        Key::Up => KeyCode::Named(NamedKey::Up),
        Key::Down => KeyCode::Named(NamedKey::Down),
        Key::Escape => KeyCode::Named(NamedKey::Escape),
        Key::Back => KeyCode::Named(NamedKey::Backspace),
        Key::Insert => KeyCode::Named(NamedKey::Insert),
        Key::Delete => KeyCode::Named(NamedKey::Delete),
        Key::Home => KeyCode::Named(NamedKey::Home),
        Key::End => KeyCode::Named(NamedKey::End),
        Key::PageUp => KeyCode::Named(NamedKey::PageUp),
        Key::PageDown => KeyCode::Named(NamedKey::PageDown),
        Key::Pause => KeyCode::Named(NamedKey::Pause),
        Key::Capital => KeyCode::Named(NamedKey::CapsLock),
        Key::LShift => KeyCode::Named(NamedKey::LeftShift),
        Key::RShift => KeyCode::Named(NamedKey::RightShift),
        Key::LControl => KeyCode::Named(NamedKey::LeftCtrl),
        Key::RControl => KeyCode::Named(NamedKey::RightCtrl),
        Key::LAlt => KeyCode::Named(NamedKey::LeftAlt),
        Key::RAlt => KeyCode::Named(NamedKey::RightAlt),
        Key::Minus => KeyCode::Named(NamedKey::Minus),
        Key::Equals => KeyCode::Named(NamedKey::Equals),
        Key::Comma => KeyCode::Named(NamedKey::Comma),
        Key::Period => KeyCode::Named(NamedKey::Period),
        Key::Slash => KeyCode::Named(NamedKey::Slash),
        Key::Backslash => KeyCode::Named(NamedKey::Backslash),
        Key::Semicolon => KeyCode::Named(NamedKey::Semicolon),
        Key::Apostrophe => KeyCode::Named(NamedKey::Apostrophe),
        Key::Grave => KeyCode::Named(NamedKey::Grave),
        Key::LBracket => KeyCode::Named(NamedKey::LeftBracket),
        Key::RBracket => KeyCode::Named(NamedKey::RightBracket),
        Key::NumpadAdd => KeyCode::Named(NamedKey::NumpadAdd),
        Key::NumpadSubtract => KeyCode::Named(NamedKey::NumpadSubtract),
        Key::NumpadMultiply => KeyCode::Named(NamedKey::NumpadMultiply),
        Key::NumpadDivide => KeyCode::Named(NamedKey::NumpadDivide),
        Key::NumpadDecimal => KeyCode::Named(NamedKey::NumpadDecimal),
        Key::Key0 => KeyCode::Digit(0),
        Key::Key1 => KeyCode::Digit(1),
        Key::Key2 => KeyCode::Digit(2),
        Key::Key3 => KeyCode::Digit(3),
        Key::Key4 => KeyCode::Digit(4),
        Key::Key5 => KeyCode::Digit(5),
        Key::Key6 => KeyCode::Digit(6),
        Key::Key7 => KeyCode::Digit(7),
        Key::Key8 => KeyCode::Digit(8),
        Key::Key9 => KeyCode::Digit(9),
        Key::Numpad0 => KeyCode::Numpad(0),
        Key::Numpad1 => KeyCode::Numpad(1),
        Key::Numpad2 => KeyCode::Numpad(2),
        Key::Numpad3 => KeyCode::Numpad(3),
        Key::Numpad4 => KeyCode::Numpad(4),
        Key::Numpad5 => KeyCode::Numpad(5),
        Key::Numpad6 => KeyCode::Numpad(6),
        Key::Numpad7 => KeyCode::Numpad(7),
        Key::Numpad8 => KeyCode::Numpad(8),
        Key::Numpad9 => KeyCode::Numpad(9),
        Key::A => KeyCode::Character('A'),
        Key::B => KeyCode::Character('B'),
        Key::C => KeyCode::Character('C'),
        Key::D => KeyCode::Character('D'),
        Key::E => KeyCode::Character('E'),
        Key::F => KeyCode::Character('F'),
        Key::G => KeyCode::Character('G'),
        Key::H => KeyCode::Character('H'),
        Key::I => KeyCode::Character('I'),
        Key::J => KeyCode::Character('J'),
        Key::K => KeyCode::Character('K'),
        Key::L => KeyCode::Character('L'),
        Key::M => KeyCode::Character('M'),
        Key::N => KeyCode::Character('N'),
        Key::O => KeyCode::Character('O'),
        Key::P => KeyCode::Character('P'),
        Key::Q => KeyCode::Character('Q'),
        Key::R => KeyCode::Character('R'),
        Key::S => KeyCode::Character('S'),
        Key::T => KeyCode::Character('T'),
        Key::U => KeyCode::Character('U'),
        Key::V => KeyCode::Character('V'),
        Key::W => KeyCode::Character('W'),
        Key::X => KeyCode::Character('X'),
        Key::Y => KeyCode::Character('Y'),
        Key::Z => KeyCode::Character('Z'),
        Key::F1 => KeyCode::Function(1),
        Key::F2 => KeyCode::Function(2),
        Key::F3 => KeyCode::Function(3),
        Key::F4 => KeyCode::Function(4),
        Key::F5 => KeyCode::Function(5),
        Key::F6 => KeyCode::Function(6),
        Key::F7 => KeyCode::Function(7),
        Key::F8 => KeyCode::Function(8),
        Key::F9 => KeyCode::Function(9),
        Key::F10 => KeyCode::Function(10),
        Key::F11 => KeyCode::Function(11),
        Key::F12 => KeyCode::Function(12),
        Key::F13 => KeyCode::Function(13),
        Key::F14 => KeyCode::Function(14),
        Key::F15 => KeyCode::Function(15),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components;
    use crate::core::{Bootstrap, RunMode};
    use crate::input::{InputSource, QueuedInput};
    use crate::settings::EngineSettings;

    #[test]
    fn escape_exits_the_core() {
        let input = Arc::new(QueuedInput::new());
        let source: Arc<dyn InputSource> = input.clone();
        let mut core = Core::new(EngineSettings::default());
        core.register_service(source);
        let bootstrap =
            components::bootstrap(Bootstrap::new()).auto_load::<Diagnostics>(RunMode::Always);
        core.initialize(bootstrap).unwrap();

        core.update(Duration::from_millis(16)).unwrap();
        assert!(!core.is_disposed());
        input.set_key_down(KeyCode::Named(NamedKey::Escape));
        core.update(Duration::from_millis(16)).unwrap();
        assert!(core.is_disposed());
    }

    #[test]
    fn frame_counter_counts_presented_frames() {
        let frames = Arc::new(AtomicU64::new(0));
        let mut core = Core::new(EngineSettings::default())
            .with_render_hooks(Box::new(FrameCounter::new(Arc::clone(&frames))));
        core.draw();
        core.draw();
        assert_eq!(frames.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn winit_keys_map_to_config_names() {
        use winit::event::VirtualKeyCode as Key;
        assert_eq!(map_keycode(Key::Escape), KeyCode::from_name("escape"));
        assert_eq!(map_keycode(Key::Numpad4), KeyCode::from_name("numpad4"));
        assert_eq!(map_keycode(Key::F15), KeyCode::from_name("F15"));
        assert_eq!(mouse_button(winit::event::MouseButton::Middle), MouseButton::MIDDLE);
    }
}
