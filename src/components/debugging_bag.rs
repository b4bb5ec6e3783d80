//! On-screen `name : value` diagnostics that fade out when no longer updated.

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::{Component, FrameContext, Injection, ServiceDependency, ServiceRegistry};
use crate::error::FrameworkError;
use crate::render::{Color, TextRenderer};
use crate::tools::easing::{ease_in, EasingType};
use crate::tools::math::{almost_equal, clamp};

/// A line not written for this long is removed.
pub const EXPIRATION: Duration = Duration::from_secs(20);
/// A line whose value changed is highlighted for this long.
pub const HIGHLIGHT: Duration = Duration::from_millis(250);

pub const HIGHLIGHT_COLOR: Color = Color::new(1.0, 1.0, 0.5, 1.0);
const LINE_HEIGHT: i32 = 15;
const LEFT: i32 = 8;
const TOP: i32 = 30;

pub trait DebuggingBagService: Send + Sync {
    /// Shows `value` under `name`, replacing the previous value.
    fn put(&self, name: &str, value: &dyn Display);

    fn shadows(&self) -> bool;

    fn set_shadows(&self, shadows: bool);
}

#[derive(Debug, Clone, PartialEq)]
pub struct DebugLine {
    pub name: String,
    pub value: String,
    since_seen: Duration,
    since_refreshed: Duration,
}

impl DebugLine {
    fn new(name: &str, value: String) -> Self {
        Self {
            name: name.to_owned(),
            value,
            since_seen: Duration::ZERO,
            since_refreshed: Duration::ZERO,
        }
    }

    fn set_value(&mut self, value: String) {
        if value != self.value {
            self.since_refreshed = Duration::ZERO;
        }
        self.value = value;
        self.since_seen = Duration::ZERO;
    }

    fn advance(&mut self, elapsed: Duration) {
        self.since_seen += elapsed;
        self.since_refreshed += elapsed;
    }

    pub fn is_expired(&self) -> bool {
        self.since_seen >= EXPIRATION
    }

    /// Time since last written, normalized to `[0, 1]` over [`EXPIRATION`].
    pub fn age(&self) -> f64 {
        clamp(
            self.since_seen.as_secs_f64() / EXPIRATION.as_secs_f64(),
            0.0,
            1.0,
        )
    }

    pub fn is_new(&self) -> bool {
        self.since_refreshed < HIGHLIGHT
    }

    pub fn text(&self) -> String {
        if self.value.is_empty() {
            self.name.clone()
        } else {
            format!("{} : {}", self.name, self.value)
        }
    }
}

/// A line as it should be drawn this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleLine {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub color: Color,
    /// Drop shadow color when shadows are on.
    pub shadow: Option<Color>,
}

#[derive(Debug, Default)]
pub struct DebugLines {
    lines: Mutex<Vec<DebugLine>>,
    shadows: AtomicBool,
}

impl DebugLines {
    pub fn advance(&self, elapsed: Duration) {
        for line in self.lines.lock().iter_mut() {
            line.advance(elapsed);
        }
    }

    /// Lines still visible, laid out top to bottom in insertion order.
    pub fn visible(&self) -> Vec<VisibleLine> {
        let shadows = self.shadows();
        let mut y = TOP;
        let mut visible = Vec::new();
        for line in self.lines.lock().iter() {
            let alpha = 1.0 - ease_in(line.age(), EasingType::Quadratic);
            if almost_equal(alpha, 0.0) {
                continue;
            }
            let alpha = alpha as f32;
            visible.push(VisibleLine {
                text: line.text(),
                x: LEFT,
                y,
                color: if line.is_new() {
                    HIGHLIGHT_COLOR
                } else {
                    Color::WHITE.with_alpha(alpha)
                },
                shadow: shadows.then(|| Color::BLACK.with_alpha(alpha * 0.5)),
            });
            y += LINE_HEIGHT;
        }
        visible
    }

    /// Removes expired lines, returning how many went away.
    pub fn sweep(&self) -> usize {
        let mut lines = self.lines.lock();
        let before = lines.len();
        lines.retain(|line| !line.is_expired());
        before - lines.len()
    }

    pub fn line(&self, name: &str) -> Option<DebugLine> {
        self.lines.lock().iter().find(|line| line.name == name).cloned()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl DebuggingBagService for DebugLines {
    fn put(&self, name: &str, value: &dyn Display) {
        let value = value.to_string();
        let mut lines = self.lines.lock();
        match lines.iter_mut().find(|line| line.name == name) {
            Some(line) => line.set_value(value),
            None => lines.push(DebugLine::new(name, value)),
        }
    }

    fn shadows(&self) -> bool {
        self.shadows.load(Ordering::Relaxed)
    }

    fn set_shadows(&self, shadows: bool) {
        self.shadows.store(shadows, Ordering::Relaxed);
    }
}

/// Draws the bag through the text renderer service, if there is one.
#[derive(Default)]
pub struct DebuggingBag {
    lines: Arc<DebugLines>,
    renderer: Option<Arc<dyn TextRenderer>>,
}

impl Component for DebuggingBag {
    fn name(&self) -> &'static str {
        "DebuggingBag"
    }

    fn order(&self) -> i32 {
        i32::MIN
    }

    fn register_services(&self, registry: &mut ServiceRegistry) {
        let service: Arc<dyn DebuggingBagService> = self.lines.clone();
        registry.register(service);
    }

    fn dependencies(&self) -> Vec<ServiceDependency> {
        vec![ServiceDependency::optional::<dyn TextRenderer>()]
    }

    fn inject(&mut self, services: &mut Injection<'_>) -> Result<(), FrameworkError> {
        self.renderer = services.optional::<dyn TextRenderer>();
        Ok(())
    }

    fn update(&mut self, _context: &mut FrameContext<'_>, elapsed: Duration) {
        self.lines.advance(elapsed);
    }

    fn post_draw(&mut self) {
        if self.lines.is_empty() {
            return;
        }
        if let Some(renderer) = &self.renderer {
            renderer.begin_text();
            for line in self.lines.visible() {
                if let Some(shadow) = line.shadow {
                    renderer.draw_text(&line.text, line.x - 1, line.y - 1, shadow);
                }
                renderer.draw_text(&line.text, line.x, line.y, line.color);
            }
            renderer.end_text();
        }
        self.lines.sweep();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Bootstrap, Core, RunMode};
    use crate::settings::EngineSettings;

    #[derive(Default)]
    struct CapturedText {
        drawn: Mutex<Vec<(String, i32, i32, Color)>>,
    }

    impl TextRenderer for CapturedText {
        fn draw_text(&self, text: &str, x: i32, y: i32, color: Color) {
            self.drawn.lock().push((text.to_owned(), x, y, color));
        }
    }

    #[test]
    fn unchanged_value_keeps_highlight_timer() {
        let lines = DebugLines::default();
        lines.put("fps", &60);
        lines.advance(Duration::from_secs(1));
        lines.put("fps", &60);

        let line = lines.line("fps").unwrap();
        assert!(!line.is_new());
        assert_eq!(line.age(), 0.0);
    }

    #[test]
    fn changed_value_restarts_highlight() {
        let lines = DebugLines::default();
        lines.put("fps", &60);
        lines.advance(Duration::from_secs(1));
        lines.put("fps", &59);

        let line = lines.line("fps").unwrap();
        assert!(line.is_new());
        assert_eq!(line.value, "59");
        assert_eq!(lines.visible()[0].color, HIGHLIGHT_COLOR);
    }

    #[test]
    fn lines_fade_and_expire() {
        let lines = DebugLines::default();
        lines.put("state", &"loading");
        lines.advance(Duration::from_secs(10));

        let visible = lines.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].text, "state : loading");
        assert!((visible[0].color.a - 0.75).abs() < 1e-6);

        lines.advance(Duration::from_secs(10));
        assert!(lines.visible().is_empty());
        assert_eq!(lines.sweep(), 1);
        assert!(lines.line("state").is_none());
    }

    #[test]
    fn layout_follows_insertion_order() {
        let lines = DebugLines::default();
        lines.put("zeta", &1);
        lines.put("alpha", &"");
        lines.set_shadows(true);

        let visible = lines.visible();
        assert_eq!(visible[0].text, "zeta : 1");
        assert_eq!(visible[1].text, "alpha");
        assert_eq!((visible[0].x, visible[0].y), (LEFT, TOP));
        assert_eq!(visible[1].y, TOP + LINE_HEIGHT);
        assert!(visible[0].shadow.is_some());
    }

    #[test]
    fn renders_through_the_text_service_and_sweeps() {
        let text = Arc::new(CapturedText::default());
        let mut core = Core::new(EngineSettings::default());
        let renderer: Arc<dyn TextRenderer> = text.clone();
        core.register_service(renderer);
        core.initialize(Bootstrap::new().auto_load::<DebuggingBag>(RunMode::Always))
            .unwrap();
        let bag = core.get_service::<dyn DebuggingBagService>().unwrap();

        bag.put("frame", &1);
        core.update(Duration::from_millis(16)).unwrap();
        core.draw();
        assert_eq!(text.drawn.lock().len(), 1);
        assert_eq!(text.drawn.lock()[0].0, "frame : 1");

        core.update(EXPIRATION).unwrap();
        core.draw();
        assert_eq!(text.drawn.lock().len(), 1);
    }

    #[test]
    fn works_without_a_text_renderer() {
        let mut core = Core::new(EngineSettings::default());
        core.initialize(Bootstrap::new().auto_load::<DebuggingBag>(RunMode::Always))
            .unwrap();
        let bag = core.get_service::<dyn DebuggingBagService>().unwrap();
        bag.put("orphan", &true);
        core.update(EXPIRATION).unwrap();
        core.draw();
        assert!(!core.is_disposed());
    }
}
