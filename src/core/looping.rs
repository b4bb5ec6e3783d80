use std::time::Duration;

use log::warn;

use super::scheduler::Core;
use crate::error::FrameworkError;
use crate::settings::DEFAULT_UPDATE_STEP;

pub const DEFAULT_MAX_STEPS_PER_FRAME: u32 = 5;

/// What a single [`Looping::frame`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    pub updates: u32,
    pub drawn: bool,
    /// Time discarded because the frame needed more than the step cap.
    pub dropped: Duration,
}

/// Fixed-step driver: accumulates real time, runs as many fixed updates as
/// fit, then draws once.
#[derive(Debug, Clone)]
pub struct Looping {
    step: Duration,
    max_steps_per_frame: u32,
    accumulator: Duration,
    paused: bool,
}

impl Looping {
    pub fn new(step: Duration) -> Self {
        Self {
            step: if step.is_zero() { DEFAULT_UPDATE_STEP } else { step },
            max_steps_per_frame: DEFAULT_MAX_STEPS_PER_FRAME,
            accumulator: Duration::ZERO,
            paused: false,
        }
    }

    pub fn with_max_steps_per_frame(mut self, max_steps: u32) -> Self {
        self.max_steps_per_frame = max_steps.max(1);
        self
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resumes without replaying the time spent paused.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.accumulator = Duration::ZERO;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn frame(
        &mut self,
        core: &mut Core,
        elapsed: Duration,
    ) -> Result<FrameReport, FrameworkError> {
        if self.paused || core.is_disposed() {
            return Ok(FrameReport::default());
        }
        let plan = plan_steps(self.accumulator + elapsed, self.step, self.max_steps_per_frame);
        self.accumulator = plan.remaining;
        if !plan.dropped.is_zero() {
            warn!("running behind, dropped {:?} of updates", plan.dropped);
        }

        let mut report = FrameReport {
            dropped: plan.dropped,
            ..FrameReport::default()
        };
        for _ in 0..plan.steps {
            core.update(self.step)?;
            report.updates += 1;
            if core.is_disposed() {
                return Ok(report);
            }
        }
        core.draw();
        report.drawn = true;
        Ok(report)
    }
}

impl Default for Looping {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_STEP)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StepPlan {
    steps: u32,
    remaining: Duration,
    dropped: Duration,
}

fn plan_steps(mut accumulator: Duration, step: Duration, max_steps: u32) -> StepPlan {
    let mut steps = 0;
    while accumulator >= step && steps < max_steps {
        accumulator -= step;
        steps += 1;
    }
    if accumulator >= step {
        StepPlan {
            steps,
            remaining: Duration::ZERO,
            dropped: accumulator,
        }
    } else {
        StepPlan {
            steps,
            remaining: accumulator,
            dropped: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::core::{Component, FrameContext};
    use crate::settings::EngineSettings;

    struct Counter {
        updates: Arc<AtomicU32>,
        draws: Arc<AtomicU32>,
        exit_after: Option<u32>,
    }

    impl Component for Counter {
        fn update(&mut self, context: &mut FrameContext<'_>, _elapsed: Duration) {
            let count = self.updates.fetch_add(1, Ordering::SeqCst) + 1;
            if self.exit_after == Some(count) {
                context.exit();
            }
        }

        fn draw(&mut self) {
            self.draws.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn core_with_counter(exit_after: Option<u32>) -> (Core, Arc<AtomicU32>, Arc<AtomicU32>) {
        let updates = Arc::new(AtomicU32::new(0));
        let draws = Arc::new(AtomicU32::new(0));
        let mut core = Core::new(EngineSettings::default());
        core.load_component(Box::new(Counter {
            updates: Arc::clone(&updates),
            draws: Arc::clone(&draws),
            exit_after,
        }))
        .unwrap();
        (core, updates, draws)
    }

    #[test]
    fn plan_runs_whole_steps_and_keeps_remainder() {
        let plan = plan_steps(Duration::from_millis(50), Duration::from_millis(16), 5);
        assert_eq!(plan.steps, 3);
        assert_eq!(plan.remaining, Duration::from_millis(2));
        assert_eq!(plan.dropped, Duration::ZERO);
    }

    #[test]
    fn plan_drops_backlog_past_the_cap() {
        let plan = plan_steps(Duration::from_millis(120), Duration::from_millis(16), 3);
        assert_eq!(plan.steps, 3);
        assert_eq!(plan.remaining, Duration::ZERO);
        assert_eq!(plan.dropped, Duration::from_millis(72));
    }

    #[test]
    fn short_frames_accumulate_until_a_step_fits() {
        let (mut core, updates, draws) = core_with_counter(None);
        let mut looping = Looping::new(Duration::from_millis(10));

        let report = looping.frame(&mut core, Duration::from_millis(6)).unwrap();
        assert_eq!(report.updates, 0);
        assert!(report.drawn);
        let report = looping.frame(&mut core, Duration::from_millis(6)).unwrap();
        assert_eq!(report.updates, 1);
        assert_eq!(updates.load(Ordering::SeqCst), 1);
        // The component only joins the draw list at its first update.
        assert_eq!(draws.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn paused_loop_does_nothing() {
        let (mut core, updates, draws) = core_with_counter(None);
        let mut looping = Looping::new(Duration::from_millis(10));
        looping.pause();
        let report = looping.frame(&mut core, Duration::from_secs(1)).unwrap();
        assert_eq!(report, FrameReport::default());
        looping.resume();
        let report = looping.frame(&mut core, Duration::from_millis(10)).unwrap();
        assert_eq!(report.updates, 1);
        assert_eq!(updates.load(Ordering::SeqCst), 1);
        assert_eq!(draws.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn exit_stops_the_frame_without_drawing() {
        let (mut core, updates, draws) = core_with_counter(Some(2));
        let mut looping = Looping::new(Duration::from_millis(10));
        let report = looping.frame(&mut core, Duration::from_millis(40)).unwrap();
        assert_eq!(report.updates, 2);
        assert!(!report.drawn);
        assert!(core.is_disposed());
        assert_eq!(updates.load(Ordering::SeqCst), 2);
        assert_eq!(draws.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn zero_step_falls_back_to_sixty_hertz() {
        assert_eq!(Looping::new(Duration::ZERO).step(), DEFAULT_UPDATE_STEP);
    }
}
