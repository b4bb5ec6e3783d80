//! Penner-style easing curves over a normalized step in `[0, 1]`.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use super::math::lerp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EasingType {
    Step,
    #[default]
    Linear,
    Sine,
    Quadratic,
    Circular,
}

/// Blends between the linear step and an eased curve.
///
/// A positive `acceleration` blends towards [`ease_in`], a negative one towards
/// [`ease_out`]; its magnitude is the blend factor.
pub fn ease(step: f64, acceleration: f64, kind: EasingType) -> f64 {
    let eased = if acceleration > 0.0 {
        ease_in(step, kind)
    } else if acceleration < 0.0 {
        ease_out(step, kind)
    } else {
        step
    };
    lerp(step, eased, acceleration.abs())
}

pub fn ease_in(step: f64, kind: EasingType) -> f64 {
    match kind {
        EasingType::Step => step_curve(step),
        EasingType::Linear => step,
        EasingType::Sine => (step * FRAC_PI_2 - FRAC_PI_2).sin() + 1.0,
        EasingType::Quadratic => step.powi(2),
        EasingType::Circular => -((1.0 - step * step).sqrt() - 1.0),
    }
}

pub fn ease_out(step: f64, kind: EasingType) -> f64 {
    match kind {
        EasingType::Step => step_curve(step),
        EasingType::Linear => step,
        EasingType::Sine => (step * FRAC_PI_2).sin(),
        EasingType::Quadratic => 1.0 - (step - 1.0).powi(2),
        EasingType::Circular => (1.0 - (step - 1.0).powi(2)).sqrt(),
    }
}

pub fn ease_in_out(step: f64, kind: EasingType) -> f64 {
    match kind {
        EasingType::Step => step_curve(step),
        EasingType::Linear => step,
        EasingType::Sine => ((step * PI - FRAC_PI_2).sin() + 1.0) / 2.0,
        EasingType::Quadratic => {
            let s = step * 2.0;
            if s < 1.0 {
                s.powi(2) / 2.0
            } else {
                -0.5 * ((s - 2.0).powi(2) - 2.0)
            }
        }
        EasingType::Circular => {
            let s = step * 2.0;
            if s < 1.0 {
                ease_in(s, EasingType::Circular) / 2.0
            } else {
                ((1.0 - (s - 2.0).powi(2)).sqrt() + 1.0) / 2.0
            }
        }
    }
}

fn step_curve(step: f64) -> f64 {
    if step < 0.5 {
        0.0
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::math::almost_equal;

    const ALL: [EasingType; 5] = [
        EasingType::Step,
        EasingType::Linear,
        EasingType::Sine,
        EasingType::Quadratic,
        EasingType::Circular,
    ];

    #[test]
    fn curves_hit_both_endpoints() {
        for kind in ALL {
            assert!(almost_equal(ease_in(0.0, kind), 0.0), "{kind:?} in @0");
            assert!(almost_equal(ease_in(1.0, kind), 1.0), "{kind:?} in @1");
            assert!(almost_equal(ease_out(0.0, kind), 0.0), "{kind:?} out @0");
            assert!(almost_equal(ease_out(1.0, kind), 1.0), "{kind:?} out @1");
            assert!(almost_equal(ease_in_out(0.0, kind), 0.0), "{kind:?} inout @0");
            assert!(almost_equal(ease_in_out(1.0, kind), 1.0), "{kind:?} inout @1");
        }
    }

    #[test]
    fn quadratic_ease_in_is_slower_than_linear() {
        assert!(almost_equal(ease_in(0.5, EasingType::Quadratic), 0.25));
        assert!(almost_equal(ease_out(0.5, EasingType::Quadratic), 0.75));
        assert!(almost_equal(ease_in_out(0.25, EasingType::Quadratic), 0.125));
    }

    #[test]
    fn zero_acceleration_stays_linear() {
        assert!(almost_equal(ease(0.3, 0.0, EasingType::Circular), 0.3));
        assert!(almost_equal(ease(0.5, 1.0, EasingType::Quadratic), 0.25));
        assert!(almost_equal(ease(0.5, -1.0, EasingType::Quadratic), 0.75));
    }
}
