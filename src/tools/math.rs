/// Default tolerance used by [`almost_equal`].
pub const EPSILON: f64 = 1e-5;

pub fn almost_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

pub fn clamp(value: f64, minimum: f64, maximum: f64) -> f64 {
    value.max(minimum).min(maximum)
}

/// Clamps into `[0, 1]`.
pub fn saturate(value: f64) -> f64 {
    clamp(value, 0.0, 1.0)
}

pub fn lerp(from: f64, to: f64, step: f64) -> f64 {
    from + (to - from) * step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturate_clamps_both_ends() {
        assert_eq!(saturate(-0.5), 0.0);
        assert_eq!(saturate(0.25), 0.25);
        assert_eq!(saturate(3.0), 1.0);
    }

    #[test]
    fn lerp_interpolates_linearly() {
        assert!(almost_equal(lerp(2.0, 4.0, 0.5), 3.0));
        assert!(almost_equal(lerp(2.0, 4.0, 0.0), 2.0));
    }
}
