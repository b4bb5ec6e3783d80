pub mod dirtyable;
pub mod easing;
pub mod math;

pub use dirtyable::Dirtyable;
pub use easing::EasingType;
