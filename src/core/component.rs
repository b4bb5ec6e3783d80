use std::any::type_name;
use std::fmt;
use std::time::Duration;

use super::injection::Injection;
use super::registry::{ServiceDependency, ServiceRegistry};
use super::scheduler::FrameContext;
use crate::error::FrameworkError;

/// Handle identifying a component owned by the [`Core`](super::Core).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) u64);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unit of behavior driven by the core.
///
/// Every hook has a no-op default. The core calls them in this order:
/// `register_services`, `inject`, `initialize`, `post_initialize`, then
/// `update` and the draw hooks once per frame while [`enabled`](Component::enabled)
/// holds, and finally `dispose` exactly once.
pub trait Component {
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Lower values run first. Call [`FrameContext::notify_order_changed`]
    /// after changing it at runtime.
    fn order(&self) -> i32 {
        0
    }

    fn enabled(&self) -> bool {
        true
    }

    /// Publishes the services this component provides.
    fn register_services(&self, _registry: &mut ServiceRegistry) {}

    /// Services that [`inject`](Component::inject) takes.
    fn dependencies(&self) -> Vec<ServiceDependency> {
        Vec::new()
    }

    fn inject(&mut self, _services: &mut Injection<'_>) -> Result<(), FrameworkError> {
        Ok(())
    }

    fn initialize(&mut self) {}

    fn post_initialize(&mut self) {}

    fn update(&mut self, _context: &mut FrameContext<'_>, _elapsed: Duration) {}

    fn pre_draw(&mut self) {}

    fn draw(&mut self) {}

    fn post_draw(&mut self) {}

    /// Called once, and only on components that were initialized.
    fn dispose(&mut self) {}
}
