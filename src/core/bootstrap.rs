use std::any::type_name;
use std::sync::Arc;

use super::component::Component;
use super::injection::{inject_services, Injection};
use super::registry::{Registration, ServiceDependency, ServiceKey, ServiceRegistry};
use crate::error::FrameworkError;

/// Build flavor a component is loaded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Always,
    Debug,
    Release,
}

impl RunMode {
    /// The flavor of the running binary.
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    /// Whether an entry declared for `self` loads when running as `current`.
    pub fn allows(self, current: RunMode) -> bool {
        self == Self::Always || self == current
    }
}

pub(crate) type ComponentFactory = Box<dyn FnOnce() -> Box<dyn Component>>;
pub(crate) type ServiceBuilder =
    Box<dyn FnOnce(&mut ServiceRegistry) -> Result<Registration, FrameworkError>>;

pub(crate) struct AutoLoad {
    pub run_mode: RunMode,
    pub factory: ComponentFactory,
}

/// Explicit list of what the core constructs at start-up.
///
/// Each module contributes through a `bootstrap(Bootstrap) -> Bootstrap`
/// function, so the full set is visible where the application wires it.
#[derive(Default)]
pub struct Bootstrap {
    components: Vec<AutoLoad>,
    services: Vec<ServiceBuilder>,
    disabled: Vec<ServiceKey>,
}

impl Bootstrap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auto_load<C>(self, run_mode: RunMode) -> Self
    where
        C: Component + Default + 'static,
    {
        self.auto_load_with(run_mode, || Box::new(C::default()))
    }

    pub fn auto_load_with(
        mut self,
        run_mode: RunMode,
        factory: impl FnOnce() -> Box<dyn Component> + 'static,
    ) -> Self {
        self.components.push(AutoLoad {
            run_mode,
            factory: Box::new(factory),
        });
        self
    }

    /// Adds a service that is not a component. It is built after every
    /// auto-loaded component has registered, so it may depend on them.
    pub fn service<S>(
        mut self,
        dependencies: Vec<ServiceDependency>,
        build: impl FnOnce(&mut Injection<'_>) -> Result<Arc<S>, FrameworkError> + 'static,
    ) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.services.push(Box::new(move |registry| {
            let service = inject_services(registry, type_name::<S>(), &dependencies, build)?;
            Ok(registry.register(service))
        }));
        self
    }

    /// Prevents `S` from being registered by anything in this bootstrap.
    pub fn disable<S: ?Sized + 'static>(mut self) -> Self {
        self.disabled.push(ServiceKey::of::<S>());
        self
    }

    pub fn len(&self) -> usize {
        self.components.len() + self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.services.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Vec<AutoLoad>, Vec<ServiceBuilder>, Vec<ServiceKey>) {
        (self.components, self.services, self.disabled)
    }
}
