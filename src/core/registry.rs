//! Type-keyed singleton services.
//!
//! A service is any `Send + Sync` value shared through an [`Arc`]. Services
//! are usually registered under a trait object type (`dyn KeyboardService`)
//! so consumers never name the implementation, but concrete types work too.
//!
//! The registry is sealed once the core finishes bootstrapping. After that
//! point registrations are ignored and logged, never reported as errors.

use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use log::{debug, warn};

use crate::error::FrameworkError;

/// Identifies a service interface.
#[derive(Clone, Copy)]
pub struct ServiceKey {
    id: TypeId,
    name: &'static str,
}

impl ServiceKey {
    pub fn of<S: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            name: type_name::<S>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceKey {}

impl std::hash::Hash for ServiceKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A service a component declares it needs before it is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDependency {
    pub key: ServiceKey,
    pub optional: bool,
}

impl ServiceDependency {
    pub fn required<S: ?Sized + 'static>() -> Self {
        Self {
            key: ServiceKey::of::<S>(),
            optional: false,
        }
    }

    pub fn optional<S: ?Sized + 'static>() -> Self {
        Self {
            key: ServiceKey::of::<S>(),
            optional: true,
        }
    }
}

/// Outcome of [`ServiceRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Registered,
    /// Another implementation already claimed the interface and was kept.
    Duplicate,
    /// The interface was excluded with [`ServiceRegistry::disable`].
    Disabled,
    /// The registry was sealed; nothing changed.
    Sealed,
}

#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<ServiceKey, Box<dyn Any + Send + Sync>>,
    disabled: HashSet<ServiceKey>,
    sealed: bool,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `service` as the singleton for `S`. The first registrant wins.
    pub fn register<S>(&mut self, service: Arc<S>) -> Registration
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let key = ServiceKey::of::<S>();
        if self.sealed {
            warn!("ignoring late registration of {key:?}: services are sealed");
            return Registration::Sealed;
        }
        if self.disabled.contains(&key) {
            debug!("{key:?} is disabled, skipping registration");
            return Registration::Disabled;
        }
        if self.services.contains_key(&key) {
            warn!("{key:?} already has an implementation, keeping the first one");
            return Registration::Duplicate;
        }
        debug!("registered {key:?}");
        self.services.insert(key, Box::new(service));
        Registration::Registered
    }

    /// Excludes `S` from registration. Has no effect on an already registered service.
    pub fn disable<S: ?Sized + 'static>(&mut self) {
        self.disable_key(ServiceKey::of::<S>());
    }

    pub(crate) fn disable_key(&mut self, key: ServiceKey) {
        self.disabled.insert(key);
    }

    pub fn get<S>(&self) -> Result<Arc<S>, FrameworkError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.try_get::<S>()
            .ok_or_else(|| FrameworkError::ServiceNotFound(type_name::<S>()))
    }

    pub fn try_get<S>(&self) -> Option<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.services
            .get(&ServiceKey::of::<S>())
            .and_then(|boxed| boxed.downcast_ref::<Arc<S>>())
            .cloned()
    }

    pub fn contains<S: ?Sized + 'static>(&self) -> bool {
        self.contains_key(&ServiceKey::of::<S>())
    }

    pub fn contains_key(&self, key: &ServiceKey) -> bool {
        self.services.contains_key(key)
    }

    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.services.keys().collect::<Vec<_>>())
            .field("disabled", &self.disabled)
            .field("sealed", &self.sealed)
            .finish()
    }
}
