use std::collections::HashSet;
use std::sync::Arc;

use log::debug;

use super::registry::{ServiceDependency, ServiceKey, ServiceRegistry};
use crate::error::FrameworkError;

/// Hands resolved services to a component while it is being wired.
///
/// Every service taken through [`require`](Injection::require) or
/// [`optional`](Injection::optional) is recorded so the caller can detect
/// declared dependencies that were resolved but never consumed.
pub struct Injection<'a> {
    registry: &'a ServiceRegistry,
    requiring: &'static str,
    delivered: HashSet<ServiceKey>,
}

impl<'a> Injection<'a> {
    fn new(registry: &'a ServiceRegistry, requiring: &'static str) -> Self {
        Self {
            registry,
            requiring,
            delivered: HashSet::new(),
        }
    }

    pub fn require<S>(&mut self) -> Result<Arc<S>, FrameworkError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let key = ServiceKey::of::<S>();
        let service = self
            .registry
            .try_get::<S>()
            .ok_or(FrameworkError::MissingService {
                requiring: self.requiring,
                missing: key.name(),
            })?;
        self.delivered.insert(key);
        Ok(service)
    }

    pub fn optional<S>(&mut self) -> Option<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let service = self.registry.try_get::<S>();
        if service.is_some() {
            self.delivered.insert(ServiceKey::of::<S>());
        }
        service
    }

    pub fn requiring(&self) -> &'static str {
        self.requiring
    }
}

/// Resolves `dependencies` for `requiring` and runs `inject` with them.
///
/// Required dependencies are checked before `inject` runs. Afterwards every
/// dependency that resolved must have been taken, otherwise the wiring is
/// reported as [`FrameworkError::MissingSetter`].
pub fn inject_services<T>(
    registry: &ServiceRegistry,
    requiring: &'static str,
    dependencies: &[ServiceDependency],
    inject: impl FnOnce(&mut Injection<'_>) -> Result<T, FrameworkError>,
) -> Result<T, FrameworkError> {
    if let Some(missing) = dependencies
        .iter()
        .find(|dependency| !dependency.optional && !registry.contains_key(&dependency.key))
    {
        return Err(FrameworkError::MissingService {
            requiring,
            missing: missing.key.name(),
        });
    }

    let mut injection = Injection::new(registry, requiring);
    let value = inject(&mut injection)?;

    if let Some(unused) = dependencies.iter().find(|dependency| {
        registry.contains_key(&dependency.key) && !injection.delivered.contains(&dependency.key)
    }) {
        return Err(FrameworkError::MissingSetter {
            requiring,
            missing: unused.key.name(),
        });
    }

    debug!(
        "injected {} service(s) into {}",
        injection.delivered.len(),
        requiring
    );
    Ok(value)
}
