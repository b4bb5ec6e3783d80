use std::mem;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};

use super::bootstrap::{Bootstrap, RunMode};
use super::component::{Component, ComponentId};
use super::injection::inject_services;
use super::registry::{Registration, ServiceRegistry};
use crate::error::FrameworkError;
use crate::render::{NullRenderHooks, RenderHooks};
use crate::settings::EngineSettings;

struct Slot {
    id: ComponentId,
    order: i32,
    component: Box<dyn Component>,
}

impl Slot {
    fn new(id: ComponentId, component: Box<dyn Component>) -> Self {
        Self {
            id,
            order: component.order(),
            component,
        }
    }
}

/// Mutations requested while components are being iterated. They are
/// applied at the next frame boundary.
#[derive(Default)]
struct Commands {
    next_id: u64,
    /// Already initialized, waiting to join the active list.
    to_add: Vec<Slot>,
    /// Loaded from inside an update, wired at the next boundary.
    to_spawn: Vec<(ComponentId, Box<dyn Component>)>,
    to_remove: Vec<ComponentId>,
    should_sort: bool,
    exit_requested: bool,
}

impl Commands {
    fn allocate_id(&mut self) -> ComponentId {
        self.next_id += 1;
        ComponentId(self.next_id)
    }

    fn is_pending(&self) -> bool {
        !self.to_add.is_empty() || !self.to_spawn.is_empty() || !self.to_remove.is_empty()
    }
}

/// Scheduler access handed to a component during [`Component::update`].
pub struct FrameContext<'a> {
    current: ComponentId,
    services: &'a ServiceRegistry,
    commands: &'a mut Commands,
}

impl<'a> FrameContext<'a> {
    /// Id of the component being updated.
    pub fn id(&self) -> ComponentId {
        self.current
    }

    pub fn services(&self) -> &ServiceRegistry {
        self.services
    }

    pub fn get_service<S>(&self) -> Result<Arc<S>, FrameworkError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.services.get::<S>()
    }

    /// Queues `component`; it is wired and starts updating next frame.
    pub fn load_component(&mut self, component: Box<dyn Component>) -> ComponentId {
        let id = self.commands.allocate_id();
        self.commands.to_spawn.push((id, component));
        id
    }

    pub fn unload(&mut self, id: ComponentId) {
        self.commands.to_remove.push(id);
    }

    pub fn unload_self(&mut self) {
        self.commands.to_remove.push(self.current);
    }

    pub fn notify_order_changed(&mut self) {
        self.commands.should_sort = true;
    }

    /// Stops the current frame after this component and disposes the core.
    pub fn exit(&mut self) {
        self.commands.exit_requested = true;
    }
}

/// Owns the components, their services and the frame lifecycle.
pub struct Core {
    settings: EngineSettings,
    run_mode: RunMode,
    registry: ServiceRegistry,
    active: Vec<Slot>,
    commands: Commands,
    render: Box<dyn RenderHooks>,
    initialized: bool,
    disposed: bool,
}

impl Core {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            run_mode: RunMode::current(),
            registry: ServiceRegistry::new(),
            active: Vec::new(),
            commands: Commands::default(),
            render: Box::new(NullRenderHooks),
            initialized: false,
            disposed: false,
        }
    }

    pub fn with_render_hooks(mut self, render: Box<dyn RenderHooks>) -> Self {
        self.render = render;
        self
    }

    pub fn with_run_mode(mut self, run_mode: RunMode) -> Self {
        self.run_mode = run_mode;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn run_mode(&self) -> RunMode {
        self.run_mode
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Registers a service provided by the host, such as the input source.
    pub fn register_service<S>(&mut self, service: Arc<S>) -> Registration
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.registry.register(service)
    }

    pub fn get_service<S>(&self) -> Result<Arc<S>, FrameworkError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.registry.get::<S>()
    }

    /// Builds everything in `bootstrap` and seals the service registry.
    ///
    /// Components are constructed and register their services first, then the
    /// standalone services are built. Components are then sorted, injected and
    /// initialized in order, and finally post-initialized in the same order.
    pub fn initialize(&mut self, bootstrap: Bootstrap) -> Result<(), FrameworkError> {
        if self.disposed {
            return Err(FrameworkError::Disposed);
        }
        let (auto_load, services, disabled) = bootstrap.into_parts();
        for key in disabled {
            self.registry.disable_key(key);
        }

        let mut loaded = Vec::new();
        for entry in auto_load {
            if !entry.run_mode.allows(self.run_mode) {
                debug!(
                    "skipping {:?} component in {:?} mode",
                    entry.run_mode, self.run_mode
                );
                continue;
            }
            let component = (entry.factory)();
            component.register_services(&mut self.registry);
            let id = self.commands.allocate_id();
            loaded.push(Slot::new(id, component));
        }
        for build in services {
            build(&mut self.registry)?;
        }
        self.registry.seal();

        loaded.sort_by_key(|slot| slot.order);
        for index in 0..loaded.len() {
            if let Err(err) = wire(&self.registry, loaded[index].component.as_mut()) {
                for slot in &mut loaded[..index] {
                    slot.component.dispose();
                }
                return Err(err);
            }
            loaded[index].component.initialize();
        }
        for slot in &mut loaded {
            slot.component.post_initialize();
        }

        info!(
            "core initialized with {} component(s) and {} service(s) in {:?} mode",
            loaded.len(),
            self.registry.len(),
            self.run_mode
        );
        self.active.extend(loaded);
        self.commands.should_sort = true;
        self.initialized = true;
        Ok(())
    }

    /// Wires and initializes `component` now; it joins the update list at the
    /// next frame boundary.
    pub fn load_component(
        &mut self,
        mut component: Box<dyn Component>,
    ) -> Result<ComponentId, FrameworkError> {
        if self.disposed {
            return Err(FrameworkError::Disposed);
        }
        component.register_services(&mut self.registry);
        wire(&self.registry, component.as_mut())?;
        component.initialize();
        component.post_initialize();
        let id = self.commands.allocate_id();
        debug!("loaded {} as {}", component.name(), id);
        self.commands.to_add.push(Slot::new(id, component));
        Ok(id)
    }

    /// Queues `id` for disposal at the next frame boundary.
    pub fn unload_component(&mut self, id: ComponentId) {
        self.commands.to_remove.push(id);
    }

    /// Runs one logic tick over the enabled components in order.
    pub fn update(&mut self, elapsed: Duration) -> Result<(), FrameworkError> {
        if self.disposed {
            return Ok(());
        }
        if self.commands.is_pending() {
            self.synchronize()?;
        }
        if mem::take(&mut self.commands.should_sort) {
            self.sort();
        }

        let Self {
            active,
            registry,
            commands,
            ..
        } = self;
        for slot in active.iter_mut() {
            if slot.component.enabled() {
                let mut context = FrameContext {
                    current: slot.id,
                    services: &*registry,
                    commands: &mut *commands,
                };
                slot.component.update(&mut context, elapsed);
            }
            if commands.exit_requested {
                break;
            }
        }

        if self.commands.exit_requested {
            info!("exit requested during update");
            self.dispose();
            return Ok(());
        }
        if mem::take(&mut self.commands.should_sort) {
            self.sort();
        }
        Ok(())
    }

    /// Runs the draw hooks of every enabled component.
    pub fn draw(&mut self) {
        if self.disposed {
            return;
        }
        self.for_each_enabled(|component| component.pre_draw());
        self.render.begin_frame();
        self.for_each_enabled(|component| component.draw());
        self.for_each_enabled(|component| component.post_draw());
        self.render.end_frame();
    }

    /// Draws again without advancing the logic, for example after a resize.
    pub fn redraw(&mut self) {
        self.draw();
    }

    pub fn exit(&mut self) {
        self.dispose();
    }

    /// Disposes every initialized component exactly once, then releases rendering.
    /// Components spawned during the last update and not yet wired are dropped.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        let ids = self
            .active
            .iter()
            .map(|slot| slot.id)
            .chain(self.commands.to_add.iter().map(|slot| slot.id))
            .chain(self.commands.to_spawn.iter().map(|(id, _)| *id))
            .collect::<Vec<_>>();
        self.commands.to_remove.extend(ids);
        self.apply_removals();
        self.render.release();
        self.disposed = true;
        info!("core disposed");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Components currently being updated, in update order.
    pub fn component_ids(&self) -> Vec<ComponentId> {
        self.active.iter().map(|slot| slot.id).collect()
    }

    pub fn component_count(&self) -> usize {
        self.active.len()
    }

    pub fn component_names(&self) -> Vec<&'static str> {
        self.active.iter().map(|slot| slot.component.name()).collect()
    }

    fn for_each_enabled(&mut self, mut f: impl FnMut(&mut dyn Component)) {
        for slot in &mut self.active {
            if slot.component.enabled() {
                f(slot.component.as_mut());
            }
        }
    }

    fn sort(&mut self) {
        for slot in &mut self.active {
            slot.order = slot.component.order();
        }
        self.active.sort_by_key(|slot| slot.order);
    }

    fn synchronize(&mut self) -> Result<(), FrameworkError> {
        self.apply_removals();

        let mut spawned = mem::take(&mut self.commands.to_spawn).into_iter();
        while let Some((id, mut component)) = spawned.next() {
            component.register_services(&mut self.registry);
            if let Err(err) = wire(&self.registry, component.as_mut()) {
                let discarded = spawned
                    .map(|(_, component)| component.name())
                    .collect::<Vec<_>>();
                error!(
                    "failed to wire {} ({}): {}; discarding {:?}",
                    component.name(),
                    id,
                    err,
                    discarded
                );
                return Err(err);
            }
            component.initialize();
            component.post_initialize();
            self.commands.to_add.push(Slot::new(id, component));
        }

        let added = mem::take(&mut self.commands.to_add);
        if !added.is_empty() {
            debug!("adding {} component(s)", added.len());
            self.active.extend(added);
            self.commands.should_sort = true;
        }
        Ok(())
    }

    fn apply_removals(&mut self) {
        for id in mem::take(&mut self.commands.to_remove) {
            let removed = if let Some(index) = self.active.iter().position(|slot| slot.id == id) {
                Some(self.active.remove(index).component)
            } else if let Some(index) = self.commands.to_add.iter().position(|slot| slot.id == id)
            {
                Some(self.commands.to_add.remove(index).component)
            } else {
                // Spawned components were never initialized, so they are not disposed either.
                if let Some(index) = self
                    .commands
                    .to_spawn
                    .iter()
                    .position(|(spawn_id, _)| *spawn_id == id)
                {
                    let (_, component) = self.commands.to_spawn.remove(index);
                    debug!("discarding {} ({}) before initialization", component.name(), id);
                }
                None
            };
            if let Some(mut component) = removed {
                debug!("disposing {} ({})", component.name(), id);
                component.dispose();
            }
        }
    }
}

impl Drop for Core {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn wire(registry: &ServiceRegistry, component: &mut dyn Component) -> Result<(), FrameworkError> {
    let dependencies = component.dependencies();
    let name = component.name();
    inject_services(registry, name, &dependencies, |services| {
        component.inject(services)
    })
}
