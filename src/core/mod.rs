//! Component scheduler, service registry and the fixed-step loop.

pub mod bootstrap;
pub mod component;
pub mod injection;
pub mod looping;
pub mod registry;
pub mod scheduler;

pub use bootstrap::{Bootstrap, RunMode};
pub use component::{Component, ComponentId};
pub use injection::{inject_services, Injection};
pub use looping::{FrameReport, Looping};
pub use registry::{Registration, ServiceDependency, ServiceKey, ServiceRegistry};
pub use scheduler::{Core, FrameContext};
