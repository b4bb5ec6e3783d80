use thiserror::Error;

/// Errors raised by the scheduler, the service registry and the worker pool.
///
/// Wiring errors (`MissingService`, `MissingSetter`) indicate a broken
/// bootstrap and are surfaced immediately to whoever loaded the component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameworkError {
    #[error("the service dependency for {missing} in {requiring} could not be resolved")]
    MissingService {
        requiring: &'static str,
        missing: &'static str,
    },
    #[error(
        "the service dependency for {missing} in {requiring} could not be injected because nothing accepted it"
    )]
    MissingSetter {
        requiring: &'static str,
        missing: &'static str,
    },
    #[error("no service is registered for {0}")]
    ServiceNotFound(&'static str),
    #[error("worker thread is already started")]
    WorkerBusy,
    #[error("worker thread has been shut down")]
    PoolDisposed,
    #[error("the core has been disposed")]
    Disposed,
}
