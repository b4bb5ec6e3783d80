//! Long-lived worker threads handed out for repeated jobs.
//!
//! A [`Worker`] binds one parked OS thread to a task. Starting it wakes the
//! thread, [`Worker::join`] blocks until the task finished, and giving the
//! worker back parks the thread again for the next [`PersistentThreadPool::take`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error};
use parking_lot::{Condvar, Mutex};

use crate::core::{Component, ServiceRegistry};
use crate::error::FrameworkError;

/// Threads spawned up front when the pool is created.
pub const INITIAL_THREADS: usize = 1;

type Job = Box<dyn FnOnce() + Send>;

enum Phase {
    Idle,
    Queued(Job),
    Running,
    Finished,
}

struct Handshake {
    phase: Phase,
    shutdown: bool,
}

struct Shared {
    state: Mutex<Handshake>,
    signal: Condvar,
}

struct PersistentThread {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl PersistentThread {
    fn spawn() -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(Handshake {
                phase: Phase::Idle,
                shutdown: false,
            }),
            signal: Condvar::new(),
        });
        let worker_shared = Arc::clone(&shared);
        let handle = thread::spawn(move || run_jobs(worker_shared));
        Self {
            shared,
            handle: Some(handle),
        }
    }

    fn start(&self, job: Job) -> Result<(), FrameworkError> {
        let mut state = self.shared.state.lock();
        if state.shutdown {
            return Err(FrameworkError::PoolDisposed);
        }
        if !matches!(state.phase, Phase::Idle) {
            return Err(FrameworkError::WorkerBusy);
        }
        state.phase = Phase::Queued(job);
        self.shared.signal.notify_all();
        Ok(())
    }

    fn is_started(&self) -> bool {
        !matches!(self.shared.state.lock().phase, Phase::Idle)
    }

    /// Blocks until the current job finished; the thread is idle afterwards.
    fn join(&self) {
        let mut state = self.shared.state.lock();
        while matches!(state.phase, Phase::Queued(_) | Phase::Running) {
            self.shared.signal.wait(&mut state);
        }
        state.phase = Phase::Idle;
    }

    fn shutdown(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.shutdown = true;
            self.shared.signal.notify_all();
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("persistent worker thread terminated abnormally");
            }
        }
    }
}

impl Drop for PersistentThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_jobs(shared: Arc<Shared>) {
    loop {
        let job = {
            let mut state = shared.state.lock();
            loop {
                if state.shutdown {
                    return;
                }
                match std::mem::replace(&mut state.phase, Phase::Idle) {
                    Phase::Queued(job) => {
                        state.phase = Phase::Running;
                        break job;
                    }
                    other => {
                        state.phase = other;
                        shared.signal.wait(&mut state);
                    }
                }
            }
        };

        if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(job)) {
            error!("worker task panicked: {}", panic_message(panic.as_ref()));
        }

        let mut state = shared.state.lock();
        state.phase = Phase::Finished;
        shared.signal.notify_all();
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else {
        "unknown panic"
    }
}

type Task<C, R> = Box<dyn FnMut(C) -> R + Send>;

/// A task bound to a pool thread.
pub struct Worker<C, R> {
    thread: PersistentThread,
    task: Arc<Mutex<Task<C, R>>>,
    result: Arc<Mutex<Option<R>>>,
}

impl<C, R> Worker<C, R>
where
    C: Send + 'static,
    R: Send + 'static,
{
    /// Runs the task with `context` on the worker's thread.
    pub fn start(&self, context: C) -> Result<(), FrameworkError> {
        let task = Arc::clone(&self.task);
        let result = Arc::clone(&self.result);
        self.thread.start(Box::new(move || {
            let mut task = task.lock();
            let value = (&mut **task)(context);
            *result.lock() = Some(value);
        }))
    }

    pub fn join(&self) {
        self.thread.join();
    }

    pub fn is_started(&self) -> bool {
        self.thread.is_started()
    }

    /// Joins, then takes the result of the last run. `None` if the task
    /// panicked or was never started.
    pub fn result(&self) -> Option<R> {
        self.join();
        self.result.lock().take()
    }
}

/// Service handing out [`Worker`]s backed by reusable threads.
pub struct PersistentThreadPool {
    idle: Mutex<Vec<PersistentThread>>,
    disposed: AtomicBool,
}

impl PersistentThreadPool {
    pub fn new() -> Self {
        Self {
            idle: Mutex::new((0..INITIAL_THREADS).map(|_| PersistentThread::spawn()).collect()),
            disposed: AtomicBool::new(false),
        }
    }

    /// Binds `task` to a parked thread, spawning one if none is idle.
    /// Fails with [`FrameworkError::PoolDisposed`] once the pool is disposed.
    pub fn take<C, R, F>(&self, task: F) -> Result<Worker<C, R>, FrameworkError>
    where
        C: Send + 'static,
        R: Send + 'static,
        F: FnMut(C) -> R + Send + 'static,
    {
        let mut idle = self.idle.lock();
        if self.is_disposed() {
            return Err(FrameworkError::PoolDisposed);
        }
        let thread = idle.pop().unwrap_or_else(|| {
            debug!("no idle worker thread, spawning one");
            PersistentThread::spawn()
        });
        Ok(Worker {
            thread,
            task: Arc::new(Mutex::new(Box::new(task))),
            result: Arc::new(Mutex::new(None)),
        })
    }

    /// Waits for the worker to finish and parks its thread again. After
    /// [`dispose`](Self::dispose) the thread is shut down instead.
    pub fn give_back<C, R>(&self, worker: Worker<C, R>) {
        let thread = worker.thread;
        thread.join();
        if self.disposed.load(Ordering::SeqCst) {
            drop(thread);
        } else {
            self.idle.lock().push(thread);
        }
    }

    pub fn idle_threads(&self) -> usize {
        self.idle.lock().len()
    }

    /// Shuts down every parked thread. Workers still out are shut down when
    /// given back or dropped.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        let threads = std::mem::take(&mut *self.idle.lock());
        debug!("shutting down {} idle worker thread(s)", threads.len());
        drop(threads);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl Default for PersistentThreadPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Publishes a [`PersistentThreadPool`] and disposes it with the core.
#[derive(Default)]
pub struct ThreadPool {
    pool: Arc<PersistentThreadPool>,
}

impl Component for ThreadPool {
    fn name(&self) -> &'static str {
        "ThreadPool"
    }

    fn register_services(&self, registry: &mut ServiceRegistry) {
        registry.register(Arc::clone(&self.pool));
    }

    fn dispose(&mut self) {
        self.pool.dispose();
    }
}
