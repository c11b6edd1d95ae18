//! Keeps one log source registered per running container.
//!
//! A [`Scanner`] consumes the added and removed pods of a [`PodWatcher`] and forwards a
//! [`LogSource`](crate::source::LogSource) per container to a [`SourceRegistry`]:
//!
//! - an added pod registers a source for each of its containers that is not tracked yet,
//! - a removed pod unregisters the source of each of its tracked containers.
//!
//! Duplicate adds and removes of unknown containers are ignored, so a container never has
//! more than one registered source. Events are handled one at a time by a single task, which
//! also awaits the tag lookups: a slow [`TagResolver`] delays all later events.
//!
//! Events of one stream are handled in order. When both streams have events ready, the one
//! handled first is chosen at random, so only the order within a stream can be relied on.
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::BoxError;
use crate::registry::SourceRegistry;
use crate::source::SourceBuilder;
use crate::tagger::TagResolver;
use crate::watcher::{PodStreams, PodWatcher, WatcherOptions};

mod error;
mod reconciler;
mod store;
#[cfg(test)]
pub(crate) mod testutil;

pub use error::{Error, Result};

use reconciler::Reconciler;

const CREATED: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

/// Lifecycle of a [`Scanner`]. States only ever advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
    Created,
    Running,
    Stopped,
}

struct RunningLoop {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<usize>,
}

/// Creates and removes log sources as pods come and go.
pub struct Scanner<W, T, R> {
    state: AtomicU8,
    watcher: Mutex<W>,
    pending: Mutex<Option<(Reconciler<T, R>, PodStreams)>>,
    running: Mutex<Option<RunningLoop>>,
}

impl<W, T, R> Scanner<W, T, R>
where
    W: PodWatcher,
    T: TagResolver,
    R: SourceRegistry,
{
    /// Builds a scanner.
    ///
    /// The watcher is created by `make_watcher` from the discovery settings of `config`.
    /// The tag resolver is initialized before use.
    ///
    /// # Errors
    ///
    /// - [`Error::WatcherInit`] if the watcher cannot be created.
    /// - [`Error::TaggerInit`] if the tag resolver fails to initialize.
    /// - [`Error::StreamsUnavailable`] if the watcher does not hand out its event streams.
    pub fn new<F, E>(
        config: &Config,
        make_watcher: F,
        resolver: Arc<T>,
        registry: Arc<R>,
    ) -> Result<Self>
    where
        F: FnOnce(WatcherOptions) -> std::result::Result<W, E>,
        E: Into<BoxError>,
    {
        let options = WatcherOptions {
            use_inotify: config.use_inotify(),
        };
        let mut watcher = make_watcher(options).map_err(|err| Error::WatcherInit(err.into()))?;
        resolver
            .init()
            .map_err(|err| Error::TaggerInit(Box::new(err)))?;
        let streams = watcher.take_streams().ok_or(Error::StreamsUnavailable)?;

        let reconciler = Reconciler::new(SourceBuilder::new(config), resolver, registry);
        Ok(Self {
            state: AtomicU8::new(CREATED),
            watcher: Mutex::new(watcher),
            pending: Mutex::new(Some((reconciler, streams))),
            running: Mutex::new(None),
        })
    }

    /// Starts handling pod events on a new task, then starts the watcher.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`Error::NoRuntime`] if called outside of a tokio runtime.
    /// - [`Error::AlreadyStarted`] if the scanner is running.
    /// - [`Error::Stopped`] if the scanner was stopped.
    pub fn start(&self) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current().map_err(Error::NoRuntime)?;
        // Held until the watcher runs, `stop` takes it before stopping the watcher.
        let mut running = lock(&self.running);
        self.state
            .compare_exchange(CREATED, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|state| match state {
                RUNNING => Error::AlreadyStarted,
                _ => Error::Stopped,
            })?;
        log::info!("Starting Kubernetes scanner");

        let (reconciler, streams) = lock(&self.pending)
            .take()
            .ok_or(Error::AlreadyStarted)?;
        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = runtime.spawn(reconciler.run(streams, stop_rx));
        *running = Some(RunningLoop { stop_tx, handle });

        lock(&self.watcher).start();
        Ok(())
    }

    /// Stops the watcher and waits until the event task has exited.
    ///
    /// No source is added or removed once this returns. Returns immediately if the scanner
    /// was never started or is already stopped.
    pub async fn stop(&self) {
        match self.state.swap(STOPPED, Ordering::AcqRel) {
            RUNNING => {}
            CREATED => {
                log::debug!("Kubernetes scanner stopped before it was started");
                return;
            }
            _ => return,
        }
        log::info!("Stopping Kubernetes scanner");

        // Waits for a concurrent `start` to finish starting the watcher.
        let running = lock(&self.running).take();
        lock(&self.watcher).stop();

        if let Some(RunningLoop { stop_tx, handle }) = running {
            let _ = stop_tx.send(());
            match handle.await {
                Ok(tracked) => {
                    log::debug!("Kubernetes scanner stopped, {tracked} containers were tracked")
                }
                Err(err) => log::error!("Kubernetes scanner task failed: {}", err),
            }
        }
    }

    pub fn state(&self) -> ScannerState {
        match self.state.load(Ordering::Acquire) {
            CREATED => ScannerState::Created,
            RUNNING => ScannerState::Running,
            _ => ScannerState::Stopped,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
