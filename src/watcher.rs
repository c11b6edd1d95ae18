//! The interface of pod watchers and a channel-backed watcher for hosts running their own
//! pod discovery.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use crate::pod::PodDescriptor;

/// Options handed to the watcher factory of a [`Scanner`](crate::scanner::Scanner).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherOptions {
    /// Discover pods through filesystem notifications instead of polling.
    pub use_inotify: bool,
}

/// The two event streams of a pod watcher.
#[derive(Debug)]
pub struct PodStreams {
    pub added: mpsc::Receiver<PodDescriptor>,
    pub removed: mpsc::Receiver<PodDescriptor>,
}

/// Produces added and removed pods.
///
/// Events for the same container must be delivered in the order they happened. No ordering
/// is required across pods or across the two streams.
pub trait PodWatcher: Send + 'static {
    /// Starts producing events.
    fn start(&mut self);

    /// Stops producing events and releases the watcher's resources.
    fn stop(&mut self);

    /// Hands out the event streams. Returns `None` once they were taken.
    fn take_streams(&mut self) -> Option<PodStreams>;
}

/// A [`PodWatcher`] fed through a [`PodEventSender`].
///
/// Events sent before [`PodWatcher::start`] are buffered, events sent after
/// [`PodWatcher::stop`] are discarded.
#[derive(Debug)]
pub struct ChannelWatcher {
    stopped: Arc<AtomicBool>,
    streams: Option<PodStreams>,
}

/// Sending half of a [`ChannelWatcher`].
#[derive(Debug, Clone)]
pub struct PodEventSender {
    stopped: Arc<AtomicBool>,
    added: mpsc::Sender<PodDescriptor>,
    removed: mpsc::Sender<PodDescriptor>,
}

impl ChannelWatcher {
    /// Creates a watcher whose streams buffer up to `capacity` pods each.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> (Self, PodEventSender) {
        let (added_tx, added_rx) = mpsc::channel(capacity);
        let (removed_tx, removed_rx) = mpsc::channel(capacity);
        let stopped = Arc::new(AtomicBool::new(false));
        let watcher = Self {
            stopped: Arc::clone(&stopped),
            streams: Some(PodStreams {
                added: added_rx,
                removed: removed_rx,
            }),
        };
        let sender = PodEventSender {
            stopped,
            added: added_tx,
            removed: removed_tx,
        };
        (watcher, sender)
    }
}

impl PodWatcher for ChannelWatcher {
    fn start(&mut self) {
        log::debug!("Starting channel pod watcher");
    }

    fn stop(&mut self) {
        log::debug!("Stopping channel pod watcher");
        self.stopped.store(true, Ordering::Release);
    }

    fn take_streams(&mut self) -> Option<PodStreams> {
        self.streams.take()
    }
}

impl PodEventSender {
    /// Publishes an added pod.
    ///
    /// Returns `false` if the event was discarded because the watcher is stopped or the
    /// receiving side is gone.
    pub async fn added(&self, pod: PodDescriptor) -> bool {
        self.send(&self.added, pod).await
    }

    /// Publishes a removed pod.
    ///
    /// Returns `false` if the event was discarded because the watcher is stopped or the
    /// receiving side is gone.
    pub async fn removed(&self, pod: PodDescriptor) -> bool {
        self.send(&self.removed, pod).await
    }

    async fn send(&self, tx: &mpsc::Sender<PodDescriptor>, pod: PodDescriptor) -> bool {
        if self.stopped.load(Ordering::Acquire) {
            log::trace!("Discarding event for pod `{}`, watcher stopped", pod.name());
            return false;
        }
        tx.send(pod).await.is_ok()
    }
}
