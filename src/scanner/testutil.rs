use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{Semaphore, watch};

use crate::pod::{ContainerDescriptor, ContainerID, PodDescriptor};
use crate::registry::SourceRegistry;
use crate::source::LogSource;
use crate::tagger::TagResolver;
use crate::watcher::{ChannelWatcher, PodEventSender, PodStreams, PodWatcher};

pub(crate) const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A pod in namespace `default` with uid `{name}-uid`.
pub(crate) fn pod(name: &str, containers: &[(&str, &str)]) -> PodDescriptor {
    let containers = containers
        .iter()
        .map(|(id, name)| ContainerDescriptor::new(ContainerID::new(id).unwrap(), *name))
        .collect();
    PodDescriptor::new("default", name, format!("{name}-uid"), containers)
}

#[derive(Debug, thiserror::Error)]
#[error("no tags for container `{0}`")]
pub(crate) struct TagLookupError(String);

/// Resolves tags from a fixed table.
#[derive(Debug, Default)]
pub(crate) struct MapResolver {
    tags: HashMap<String, BTreeSet<String>>,
    failing: HashSet<String>,
    fail_init: bool,
    lookups: Arc<AtomicUsize>,
    gate: Option<Arc<Semaphore>>,
}

impl MapResolver {
    pub(crate) fn with_tags(mut self, container_id: &str, tags: &[&str]) -> Self {
        self.tags.insert(
            container_id.to_owned(),
            tags.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    pub(crate) fn failing_for(mut self, container_id: &str) -> Self {
        self.failing.insert(container_id.to_owned());
        self
    }

    pub(crate) fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Every lookup waits for a permit of the returned semaphore.
    pub(crate) fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub(crate) fn lookups(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.lookups)
    }
}

impl TagResolver for MapResolver {
    type Error = TagLookupError;

    fn init(&self) -> Result<(), Self::Error> {
        if self.fail_init {
            return Err(TagLookupError("init".to_owned()));
        }
        Ok(())
    }

    async fn tag(
        &self,
        container_id: &ContainerID,
        _high_cardinality: bool,
    ) -> Result<BTreeSet<String>, Self::Error> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .expect("gate semaphore closed")
                .forget();
        }
        if self.failing.contains(container_id.as_str()) {
            return Err(TagLookupError(container_id.to_string()));
        }
        Ok(self
            .tags
            .get(container_id.as_str())
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Call {
    Add(String),
    Remove(String),
}

/// Records every registry call in order.
#[derive(Debug)]
pub(crate) struct RecordingRegistry {
    calls: Mutex<Vec<(Call, Arc<LogSource>)>>,
    count: watch::Sender<usize>,
}

impl Default for RecordingRegistry {
    fn default() -> Self {
        Self {
            calls: Mutex::default(),
            count: watch::Sender::new(0),
        }
    }
}

impl RecordingRegistry {
    pub(crate) fn calls(&self) -> Vec<Call> {
        let calls = self.calls.lock().unwrap();
        calls.iter().map(|(call, _)| call.clone()).collect()
    }

    pub(crate) fn sources(&self) -> Vec<Arc<LogSource>> {
        let calls = self.calls.lock().unwrap();
        calls.iter().map(|(_, source)| Arc::clone(source)).collect()
    }

    /// Waits until at least `n` calls were recorded.
    pub(crate) async fn wait_for_calls(&self, n: usize) {
        let mut rx = self.count.subscribe();
        tokio::time::timeout(WAIT_TIMEOUT, rx.wait_for(|count| *count >= n))
            .await
            .expect("timed out waiting for registry calls")
            .expect("registry dropped");
    }

    fn record(&self, call: Call, source: Arc<LogSource>) {
        self.calls.lock().unwrap().push((call, source));
        self.count.send_modify(|count| *count += 1);
    }
}

impl SourceRegistry for RecordingRegistry {
    fn add_source(&self, source: Arc<LogSource>) {
        self.record(Call::Add(source.name().to_owned()), source);
    }

    fn remove_source(&self, source: Arc<LogSource>) {
        self.record(Call::Remove(source.name().to_owned()), source);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WatcherCall {
    Start,
    Stop,
}

/// A [`ChannelWatcher`] that records its start and stop calls.
#[derive(Debug)]
pub(crate) struct RecordingWatcher {
    inner: ChannelWatcher,
    calls: Arc<Mutex<Vec<WatcherCall>>>,
}

impl RecordingWatcher {
    pub(crate) fn new() -> (Self, PodEventSender, Arc<Mutex<Vec<WatcherCall>>>) {
        let (inner, sender) = ChannelWatcher::new(16);
        let calls = Arc::new(Mutex::new(Vec::new()));
        let watcher = Self {
            inner,
            calls: Arc::clone(&calls),
        };
        (watcher, sender, calls)
    }
}

impl PodWatcher for RecordingWatcher {
    fn start(&mut self) {
        self.calls.lock().unwrap().push(WatcherCall::Start);
        self.inner.start();
    }

    fn stop(&mut self) {
        self.calls.lock().unwrap().push(WatcherCall::Stop);
        self.inner.stop();
    }

    fn take_streams(&mut self) -> Option<PodStreams> {
        self.inner.take_streams()
    }
}
