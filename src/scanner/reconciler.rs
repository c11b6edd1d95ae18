use std::sync::Arc;

use tokio::sync::oneshot;

use crate::error::ResultOkLogExt;
use crate::pod::{ContainerDescriptor, PodDescriptor};
use crate::registry::SourceRegistry;
use crate::source::{LogSource, SourceBuilder};
use crate::tagger::TagResolver;
use crate::watcher::PodStreams;

use super::store::SourceMap;

/// Turns pod events into log source registrations, one event at a time.
pub(super) struct Reconciler<T, R> {
    builder: SourceBuilder,
    resolver: Arc<T>,
    registry: Arc<R>,
    sources: SourceMap,
}

impl<T, R> Reconciler<T, R>
where
    T: TagResolver,
    R: SourceRegistry,
{
    pub(super) fn new(builder: SourceBuilder, resolver: Arc<T>, registry: Arc<R>) -> Self {
        Self {
            builder,
            resolver,
            registry,
            sources: SourceMap::default(),
        }
    }

    /// Handles pod events until `stop_rx` fires or its sender is dropped.
    ///
    /// When both streams have a pod ready, the stream handled first is picked at random.
    /// Events of one stream are handled in the order they were received.
    ///
    /// Returns the number of containers still tracked on exit.
    pub(super) async fn run(
        mut self,
        mut streams: PodStreams,
        mut stop_rx: oneshot::Receiver<()>,
    ) -> usize {
        loop {
            tokio::select! {
                Some(pod) = streams.added.recv() => {
                    log::info!("Adding pod: {}", pod.name());
                    self.add_sources(&pod).await;
                }
                Some(pod) = streams.removed.recv() => {
                    log::info!("Removing pod: {}", pod.name());
                    self.remove_sources(&pod);
                }
                _ = &mut stop_rx => break,
            }
        }
        self.sources.len()
    }

    /// Registers a log source for every container of `pod` that is not tracked yet.
    pub(super) async fn add_sources(&mut self, pod: &PodDescriptor) {
        for container in pod.containers() {
            if self.sources.contains(container.id()) {
                log::debug!("Container `{}` is already tracked", container.id());
                continue;
            }
            let source = Arc::new(self.source_for(pod, container).await);
            if self
                .sources
                .add_if_absent(container.id().clone(), Arc::clone(&source))
            {
                self.registry.add_source(source);
            }
        }
    }

    /// Unregisters the log source of every tracked container of `pod`.
    pub(super) fn remove_sources(&mut self, pod: &PodDescriptor) {
        for container in pod.containers() {
            match self.sources.remove_if_present(container.id()) {
                Some(source) => self.registry.remove_source(source),
                None => log::debug!("Container `{}` is not tracked", container.id()),
            }
        }
    }

    async fn source_for(
        &self,
        pod: &PodDescriptor,
        container: &ContainerDescriptor,
    ) -> LogSource {
        // A failed lookup only costs the tags, the logs are still collected.
        let tags = self
            .resolver
            .tag(container.id(), true)
            .await
            .ok_log(log::Level::Debug)
            .unwrap_or_default();
        self.builder.build(pod, container, tags)
    }

    #[cfg(test)]
    pub(super) fn tracked(&self) -> usize {
        self.sources.len()
    }
}
