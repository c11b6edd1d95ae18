use std::sync::Arc;

use dashmap::DashMap;

use crate::source::LogSource;

/// Receives the log sources to start and stop ingesting.
///
/// For a single container, `add_source` is always called before `remove_source` and each
/// source is added and removed at most once.
pub trait SourceRegistry: Send + Sync + 'static {
    fn add_source(&self, source: Arc<LogSource>);

    fn remove_source(&self, source: Arc<LogSource>);
}

/// In-memory set of the currently registered log sources.
///
/// Sources are grouped by name. A restarted container briefly has two live sources with the
/// same name, removal therefore matches on the source itself.
#[derive(Debug, Default)]
pub struct LogSources {
    sources: DashMap<String, Vec<Arc<LogSource>>>,
}

impl LogSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live sources.
    pub fn len(&self) -> usize {
        self.sources.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Returns the live sources registered under `name`.
    pub fn sources_named(&self, name: &str) -> Vec<Arc<LogSource>> {
        self.sources
            .get(name)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Returns all live sources.
    pub fn snapshot(&self) -> Vec<Arc<LogSource>> {
        self.sources
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect()
    }
}

impl SourceRegistry for LogSources {
    fn add_source(&self, source: Arc<LogSource>) {
        log::debug!("Registering log source `{}`", source.name());
        self.sources
            .entry(source.name().to_owned())
            .or_default()
            .push(source);
    }

    fn remove_source(&self, source: Arc<LogSource>) {
        log::debug!("Unregistering log source `{}`", source.name());
        self.sources.remove_if_mut(source.name(), |_, live| {
            live.retain(|s| !Arc::ptr_eq(s, &source));
            live.is_empty()
        });
    }
}
