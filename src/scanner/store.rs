use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use crate::pod::ContainerID;
use crate::source::LogSource;

/// The log source registered for every tracked container.
///
/// Owned by the reconciler task, nothing else reads or writes it. Access from other tasks
/// requires wrapping it in a mutex first.
#[derive(Debug, Default)]
pub(super) struct SourceMap {
    sources: HashMap<ContainerID, Arc<LogSource>>,
}

impl SourceMap {
    /// Tracks `container_id` with `source` unless it is already tracked.
    ///
    /// Returns whether the source was inserted.
    pub(super) fn add_if_absent(
        &mut self,
        container_id: ContainerID,
        source: Arc<LogSource>,
    ) -> bool {
        match self.sources.entry(container_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(source);
                true
            }
        }
    }

    /// Stops tracking `container_id`, returning its source if it was tracked.
    pub(super) fn remove_if_present(
        &mut self,
        container_id: &ContainerID,
    ) -> Option<Arc<LogSource>> {
        self.sources.remove(container_id)
    }

    pub(super) fn contains(&self, container_id: &ContainerID) -> bool {
        self.sources.contains_key(container_id)
    }

    pub(super) fn len(&self) -> usize {
        self.sources.len()
    }
}
