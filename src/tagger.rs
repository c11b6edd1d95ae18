use std::collections::BTreeSet;

use crate::pod::ContainerID;

/// Looks up the tags attached to a container.
///
/// A resolver is created once by the host and shared with every component needing tags.
/// Lookups of the scanner are awaited one at a time, so a slow lookup delays the
/// processing of all later pod events.
pub trait TagResolver: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Prepares the resolver for lookups. Called once while constructing a scanner.
    fn init(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Returns the tags of the container.
    ///
    /// With `high_cardinality` set, tags with many distinct values (e.g., container ids)
    /// are included.
    fn tag(
        &self,
        container_id: &ContainerID,
        high_cardinality: bool,
    ) -> impl Future<Output = Result<BTreeSet<String>, Self::Error>> + Send;
}
