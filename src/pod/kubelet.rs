//! Decoding of the kubelet `/pods` endpoint into [`PodDescriptor`]s.
//!
//! Only the fields needed to build log sources are decoded, everything else in the
//! `PodList` document is ignored.
use serde::Deserialize;

use super::{ContainerDescriptor, ContainerID, Error, PodDescriptor, Result};

#[derive(Debug, Deserialize)]
pub struct PodList {
    #[serde(default)]
    pub items: Vec<Pod>,
}

#[derive(Debug, Deserialize)]
pub struct Pod {
    pub metadata: PodMetadata,
    #[serde(default)]
    pub status: PodStatus,
}

#[derive(Debug, Deserialize)]
pub struct PodMetadata {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    pub uid: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodStatus {
    #[serde(default)]
    pub container_statuses: Vec<ContainerStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ContainerStatus {
    pub name: String,
    #[serde(default, rename = "containerID")]
    pub container_id: String,
}

impl Pod {
    /// Converts the kubelet pod into a [`PodDescriptor`].
    ///
    /// Containers without a valid container id, e.g., containers that did not start yet,
    /// are left out.
    pub fn to_descriptor(&self) -> PodDescriptor {
        let containers = self
            .status
            .container_statuses
            .iter()
            .filter_map(|status| match ContainerID::new(&status.container_id) {
                Ok(id) => Some(ContainerDescriptor::new(id, status.name.clone())),
                Err(err) => {
                    log::debug!(
                        "Skipping container `{}` of pod `{}/{}`: {}",
                        status.name,
                        self.metadata.namespace,
                        self.metadata.name,
                        err
                    );
                    None
                }
            })
            .collect();

        PodDescriptor::new(
            self.metadata.namespace.clone(),
            self.metadata.name.clone(),
            self.metadata.uid.clone(),
            containers,
        )
    }
}

/// Parses a kubelet `PodList` JSON document.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the input is not a valid `PodList` document.
pub fn parse_pod_list(src: &[u8]) -> Result<Vec<PodDescriptor>> {
    let list: PodList = serde_json::from_slice(src).map_err(Error::Decode)?;
    Ok(list.items.iter().map(Pod::to_descriptor).collect())
}
