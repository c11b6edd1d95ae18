//! Pod and container snapshots as delivered by a pod watcher.
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

mod error;
pub mod kubelet;

pub use error::{Error, Result};

/// The maximum allowed length for a [`ContainerID`].
const CONTAINER_ID_MAX_LEN: usize = 255;

/// A validated, node-unique container identifier.
///
/// Cloning is cheap, the underlying string is shared.
///
/// # Examples
///
/// ```
/// # use pod_log_scanner::pod::ContainerID;
/// let container_id = ContainerID::new("docker://4f1c2a").unwrap();
/// assert_eq!(container_id.as_ref(), "docker://4f1c2a");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerID(Arc<str>);

impl ContainerID {
    /// Creates a new `ContainerID` from the given raw id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContainerID`] if the input is empty or its length exceeds
    /// [`CONTAINER_ID_MAX_LEN`].
    pub fn new(src: impl AsRef<str>) -> Result<Self> {
        let src = src.as_ref();
        if src.is_empty() || src.len() > CONTAINER_ID_MAX_LEN {
            return Err(Error::InvalidContainerID(src.to_owned()));
        }

        Ok(Self(src.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ContainerID {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ContainerID {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ContainerID {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single container of a pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDescriptor {
    id: ContainerID,
    name: String,
}

impl ContainerDescriptor {
    pub fn new(id: ContainerID, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// The node-unique identifier of the container.
    pub fn id(&self) -> &ContainerID {
        &self.id
    }

    /// The name of the container, unique within its pod.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// An immutable snapshot of a pod and its containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodDescriptor {
    namespace: String,
    name: String,
    uid: String,
    containers: Vec<ContainerDescriptor>,
}

impl PodDescriptor {
    /// Constructs a [`PodDescriptor`].
    ///
    /// # Arguments
    ///
    /// * `namespace` - The namespace the pod is scheduled in.
    /// * `name` - The pod name.
    /// * `uid` - The identifier of this pod instance, stable for its lifetime.
    /// * `containers` - The containers of the pod, in the order reported by the watcher.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pod_log_scanner::pod::{ContainerDescriptor, ContainerID, PodDescriptor};
    /// let nginx = ContainerDescriptor::new(ContainerID::new("c1").unwrap(), "nginx");
    /// let pod = PodDescriptor::new("default", "web-0", "abc123", vec![nginx]);
    /// assert_eq!(pod.containers().len(), 1);
    /// ```
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        uid: impl Into<String>,
        containers: Vec<ContainerDescriptor>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            uid: uid.into(),
            containers,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn containers(&self) -> &[ContainerDescriptor] {
        &self.containers
    }
}
