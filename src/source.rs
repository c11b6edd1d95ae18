//! Log source descriptors and their construction from pod snapshots.
use std::collections::BTreeSet;
use std::fmt;

use crate::config::Config;
use crate::pod::{ContainerDescriptor, PodDescriptor};

/// The integration name used as source and service of every container log source.
pub const KUBERNETES_INTEGRATION: &str = "kubernetes";

/// How a log source is ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Tail files matching the source path pattern.
    File,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::File => "file",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes where and how to collect the logs of one container.
///
/// A source is never modified after construction. A changed container gets a new source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSource {
    name: String,
    path: String,
    kind: SourceKind,
    source: &'static str,
    service: &'static str,
    tags: BTreeSet<String>,
}

impl LogSource {
    /// `{namespace}/{pod name}/{container name}`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Glob pattern of the log files to ingest.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn source(&self) -> &str {
        self.source
    }

    pub fn service(&self) -> &str {
        self.service
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }
}

/// Builds [`LogSource`]s for the containers of a pod.
#[derive(Debug, Clone)]
pub struct SourceBuilder {
    pods_root: String,
}

impl SourceBuilder {
    /// Creates a builder placing source paths below the configured pods root.
    pub fn new(config: &Config) -> Self {
        Self {
            pods_root: config.pods_root().to_owned(),
        }
    }

    /// Builds the log source of `container` running in `pod`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::collections::BTreeSet;
    /// # use pod_log_scanner::config::Config;
    /// # use pod_log_scanner::pod::{ContainerDescriptor, ContainerID, PodDescriptor};
    /// # use pod_log_scanner::source::SourceBuilder;
    /// let nginx = ContainerDescriptor::new(ContainerID::new("c1").unwrap(), "nginx");
    /// let pod = PodDescriptor::new("default", "web-0", "abc123", vec![nginx.clone()]);
    ///
    /// let source = SourceBuilder::new(&Config::default()).build(&pod, &nginx, BTreeSet::new());
    /// assert_eq!(source.name(), "default/web-0/nginx");
    /// assert_eq!(source.path(), "/var/log/pods/abc123/nginx/*.log");
    /// ```
    pub fn build(
        &self,
        pod: &PodDescriptor,
        container: &ContainerDescriptor,
        tags: BTreeSet<String>,
    ) -> LogSource {
        LogSource {
            name: self.source_name(pod, container),
            path: self.source_path(pod, container),
            kind: SourceKind::File,
            source: KUBERNETES_INTEGRATION,
            service: KUBERNETES_INTEGRATION,
            tags,
        }
    }

    fn source_name(&self, pod: &PodDescriptor, container: &ContainerDescriptor) -> String {
        format!("{}/{}/{}", pod.namespace(), pod.name(), container.name())
    }

    fn source_path(&self, pod: &PodDescriptor, container: &ContainerDescriptor) -> String {
        let root = if self.pods_root == "/" {
            ""
        } else {
            self.pods_root.as_str()
        };
        format!("{}/{}/{}/*.log", root, pod.uid(), container.name())
    }
}
