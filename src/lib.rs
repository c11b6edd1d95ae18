//! Pod Log Scanner: keeps one log source per running Kubernetes container registered with
//! a log pipeline.
//!
//! Pods are discovered by a [`watcher::PodWatcher`], tagged by a [`tagger::TagResolver`] and
//! turned into [`source::LogSource`]s, which the [`scanner::Scanner`] hands to a
//! [`registry::SourceRegistry`] as containers come and go.
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeSet;
//! use std::convert::Infallible;
//! use std::sync::Arc;
//!
//! use pod_log_scanner::config::Config;
//! use pod_log_scanner::pod::{ContainerDescriptor, ContainerID, PodDescriptor};
//! use pod_log_scanner::registry::LogSources;
//! use pod_log_scanner::scanner::Scanner;
//! use pod_log_scanner::tagger::TagResolver;
//! use pod_log_scanner::watcher::ChannelWatcher;
//!
//! struct NoTags;
//!
//! impl TagResolver for NoTags {
//!     type Error = Infallible;
//!
//!     async fn tag(&self, _: &ContainerID, _: bool) -> Result<BTreeSet<String>, Infallible> {
//!         Ok(BTreeSet::new())
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (watcher, pods) = ChannelWatcher::new(16);
//! let sources = Arc::new(LogSources::new());
//! let scanner = Scanner::new(
//!     &Config::default(),
//!     |_| Ok::<_, Infallible>(watcher),
//!     Arc::new(NoTags),
//!     Arc::clone(&sources),
//! )?;
//! scanner.start()?;
//!
//! let nginx = ContainerDescriptor::new(ContainerID::new("c1")?, "nginx");
//! pods.added(PodDescriptor::new("default", "web-0", "abc123", vec![nginx]))
//!     .await;
//!
//! scanner.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod pod;
pub mod registry;
pub mod scanner;
pub mod source;
pub mod tagger;
pub mod watcher;
