use crate::error::BoxError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to initialize pod watcher: {0}")]
    WatcherInit(#[source] BoxError),
    #[error("failed to initialize tag resolver: {0}")]
    TaggerInit(#[source] BoxError),
    #[error("pod watcher event streams are no longer available")]
    StreamsUnavailable,
    #[error("scanner must be started from within a tokio runtime: {0}")]
    NoRuntime(#[source] tokio::runtime::TryCurrentError),
    #[error("scanner is already running")]
    AlreadyStarted,
    #[error("scanner was stopped")]
    Stopped,
}

pub type Result<T> = std::result::Result<T, Error>;
