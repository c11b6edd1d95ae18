#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid container id: {0:?}")]
    InvalidContainerID(String),
    #[error("failed to decode kubelet pod list: {0}")]
    Decode(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
