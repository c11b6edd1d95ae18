/// A boxed error returned by external collaborators, e.g., a failing watcher factory.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub trait ResultOkLogExt<T, E> {
    /// Converts the result into an [`Option`], logging the error at `level`.
    fn ok_log(self, level: log::Level) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self, level: log::Level) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::log!(level, "{err}");
                None
            }
        }
    }
}
