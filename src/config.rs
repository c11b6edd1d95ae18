use std::ffi::OsString;

/// The root directory of the per-pod log trees written by the kubelet.
pub const DEFAULT_PODS_ROOT: &str = "/var/log/pods";

/// Environment variable overriding [`Config::pods_root`].
pub const PODS_ROOT_ENV: &str = "POD_LOGS_ROOT";
/// Environment variable selecting the notification-based pod discovery.
pub const USE_INOTIFY_ENV: &str = "LOGS_DEV_MODE_USE_INOTIFY";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid value for `{key}`: {value:?}")]
    InvalidValue { key: &'static str, value: OsString },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Settings of a [`Scanner`](crate::scanner::Scanner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pods_root: String,
    use_inotify: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pods_root: DEFAULT_PODS_ROOT.to_owned(),
            use_inotify: false,
        }
    }
}

impl Config {
    pub fn new(pods_root: impl Into<String>, use_inotify: bool) -> Self {
        let mut pods_root = pods_root.into();
        while pods_root.len() > 1 && pods_root.ends_with('/') {
            pods_root.pop();
        }
        Self {
            pods_root,
            use_inotify,
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if a variable is set but cannot be interpreted.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Reads the configuration through the given variable lookup.
    ///
    /// Unset variables fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Result<Self> {
        let pods_root = match lookup(PODS_ROOT_ENV) {
            Some(value) => value.into_string().map_err(|value| Error::InvalidValue {
                key: PODS_ROOT_ENV,
                value,
            })?,
            None => DEFAULT_PODS_ROOT.to_owned(),
        };
        if pods_root.is_empty() {
            return Err(Error::InvalidValue {
                key: PODS_ROOT_ENV,
                value: OsString::new(),
            });
        }

        let use_inotify = match lookup(USE_INOTIFY_ENV) {
            Some(value) => parse_bool(&value).ok_or(Error::InvalidValue {
                key: USE_INOTIFY_ENV,
                value,
            })?,
            None => false,
        };

        let config = Self::new(pods_root, use_inotify);
        log::debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    /// The directory containing one log tree per pod uid.
    pub fn pods_root(&self) -> &str {
        &self.pods_root
    }

    /// Whether the pod watcher should use filesystem notifications instead of polling.
    pub fn use_inotify(&self) -> bool {
        self.use_inotify
    }
}

fn parse_bool(value: &OsString) -> Option<bool> {
    match value.to_str()?.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let vars: HashMap<String, OsString> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(v)))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.pods_root(), "/var/log/pods");
        assert!(!config.use_inotify());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            (PODS_ROOT_ENV, "/host/var/log/pods/"),
            (USE_INOTIFY_ENV, "True"),
        ]))
        .unwrap();
        assert_eq!(config.pods_root(), "/host/var/log/pods");
        assert!(config.use_inotify());
    }

    #[test]
    fn test_invalid_bool() {
        let err = Config::from_lookup(lookup_from(&[(USE_INOTIFY_ENV, "maybe")])).unwrap_err();
        match err {
            Error::InvalidValue { key, value } => {
                assert_eq!(key, USE_INOTIFY_ENV);
                assert_eq!(value, OsString::from("maybe"));
            }
        }
    }

    #[test]
    fn test_empty_pods_root() {
        let err = Config::from_lookup(lookup_from(&[(PODS_ROOT_ENV, "")])).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { key: PODS_ROOT_ENV, .. }));
    }

    #[test]
    fn test_root_slash_is_kept() {
        assert_eq!(Config::new("/", false).pods_root(), "/");
    }
}
