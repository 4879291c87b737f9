use std::io;
use std::path::Path;

use thiserror::Error;

use crate::utils::path_must_str;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The op table is internally inconsistent. Only raised while building a
    /// table, a process holding a built table never sees this.
    #[error("invalid op table: {0}")]
    Configuration(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The package inventory could not be read while rebuilding the cache
    #[error("package inventory failed: {0}")]
    Provider(String),

    /// A call forwarded to the app ops authority failed
    #[error("app ops authority failed: {0}")]
    RemoteAuthority(String),

    #[error("operation not supported by this authority: {0}")]
    Unsupported(String),

    #[error("required binary `{0}` not available to context")]
    MissingBin(String),
    #[error("missing required env var: {0}")]
    MissingEnv(String),

    #[error("{0}")]
    IO(io::Error),

    #[error("command failed with status {0}: {1}")]
    CommandError(i32, String),

    #[error("failed to get basedirs")]
    NoBaseDirs,

    #[error("no adb device connected")]
    NoAdbDevice,
    #[error("adb device {0} not found")]
    AdbDeviceNotFound(String),
    #[error("adb disabled by configuration file")]
    AdbDisabled,

    #[error("generic error: {0}")]
    Generic(String),

    #[error("invalid config {0}: {1}")]
    InvalidConfig(String, String),

    #[error("file {0} doesn't exist")]
    MissingFile(String),
}

impl Error {
    pub fn new_cfg<S: ToString + ?Sized>(path: &Path, s: &S) -> Self {
        let as_str = path_must_str(path.as_ref());
        Self::InvalidConfig(as_str.into(), s.to_string())
    }

    /// Wrap any error as a package inventory failure, keeping an error that
    /// already is one as it is
    pub fn into_provider(self) -> Self {
        match self {
            Self::Provider(_) => self,
            other => Self::Provider(other.to_string()),
        }
    }

    /// Wrap any error as an app ops authority failure. `Unsupported` is kept
    /// as is so callers can tell a transport limit from a rejected call.
    pub fn into_remote(self) -> Self {
        match self {
            Self::RemoteAuthority(_) | Self::Unsupported(_) => self,
            other => Self::RemoteAuthority(other.to_string()),
        }
    }

    #[inline]
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider(_))
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for Error {
    fn from(value: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Generic(value.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::IO(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_into_provider() {
        let err = Error::from(io::Error::new(io::ErrorKind::Other, "pipe closed"));
        match err.into_provider() {
            Error::Provider(msg) => assert_eq!(msg, "pipe closed"),
            e => panic!("unexpected {e:?}"),
        }

        match Error::Provider("already".into()).into_provider() {
            Error::Provider(msg) => assert_eq!(msg, "already"),
            e => panic!("unexpected {e:?}"),
        }
    }

    #[test]
    fn test_into_remote_keeps_unsupported() {
        assert!(matches!(
            Error::Unsupported("onStartOp".into()).into_remote(),
            Error::Unsupported(_)
        ));
        assert!(matches!(
            Error::NoAdbDevice.into_remote(),
            Error::RemoteAuthority(_)
        ));
    }
}
