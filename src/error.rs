//! Error taxonomy shared by the path resolver and the console mode controller.

use std::io;
use thiserror::Error;

/// Failure reported by a native facility call.
///
/// None of these are retried: they describe absence, permission, or the
/// process environment, never contention.
#[derive(Debug, Error)]
pub enum NativeError {
    /// The object does not exist and the request required it to.
    #[error("not found")]
    NotFound,

    /// The object exists and the request forbade it.
    #[error("already exists")]
    AlreadyExists,

    /// The caller lacks permission, or the object type is not openable this way.
    #[error("access denied")]
    AccessDenied,

    /// Malformed input or a flag combination the OS rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The handle was released already or never referred to an open object.
    #[error("invalid handle")]
    InvalidHandle,

    /// The OS kept asking for a larger buffer than it reported.
    #[error("buffer too small")]
    BufferTooSmall,

    /// The stream is not attached to an interactive terminal.
    #[error("no console attached to stream")]
    NoConsole,

    /// Anything not classified above, with the raw platform code.
    #[error("os failure (code {code}): {message}")]
    OsFailure { code: i32, message: String },
}

/// Result type for native facility calls.
pub type Result<T> = std::result::Result<T, NativeError>;

impl NativeError {
    pub(crate) fn invalid(detail: impl Into<String>) -> Self {
        NativeError::InvalidArgument(detail.into())
    }

    /// Classify the calling thread's last OS error.
    pub(crate) fn last_os_error() -> Self {
        Self::from(io::Error::last_os_error())
    }

    /// True for the conditions a caller is expected to recover from.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, NativeError::NoConsole | NativeError::NotFound)
    }
}

impl From<io::Error> for NativeError {
    fn from(err: io::Error) -> Self {
        match err.raw_os_error() {
            Some(code) => classify_os_error(code, &err),
            None => match err.kind() {
                io::ErrorKind::NotFound => NativeError::NotFound,
                io::ErrorKind::AlreadyExists => NativeError::AlreadyExists,
                io::ErrorKind::PermissionDenied => NativeError::AccessDenied,
                io::ErrorKind::InvalidInput => NativeError::InvalidArgument(err.to_string()),
                _ => NativeError::OsFailure {
                    code: -1,
                    message: err.to_string(),
                },
            },
        }
    }
}

#[cfg(unix)]
pub(crate) fn classify_os_error(code: i32, err: &io::Error) -> NativeError {
    match code {
        libc::ENOENT | libc::ENOTDIR => NativeError::NotFound,
        libc::EEXIST => NativeError::AlreadyExists,
        libc::EACCES | libc::EPERM | libc::EROFS | libc::EISDIR => NativeError::AccessDenied,
        libc::EINVAL | libc::ENAMETOOLONG | libc::ELOOP => {
            NativeError::InvalidArgument(err.to_string())
        }
        libc::EBADF => NativeError::InvalidHandle,
        libc::ERANGE => NativeError::BufferTooSmall,
        libc::ENOTTY => NativeError::NoConsole,
        _ => NativeError::OsFailure {
            code,
            message: err.to_string(),
        },
    }
}

#[cfg(windows)]
pub(crate) fn classify_os_error(code: i32, err: &io::Error) -> NativeError {
    use windows_sys::Win32::Foundation::{
        ERROR_ACCESS_DENIED, ERROR_ALREADY_EXISTS, ERROR_BAD_PATHNAME, ERROR_FILE_EXISTS,
        ERROR_FILE_NOT_FOUND, ERROR_INSUFFICIENT_BUFFER, ERROR_INVALID_HANDLE,
        ERROR_INVALID_NAME, ERROR_INVALID_PARAMETER, ERROR_PATH_NOT_FOUND,
        ERROR_SHARING_VIOLATION,
    };

    match code as u32 {
        ERROR_FILE_NOT_FOUND | ERROR_PATH_NOT_FOUND => NativeError::NotFound,
        ERROR_FILE_EXISTS | ERROR_ALREADY_EXISTS => NativeError::AlreadyExists,
        ERROR_ACCESS_DENIED | ERROR_SHARING_VIOLATION => NativeError::AccessDenied,
        ERROR_INVALID_PARAMETER | ERROR_INVALID_NAME | ERROR_BAD_PATHNAME => {
            NativeError::InvalidArgument(err.to_string())
        }
        ERROR_INVALID_HANDLE => NativeError::InvalidHandle,
        ERROR_INSUFFICIENT_BUFFER => NativeError::BufferTooSmall,
        _ => NativeError::OsFailure {
            code,
            message: err.to_string(),
        },
    }
}
