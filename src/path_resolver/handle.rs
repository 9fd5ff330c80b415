use super::backend;
use super::flags::{FlagsAndAttributes, NameForm, OpenRequest};
use crate::error::{NativeError, Result};
use crate::log_debug;
use std::fmt;
use std::fs::File;
use std::path::Path;

/// An open OS object. Released exactly once, either explicitly or on drop.
///
/// After `release` the wrapper is empty and every further call, a second
/// `release` included, fails with [`NativeError::InvalidHandle`].
pub struct PathHandle {
    file: Option<File>,
    opened_name: Option<String>,
    delete_on_close: bool,
}

impl PathHandle {
    /// Open `path` with the given access, sharing, disposition and flags.
    pub fn open(path: impl AsRef<Path>, request: OpenRequest) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(NativeError::invalid("path is empty"));
        }
        let file = backend::open(path, &request)?;
        let opened_name = backend::opened_name(&file);
        tracing::debug!(
            path = %path.display(),
            disposition = ?request.disposition,
            flags = request.flags.bits(),
            "opened handle"
        );
        Ok(Self {
            file: Some(file),
            opened_name,
            delete_on_close: request
                .flags
                .contains(FlagsAndAttributes::FILE_FLAG_DELETE_ON_CLOSE),
        })
    }

    pub fn is_valid(&self) -> bool {
        self.file.is_some()
    }

    /// Borrow the underlying file for I/O.
    pub fn file(&self) -> Result<&File> {
        self.file.as_ref().ok_or(NativeError::InvalidHandle)
    }

    /// Canonical path of the object, links resolved, in the requested form.
    pub fn final_path(&self, form: NameForm) -> Result<String> {
        let file = self.file()?;
        backend::resolve(file, form, self.opened_name.as_deref())
    }

    /// Close the OS object, reporting close failures.
    pub fn release(&mut self) -> Result<()> {
        let file = self.file.take().ok_or(NativeError::InvalidHandle)?;
        backend::close(file, self.delete_on_close)
    }
}

impl Drop for PathHandle {
    fn drop(&mut self) {
        if self.file.is_none() {
            return;
        }
        if let Err(err) = self.release() {
            log_debug(&format!("implicit handle release failed: {err}"));
        }
    }
}

impl fmt::Debug for PathHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathHandle")
            .field("valid", &self.is_valid())
            .field("opened_name", &self.opened_name)
            .field("delete_on_close", &self.delete_on_close)
            .finish()
    }
}
