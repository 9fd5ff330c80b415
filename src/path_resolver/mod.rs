//! Opens a path and reports the canonical path behind it, following links,
//! junctions and substitutions.
//!
//! One open, one query, one close per lookup: nothing is cached between calls.

mod flags;
mod handle;

#[cfg(unix)]
#[path = "unix.rs"]
mod backend;
#[cfg(windows)]
#[path = "windows.rs"]
mod backend;

pub use flags::{
    CreationDisposition, DesiredAccess, FlagsAndAttributes, NameForm, OpenRequest, ShareMode,
    VolumeName,
};
pub use handle::PathHandle;

use crate::error::Result;
use std::path::Path;

/// Acquire a handle to the object at `path`.
pub fn open(path: impl AsRef<Path>, request: OpenRequest) -> Result<PathHandle> {
    PathHandle::open(path, request)
}

/// Resolve the final path behind an open handle.
pub fn resolve_final_path(handle: &PathHandle, form: NameForm) -> Result<String> {
    handle.final_path(form)
}

/// Release a handle. A second release reports `InvalidHandle`.
pub fn release(handle: &mut PathHandle) -> Result<()> {
    handle.release()
}

/// Query-only open of `path`, resolve, release.
pub fn final_path(path: impl AsRef<Path>, form: NameForm) -> Result<String> {
    final_path_with(path, form, OpenRequest::query())
}

/// Same as [`final_path`] with a caller-chosen open request.
pub fn final_path_with(
    path: impl AsRef<Path>,
    form: NameForm,
    request: OpenRequest,
) -> Result<String> {
    let mut handle = PathHandle::open(path, request)?;
    let resolved = handle.final_path(form);
    let released = handle.release();
    let resolved = resolved?;
    released?;
    Ok(resolved)
}
