//! POSIX backend: `open(2)` with Win32-style dispositions, `/proc/self/fd`
//! (or `F_GETPATH`) for the final name.

use super::flags::{CreationDisposition, FlagsAndAttributes, NameForm, OpenRequest, VolumeName};
use crate::error::{NativeError, Result};
use crate::log_debug;
use std::ffi::CString;
use std::fs::{self, File};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::MetadataExt;
use std::os::unix::io::{AsRawFd, FromRawFd, IntoRawFd, RawFd};
use std::path::{Path, PathBuf};

const CREATE_MODE: libc::c_uint = 0o666;
const CREATE_MODE_READONLY: libc::c_uint = 0o444;

pub(super) fn open(path: &Path, request: &OpenRequest) -> Result<File> {
    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        NativeError::invalid(format!("path contains NUL byte: {}", path.display()))
    })?;
    let oflag = open_flags(request)?;
    let mode = if request
        .flags
        .contains(FlagsAndAttributes::FILE_ATTRIBUTE_READONLY)
    {
        CREATE_MODE_READONLY
    } else {
        CREATE_MODE
    };

    // SAFETY: c_path is NUL-terminated and outlives the call; open does not keep the pointer.
    let fd = unsafe { libc::open(c_path.as_ptr(), oflag, mode) };
    if fd < 0 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ELOOP) && oflag & libc::O_NOFOLLOW != 0 {
            return Err(NativeError::invalid(format!(
                "link {} cannot be opened for data access, open it without read or write access",
                path.display()
            )));
        }
        return Err(err.into());
    }
    // SAFETY: fd was just returned by open and has no other owner.
    let file = unsafe { File::from_raw_fd(fd) };

    if !request
        .flags
        .contains(FlagsAndAttributes::FILE_FLAG_BACKUP_SEMANTICS)
        && file.metadata()?.is_dir()
    {
        return Err(NativeError::AccessDenied);
    }
    apply_access_hints(&file, request.flags);
    Ok(file)
}

pub(super) fn open_flags(request: &OpenRequest) -> Result<libc::c_int> {
    let access = request.access;
    let disposition = request.disposition;
    if disposition == CreationDisposition::TruncateExisting && !access.writes() {
        return Err(NativeError::invalid(
            "truncate-existing requires write access",
        ));
    }
    if request
        .flags
        .contains(FlagsAndAttributes::FILE_FLAG_OVERLAPPED)
    {
        return Err(NativeError::invalid(
            "overlapped I/O is not supported on this platform",
        ));
    }

    let mut oflag = libc::O_CLOEXEC;
    oflag |= match (access.reads(), access.writes()) {
        (true, true) => libc::O_RDWR,
        (false, true) => libc::O_WRONLY,
        (true, false) => libc::O_RDONLY,
        (false, false) => query_only_flag(disposition),
    };
    oflag |= match disposition {
        CreationDisposition::CreateNew => libc::O_CREAT | libc::O_EXCL,
        CreationDisposition::CreateAlways => libc::O_CREAT | libc::O_TRUNC,
        CreationDisposition::OpenExisting => 0,
        CreationDisposition::OpenAlways => libc::O_CREAT,
        CreationDisposition::TruncateExisting => libc::O_TRUNC,
    };
    if request
        .flags
        .contains(FlagsAndAttributes::FILE_FLAG_OPEN_REPARSE_POINT)
    {
        oflag |= libc::O_NOFOLLOW;
    }
    if request
        .flags
        .contains(FlagsAndAttributes::FILE_FLAG_WRITE_THROUGH)
    {
        oflag |= libc::O_SYNC;
    }
    #[cfg(target_os = "linux")]
    if request
        .flags
        .contains(FlagsAndAttributes::FILE_FLAG_NO_BUFFERING)
    {
        oflag |= libc::O_DIRECT;
    }
    Ok(oflag)
}

/// Handles with no data access only need a path reference where the OS has one.
#[cfg(target_os = "linux")]
fn query_only_flag(disposition: CreationDisposition) -> libc::c_int {
    if disposition.creates() || disposition.truncates() {
        libc::O_RDONLY
    } else {
        libc::O_PATH
    }
}

#[cfg(not(target_os = "linux"))]
fn query_only_flag(_disposition: CreationDisposition) -> libc::c_int {
    libc::O_RDONLY
}

#[cfg(target_os = "linux")]
fn apply_access_hints(file: &File, flags: FlagsAndAttributes) {
    let advice = if flags.contains(FlagsAndAttributes::FILE_FLAG_SEQUENTIAL_SCAN) {
        libc::POSIX_FADV_SEQUENTIAL
    } else if flags.contains(FlagsAndAttributes::FILE_FLAG_RANDOM_ACCESS) {
        libc::POSIX_FADV_RANDOM
    } else {
        return;
    };
    // SAFETY: the fd is owned by `file` for the duration of the call.
    let rc = unsafe { libc::posix_fadvise(file.as_raw_fd(), 0, 0, advice) };
    if rc != 0 {
        log_debug(&format!(
            "posix_fadvise hint ignored: {}",
            std::io::Error::from_raw_os_error(rc)
        ));
    }
}

#[cfg(not(target_os = "linux"))]
fn apply_access_hints(_file: &File, _flags: FlagsAndAttributes) {}

/// Name captured at open time; FILE_NAME_OPENED answers from it after renames.
pub(super) fn opened_name(file: &File) -> Option<String> {
    current_name(file).ok()
}

pub(super) fn resolve(file: &File, form: NameForm, opened_name: Option<&str>) -> Result<String> {
    match form.volume {
        VolumeName::Dos | VolumeName::None => {}
        VolumeName::Guid | VolumeName::Nt => {
            return Err(NativeError::invalid(format!(
                "{:?} volume names are not available on this platform",
                form.volume
            )));
        }
    }
    if form.opened {
        return opened_name
            .map(str::to_owned)
            .ok_or(NativeError::NotFound);
    }
    current_name(file)
}

pub(super) fn current_name(file: &File) -> Result<String> {
    if file.metadata()?.nlink() == 0 {
        return Err(NativeError::NotFound);
    }
    fd_path(file.as_raw_fd())?
        .into_os_string()
        .into_string()
        .map_err(|_| NativeError::invalid("resolved path is not valid UTF-8"))
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn fd_path(fd: RawFd) -> Result<PathBuf> {
    Ok(fs::read_link(format!("/proc/self/fd/{fd}"))?)
}

#[cfg(any(target_os = "macos", target_os = "ios"))]
fn fd_path(fd: RawFd) -> Result<PathBuf> {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;

    let mut buf = vec![0u8; libc::PATH_MAX as usize];
    // SAFETY: F_GETPATH writes at most PATH_MAX bytes into buf, which is that long.
    if unsafe { libc::fcntl(fd, libc::F_GETPATH, buf.as_mut_ptr()) } == -1 {
        return Err(NativeError::last_os_error());
    }
    let len = buf
        .iter()
        .position(|&b| b == 0)
        .ok_or(NativeError::BufferTooSmall)?;
    buf.truncate(len);
    Ok(PathBuf::from(OsString::from_vec(buf)))
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios"
)))]
fn fd_path(_fd: RawFd) -> Result<PathBuf> {
    Err(NativeError::OsFailure {
        code: libc::ENOSYS,
        message: "final path lookup is not supported on this platform".to_string(),
    })
}

/// Close the descriptor, unlinking the object first when it was opened delete-on-close.
pub(super) fn close(file: File, delete_on_close: bool) -> Result<()> {
    let doomed = if delete_on_close {
        current_name(&file).ok()
    } else {
        None
    };
    let fd = file.into_raw_fd();
    // SAFETY: fd came from into_raw_fd, so nothing else will close it.
    let rc = unsafe { libc::close(fd) };
    let closed = if rc != 0 {
        Err(NativeError::last_os_error())
    } else {
        Ok(())
    };
    if let Some(path) = doomed {
        let removed = if Path::new(&path).is_dir() {
            fs::remove_dir(&path)
        } else {
            fs::remove_file(&path)
        };
        match removed {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => log_debug(&format!("delete-on-close failed for {path}: {err}")),
        }
    }
    closed
}
