//! Win32 backend: `CreateFileW` via std's `OpenOptionsExt`, then
//! `GetFinalPathNameByHandleW`.

use super::flags::{CreationDisposition, NameForm, OpenRequest};
use crate::error::{NativeError, Result};
use std::fs::{File, OpenOptions};
use std::os::windows::fs::OpenOptionsExt;
use std::os::windows::io::{AsRawHandle, IntoRawHandle};
use std::path::Path;
use windows_sys::Win32::Foundation::{CloseHandle, HANDLE};
use windows_sys::Win32::Storage::FileSystem::GetFinalPathNameByHandleW;

/// Most final paths fit; longer ones get exactly the size the OS asks for.
const INITIAL_PATH_CAPACITY: usize = 260;

pub(super) fn open(path: &Path, request: &OpenRequest) -> Result<File> {
    if request.disposition == CreationDisposition::TruncateExisting && !request.access.writes() {
        return Err(NativeError::invalid(
            "truncate-existing requires write access",
        ));
    }
    let mut options = OpenOptions::new();
    // std only accepts creation flags with write set; access_mode still decides the rights.
    options
        .write(request.disposition.creates() || request.disposition.truncates())
        .access_mode(request.access.bits())
        .share_mode(request.share.bits())
        .custom_flags(request.flags.bits());
    match request.disposition {
        CreationDisposition::CreateNew => {
            options.create_new(true);
        }
        CreationDisposition::CreateAlways => {
            options.create(true).truncate(true);
        }
        CreationDisposition::OpenExisting => {}
        CreationDisposition::OpenAlways => {
            options.create(true);
        }
        CreationDisposition::TruncateExisting => {
            options.truncate(true);
        }
    }
    Ok(options.open(path)?)
}

/// The OS tracks the opened name itself.
pub(super) fn opened_name(_file: &File) -> Option<String> {
    None
}

pub(super) fn resolve(file: &File, form: NameForm, _opened_name: Option<&str>) -> Result<String> {
    let handle = file.as_raw_handle() as HANDLE;
    let mut buf: Vec<u16> = vec![0; INITIAL_PATH_CAPACITY];
    // One retry: the first failure tells us the exact size needed.
    for _ in 0..2 {
        // SAFETY: buf is valid for buf.len() u16 writes and the handle stays open while `file` is borrowed.
        let len = unsafe {
            GetFinalPathNameByHandleW(handle, buf.as_mut_ptr(), buf.len() as u32, form.bits())
        } as usize;
        if len == 0 {
            return Err(NativeError::last_os_error());
        }
        if len < buf.len() {
            buf.truncate(len);
            return String::from_utf16(&buf)
                .map_err(|_| NativeError::invalid("resolved path is not valid UTF-16"));
        }
        buf.resize(len + 1, 0);
    }
    Err(NativeError::BufferTooSmall)
}

/// Delete-on-close is carried out by the OS when the last handle goes away.
pub(super) fn close(file: File, _delete_on_close: bool) -> Result<()> {
    let handle = file.into_raw_handle() as HANDLE;
    // SAFETY: the handle came from into_raw_handle, so this is its only close.
    if unsafe { CloseHandle(handle) } == 0 {
        return Err(NativeError::last_os_error());
    }
    Ok(())
}
