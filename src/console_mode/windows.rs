use super::flags::{ModeFlags, StdStream};
use crate::error::{NativeError, Result};
use windows_sys::Win32::Foundation::{HANDLE, INVALID_HANDLE_VALUE};
use windows_sys::Win32::System::Console::{
    GetConsoleMode, GetStdHandle, SetConsoleMode, CONSOLE_MODE, STD_ERROR_HANDLE,
    STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
};

/// Looked up per call so redirections made after startup are honored.
fn std_handle(stream: StdStream) -> Result<HANDLE> {
    let id = match stream {
        StdStream::Input => STD_INPUT_HANDLE,
        StdStream::Output => STD_OUTPUT_HANDLE,
        StdStream::Error => STD_ERROR_HANDLE,
    };
    // SAFETY: GetStdHandle only reads process parameters.
    let handle = unsafe { GetStdHandle(id) };
    if handle == INVALID_HANDLE_VALUE {
        return Err(NativeError::last_os_error());
    }
    if handle.is_null() {
        return Err(NativeError::NoConsole);
    }
    Ok(handle)
}

fn console_mode(handle: HANDLE) -> Result<CONSOLE_MODE> {
    let mut mode: CONSOLE_MODE = 0;
    // SAFETY: mode is a valid out pointer for the duration of the call.
    if unsafe { GetConsoleMode(handle, &mut mode) } == 0 {
        // Files and pipes fail here; there is no console behind them.
        return Err(NativeError::NoConsole);
    }
    Ok(mode)
}

pub(super) fn get_mode(stream: StdStream) -> Result<ModeFlags> {
    let mode = console_mode(std_handle(stream)?)?;
    Ok(ModeFlags::from_bits(stream.direction(), mode))
}

pub(super) fn set_mode(stream: StdStream, flags: ModeFlags) -> Result<()> {
    let handle = std_handle(stream)?;
    console_mode(handle)?;
    // SAFETY: handle is a live console handle per the check above.
    if unsafe { SetConsoleMode(handle, flags.bits()) } == 0 {
        return Err(match NativeError::last_os_error() {
            NativeError::InvalidHandle => NativeError::NoConsole,
            other => other,
        });
    }
    Ok(())
}
