//! Read and replace the line-discipline / terminal-processing flags of the
//! standard streams.
//!
//! `set_mode` replaces the whole bitset; there is no atomic bit toggle in the
//! underlying primitive, so [`enable`] and [`disable`] do the read-modify-write.

mod flags;
mod guard;

#[cfg(unix)]
#[path = "unix.rs"]
mod backend;
#[cfg(windows)]
#[path = "windows.rs"]
mod backend;

pub use flags::{Direction, InputModeFlags, ModeFlags, OutputModeFlags, StdStream};
pub use guard::ConsoleModeGuard;

use crate::error::{NativeError, Result};

/// Something whose terminal mode can be read and replaced.
pub trait ModeTarget {
    fn direction(&self) -> Direction;
    fn read_mode(&self) -> Result<ModeFlags>;
    fn write_mode(&self, flags: ModeFlags) -> Result<()>;
}

impl ModeTarget for StdStream {
    fn direction(&self) -> Direction {
        StdStream::direction(*self)
    }

    fn read_mode(&self) -> Result<ModeFlags> {
        backend::get_mode(*self)
    }

    fn write_mode(&self, flags: ModeFlags) -> Result<()> {
        backend::set_mode(*self, flags)
    }
}

/// A terminal file descriptor other than the standard streams, such as a pty.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalFd {
    fd: std::os::unix::io::RawFd,
    direction: Direction,
}

#[cfg(unix)]
impl TerminalFd {
    pub fn new(fd: std::os::unix::io::RawFd, direction: Direction) -> Self {
        Self { fd, direction }
    }
}

#[cfg(unix)]
impl ModeTarget for TerminalFd {
    fn direction(&self) -> Direction {
        self.direction
    }

    fn read_mode(&self) -> Result<ModeFlags> {
        backend::get_mode_fd(self.fd, self.direction)
    }

    fn write_mode(&self, flags: ModeFlags) -> Result<()> {
        backend::set_mode_fd(self.fd, flags)
    }
}

/// Current mode of `stream`. `NoConsole` when it is not a terminal.
pub fn get_mode(stream: StdStream) -> Result<ModeFlags> {
    read(&stream)
}

/// Replace the whole mode of `stream` with `flags`.
pub fn set_mode(stream: StdStream, flags: ModeFlags) -> Result<()> {
    write(&stream, flags)
}

pub fn read(target: &impl ModeTarget) -> Result<ModeFlags> {
    let mode = target.read_mode()?;
    tracing::trace!(mode = mode.bits(), "read console mode");
    Ok(mode)
}

pub fn write(target: &impl ModeTarget, flags: ModeFlags) -> Result<()> {
    if flags.direction() != target.direction() {
        return Err(NativeError::invalid(format!(
            "{:?} flags do not apply to a {:?} stream",
            flags.direction(),
            target.direction()
        )));
    }
    target.write_mode(flags)?;
    tracing::debug!(mode = flags.bits(), "replaced console mode");
    Ok(())
}

/// Set `flags` on top of the current mode; returns the resulting mode.
pub fn enable(target: &impl ModeTarget, flags: ModeFlags) -> Result<ModeFlags> {
    update(target, |current| current.union(flags))
}

/// Clear `flags` from the current mode; returns the resulting mode.
pub fn disable(target: &impl ModeTarget, flags: ModeFlags) -> Result<ModeFlags> {
    update(target, |current| current.difference(flags))
}

pub(crate) fn update(
    target: &impl ModeTarget,
    change: impl FnOnce(ModeFlags) -> Result<ModeFlags>,
) -> Result<ModeFlags> {
    let current = read(target)?;
    let next = change(current)?;
    if next != current {
        write(target, next)?;
    }
    Ok(next)
}
