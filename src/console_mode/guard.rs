use super::{read, update, write, ModeFlags, ModeTarget};
use crate::error::Result;
use crate::log_debug;

/// RAII guard that puts a stream's mode back the way it found it.
///
/// Restoration runs on drop, which includes unwinding out of a panic.
pub struct ConsoleModeGuard<T: ModeTarget> {
    target: T,
    saved: ModeFlags,
    armed: bool,
}

impl<T: ModeTarget> ConsoleModeGuard<T> {
    /// Capture the current mode of `target`.
    pub fn acquire(target: T) -> Result<Self> {
        let saved = read(&target)?;
        Ok(Self {
            target,
            saved,
            armed: true,
        })
    }

    pub fn saved(&self) -> ModeFlags {
        self.saved
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// Read-modify-write the live mode; the saved mode is untouched.
    pub fn update(&self, change: impl FnOnce(ModeFlags) -> Result<ModeFlags>) -> Result<ModeFlags> {
        update(&self.target, change)
    }

    /// Put the saved mode back now instead of at drop.
    pub fn restore(&mut self) -> Result<()> {
        self.armed = false;
        write(&self.target, self.saved)
    }

    /// Keep whatever mode is live now.
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl<T: ModeTarget> Drop for ConsoleModeGuard<T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(err) = write(&self.target, self.saved) {
            log_debug(&format!("failed to restore console mode: {err}"));
        }
    }
}
