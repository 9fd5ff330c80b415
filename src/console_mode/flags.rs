use crate::error::{NativeError, Result};
use bitflags::bitflags;
use clap::ValueEnum;
use std::fmt;

bitflags! {
    /// Line discipline of a terminal input stream, bit-compatible with Win32.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InputModeFlags: u32 {
        /// Control keys are handled by the system (signals on Unix).
        const ENABLE_PROCESSED_INPUT = 0x001;
        /// Reads return only when a full line is available.
        const ENABLE_LINE_INPUT = 0x002;
        const ENABLE_ECHO_INPUT = 0x004;
        const ENABLE_WINDOW_INPUT = 0x008;
        const ENABLE_MOUSE_INPUT = 0x010;
        const ENABLE_INSERT_MODE = 0x020;
        const ENABLE_QUICK_EDIT_MODE = 0x040;
        const ENABLE_EXTENDED_FLAGS = 0x080;
        const ENABLE_AUTO_POSITION = 0x100;
        /// Keys arrive as VT escape sequences.
        const ENABLE_VIRTUAL_TERMINAL_INPUT = 0x200;
    }
}

bitflags! {
    /// Output processing of a terminal stream, bit-compatible with Win32.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OutputModeFlags: u32 {
        const ENABLE_PROCESSED_OUTPUT = 0x01;
        const ENABLE_WRAP_AT_EOL_OUTPUT = 0x02;
        /// Escape sequences are interpreted rather than printed.
        const ENABLE_VIRTUAL_TERMINAL_PROCESSING = 0x04;
        /// LF moves down without returning the cursor.
        const DISABLE_NEWLINE_AUTO_RETURN = 0x08;
        const ENABLE_LVB_GRID_WORLDWIDE = 0x10;
    }
}

/// Which flag set a stream uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

/// Logical standard stream, looked up afresh on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum StdStream {
    Input,
    Output,
    Error,
}

impl StdStream {
    pub fn direction(self) -> Direction {
        match self {
            StdStream::Input => Direction::Input,
            StdStream::Output | StdStream::Error => Direction::Output,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StdStream::Input => "stdin",
            StdStream::Output => "stdout",
            StdStream::Error => "stderr",
        }
    }
}

/// Mode bitset of one stream. Input streams carry input flags, the rest output flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeFlags {
    Input(InputModeFlags),
    Output(OutputModeFlags),
}

impl ModeFlags {
    /// Wrap raw bits, keeping bits this crate has no name for.
    pub fn from_bits(direction: Direction, bits: u32) -> Self {
        match direction {
            Direction::Input => ModeFlags::Input(InputModeFlags::from_bits_retain(bits)),
            Direction::Output => ModeFlags::Output(OutputModeFlags::from_bits_retain(bits)),
        }
    }

    pub fn empty(direction: Direction) -> Self {
        Self::from_bits(direction, 0)
    }

    pub fn bits(self) -> u32 {
        match self {
            ModeFlags::Input(flags) => flags.bits(),
            ModeFlags::Output(flags) => flags.bits(),
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            ModeFlags::Input(_) => Direction::Input,
            ModeFlags::Output(_) => Direction::Output,
        }
    }

    pub fn contains(self, other: ModeFlags) -> bool {
        self.direction() == other.direction() && self.bits() & other.bits() == other.bits()
    }

    /// `self` with every bit of `other` set.
    pub fn union(self, other: ModeFlags) -> Result<Self> {
        self.ensure_same_direction(other)?;
        Ok(Self::from_bits(self.direction(), self.bits() | other.bits()))
    }

    /// `self` with every bit of `other` cleared.
    pub fn difference(self, other: ModeFlags) -> Result<Self> {
        self.ensure_same_direction(other)?;
        Ok(Self::from_bits(self.direction(), self.bits() & !other.bits()))
    }

    /// Names of the set flags, plus a hex remainder for unnamed bits.
    pub fn names(self) -> Vec<String> {
        let (mut names, remainder): (Vec<String>, u32) = match self {
            ModeFlags::Input(flags) => (
                flags.iter_names().map(|(name, _)| name.to_string()).collect(),
                flags.bits() & !InputModeFlags::all().bits(),
            ),
            ModeFlags::Output(flags) => (
                flags.iter_names().map(|(name, _)| name.to_string()).collect(),
                flags.bits() & !OutputModeFlags::all().bits(),
            ),
        };
        if remainder != 0 {
            names.push(format!("{remainder:#x}"));
        }
        names
    }

    /// Parse `0x1f7`, `503`, or names joined by `|`, `,` or `+`.
    ///
    /// Names match case-insensitively and may omit the `ENABLE_` prefix.
    pub fn parse(direction: Direction, text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NativeError::invalid("empty flag set"));
        }
        if let Some(bits) = parse_number(text) {
            return Ok(Self::from_bits(direction, bits));
        }
        let mut bits = 0u32;
        for token in text
            .split(['|', ',', '+'])
            .map(str::trim)
            .filter(|token| !token.is_empty())
        {
            bits |= lookup_name(direction, token).ok_or_else(|| {
                NativeError::invalid(format!(
                    "unknown {} mode flag '{token}'",
                    direction_label(direction)
                ))
            })?;
        }
        Ok(Self::from_bits(direction, bits))
    }

    fn ensure_same_direction(self, other: ModeFlags) -> Result<()> {
        if self.direction() != other.direction() {
            return Err(NativeError::invalid(format!(
                "cannot combine {} flags with {} flags",
                direction_label(self.direction()),
                direction_label(other.direction())
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ModeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.names();
        if names.is_empty() {
            write!(f, "{:#06x}", self.bits())
        } else {
            write!(f, "{:#06x} ({})", self.bits(), names.join(" | "))
        }
    }
}

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Input => "input",
        Direction::Output => "output",
    }
}

fn parse_number(text: &str) -> Option<u32> {
    if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        return u32::from_str_radix(hex, 16).ok();
    }
    text.parse().ok()
}

fn lookup_name(direction: Direction, token: &str) -> Option<u32> {
    let upper = token.to_ascii_uppercase();
    let prefixed = format!("ENABLE_{upper}");
    let candidates = [upper.as_str(), prefixed.as_str()];
    candidates.iter().find_map(|name| match direction {
        Direction::Input => InputModeFlags::from_name(name).map(|flag| flag.bits()),
        Direction::Output => OutputModeFlags::from_name(name).map(|flag| flag.bits()),
    })
}
