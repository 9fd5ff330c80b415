//! termios backend. Only the bits with a termios counterpart can change;
//! the rest describe fixed properties of a Unix terminal.

use super::flags::{Direction, InputModeFlags, ModeFlags, OutputModeFlags, StdStream};
use crate::error::{NativeError, Result};
use std::mem;
use std::os::unix::io::RawFd;

const INPUT_LFLAGS: [(InputModeFlags, libc::tcflag_t); 3] = [
    (InputModeFlags::ENABLE_PROCESSED_INPUT, libc::ISIG),
    (InputModeFlags::ENABLE_LINE_INPUT, libc::ICANON),
    (InputModeFlags::ENABLE_ECHO_INPUT, libc::ECHO),
];

/// Terminals always hand keys over as VT sequences.
const INPUT_FIXED: InputModeFlags = InputModeFlags::ENABLE_VIRTUAL_TERMINAL_INPUT;

/// `(flag, oflag bit, flag is set when the bit is clear)`
const OUTPUT_OFLAGS: [(OutputModeFlags, libc::tcflag_t, bool); 2] = [
    (OutputModeFlags::ENABLE_PROCESSED_OUTPUT, libc::OPOST, false),
    (OutputModeFlags::DISABLE_NEWLINE_AUTO_RETURN, libc::ONLCR, true),
];

const OUTPUT_FIXED: OutputModeFlags = OutputModeFlags::ENABLE_WRAP_AT_EOL_OUTPUT
    .union(OutputModeFlags::ENABLE_VIRTUAL_TERMINAL_PROCESSING);

pub(super) fn std_fd(stream: StdStream) -> RawFd {
    match stream {
        StdStream::Input => libc::STDIN_FILENO,
        StdStream::Output => libc::STDOUT_FILENO,
        StdStream::Error => libc::STDERR_FILENO,
    }
}

pub(super) fn get_mode(stream: StdStream) -> Result<ModeFlags> {
    get_mode_fd(std_fd(stream), stream.direction())
}

pub(super) fn set_mode(stream: StdStream, flags: ModeFlags) -> Result<()> {
    set_mode_fd(std_fd(stream), flags)
}

pub(super) fn get_mode_fd(fd: RawFd, direction: Direction) -> Result<ModeFlags> {
    let termios = read_termios(fd)?;
    Ok(match direction {
        Direction::Input => ModeFlags::Input(input_from_termios(&termios)),
        Direction::Output => ModeFlags::Output(output_from_termios(&termios)),
    })
}

pub(super) fn set_mode_fd(fd: RawFd, flags: ModeFlags) -> Result<()> {
    let mut termios = read_termios(fd)?;
    match flags {
        ModeFlags::Input(flags) => apply_input(&mut termios, flags)?,
        ModeFlags::Output(flags) => apply_output(&mut termios, flags)?,
    }
    // SAFETY: termios was filled by tcgetattr and only has flag bits changed.
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) } != 0 {
        return Err(console_error(NativeError::last_os_error()));
    }
    Ok(())
}

fn read_termios(fd: RawFd) -> Result<libc::termios> {
    // SAFETY: libc::termios is a plain C struct; zeroed is a valid baseline.
    let mut termios: libc::termios = unsafe { mem::zeroed() };
    // SAFETY: tcgetattr only writes into the termios we pass.
    if unsafe { libc::tcgetattr(fd, &mut termios) } != 0 {
        return Err(console_error(NativeError::last_os_error()));
    }
    Ok(termios)
}

/// Closed descriptors and non-terminals both mean there is no console to talk to.
fn console_error(err: NativeError) -> NativeError {
    match err {
        NativeError::InvalidHandle | NativeError::NoConsole => NativeError::NoConsole,
        other => other,
    }
}

fn input_from_termios(termios: &libc::termios) -> InputModeFlags {
    INPUT_LFLAGS
        .iter()
        .filter(|(_, bit)| termios.c_lflag & bit != 0)
        .fold(INPUT_FIXED, |acc, (flag, _)| acc | *flag)
}

fn output_from_termios(termios: &libc::termios) -> OutputModeFlags {
    OUTPUT_OFLAGS
        .iter()
        .filter(|(_, bit, inverted)| (termios.c_oflag & bit != 0) != *inverted)
        .fold(OUTPUT_FIXED, |acc, (flag, _, _)| acc | *flag)
}

fn apply_input(termios: &mut libc::termios, flags: InputModeFlags) -> Result<()> {
    let mapped = INPUT_LFLAGS
        .iter()
        .fold(InputModeFlags::empty(), |acc, (flag, _)| acc | *flag);
    let fixed = InputModeFlags::from_bits_retain(flags.bits() & !mapped.bits());
    if fixed != INPUT_FIXED {
        return Err(NativeError::invalid(format!(
            "input mode bits {:#x} cannot change on this platform",
            (fixed ^ INPUT_FIXED).bits()
        )));
    }
    for (flag, bit) in INPUT_LFLAGS {
        if flags.contains(flag) {
            termios.c_lflag |= bit;
        } else {
            termios.c_lflag &= !bit;
        }
    }
    Ok(())
}

fn apply_output(termios: &mut libc::termios, flags: OutputModeFlags) -> Result<()> {
    let mapped = OUTPUT_OFLAGS
        .iter()
        .fold(OutputModeFlags::empty(), |acc, (flag, _, _)| acc | *flag);
    let fixed = OutputModeFlags::from_bits_retain(flags.bits() & !mapped.bits());
    if fixed != OUTPUT_FIXED {
        return Err(NativeError::invalid(format!(
            "output mode bits {:#x} cannot change on this platform",
            (fixed ^ OUTPUT_FIXED).bits()
        )));
    }
    for (flag, bit, inverted) in OUTPUT_OFLAGS {
        if flags.contains(flag) != inverted {
            termios.c_oflag |= bit;
        } else {
            termios.c_oflag &= !bit;
        }
    }
    Ok(())
}
