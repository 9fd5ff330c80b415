//! Command-line parsing and validation helpers.

#[cfg(test)]
mod tests;
mod validation;

use crate::console_mode::{ModeFlags, StdStream};
use crate::path_resolver::{FlagsAndAttributes, NameForm, OpenRequest, VolumeName};
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI options for termpath. Validated before any OS call is made.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "termpath",
    about = "Resolve final file paths and inspect terminal modes",
    author,
    version
)]
pub struct AppConfig {
    /// Enable file logging (debug)
    #[arg(
        long = "logs",
        env = "TERMPATH_LOGS",
        value_parser = FalseyValueParser::new(),
        default_value_t = false,
        global = true
    )]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(
        long = "no-logs",
        env = "TERMPATH_NO_LOGS",
        value_parser = FalseyValueParser::new(),
        default_value_t = false,
        global = true
    )]
    pub no_logs: bool,

    /// Allow logging paths and command arguments (debug log only)
    #[arg(
        long = "log-content",
        env = "TERMPATH_LOG_CONTENT",
        value_parser = FalseyValueParser::new(),
        default_value_t = false,
        global = true
    )]
    pub log_content: bool,

    /// Trace every native call, not just state changes (turns on --logs)
    #[arg(long, global = true)]
    pub log_timings: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl AppConfig {
    pub fn logging_enabled(&self) -> bool {
        (self.logs || self.log_timings) && !self.no_logs
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print the final path of a file or directory, links resolved
    FinalPath(FinalPathArgs),
    /// Read or change the mode of a standard stream
    Mode {
        #[command(subcommand)]
        action: ModeCommand,
    },
    /// Proxy traffic rules
    Rules {
        #[command(subcommand)]
        action: RulesCommand,
    },
}

#[derive(Debug, Args, Clone)]
pub struct FinalPathArgs {
    /// Path to resolve
    pub path: PathBuf,

    /// Volume name form of the result
    #[arg(long, value_enum, default_value_t = VolumeName::Dos)]
    pub form: VolumeName,

    /// Report the name the object had when it was opened
    #[arg(long, default_value_t = false)]
    pub opened: bool,

    /// Resolve the link itself instead of its target
    #[arg(long = "no-follow", default_value_t = false)]
    pub no_follow: bool,
}

impl FinalPathArgs {
    pub fn name_form(&self) -> NameForm {
        let form = NameForm::new(self.form);
        if self.opened {
            form.opened()
        } else {
            form
        }
    }

    pub fn open_request(&self) -> OpenRequest {
        let request = OpenRequest::query();
        if self.no_follow {
            request.with_flag(FlagsAndAttributes::FILE_FLAG_OPEN_REPARSE_POINT)
        } else {
            request
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct StreamArgs {
    /// Standard stream to operate on
    #[arg(long, value_enum)]
    pub stream: StdStream,
}

#[derive(Debug, Args, Clone)]
pub struct ModeChangeArgs {
    #[command(flatten)]
    pub target: StreamArgs,

    /// Flags as hex (0x1f7), decimal, or names joined by `|` or `,`
    pub flags: String,
}

impl ModeChangeArgs {
    pub fn parsed_flags(&self) -> crate::error::Result<ModeFlags> {
        ModeFlags::parse(self.target.stream.direction(), &self.flags)
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum ModeCommand {
    /// Print the current mode
    Get(StreamArgs),
    /// Replace the whole mode
    Set(ModeChangeArgs),
    /// Turn the given flags on, keeping the rest
    Enable(ModeChangeArgs),
    /// Turn the given flags off, keeping the rest
    Disable(ModeChangeArgs),
}

#[derive(Debug, Subcommand, Clone)]
pub enum RulesCommand {
    /// List the preference registrations and their current values
    Prefs {
        /// Rule state file (JSON)
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// List the user-agent presets
    UserAgents,
    /// Run a quick-exec command against the rule state
    Exec {
        /// Rule state file (JSON), created if missing and updated afterwards
        #[arg(long)]
        state: Option<PathBuf>,

        /// Command name followed by its arguments
        #[arg(
            required = true,
            action = ArgAction::Append,
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "ARGS"
        )]
        args: Vec<String>,
    },
}
