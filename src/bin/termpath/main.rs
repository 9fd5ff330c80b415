//! termpath entrypoint: final path lookups, standard stream modes and proxy
//! rule commands for interactive shell use.
//!
//! Exit status is 0 on success, 2 when the stream has no terminal attached,
//! and 1 for every other failure.

mod render;

use anyhow::{Context, Result};
use std::process::ExitCode;
use termpath::config::{AppConfig, Command, FinalPathArgs, ModeCommand, RulesCommand};
use termpath::console_mode::{self, ModeFlags, StdStream};
use termpath::path_resolver;
use termpath::rules::{Action, RulesState};
use termpath::{
    init_logging, install_panic_logging, log_debug, log_debug_content, log_file_path,
    NativeError,
};

const EXIT_FAILURE: u8 = 1;
const EXIT_NO_CONSOLE: u8 = 2;

fn main() -> ExitCode {
    install_panic_logging();
    match run() {
        Ok(code) => code,
        Err(err) => {
            let no_console = err.chain().any(|cause| {
                matches!(
                    cause.downcast_ref::<NativeError>(),
                    Some(NativeError::NoConsole)
                )
            });
            log_debug(&format!("command failed: {err:#}"));
            eprintln!("termpath: {err:#}");
            ExitCode::from(if no_console {
                EXIT_NO_CONSOLE
            } else {
                EXIT_FAILURE
            })
        }
    }
}

fn run() -> Result<ExitCode> {
    let config = AppConfig::parse_args()?;
    init_logging(&config);
    log_debug(&format!(
        "=== termpath {} started (log file: {}) ===",
        env!("CARGO_PKG_VERSION"),
        log_file_path().display()
    ));

    match &config.command {
        Command::FinalPath(args) => final_path(&config, args),
        Command::Mode { action } => mode(&config, action),
        Command::Rules { action } => rules(&config, action),
    }
}

fn final_path(config: &AppConfig, args: &FinalPathArgs) -> Result<ExitCode> {
    log_debug_content(&format!("final-path {}", args.path.display()));
    let form = args.name_form();
    let resolved = path_resolver::final_path_with(&args.path, form, args.open_request())
        .with_context(|| format!("cannot resolve {}", args.path.display()))?;
    render::final_path(config.json, &resolved, form)?;
    Ok(ExitCode::SUCCESS)
}

fn mode(config: &AppConfig, action: &ModeCommand) -> Result<ExitCode> {
    let (stream, mode) = match action {
        ModeCommand::Get(args) => {
            let stream = args.stream;
            (stream, console_mode::get_mode(stream).with_context(|| context(stream))?)
        }
        ModeCommand::Set(args) => {
            let stream = args.target.stream;
            let flags = args.parsed_flags()?;
            console_mode::set_mode(stream, flags).with_context(|| context(stream))?;
            (stream, flags)
        }
        ModeCommand::Enable(args) => {
            let stream = args.target.stream;
            let flags = args.parsed_flags()?;
            (stream, console_mode::enable(&stream, flags).with_context(|| context(stream))?)
        }
        ModeCommand::Disable(args) => {
            let stream = args.target.stream;
            let flags = args.parsed_flags()?;
            (stream, console_mode::disable(&stream, flags).with_context(|| context(stream))?)
        }
    };
    report_mode(config, stream, mode)
}

fn report_mode(config: &AppConfig, stream: StdStream, mode: ModeFlags) -> Result<ExitCode> {
    log_debug(&format!("{} mode is {mode}", stream.label()));
    render::mode(config.json, stream, mode)?;
    Ok(ExitCode::SUCCESS)
}

fn context(stream: StdStream) -> String {
    format!("console mode of {}", stream.label())
}

fn rules(config: &AppConfig, action: &RulesCommand) -> Result<ExitCode> {
    match action {
        RulesCommand::Prefs { state } => {
            let state = match state {
                Some(path) => RulesState::load(path)?,
                None => RulesState::default(),
            };
            render::preferences(config.json, &state)?;
            Ok(ExitCode::SUCCESS)
        }
        RulesCommand::UserAgents => {
            render::user_agents(config.json)?;
            Ok(ExitCode::SUCCESS)
        }
        RulesCommand::Exec { state: path, args } => {
            let mut state = match path {
                Some(path) => RulesState::load(path)?,
                None => RulesState::default(),
            };
            log_debug_content(&format!("rules exec {}", args.join(" ")));
            let outcome = Action::parse(args.as_slice()).execute(&mut state);
            if let Some(path) = path {
                state
                    .save(path)
                    .with_context(|| format!("cannot update {}", path.display()))?;
            }
            render::outcome(config.json, &outcome)?;
            Ok(if outcome.handled {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_FAILURE)
            })
        }
    }
}
