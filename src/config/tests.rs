use super::{AppConfig, Command, ModeCommand, RulesCommand};
use crate::console_mode::{InputModeFlags, ModeFlags, StdStream};
use crate::path_resolver::{FlagsAndAttributes, NameForm, VolumeName};
use clap::Parser;
use std::sync::Mutex;

// Serializes tests that read or write the TERMPATH_* logging env vars.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn parse(args: &[&str]) -> AppConfig {
    let mut argv = vec!["termpath"];
    argv.extend_from_slice(args);
    AppConfig::parse_from(argv)
}

#[test]
fn logging_is_off_unless_requested() {
    let _env = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let cfg = parse(&["mode", "get", "--stream", "input"]);
    assert!(!cfg.logging_enabled());

    let cfg = parse(&["--logs", "mode", "get", "--stream", "input"]);
    assert!(cfg.logging_enabled());
}

#[test]
fn no_logs_overrides_logs() {
    let cfg = parse(&["--logs", "--no-logs", "mode", "get", "--stream", "output"]);
    assert!(!cfg.logging_enabled());
}

#[test]
fn log_timings_turns_logging_on() {
    let _env = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let cfg = parse(&["--log-timings", "mode", "get", "--stream", "input"]);
    assert!(cfg.logging_enabled());

    let cfg = parse(&["--log-timings", "--no-logs", "mode", "get", "--stream", "input"]);
    assert!(!cfg.logging_enabled());
}

#[test]
fn logging_env_vars_accept_numeric_values() {
    let _env = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    std::env::set_var("TERMPATH_NO_LOGS", "1");
    std::env::set_var("TERMPATH_LOG_CONTENT", "0");
    let parsed = AppConfig::try_parse_from(["termpath", "--logs", "final-path", "/tmp"]);
    std::env::remove_var("TERMPATH_NO_LOGS");
    std::env::remove_var("TERMPATH_LOG_CONTENT");

    let cfg = parsed.expect("numeric env values parse");
    assert!(cfg.no_logs);
    assert!(!cfg.log_content);
    assert!(!cfg.logging_enabled());
}

#[test]
fn global_flags_are_accepted_after_the_subcommand() {
    let cfg = parse(&["final-path", "/tmp", "--json", "--logs"]);
    assert!(cfg.json);
    assert!(cfg.logs);
}

#[test]
fn final_path_builds_name_form_and_request() {
    let cfg = parse(&["final-path", "/tmp", "--form", "none", "--opened", "--no-follow"]);
    let Command::FinalPath(args) = &cfg.command else {
        panic!("expected final-path, got {:?}", cfg.command);
    };
    assert_eq!(args.name_form(), NameForm::new(VolumeName::None).opened());
    assert!(args
        .open_request()
        .flags
        .contains(FlagsAndAttributes::FILE_FLAG_OPEN_REPARSE_POINT));
    assert!(cfg.validate().is_ok());
}

#[test]
fn final_path_defaults_to_dos_form() {
    let cfg = parse(&["final-path", "."]);
    let Command::FinalPath(args) = &cfg.command else {
        panic!("expected final-path");
    };
    assert_eq!(args.name_form(), NameForm::default());
    assert!(!args
        .open_request()
        .flags
        .contains(FlagsAndAttributes::FILE_FLAG_OPEN_REPARSE_POINT));
}

#[test]
fn rejects_empty_path() {
    assert!(AppConfig::try_parse_from(["termpath", "final-path", ""]).is_err());
    assert!(AppConfig::try_parse_from(["termpath", "rules", "prefs", "--state", ""]).is_err());
}

#[cfg(unix)]
#[test]
fn rejects_path_with_nul() {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;

    let cfg = AppConfig::parse_from([
        OsString::from("termpath"),
        OsString::from("final-path"),
        OsString::from_vec(b"/tmp/a\0b".to_vec()),
    ]);
    assert!(cfg.validate().is_err());
}

#[test]
fn mode_flags_are_parsed_for_the_stream_direction() {
    let cfg = parse(&["mode", "enable", "--stream", "input", "LINE_INPUT,ECHO_INPUT"]);
    let Command::Mode {
        action: ModeCommand::Enable(args),
    } = &cfg.command
    else {
        panic!("expected mode enable");
    };
    assert_eq!(args.target.stream, StdStream::Input);
    assert_eq!(
        args.parsed_flags().unwrap(),
        ModeFlags::Input(InputModeFlags::ENABLE_LINE_INPUT | InputModeFlags::ENABLE_ECHO_INPUT)
    );
    assert!(cfg.validate().is_ok());
}

#[test]
fn rejects_flags_for_the_wrong_direction() {
    let cfg = parse(&["mode", "set", "--stream", "error", "ECHO_INPUT"]);
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("stderr"), "{err}");
}

#[test]
fn rejects_unparsable_flags() {
    for flags in ["0xzz", "SOMETHING", " "] {
        let cfg = parse(&["mode", "disable", "--stream", "output", flags]);
        assert!(cfg.validate().is_err(), "accepted {flags:?}");
    }
}

#[test]
fn numeric_flags_are_accepted() {
    let cfg = parse(&["mode", "set", "--stream", "output", "0x7"]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn rules_exec_keeps_hyphenated_arguments() {
    let cfg = parse(&["rules", "exec", "bps", "-1"]);
    let Command::Rules {
        action: RulesCommand::Exec { state, args },
    } = &cfg.command
    else {
        panic!("expected rules exec");
    };
    assert!(state.is_none());
    assert_eq!(args, &["bps", "-1"]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn rules_exec_requires_a_command() {
    assert!(AppConfig::try_parse_from(["termpath", "rules", "exec"]).is_err());
    let cfg = parse(&["rules", "exec", ""]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_directory_as_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let dir_arg = dir.path().to_string_lossy().into_owned();
    let cfg = parse(&["rules", "prefs", "--state", &dir_arg]);
    assert!(cfg.validate().is_err());

    let file_arg = dir.path().join("state.json").to_string_lossy().into_owned();
    let cfg = parse(&["rules", "exec", "--state", &file_arg, "hide"]);
    assert!(cfg.validate().is_ok());
}
