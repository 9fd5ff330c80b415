use std::fs;
use std::process::{Command, Output, Stdio};

fn combined_output(output: &Output) -> String {
    let mut combined = String::new();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn termpath_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_termpath").expect("termpath test binary not built")
}

fn termpath(args: &[&str]) -> Output {
    Command::new(termpath_bin())
        .args(args)
        .env("TERMPATH_NO_LOGS", "1")
        .stdin(Stdio::null())
        .output()
        .expect("run termpath")
}

#[test]
fn termpath_help_lists_subcommands() {
    let output = termpath(&["--help"]);
    assert!(output.status.success());
    let combined = combined_output(&output);
    for name in ["final-path", "mode", "rules"] {
        assert!(combined.contains(name), "{combined}");
    }
}

#[test]
fn final_path_prints_the_canonical_path() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("note.txt");
    fs::write(&file, b"hello").unwrap();
    let expected = fs::canonicalize(&file).unwrap();

    let output = termpath(&["final-path", file.to_str().unwrap()]);
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim_end(), expected.to_string_lossy());
}

#[cfg(unix)]
#[test]
fn final_path_follows_symlinks_and_reports_json() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("target.txt");
    let link = dir.path().join("link.txt");
    fs::write(&target, b"x").unwrap();
    std::os::unix::fs::symlink(&target, &link).unwrap();
    let expected = fs::canonicalize(&target).unwrap();

    let output = termpath(&["--json", "final-path", link.to_str().unwrap()]);
    assert!(output.status.success(), "{}", combined_output(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["path"], expected.to_str().unwrap());
    assert_eq!(value["form"], "dos");
    assert_eq!(value["opened"], false);
}

#[test]
fn final_path_of_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing");
    let output = termpath(&["final-path", missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("not found"));
}

#[test]
fn mode_without_a_terminal_exits_with_status_two() {
    let output = termpath(&["mode", "get", "--stream", "output"]);
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("no console"));

    let output = termpath(&["mode", "get", "--stream", "input"]);
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
}

#[test]
fn mode_rejects_bad_flags_before_touching_the_stream() {
    let output = termpath(&["mode", "set", "--stream", "input", "NOT_A_FLAG"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("invalid stdin flags"));
}

#[test]
fn rules_exec_updates_the_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("rules.json");
    let state_arg = state.to_str().unwrap();

    let output = termpath(&["rules", "exec", "--state", state_arg, "bpm", "post"]);
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("POST"));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&state).unwrap()).unwrap();
    assert_eq!(saved["bp_method"], "POST");

    let output = termpath(&["--json", "rules", "prefs", "--state", state_arg]);
    assert!(output.status.success());
    let prefs: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let method = prefs
        .as_array()
        .unwrap()
        .iter()
        .find(|entry| entry["field"] == "bp_method")
        .unwrap();
    assert_eq!(method["value"], "POST");
}

#[test]
fn rules_exec_reports_host_commands() {
    let output = termpath(&["--json", "rules", "exec", "save"]);
    assert!(output.status.success());
    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["handled"], true);
    assert_eq!(outcome["host"]["command"], "save_all_sessions");
    assert_eq!(outcome["host"]["file_name"], "dump.saz");
}

#[test]
fn rules_exec_unknown_command_fails() {
    let output = termpath(&["rules", "exec", "frobnicate"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("ExecAction not found: frobnicate"));
}

#[test]
fn rules_user_agents_lists_every_preset() {
    let output = termpath(&["rules", "user-agents"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 26);
    assert!(stdout.contains("%CUSTOM%"));
}
