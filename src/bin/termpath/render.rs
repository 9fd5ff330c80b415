//! Plain-text and JSON output for each subcommand.

use anyhow::Result;
use serde_json::json;
use std::io::{self, Write};
use termpath::console_mode::{ModeFlags, StdStream};
use termpath::path_resolver::{NameForm, VolumeName};
use termpath::rules::{ActionOutcome, RulesState, PREFERENCES, USER_AGENTS};

fn print_json(value: &serde_json::Value) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn volume_label(volume: VolumeName) -> &'static str {
    match volume {
        VolumeName::Dos => "dos",
        VolumeName::Guid => "guid",
        VolumeName::Nt => "nt",
        VolumeName::None => "none",
    }
}

pub fn final_path(json: bool, path: &str, form: NameForm) -> Result<()> {
    if json {
        return print_json(&json!({
            "path": path,
            "form": volume_label(form.volume),
            "opened": form.opened,
        }));
    }
    writeln!(io::stdout().lock(), "{path}")?;
    Ok(())
}

pub fn mode(json: bool, stream: StdStream, mode: ModeFlags) -> Result<()> {
    if json {
        return print_json(&json!({
            "stream": stream.label(),
            "mode": mode.bits(),
            "flags": mode.names(),
        }));
    }
    writeln!(io::stdout().lock(), "{}: {mode}", stream.label())?;
    Ok(())
}

pub fn preferences(json: bool, state: &RulesState) -> Result<()> {
    if json {
        let entries: Vec<_> = PREFERENCES
            .iter()
            .map(|entry| {
                json!({
                    "field": entry.field.name(),
                    "key": entry.key,
                    "label": entry.display_label(),
                    "group": entry.group.label().replace('&', ""),
                    "default": entry.default,
                    "value": state.field(entry.field),
                    "persisted": entry.persisted(),
                })
            })
            .collect();
        return print_json(&serde_json::Value::Array(entries));
    }

    let mut out = io::stdout().lock();
    for entry in PREFERENCES {
        writeln!(
            out,
            "{:<20} {:<42} {:<12} {:<28} {}{}",
            entry.field.name(),
            entry.key.unwrap_or("-"),
            entry.group.label().replace('&', ""),
            entry.display_label().unwrap_or_else(|| "-".to_string()),
            state.field(entry.field),
            if entry.persisted() { "" } else { " (session)" },
        )?;
    }
    Ok(())
}

pub fn user_agents(json: bool) -> Result<()> {
    if json {
        let presets: Vec<_> = USER_AGENTS
            .iter()
            .map(|preset| json!({ "label": preset.label.replace('&', ""), "value": preset.value }))
            .collect();
        return print_json(&serde_json::Value::Array(presets));
    }

    let mut out = io::stdout().lock();
    for (index, preset) in USER_AGENTS.iter().enumerate() {
        writeln!(
            out,
            "{index:>2}  {:<20} {}",
            preset.label.replace('&', ""),
            preset.value
        )?;
    }
    Ok(())
}

pub fn outcome(json: bool, outcome: &ActionOutcome) -> Result<()> {
    if json {
        return print_json(&serde_json::to_value(outcome)?);
    }

    let mut out = io::stdout().lock();
    writeln!(out, "{}", outcome.status)?;
    if let Some(command) = &outcome.host {
        writeln!(out, "host: {}", serde_json::to_string(command)?)?;
    }
    Ok(())
}
