use super::{AppConfig, Command, ModeCommand, RulesCommand};
use anyhow::{anyhow, bail, Result};
use clap::Parser;
use std::path::Path;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Reject inputs the OS would refuse anyway, before touching it.
    pub fn validate(&self) -> Result<()> {
        match &self.command {
            Command::FinalPath(args) => check_path("PATH", &args.path)?,
            Command::Mode { action } => match action {
                ModeCommand::Get(_) => {}
                ModeCommand::Set(args) | ModeCommand::Enable(args) | ModeCommand::Disable(args) => {
                    if args.flags.trim().is_empty() {
                        bail!("mode flags must not be empty");
                    }
                    args.parsed_flags().map_err(|err| {
                        anyhow!(
                            "invalid {} flags '{}': {err}",
                            args.target.stream.label(),
                            args.flags
                        )
                    })?;
                }
            },
            Command::Rules { action } => match action {
                RulesCommand::Prefs { state } => check_state_file(state.as_deref())?,
                RulesCommand::UserAgents => {}
                RulesCommand::Exec { state, args } => {
                    check_state_file(state.as_deref())?;
                    match args.first() {
                        Some(name) if !name.trim().is_empty() => {}
                        _ => bail!("rules exec needs a command name"),
                    }
                }
            },
        }
        Ok(())
    }
}

fn check_path(label: &str, path: &Path) -> Result<()> {
    // clap's path parser already refuses empty values.
    if path.as_os_str().as_encoded_bytes().contains(&0) {
        bail!("{label} must not contain NUL bytes");
    }
    Ok(())
}

fn check_state_file(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    check_path("--state", path)?;
    if path.is_dir() {
        bail!("--state must be a file, got directory {}", path.display());
    }
    Ok(())
}
