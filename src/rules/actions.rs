//! Quick-exec commands typed into the host's command box.

use super::state::{Replacement, RulesState};
use serde::Serialize;

pub const QUICKEXEC_HELP_URL: &str = "https://docs.telerik.com/fiddler/knowledgebase/quickexec";
/// File name the `save` command archives sessions under, in the host's captures folder.
pub const CAPTURE_ARCHIVE_NAME: &str = "dump.saz";

const BREAKPOINT_HELP: &str = "bpu = Breakpoint on request to URI\n\
bpm = Breakpoint on request method\n\
bps = Breakpoint on response status\n\
bpa = Breakpoint on response from URI";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Bold(Option<String>),
    BreakpointHelp,
    BreakOnResponseUri(Option<String>),
    BreakOnMethod(Option<String>),
    BreakOnStatus(Option<String>),
    BreakOnRequestUri(Option<String>),
    Clear,
    Go,
    Help,
    Hide,
    KeepContentType(Option<String>),
    Log(Option<String>),
    Nuke,
    Quit,
    /// `(host, replacement)`; `None` when either is missing.
    ReplaceHost(Option<(String, String)>),
    /// `(token, replacement)`; `None` when either is missing.
    ReplaceUrl(Option<(String, String)>),
    Save,
    Screenshot,
    Show,
    Start,
    Stop,
    TrimSessions(Option<String>),
    Unknown(String),
}

/// Effects only the proxy host can carry out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum HostCommand {
    ShowMessage { text: String },
    RemoveAllSessions,
    ResumeAllSessions,
    OpenUrl { url: String },
    MinimizeToTray,
    KeepSessionsWithContentType { content_type: String },
    Log { text: String },
    ClearCacheAndCookies,
    Exit,
    /// Archive every session into the captures folder, then remove them.
    SaveAllSessions { file_name: String },
    CaptureScreenshot,
    RestoreWindow,
    AttachProxy,
    DetachProxy,
    TrimSessionList { keep: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    /// False when the command was unknown or lacked a required argument.
    pub handled: bool,
    /// Status-bar text after the command ran.
    pub status: String,
    pub host: Option<HostCommand>,
}

impl ActionOutcome {
    fn handled(status: impl Into<String>, host: Option<HostCommand>) -> Self {
        Self {
            handled: true,
            status: status.into(),
            host,
        }
    }

    fn rejected(status: impl Into<String>) -> Self {
        Self {
            handled: false,
            status: status.into(),
            host: None,
        }
    }
}

impl Action {
    /// Parse a command line already split into words. The name is case-insensitive.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Self {
        let Some(name) = args.first() else {
            return Action::Unknown(String::new());
        };
        let name = name.as_ref().to_lowercase();
        let arg = |index: usize| args.get(index).map(|a| a.as_ref().to_string());
        let pair = || arg(1).zip(arg(2));

        match name.as_str() {
            "bold" => Action::Bold(arg(1)),
            "bp" => Action::BreakpointHelp,
            "bpa" => Action::BreakOnResponseUri(arg(1)),
            "bpm" => Action::BreakOnMethod(arg(1)),
            "bps" => Action::BreakOnStatus(arg(1)),
            "bpu" => Action::BreakOnRequestUri(arg(1)),
            "clear" => Action::Clear,
            "go" => Action::Go,
            "help" => Action::Help,
            "hide" => Action::Hide,
            "keepct" => Action::KeepContentType(arg(1)),
            "log" => Action::Log(arg(1)),
            "nuke" => Action::Nuke,
            "quit" => Action::Quit,
            "rphost" => Action::ReplaceHost(pair()),
            "rpurl" => Action::ReplaceUrl(pair()),
            "save" => Action::Save,
            "screenshot" => Action::Screenshot,
            "show" => Action::Show,
            "start" => Action::Start,
            "stop" => Action::Stop,
            "trimsess" => Action::TrimSessions(arg(1)),
            _ => Action::Unknown(name),
        }
    }

    /// Apply the command to `state`. Host-side effects come back in the outcome.
    pub fn execute(self, state: &mut RulesState) -> ActionOutcome {
        let outcome = self.apply(state);
        tracing::debug!(
            handled = outcome.handled,
            host = ?outcome.host,
            "executed rules action"
        );
        outcome
    }

    fn apply(self, state: &mut RulesState) -> ActionOutcome {
        match self {
            Action::Bold(None) => {
                state.bold_uri = None;
                ActionOutcome::rejected("Bolding cleared.")
            }
            Action::Bold(Some(uri)) => {
                let status = format!("Bolding requests for: {uri}");
                state.bold_uri = Some(uri);
                ActionOutcome::handled(status, None)
            }
            Action::BreakpointHelp => ActionOutcome::handled(
                "ExecAction: bp",
                Some(HostCommand::ShowMessage {
                    text: BREAKPOINT_HELP.to_string(),
                }),
            ),
            Action::BreakOnResponseUri(None) => {
                state.bp_response_uri = None;
                ActionOutcome::rejected("Response URI breakpoint cleared.")
            }
            Action::BreakOnResponseUri(Some(uri)) => {
                let status = format!("Response URI breakpoint set for: {uri}");
                state.bp_response_uri = Some(uri);
                ActionOutcome::handled(status, None)
            }
            Action::BreakOnMethod(None) => {
                state.bp_method = None;
                ActionOutcome::rejected("Request method breakpoint cleared.")
            }
            Action::BreakOnMethod(Some(method)) => {
                let method = method.to_uppercase();
                let status = format!("Request method breakpoint set for: {method}");
                state.bp_method = Some(method);
                ActionOutcome::handled(status, None)
            }
            Action::BreakOnStatus(None) => {
                state.bp_status = None;
                ActionOutcome::rejected("Response status breakpoint cleared.")
            }
            Action::BreakOnStatus(Some(text)) => match text.trim().parse::<i32>() {
                Ok(code) => {
                    state.bp_status = Some(code);
                    ActionOutcome::handled(
                        format!("Response status breakpoint set for: {code}"),
                        None,
                    )
                }
                Err(_) => ActionOutcome::rejected(format!("Not a response status: {text}")),
            },
            Action::BreakOnRequestUri(None) => {
                state.bp_request_uri = None;
                ActionOutcome::rejected("Request URI breakpoint cleared.")
            }
            Action::BreakOnRequestUri(Some(uri)) => {
                let status = format!("Request URI breakpoint set for: {uri}");
                state.bp_request_uri = Some(uri);
                ActionOutcome::handled(status, None)
            }
            Action::Clear => host_only("clear", HostCommand::RemoveAllSessions),
            Action::Go => host_only("go", HostCommand::ResumeAllSessions),
            Action::Help => host_only(
                "help",
                HostCommand::OpenUrl {
                    url: QUICKEXEC_HELP_URL.to_string(),
                },
            ),
            Action::Hide => host_only("hide", HostCommand::MinimizeToTray),
            Action::KeepContentType(None) => {
                ActionOutcome::rejected("Specify the Content-Type of sessions to retain.")
            }
            Action::KeepContentType(Some(content_type)) => ActionOutcome::handled(
                format!("Removed all sessions without Content-Type: {content_type}"),
                Some(HostCommand::KeepSessionsWithContentType { content_type }),
            ),
            Action::Log(None) => {
                ActionOutcome::rejected("Specify string to save to the application log.")
            }
            Action::Log(Some(text)) => host_only("log", HostCommand::Log { text }),
            Action::Nuke => host_only("nuke", HostCommand::ClearCacheAndCookies),
            Action::Quit => host_only("quit", HostCommand::Exit),
            Action::ReplaceHost(None) => {
                state.host_replace = None;
                ActionOutcome::rejected("Host replacement cleared.")
            }
            Action::ReplaceHost(Some((host, with))) => {
                let host = host.to_lowercase();
                let status = format!(
                    "Rewriting requests to host [{host}] with replacement host [{with}]"
                );
                state.host_replace = Some(Replacement {
                    from: host,
                    to: with,
                });
                ActionOutcome::handled(status, None)
            }
            Action::ReplaceUrl(None) => {
                state.url_replace = None;
                ActionOutcome::rejected("URL replacement cleared.")
            }
            Action::ReplaceUrl(Some((token, with))) => {
                let with = with.replace(' ', "%20");
                let status = format!(
                    "Rewriting requests with URL token [{token}] with replacement token [{with}]"
                );
                state.url_replace = Some(Replacement {
                    from: token,
                    to: with,
                });
                ActionOutcome::handled(status, None)
            }
            Action::Save => ActionOutcome::handled(
                format!("Saved all sessions to: {CAPTURE_ARCHIVE_NAME}"),
                Some(HostCommand::SaveAllSessions {
                    file_name: CAPTURE_ARCHIVE_NAME.to_string(),
                }),
            ),
            Action::Screenshot => host_only("screenshot", HostCommand::CaptureScreenshot),
            Action::Show => host_only("show", HostCommand::RestoreWindow),
            Action::Start => host_only("start", HostCommand::AttachProxy),
            Action::Stop => host_only("stop", HostCommand::DetachProxy),
            Action::TrimSessions(None) => ActionOutcome::rejected(
                "Specify number of sessions to trim the session list to.",
            ),
            Action::TrimSessions(Some(text)) => match text.trim().parse::<usize>() {
                Ok(keep) => host_only("trimsess", HostCommand::TrimSessionList { keep }),
                Err(_) => ActionOutcome::rejected(format!("Not a session count: {text}")),
            },
            Action::Unknown(name) => {
                ActionOutcome::rejected(format!("ExecAction not found: {name}"))
            }
        }
    }
}

fn host_only(name: &str, command: HostCommand) -> ActionOutcome {
    ActionOutcome::handled(format!("ExecAction: {name}"), Some(command))
}
