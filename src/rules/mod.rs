//! Traffic rules for an intercepting HTTP debugging proxy.
//!
//! The proxy host owns sessions, the UI and the network; this module owns the
//! rule state, the quick-exec command set and the interception handlers. The
//! host calls the handlers with its own [`Session`] implementation and carries
//! out the [`HostCommand`]s returned by [`Action::execute`].

mod actions;
mod intercept;
mod prefs;
mod state;
#[cfg(test)]
mod tests;

pub use actions::{Action, ActionOutcome, HostCommand, CAPTURE_ARCHIVE_NAME, QUICKEXEC_HELP_URL};
pub use intercept::{
    decode_sessions, on_before_request, on_before_response, on_done, on_lifecycle,
    on_peek_at_request_headers, on_peek_at_response_headers, on_returning_error,
    LifecycleEvent, Session,
};
pub use prefs::{
    preference, PrefField, PrefGroup, PrefValue, Preference, UserAgentPreset,
    CUSTOM_USER_AGENT, EPHEMERAL_PREFIX, PREFERENCES, USER_AGENTS,
};
pub use state::{Replacement, RulesState, DEFAULT_TRUSTED_HOST_SUFFIX};

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures from the rule state and preference store.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("unknown preference key: {0}")]
    UnknownPreference(String),

    #[error("preference {key} expects a {expected} value")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, RulesError>;
