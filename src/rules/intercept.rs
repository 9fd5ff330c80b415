//! Interception handlers, called by the host at each stage of a session.
//!
//! With response streaming the host may call [`on_before_response`] after the
//! client already has the response; nothing here relies on the order.

use super::state::RulesState;

/// What the handlers need from one proxied request/response pair.
pub trait Session {
    /// Host including any port, as the client sent it.
    fn host(&self) -> &str;
    /// Host without the port.
    fn hostname(&self) -> &str;
    fn url(&self) -> &str;
    fn set_url(&mut self, url: String);
    fn method(&self) -> &str;
    fn is_https(&self) -> bool;
    fn response_code(&self) -> u16;
    fn set_response_code(&mut self, code: u16);
    /// Process that issued the request; 0 when it came from another machine.
    fn local_process_id(&self) -> u32;

    /// Session flags such as `ui-bold` or `x-breakrequest`.
    fn flag(&self, name: &str) -> Option<&str>;
    fn set_flag(&mut self, name: &str, value: &str);

    fn request_header(&self, name: &str) -> Option<&str>;
    fn set_request_header(&mut self, name: &str, value: &str);
    fn remove_request_header(&mut self, name: &str);
    fn set_response_header(&mut self, name: &str, value: &str);
    fn remove_response_header(&mut self, name: &str);

    /// Hold the whole response before forwarding it.
    fn buffer_response(&mut self);
    /// Answer from the proxy without contacting the server.
    fn respond_locally(&mut self);

    fn decode_request(&mut self) {}
    fn decode_response(&mut self) {}

    fn uri_contains(&self, needle: &str) -> bool {
        self.url().to_lowercase().contains(&needle.to_lowercase())
    }

    fn method_is(&self, method: &str) -> bool {
        self.method().eq_ignore_ascii_case(method)
    }
}

/// Host lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Loaded,
    Boot,
    BeforeShutdown,
    Shutdown,
    Attach,
    Detach,
}

/// Returns whether the host may proceed; only `BeforeShutdown` asks.
pub fn on_lifecycle(event: LifecycleEvent) -> bool {
    tracing::info!(?event, "rules lifecycle event");
    true
}

/// Request headers are in, the body is not. Nothing to do this early.
pub fn on_peek_at_request_headers(_state: &RulesState, _session: &mut impl Session) {}

pub fn on_before_request(state: &RulesState, session: &mut impl Session) {
    if let Some(replace) = &state.host_replace {
        if session.host().to_lowercase() == replace.from {
            session.set_flag("x-overridehost", &replace.to);
        }
    }

    if let Some(replace) = &state.url_replace {
        if session.url().contains(&replace.from) {
            let url = session.url().replace(&replace.from, &replace.to);
            session.set_url(url);
        }
    }

    if let Some(uri) = &state.bp_request_uri {
        if session.uri_contains(uri) {
            session.set_flag("x-breakrequest", "uri");
        }
    }

    if let Some(method) = &state.bp_method {
        if session.method_is(method) {
            session.set_flag("x-breakrequest", "method");
        }
    }

    if let Some(uri) = &state.bold_uri {
        if session.uri_contains(uri) {
            session.set_flag("ui-bold", "true");
        }
    }

    // "(default)" answers with the credentials the host runs under.
    if state.auto_auth {
        session.set_flag("X-AutoAuth", "(default)");
    }

    if let Some(agent) = &state.user_agent {
        session.set_request_header("User-Agent", agent);
    }

    // Milliseconds per KB.
    if state.simulate_modem {
        session.set_flag("request-trickle-delay", "300");
        session.set_flag("response-trickle-delay", "150");
    }

    if state.disable_caching {
        session.remove_request_header("If-None-Match");
        session.remove_request_header("If-Modified-Since");
        session.set_request_header("Pragma", "no-cache");
    }

    let conditional = session.request_header("If-Modified-Since").is_some()
        || session.request_header("If-None-Match").is_some();
    if state.cache_always_fresh && conditional {
        session.respond_locally();
        session.set_response_code(304);
        session.set_flag("ui-backcolor", "Lavender");
    }
}

/// Response headers are in, the body is not.
pub fn on_peek_at_response_headers(state: &RulesState, session: &mut impl Session) {
    // Answer 401s here so channel-binding servers see the host's credentials.
    if session.is_https()
        && session.response_code() == 401
        && session.local_process_id() > 0
        && is_trusted_host(state, &*session)
    {
        session.set_flag("X-AutoAuth", "(default)");
        session.set_flag("ui-backcolor", "pink");
    }

    if state.disable_caching {
        session.remove_response_header("Expires");
        session.set_response_header("Cache-Control", "no-cache");
    }

    if let Some(code) = state.bp_status {
        if code > 0 && i32::from(session.response_code()) == code {
            session.buffer_response();
            session.set_flag("x-breakresponse", "status");
        }
    }

    if let Some(uri) = &state.bp_response_uri {
        if session.uri_contains(uri) {
            session.buffer_response();
            session.set_flag("x-breakresponse", "uri");
        }
    }
}

pub fn on_before_response(state: &RulesState, session: &mut impl Session) {
    if state.hide_304s && session.response_code() == 304 {
        session.set_flag("ui-hide", "true");
    }
}

/// The host is about to return an error of its own, such as a DNS failure.
pub fn on_returning_error(_state: &RulesState, _session: &mut impl Session) {}

/// Runs once per session whatever the outcome.
pub fn on_done(_state: &RulesState, _session: &mut impl Session) {}

/// Context-menu action: decode the bodies of the selected sessions.
pub fn decode_sessions<S: Session>(sessions: &mut [S]) {
    for session in sessions.iter_mut() {
        session.decode_request();
        session.decode_response();
    }
    tracing::debug!(count = sessions.len(), "decoded sessions");
}

/// Plain (dotless) host names and the configured suffix are trusted.
fn is_trusted_host(state: &RulesState, session: &impl Session) -> bool {
    let hostname = session.hostname();
    if !hostname.is_empty() && !hostname.contains('.') {
        return true;
    }
    let suffix = state.trusted_host_suffix.to_ascii_lowercase();
    !suffix.is_empty() && hostname.to_ascii_lowercase().ends_with(&suffix)
}
