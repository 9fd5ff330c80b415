use super::*;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default)]
struct MemorySession {
    host: String,
    url: String,
    method: String,
    https: bool,
    response_code: u16,
    pid: u32,
    flags: HashMap<String, String>,
    request_headers: HashMap<String, String>,
    response_headers: HashMap<String, String>,
    buffered: bool,
    local_response: bool,
    decoded: u32,
}

impl MemorySession {
    fn get(url: &str) -> Self {
        let host = url
            .split("://")
            .nth(1)
            .and_then(|rest| rest.split('/').next())
            .unwrap_or_default()
            .to_string();
        Self {
            host,
            url: url.to_string(),
            method: "GET".to_string(),
            https: url.starts_with("https://"),
            response_code: 200,
            ..Self::default()
        }
    }
}

impl Session for MemorySession {
    fn host(&self) -> &str {
        &self.host
    }
    fn hostname(&self) -> &str {
        self.host.split(':').next().unwrap_or_default()
    }
    fn url(&self) -> &str {
        &self.url
    }
    fn set_url(&mut self, url: String) {
        self.url = url;
    }
    fn method(&self) -> &str {
        &self.method
    }
    fn is_https(&self) -> bool {
        self.https
    }
    fn response_code(&self) -> u16 {
        self.response_code
    }
    fn set_response_code(&mut self, code: u16) {
        self.response_code = code;
    }
    fn local_process_id(&self) -> u32 {
        self.pid
    }
    fn flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(String::as_str)
    }
    fn set_flag(&mut self, name: &str, value: &str) {
        self.flags.insert(name.to_string(), value.to_string());
    }
    fn request_header(&self, name: &str) -> Option<&str> {
        self.request_headers.get(name).map(String::as_str)
    }
    fn set_request_header(&mut self, name: &str, value: &str) {
        self.request_headers
            .insert(name.to_string(), value.to_string());
    }
    fn remove_request_header(&mut self, name: &str) {
        self.request_headers.remove(name);
    }
    fn set_response_header(&mut self, name: &str, value: &str) {
        self.response_headers
            .insert(name.to_string(), value.to_string());
    }
    fn remove_response_header(&mut self, name: &str) {
        self.response_headers.remove(name);
    }
    fn buffer_response(&mut self) {
        self.buffered = true;
    }
    fn respond_locally(&mut self) {
        self.local_response = true;
    }
    fn decode_request(&mut self) {
        self.decoded += 1;
    }
    fn decode_response(&mut self) {
        self.decoded += 1;
    }
}

fn exec(state: &mut RulesState, words: &[&str]) -> ActionOutcome {
    Action::parse(words).execute(state)
}

#[test]
fn command_names_are_case_insensitive() {
    assert_eq!(Action::parse(&["BOLD", "x"]), Action::Bold(Some("x".into())));
    assert_eq!(Action::parse(&["TrimSess", "5"]), Action::TrimSessions(Some("5".into())));
    assert_eq!(Action::parse(&["nope"]), Action::Unknown("nope".into()));
    assert_eq!(Action::parse::<&str>(&[]), Action::Unknown(String::new()));
}

#[test]
fn missing_argument_clears_the_setting_and_is_not_handled() {
    let mut state = RulesState::default();
    assert!(exec(&mut state, &["bold", "/api"]).handled);
    assert_eq!(state.bold_uri.as_deref(), Some("/api"));

    let outcome = exec(&mut state, &["bold"]);
    assert!(!outcome.handled);
    assert_eq!(outcome.status, "Bolding cleared.");
    assert_eq!(state.bold_uri, None);

    exec(&mut state, &["rphost", "a.test", "b.test"]);
    let outcome = exec(&mut state, &["rphost", "a.test"]);
    assert!(!outcome.handled);
    assert_eq!(state.host_replace, None);
}

#[test]
fn breakpoint_commands_normalize_their_arguments() {
    let mut state = RulesState::default();
    exec(&mut state, &["bpm", "post"]);
    assert_eq!(state.bp_method.as_deref(), Some("POST"));

    let outcome = exec(&mut state, &["bps", "404"]);
    assert!(outcome.handled);
    assert_eq!(state.bp_status, Some(404));
    assert_eq!(outcome.status, "Response status breakpoint set for: 404");

    let outcome = exec(&mut state, &["bps", "four"]);
    assert!(!outcome.handled);
    assert_eq!(state.bp_status, Some(404));

    exec(&mut state, &["bps"]);
    assert_eq!(state.bp_status, None);
}

#[test]
fn replacement_commands_store_normalized_pairs() {
    let mut state = RulesState::default();
    exec(&mut state, &["rphost", "API.Example.com", "staging.example.com"]);
    assert_eq!(
        state.host_replace,
        Some(Replacement {
            from: "api.example.com".into(),
            to: "staging.example.com".into(),
        })
    );

    exec(&mut state, &["rpurl", "v1", "v2 beta"]);
    assert_eq!(state.url_replace.as_ref().map(|r| r.to.as_str()), Some("v2%20beta"));
}

#[test]
fn host_owned_commands_are_returned_not_run() {
    let mut state = RulesState::default();
    let outcome = exec(&mut state, &["save"]);
    assert_eq!(
        outcome.host,
        Some(HostCommand::SaveAllSessions {
            file_name: CAPTURE_ARCHIVE_NAME.to_string()
        })
    );
    assert_eq!(
        exec(&mut state, &["trimsess", "50"]).host,
        Some(HostCommand::TrimSessionList { keep: 50 })
    );
    assert!(!exec(&mut state, &["trimsess", "-1"]).handled);
    assert_eq!(
        exec(&mut state, &["keepct", "image/png"]).host,
        Some(HostCommand::KeepSessionsWithContentType {
            content_type: "image/png".into()
        })
    );
    assert_eq!(exec(&mut state, &["keepct"]).host, None);
    assert_eq!(state, RulesState::default());
}

#[test]
fn unknown_commands_report_their_name() {
    let mut state = RulesState::default();
    let outcome = exec(&mut state, &["Frobnicate"]);
    assert!(!outcome.handled);
    assert_eq!(outcome.status, "ExecAction not found: frobnicate");
}

#[test]
fn host_command_serializes_with_a_tag() {
    let json = serde_json::to_value(HostCommand::OpenUrl {
        url: QUICKEXEC_HELP_URL.to_string(),
    })
    .unwrap();
    assert_eq!(json["command"], "open_url");
    assert_eq!(json["url"], QUICKEXEC_HELP_URL);
}

#[test]
fn before_request_applies_rewrites_and_marks() {
    let mut state = RulesState::default();
    exec(&mut state, &["rphost", "api.example.com", "127.0.0.1:8080"]);
    exec(&mut state, &["rpurl", "/v1/", "/v2/"]);
    exec(&mut state, &["bpu", "USERS"]);
    exec(&mut state, &["bold", "users"]);

    let mut session = MemorySession::get("https://API.example.com/v1/users");
    on_before_request(&state, &mut session);

    assert_eq!(session.flag("x-overridehost"), Some("127.0.0.1:8080"));
    assert_eq!(session.url, "https://API.example.com/v2/users");
    assert_eq!(session.flag("x-breakrequest"), Some("uri"));
    assert_eq!(session.flag("ui-bold"), Some("true"));
}

#[test]
fn method_breakpoint_wins_over_uri_breakpoint() {
    let mut state = RulesState::default();
    exec(&mut state, &["bpu", "/"]);
    exec(&mut state, &["bpm", "get"]);
    let mut session = MemorySession::get("http://intranet/");
    on_before_request(&state, &mut session);
    assert_eq!(session.flag("x-breakrequest"), Some("method"));
}

#[test]
fn toggles_shape_the_request() {
    let state = RulesState {
        auto_auth: true,
        user_agent: Some(USER_AGENTS[0].value.to_string()),
        simulate_modem: true,
        disable_caching: true,
        ..RulesState::default()
    };
    let mut session = MemorySession::get("http://intranet/");
    session.set_request_header("If-None-Match", "\"abc\"");
    on_before_request(&state, &mut session);

    assert_eq!(session.flag("X-AutoAuth"), Some("(default)"));
    assert_eq!(session.request_header("User-Agent"), Some("Mozilla/3.0 (Win95; I)"));
    assert_eq!(session.flag("request-trickle-delay"), Some("300"));
    assert_eq!(session.flag("response-trickle-delay"), Some("150"));
    assert_eq!(session.request_header("If-None-Match"), None);
    assert_eq!(session.request_header("Pragma"), Some("no-cache"));
}

#[test]
fn cache_always_fresh_answers_conditional_requests() {
    let state = RulesState {
        cache_always_fresh: true,
        ..RulesState::default()
    };
    let mut plain = MemorySession::get("http://intranet/logo.png");
    on_before_request(&state, &mut plain);
    assert!(!plain.local_response);

    let mut conditional = MemorySession::get("http://intranet/logo.png");
    conditional.set_request_header("If-Modified-Since", "Sat, 01 Jan 2000 00:00:00 GMT");
    on_before_request(&state, &mut conditional);
    assert!(conditional.local_response);
    assert_eq!(conditional.response_code, 304);
    assert_eq!(conditional.flag("ui-backcolor"), Some("Lavender"));
}

#[test]
fn unauthorized_responses_auto_authenticate_only_for_trusted_local_hosts() {
    let state = RulesState::default();
    let cases = [
        ("https://intranet/", 1234, true),
        ("https://sso.example.com/", 1234, true),
        ("https://sso.example.com:8443/", 1234, true),
        ("https://elsewhere.test/", 1234, false),
        ("https://intranet/", 0, false),
        ("http://intranet/", 1234, false),
    ];
    for (url, pid, expected) in cases {
        let mut session = MemorySession::get(url);
        session.response_code = 401;
        session.pid = pid;
        on_peek_at_response_headers(&state, &mut session);
        assert_eq!(session.flag("X-AutoAuth").is_some(), expected, "{url} pid={pid}");
        if expected {
            assert_eq!(session.flag("ui-backcolor"), Some("pink"));
        }
    }
}

#[test]
fn response_breakpoints_buffer_the_response() {
    let mut state = RulesState::default();
    exec(&mut state, &["bps", "500"]);
    let mut session = MemorySession::get("http://intranet/fail");
    session.response_code = 500;
    on_peek_at_response_headers(&state, &mut session);
    assert!(session.buffered);
    assert_eq!(session.flag("x-breakresponse"), Some("status"));

    let mut state = RulesState::default();
    exec(&mut state, &["bpa", "/fail"]);
    let mut session = MemorySession::get("http://intranet/fail");
    on_peek_at_response_headers(&state, &mut session);
    assert!(session.buffered);
    assert_eq!(session.flag("x-breakresponse"), Some("uri"));
}

#[test]
fn non_positive_status_breakpoint_never_matches() {
    let state = RulesState {
        bp_status: Some(0),
        ..RulesState::default()
    };
    let mut session = MemorySession::get("http://intranet/");
    session.response_code = 0;
    on_peek_at_response_headers(&state, &mut session);
    assert!(!session.buffered);
}

#[test]
fn disable_caching_rewrites_response_headers() {
    let state = RulesState {
        disable_caching: true,
        ..RulesState::default()
    };
    let mut session = MemorySession::get("http://intranet/");
    session.set_response_header("Expires", "0");
    on_peek_at_response_headers(&state, &mut session);
    assert!(!session.response_headers.contains_key("Expires"));
    assert_eq!(
        session.response_headers.get("Cache-Control").map(String::as_str),
        Some("no-cache")
    );
}

#[test]
fn hide_304s_hides_only_not_modified() {
    let state = RulesState {
        hide_304s: true,
        ..RulesState::default()
    };
    let mut hidden = MemorySession::get("http://intranet/");
    hidden.response_code = 304;
    on_before_response(&state, &mut hidden);
    assert_eq!(hidden.flag("ui-hide"), Some("true"));

    let mut shown = MemorySession::get("http://intranet/");
    on_before_response(&state, &mut shown);
    assert_eq!(shown.flag("ui-hide"), None);
}

#[test]
fn quiet_handlers_leave_the_session_alone() {
    let state = RulesState {
        auto_auth: true,
        ..RulesState::default()
    };
    let mut session = MemorySession::get("http://intranet/");
    on_peek_at_request_headers(&state, &mut session);
    on_returning_error(&state, &mut session);
    on_done(&state, &mut session);
    assert!(session.flags.is_empty());
    assert!(on_lifecycle(LifecycleEvent::BeforeShutdown));
}

#[test]
fn decode_sessions_visits_every_session() {
    let mut sessions = vec![
        MemorySession::get("http://a/"),
        MemorySession::get("http://b/"),
    ];
    decode_sessions(&mut sessions);
    assert!(sessions.iter().all(|s| s.decoded == 2));
}

#[test]
fn registration_table_marks_ephemeral_keys() {
    let persisted: Vec<_> = PREFERENCES
        .iter()
        .filter(|entry| entry.persisted())
        .filter_map(|entry| entry.key)
        .collect();
    assert_eq!(
        persisted,
        ["fiddlerscript.rules.Hide304s", "fiddlerscript.rules.AutoAuth"]
    );
    let modem = PREFERENCES
        .iter()
        .find(|entry| entry.field == PrefField::SimulateModem)
        .unwrap();
    assert_eq!(modem.display_label().as_deref(), Some("Simulate Modem Speeds"));
    assert_eq!(modem.group, PrefGroup::Performance);
    assert!(!modem.persisted());
}

#[test]
fn defaults_match_the_registration_table() {
    let state = RulesState::default();
    for entry in PREFERENCES {
        assert_eq!(state.field(entry.field), entry.default, "{:?}", entry.field);
    }
}

#[test]
fn user_agent_presets_end_with_custom() {
    assert_eq!(USER_AGENTS.len(), 26);
    assert_eq!(USER_AGENTS[25].value, CUSTOM_USER_AGENT);
}

#[test]
fn prefs_are_addressed_by_storage_key() {
    let mut state = RulesState::default();
    state
        .set_pref("fiddlerscript.rules.Hide304s", PrefValue::Bool(true))
        .unwrap();
    assert!(state.hide_304s);
    state
        .set_pref(
            "fiddlerscript.ephemeral.bpMethod",
            PrefValue::Text(Some("put".into())),
        )
        .unwrap();
    assert_eq!(
        state.pref("fiddlerscript.ephemeral.bpMethod").unwrap(),
        PrefValue::Text(Some("PUT".into()))
    );

    let err = state.pref("fiddlerscript.rules.Nope").unwrap_err();
    assert!(matches!(err, RulesError::UnknownPreference(_)), "got {err:?}");
    let err = state
        .set_pref("fiddlerscript.rules.AutoAuth", PrefValue::Text(None))
        .unwrap_err();
    assert!(matches!(err, RulesError::TypeMismatch { .. }), "got {err:?}");
}

#[test]
fn persisted_prefs_round_trip_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");

    let mut state = RulesState::default();
    state.auto_auth = true;
    state.bp_method = Some("GET".into());
    state.save_prefs(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(!text.contains(EPHEMERAL_PREFIX), "{text}");

    let mut restored = RulesState::default();
    restored.load_prefs(&path).unwrap();
    assert!(restored.auto_auth);
    assert_eq!(restored.bp_method, None);
}

#[test]
fn prefs_json_accepts_nulls_and_rejects_numbers() {
    let mut prefs = BTreeMap::new();
    prefs.insert(
        "fiddlerscript.ephemeral.UserAgentString".to_string(),
        serde_json::from_str::<PrefValue>("null").unwrap(),
    );
    let mut state = RulesState {
        user_agent: Some("x".into()),
        ..RulesState::default()
    };
    state.apply_prefs(&prefs).unwrap();
    assert_eq!(state.user_agent, None);

    assert!(serde_json::from_str::<PrefValue>("3").is_err());
}

#[test]
fn state_file_missing_means_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    assert_eq!(RulesState::load(&path).unwrap(), RulesState::default());

    let mut state = RulesState::default();
    exec(&mut state, &["bpu", "/login"]);
    state.save(&path).unwrap();
    assert_eq!(RulesState::load(&path).unwrap(), state);

    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        RulesState::load(&path),
        Err(RulesError::Json { .. })
    ));
}

#[test]
fn state_file_fills_missing_fields_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, r#"{ "hide_304s": true }"#).unwrap();
    let state = RulesState::load(&path).unwrap();
    assert!(state.hide_304s);
    assert_eq!(state.trusted_host_suffix, DEFAULT_TRUSTED_HOST_SUFFIX);
}
