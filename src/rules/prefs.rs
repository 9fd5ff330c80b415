//! Preference bindings for the rule toggles, as one registration table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Keys under this prefix live for one host session and are never written out.
pub const EPHEMERAL_PREFIX: &str = "fiddlerscript.ephemeral.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefField {
    BpMethod,
    BpRequestUri,
    BpResponseUri,
    Hide304s,
    AutoAuth,
    UserAgent,
    SimulateModem,
    DisableCaching,
    CacheAlwaysFresh,
}

impl PrefField {
    pub fn name(self) -> &'static str {
        match self {
            PrefField::BpMethod => "bp_method",
            PrefField::BpRequestUri => "bp_request_uri",
            PrefField::BpResponseUri => "bp_response_uri",
            PrefField::Hide304s => "hide_304s",
            PrefField::AutoAuth => "auto_auth",
            PrefField::UserAgent => "user_agent",
            PrefField::SimulateModem => "simulate_modem",
            PrefField::DisableCaching => "disable_caching",
            PrefField::CacheAlwaysFresh => "cache_always_fresh",
        }
    }

    pub fn kind(self) -> &'static str {
        match self {
            PrefField::BpMethod
            | PrefField::BpRequestUri
            | PrefField::BpResponseUri
            | PrefField::UserAgent => "string or null",
            _ => "boolean",
        }
    }
}

/// Where a rule shows up in the host's Rules menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefGroup {
    /// Bound to storage only, no menu entry.
    None,
    Rules,
    Performance,
}

impl PrefGroup {
    pub fn label(self) -> &'static str {
        match self {
            PrefGroup::None => "-",
            PrefGroup::Rules => "Rules",
            PrefGroup::Performance => "Per&formance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Text(Option<String>),
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefValue::Bool(value) => write!(f, "{value}"),
            PrefValue::Text(Some(value)) => write!(f, "{value:?}"),
            PrefValue::Text(None) => f.write_str("(unset)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preference {
    pub field: PrefField,
    /// Host preference storage key, if the field is bound to one.
    pub key: Option<&'static str>,
    pub default: PrefValue,
    /// Menu label; `&` marks the accelerator key.
    pub label: Option<&'static str>,
    pub group: PrefGroup,
}

impl Preference {
    /// Bound to storage and not session-scoped.
    pub fn persisted(&self) -> bool {
        self.key
            .is_some_and(|key| !key.starts_with(EPHEMERAL_PREFIX))
    }

    /// Label without accelerator markers.
    pub fn display_label(&self) -> Option<String> {
        self.label.map(|label| label.replace('&', ""))
    }
}

pub const PREFERENCES: &[Preference] = &[
    Preference {
        field: PrefField::BpMethod,
        key: Some("fiddlerscript.ephemeral.bpMethod"),
        default: PrefValue::Text(None),
        label: None,
        group: PrefGroup::None,
    },
    Preference {
        field: PrefField::BpRequestUri,
        key: Some("fiddlerscript.ephemeral.bpRequestURI"),
        default: PrefValue::Text(None),
        label: None,
        group: PrefGroup::None,
    },
    Preference {
        field: PrefField::BpResponseUri,
        key: Some("fiddlerscript.ephemeral.bpResponseURI"),
        default: PrefValue::Text(None),
        label: None,
        group: PrefGroup::None,
    },
    Preference {
        field: PrefField::Hide304s,
        key: Some("fiddlerscript.rules.Hide304s"),
        default: PrefValue::Bool(false),
        label: Some("Hide 304s"),
        group: PrefGroup::Rules,
    },
    Preference {
        field: PrefField::AutoAuth,
        key: Some("fiddlerscript.rules.AutoAuth"),
        default: PrefValue::Bool(false),
        label: Some("&Automatically Authenticate"),
        group: PrefGroup::Rules,
    },
    Preference {
        field: PrefField::UserAgent,
        key: Some("fiddlerscript.ephemeral.UserAgentString"),
        default: PrefValue::Text(None),
        label: Some("&User-Agents"),
        group: PrefGroup::Rules,
    },
    Preference {
        field: PrefField::SimulateModem,
        key: None,
        default: PrefValue::Bool(false),
        label: Some("Simulate &Modem Speeds"),
        group: PrefGroup::Performance,
    },
    Preference {
        field: PrefField::DisableCaching,
        key: None,
        default: PrefValue::Bool(false),
        label: Some("&Disable Caching"),
        group: PrefGroup::Performance,
    },
    Preference {
        field: PrefField::CacheAlwaysFresh,
        key: None,
        default: PrefValue::Bool(false),
        label: Some("Cache Always &Fresh"),
        group: PrefGroup::Performance,
    },
];

/// Registration entry for a storage key.
pub fn preference(key: &str) -> Option<&'static Preference> {
    PREFERENCES.iter().find(|entry| entry.key == Some(key))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserAgentPreset {
    pub label: &'static str,
    pub value: &'static str,
}

/// The value the host replaces with a user-supplied string.
pub const CUSTOM_USER_AGENT: &str = "%CUSTOM%";

const fn preset(label: &'static str, value: &'static str) -> UserAgentPreset {
    UserAgentPreset { label, value }
}

pub const USER_AGENTS: &[UserAgentPreset] = &[
    preset("Netscape &3", "Mozilla/3.0 (Win95; I)"),
    preset("WinPhone8.1", "Mozilla/5.0 (Mobile; Windows Phone 8.1; Android 4.0; ARM; Trident/7.0; Touch; rv:11.0; IEMobile/11.0; NOKIA; Lumia 520) like iPhone OS 7_0_3 Mac OS X AppleWebKit/537 (KHTML, like Gecko) Mobile Safari/537"),
    preset("&Safari5 (Win7)", "Mozilla/5.0 (Windows; U; Windows NT 6.1; en-US) AppleWebKit/533.21.1 (KHTML, like Gecko) Version/5.0.5 Safari/533.21.1"),
    preset("Safari9 (Mac)", "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_11) AppleWebKit/601.1.56 (KHTML, like Gecko) Version/9.0 Safari/601.1.56"),
    preset("iPad", "Mozilla/5.0 (iPad; CPU OS 8_3 like Mac OS X) AppleWebKit/600.1.4 (KHTML, like Gecko) Version/8.0 Mobile/12F5027d Safari/600.1.4"),
    preset("iPhone6", "Mozilla/5.0 (iPhone; CPU iPhone OS 8_3 like Mac OS X) AppleWebKit/600.1.4 (KHTML, like Gecko) Version/8.0 Mobile/12F70 Safari/600.1.4"),
    preset("IE &6 (XPSP2)", "Mozilla/4.0 (compatible; MSIE 6.0; Windows NT 5.1; SV1)"),
    preset("IE &7 (Vista)", "Mozilla/4.0 (compatible; MSIE 7.0; Windows NT 6.0; SLCC1)"),
    preset("IE 8 (Win2k3 x64)", "Mozilla/4.0 (compatible; MSIE 8.0; Windows NT 5.2; WOW64; Trident/4.0)"),
    preset("IE &8 (Win7)", "Mozilla/4.0 (compatible; MSIE 8.0; Windows NT 6.1; Trident/4.0)"),
    preset("IE 9 (Win7)", "Mozilla/5.0 (compatible; MSIE 9.0; Windows NT 6.1; Trident/5.0)"),
    preset("IE 10 (Win8)", "Mozilla/5.0 (compatible; MSIE 10.0; Windows NT 6.2; WOW64; Trident/6.0)"),
    preset("IE 11 (Surface2)", "Mozilla/5.0 (Windows NT 6.3; ARM; Trident/7.0; Touch; rv:11.0) like Gecko"),
    preset("IE 11 (Win8.1)", "Mozilla/5.0 (Windows NT 6.3; WOW64; Trident/7.0; rv:11.0) like Gecko"),
    preset("Edge (Win10)", "Mozilla/5.0 (Windows NT 10.0) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/46.0.2486.0 Safari/537.36 Edge/13.11082"),
    preset("&Opera", "Opera/9.80 (Windows NT 6.2; WOW64) Presto/2.12.388 Version/12.17"),
    preset("&Firefox 3.6", "Mozilla/5.0 (Windows; U; Windows NT 6.1; en-US; rv:1.9.2.7) Gecko/20100625 Firefox/3.6.7"),
    preset("&Firefox 43", "Mozilla/5.0 (Windows NT 6.3; WOW64; rv:43.0) Gecko/20100101 Firefox/43.0"),
    preset("&Firefox Phone", "Mozilla/5.0 (Mobile; rv:18.0) Gecko/18.0 Firefox/18.0"),
    preset("&Firefox (Mac)", "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.8; rv:24.0) Gecko/20100101 Firefox/24.0"),
    preset("Chrome (Win)", "Mozilla/5.0 (Windows NT 6.3; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/48.0.2564.48 Safari/537.36"),
    preset("Chrome (Android)", "Mozilla/5.0 (Linux; Android 5.1.1; Nexus 5 Build/LMY48B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/43.0.2357.78 Mobile Safari/537.36"),
    preset("ChromeBook", "Mozilla/5.0 (X11; CrOS x86_64 6680.52.0) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/41.0.2272.74 Safari/537.36"),
    preset("GoogleBot Crawler", "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)"),
    preset("Kindle Fire (Silk)", "Mozilla/5.0 (Macintosh; U; Intel Mac OS X 10_6_3; en-us; Silk/1.0.22.79_10013310) AppleWebKit/533.16 (KHTML, like Gecko) Version/5.0 Safari/533.16 Silk-Accelerated=true"),
    preset("&Custom...", CUSTOM_USER_AGENT),
];
