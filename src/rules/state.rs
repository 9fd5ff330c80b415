use super::prefs::{preference, PrefField, PrefValue, PREFERENCES};
use super::{Result, RulesError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// Host suffix that 401 auto-authentication trusts besides plain host names.
pub const DEFAULT_TRUSTED_HOST_SUFFIX: &str = "example.com";

/// A `from -> to` rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

/// Everything the handlers consult, passed by reference into each call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesState {
    pub bold_uri: Option<String>,
    pub bp_request_uri: Option<String>,
    /// Stored upper-cased.
    pub bp_method: Option<String>,
    pub bp_response_uri: Option<String>,
    /// Only positive codes ever match.
    pub bp_status: Option<i32>,
    /// `from` is stored lower-cased.
    pub host_replace: Option<Replacement>,
    pub url_replace: Option<Replacement>,

    pub hide_304s: bool,
    pub auto_auth: bool,
    pub user_agent: Option<String>,
    pub simulate_modem: bool,
    pub disable_caching: bool,
    pub cache_always_fresh: bool,
    pub trusted_host_suffix: String,
}

impl Default for RulesState {
    fn default() -> Self {
        Self {
            bold_uri: None,
            bp_request_uri: None,
            bp_method: None,
            bp_response_uri: None,
            bp_status: None,
            host_replace: None,
            url_replace: None,
            hide_304s: false,
            auto_auth: false,
            user_agent: None,
            simulate_modem: false,
            disable_caching: false,
            cache_always_fresh: false,
            trusted_host_suffix: DEFAULT_TRUSTED_HOST_SUFFIX.to_string(),
        }
    }
}

impl RulesState {
    /// Read a state file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| RulesError::Json {
                path: path.to_path_buf(),
                source,
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(RulesError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).map_err(|source| RulesError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        write_file(path, &text)
    }

    pub fn field(&self, field: PrefField) -> PrefValue {
        match field {
            PrefField::BpMethod => PrefValue::Text(self.bp_method.clone()),
            PrefField::BpRequestUri => PrefValue::Text(self.bp_request_uri.clone()),
            PrefField::BpResponseUri => PrefValue::Text(self.bp_response_uri.clone()),
            PrefField::Hide304s => PrefValue::Bool(self.hide_304s),
            PrefField::AutoAuth => PrefValue::Bool(self.auto_auth),
            PrefField::UserAgent => PrefValue::Text(self.user_agent.clone()),
            PrefField::SimulateModem => PrefValue::Bool(self.simulate_modem),
            PrefField::DisableCaching => PrefValue::Bool(self.disable_caching),
            PrefField::CacheAlwaysFresh => PrefValue::Bool(self.cache_always_fresh),
        }
    }

    /// Assign a field; the value must match the field's type.
    pub fn set_field(&mut self, field: PrefField, value: PrefValue) -> Result<()> {
        match (field, value) {
            (PrefField::BpMethod, PrefValue::Text(v)) => {
                self.bp_method = v.map(|m| m.to_uppercase())
            }
            (PrefField::BpRequestUri, PrefValue::Text(v)) => self.bp_request_uri = v,
            (PrefField::BpResponseUri, PrefValue::Text(v)) => self.bp_response_uri = v,
            (PrefField::UserAgent, PrefValue::Text(v)) => self.user_agent = v,
            (PrefField::Hide304s, PrefValue::Bool(v)) => self.hide_304s = v,
            (PrefField::AutoAuth, PrefValue::Bool(v)) => self.auto_auth = v,
            (PrefField::SimulateModem, PrefValue::Bool(v)) => self.simulate_modem = v,
            (PrefField::DisableCaching, PrefValue::Bool(v)) => self.disable_caching = v,
            (PrefField::CacheAlwaysFresh, PrefValue::Bool(v)) => self.cache_always_fresh = v,
            (field, _) => {
                return Err(RulesError::TypeMismatch {
                    key: field.name().to_string(),
                    expected: field.kind(),
                })
            }
        }
        Ok(())
    }

    /// Value bound to a preference storage key.
    pub fn pref(&self, key: &str) -> Result<PrefValue> {
        let entry =
            preference(key).ok_or_else(|| RulesError::UnknownPreference(key.to_string()))?;
        Ok(self.field(entry.field))
    }

    pub fn set_pref(&mut self, key: &str, value: PrefValue) -> Result<()> {
        let entry =
            preference(key).ok_or_else(|| RulesError::UnknownPreference(key.to_string()))?;
        self.set_field(entry.field, value)
            .map_err(|_| RulesError::TypeMismatch {
                key: key.to_string(),
                expected: entry.field.kind(),
            })
    }

    /// Storage key -> value for every preference that outlives the session.
    pub fn persisted_prefs(&self) -> BTreeMap<String, PrefValue> {
        PREFERENCES
            .iter()
            .filter(|entry| entry.persisted())
            .filter_map(|entry| entry.key.map(|key| (key.to_string(), self.field(entry.field))))
            .collect()
    }

    /// Apply a flat preference map. Ephemeral keys are accepted but not required.
    pub fn apply_prefs(&mut self, prefs: &BTreeMap<String, PrefValue>) -> Result<()> {
        for (key, value) in prefs {
            self.set_pref(key, value.clone())?;
        }
        Ok(())
    }

    /// Load persisted preferences; a missing file leaves the state unchanged.
    pub fn load_prefs(&mut self, path: &Path) -> Result<()> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(RulesError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let prefs: BTreeMap<String, PrefValue> =
            serde_json::from_str(&text).map_err(|source| RulesError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        self.apply_prefs(&prefs)
    }

    pub fn save_prefs(&self, path: &Path) -> Result<()> {
        let text =
            serde_json::to_string_pretty(&self.persisted_prefs()).map_err(|source| {
                RulesError::Json {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
        write_file(path, &text)
    }
}

fn write_file(path: &Path, text: &str) -> Result<()> {
    fs::write(path, format!("{text}\n")).map_err(|source| RulesError::Io {
        path: path.to_path_buf(),
        source,
    })
}
