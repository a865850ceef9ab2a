use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RegisterError, RegisterResult};

/// Environment variable holding the default award.
pub const AWARD_ENV: &str = "DCC_AWARD";
/// Environment variable holding the default lab.
pub const LAB_ENV: &str = "DCC_LAB";

/// Settings applied while building payloads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterConfig {
    /// Award filled into POST payloads whose row leaves `award` empty.
    pub award: Option<String>,
    /// Lab filled into POST payloads whose row leaves `lab` empty.
    pub lab: Option<String>,
    /// Key under which each payload records its profile.
    pub profile_key: String,
    /// Key that carries the record identifier in PATCH payloads.
    pub identifier_key: String,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            award: None,
            lab: None,
            profile_key: "_profile".into(),
            identifier_key: "_enc_id".into(),
        }
    }
}

impl RegisterConfig {
    /// Defaults with `award` and `lab` taken from `DCC_AWARD` / `DCC_LAB`.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Fill any unset `award`/`lab` from `lookup`. Empty values are ignored.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if self.award.is_none() {
            self.award = non_empty(AWARD_ENV);
        }
        if self.lab.is_none() {
            self.lab = non_empty(LAB_ENV);
        }
        self
    }

    pub fn from_toml_str(s: &str) -> RegisterResult<Self> {
        toml::from_str(s).map_err(|e| RegisterError::Config(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> RegisterResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RegisterError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
