// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of CarbonWait.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Layered configuration: defaults, config file, CI inputs, command line

use carbonwait_api::RetryPolicy;
use carbonwait_api::geo::DEFAULT_IPINFO_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Files picked up from the working directory when no `--config` is given
pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["carbonwait.toml", "carbonwait.json"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("delay tolerance is required (set INPUT_DELAYTOLERANCE or --delay-tolerance)")]
    MissingTolerance,

    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

fn default_ipinfo_url() -> String {
    DEFAULT_IPINFO_URL.to_string()
}

fn default_10() -> u64 {
    10
}

fn default_500() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ActionConfig {
    /// How long the job may be postponed, in minutes
    #[serde(default, alias = "delayTolerance")]
    pub delay_tolerance_minutes: Option<u32>,

    /// Carbon Aware SDK web API root
    #[serde(default, alias = "baseUrlCarbonApi")]
    pub carbon_api_base_url: String,

    /// Bearer token for the carbon API, forwarded untouched
    #[serde(default, alias = "authToken", skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    #[serde(default = "default_ipinfo_url")]
    pub ipinfo_base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipinfo_token: Option<String>,

    #[serde(default = "default_10")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_500")]
    pub retry_backoff_ms: u64,

    /// Region table replacing the embedded Azure one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions_file: Option<PathBuf>,

    /// Fixed runner location, skips the IP geolocation lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl std::fmt::Debug for ActionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionConfig")
            .field("delay_tolerance_minutes", &self.delay_tolerance_minutes)
            .field("carbon_api_base_url", &self.carbon_api_base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "***"))
            .field("ipinfo_base_url", &self.ipinfo_base_url)
            .field("ipinfo_token", &self.ipinfo_token.as_ref().map(|_| "***"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("regions_file", &self.regions_file)
            .field("location", &self.location)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            delay_tolerance_minutes: None,
            carbon_api_base_url: String::new(),
            auth_token: None,
            ipinfo_base_url: default_ipinfo_url(),
            ipinfo_token: None,
            request_timeout_secs: default_10(),
            retry_backoff_ms: default_500(),
            regions_file: None,
            location: None,
            log_level: default_log_level(),
        }
    }
}

impl ActionConfig {
    /// Load the file layer then apply CI inputs from the process environment.
    ///
    /// `explicit` must exist when given. Otherwise the first of
    /// [`CONFIG_FILE_CANDIDATES`] found in the working directory is used, or
    /// the defaults when there is none.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match CONFIG_FILE_CANDIDATES
                .iter()
                .map(Path::new)
                .find(|p| p.is_file())
            {
                Some(path) => Self::from_file(path)?,
                None => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a config file, JSON for `.json` and TOML for anything else
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            toml::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Override fields from environment-style inputs.
    ///
    /// GitHub Actions inputs (`INPUT_*`) win over `CARBONWAIT_*`. Blank values
    /// count as unset since the runner exports every declared input.
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |keys: &[&str]| -> Option<(String, String)> {
            keys.iter().find_map(|key| {
                lookup(key)
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .map(|v| ((*key).to_string(), v))
            })
        };

        if let Some((key, value)) = get(&["INPUT_DELAYTOLERANCE", "CARBONWAIT_DELAY_TOLERANCE"]) {
            self.delay_tolerance_minutes = Some(parse_number(&key, &value)?);
        }
        if let Some((_, value)) = get(&["INPUT_BASEURLCARBONAPI", "CARBONWAIT_CARBON_API_URL"]) {
            self.carbon_api_base_url = value;
        }
        if let Some((_, value)) = get(&["INPUT_AUTHTOKEN", "CARBONWAIT_AUTH_TOKEN"]) {
            self.auth_token = Some(value);
        }
        if let Some((_, value)) = get(&["CARBONWAIT_IPINFO_URL"]) {
            self.ipinfo_base_url = value;
        }
        if let Some((_, value)) = get(&["CARBONWAIT_IPINFO_TOKEN"]) {
            self.ipinfo_token = Some(value);
        }
        if let Some((key, value)) = get(&["CARBONWAIT_REQUEST_TIMEOUT_SECS"]) {
            self.request_timeout_secs = parse_number(&key, &value)?;
        }
        if let Some((key, value)) = get(&["CARBONWAIT_RETRY_BACKOFF_MS"]) {
            self.retry_backoff_ms = parse_number(&key, &value)?;
        }
        if let Some((_, value)) = get(&["CARBONWAIT_REGIONS_FILE"]) {
            self.regions_file = Some(PathBuf::from(value));
        }
        if let Some((_, value)) = get(&["CARBONWAIT_LOCATION"]) {
            self.location = Some(value);
        }
        if let Some((_, value)) = get(&["CARBONWAIT_LOG_LEVEL"]) {
            self.log_level = value;
        }

        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.delay_tolerance_minutes.is_none() {
            return Err(ConfigError::MissingTolerance);
        }
        if self.carbon_api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "carbon_api_base_url cannot be empty".to_string(),
            ));
        }
        if self.location.is_none() && self.ipinfo_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "ipinfo_base_url cannot be empty when no location is configured".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn delay_tolerance(&self) -> ConfigResult<u32> {
        self.delay_tolerance_minutes
            .ok_or(ConfigError::MissingTolerance)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_secs(self.request_timeout_secs),
            backoff: Duration::from_millis(self.retry_backoff_ms),
            ..RetryPolicy::default()
        }
    }
}

fn parse_number<T>(key: &str, value: &str) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ActionConfig::default();
        assert_eq!(config.delay_tolerance_minutes, None);
        assert_eq!(config.ipinfo_base_url, "https://ipinfo.io");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.retry_backoff_ms, 500);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let config: ActionConfig = toml::from_str(
            r#"
            delay_tolerance_minutes = 90
            carbon_api_base_url = "http://localhost:5073"
            "#,
        )
        .unwrap();
        assert_eq!(config.delay_tolerance_minutes, Some(90));
        assert_eq!(config.request_timeout_secs, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_file_accepts_action_input_names() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"delayTolerance": 45, "baseUrlCarbonApi": "http://carbon", "authToken": "t"}}"#
        )
        .unwrap();

        let config = ActionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.delay_tolerance_minutes, Some(45));
        assert_eq!(config.carbon_api_base_url, "http://carbon");
        assert_eq!(config.auth_token.as_deref(), Some("t"));
    }

    #[test]
    fn test_toml_file_and_parse_error() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "location = \"Virginia\"").unwrap();
        let config = ActionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.location.as_deref(), Some("Virginia"));

        let mut broken = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(broken, "delay_tolerance_minutes = \"soon\"").unwrap();
        let result = ActionConfig::from_file(broken.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ActionConfig::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config: ActionConfig = toml::from_str(
            r#"
            delay_tolerance_minutes = 10
            carbon_api_base_url = "http://from-file"
            "#,
        )
        .unwrap();

        config
            .apply_env(env(&[
                ("INPUT_DELAYTOLERANCE", "120"),
                ("INPUT_BASEURLCARBONAPI", "http://from-input"),
                ("INPUT_AUTHTOKEN", "secret"),
            ]))
            .unwrap();

        assert_eq!(config.delay_tolerance_minutes, Some(120));
        assert_eq!(config.carbon_api_base_url, "http://from-input");
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_action_input_wins_over_prefixed_env() {
        let mut config = ActionConfig::default();
        config
            .apply_env(env(&[
                ("INPUT_DELAYTOLERANCE", "30"),
                ("CARBONWAIT_DELAY_TOLERANCE", "60"),
                ("CARBONWAIT_LOCATION", "Texas"),
                ("CARBONWAIT_REQUEST_TIMEOUT_SECS", "3"),
            ]))
            .unwrap();

        assert_eq!(config.delay_tolerance_minutes, Some(30));
        assert_eq!(config.location.as_deref(), Some("Texas"));
        assert_eq!(config.retry_policy().timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut config = ActionConfig {
            delay_tolerance_minutes: Some(15),
            ..ActionConfig::default()
        };
        config
            .apply_env(env(&[("INPUT_DELAYTOLERANCE", "  "), ("INPUT_AUTHTOKEN", "")]))
            .unwrap();

        assert_eq!(config.delay_tolerance_minutes, Some(15));
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn test_non_integer_tolerance_rejected() {
        for bad in ["abc", "-5", "1.5"] {
            let mut config = ActionConfig::default();
            let result = config.apply_env(env(&[("INPUT_DELAYTOLERANCE", bad)]));
            assert!(
                matches!(result, Err(ConfigError::InvalidValue { ref key, .. }) if key == "INPUT_DELAYTOLERANCE"),
                "'{bad}' should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let missing_tolerance = ActionConfig {
            carbon_api_base_url: "http://carbon".to_string(),
            ..ActionConfig::default()
        };
        assert!(matches!(
            missing_tolerance.validate(),
            Err(ConfigError::MissingTolerance)
        ));

        let empty_url = ActionConfig {
            delay_tolerance_minutes: Some(5),
            ..ActionConfig::default()
        };
        assert!(matches!(empty_url.validate(), Err(ConfigError::Invalid(_))));

        let zero_timeout = ActionConfig {
            delay_tolerance_minutes: Some(5),
            carbon_api_base_url: "http://carbon".to_string(),
            request_timeout_secs: 0,
            ..ActionConfig::default()
        };
        assert!(matches!(zero_timeout.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_tolerance_is_valid() {
        let config = ActionConfig {
            delay_tolerance_minutes: Some(0),
            carbon_api_base_url: "http://carbon".to_string(),
            ..ActionConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.delay_tolerance().unwrap(), 0);
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let config = ActionConfig {
            auth_token: Some("carbon-secret".to_string()),
            ipinfo_token: Some("ipinfo-secret".to_string()),
            location: Some("Virginia".to_string()),
            ..ActionConfig::default()
        };

        let printed = format!("{config:?}");
        assert!(!printed.contains("carbon-secret"));
        assert!(!printed.contains("ipinfo-secret"));
        assert!(printed.contains("auth_token: Some(\"***\")"));
        assert!(printed.contains("Virginia"));
    }

    #[test]
    fn test_retry_policy_from_config() {
        let config = ActionConfig {
            retry_backoff_ms: 250,
            ..ActionConfig::default()
        };
        let policy = config.retry_policy();
        assert_eq!(policy.backoff, Duration::from_millis(250));
        assert_eq!(policy.max_attempts, 2);
    }
}
