//! Client configuration.
//!
//! The API base URL and the router's history base are explicit values handed
//! to `LoanService` and `Router`. Nothing reads the environment behind the
//! caller's back, so several clients with different base URLs can coexist.

use std::collections::HashMap;
use std::env;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_ROUTER_BASE: &str = "/";

pub const API_URL_VAR: &str = "APP_API_URL";
/// Older name for the API URL, still honored so existing `.env` files keep
/// working. `APP_API_URL` wins when both are set.
pub const LEGACY_API_URL_VAR: &str = "VUE_APP_API_URL";
pub const ROUTER_BASE_VAR: &str = "BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Backend base URL; every API request is relative to it.
    pub api_url: String,
    /// Prefix under which the application's routes are served.
    pub router_base: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            router_base: DEFAULT_ROUTER_BASE.to_string(),
        }
    }
}

impl AppConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Read `APP_API_URL` (or `VUE_APP_API_URL`) and `BASE_URL`, loading a
    /// `.env` file first if one exists. Unset variables fall back to the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable is set to something
    /// unusable, including a value that is not valid Unicode.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let mut vars = HashMap::new();
        for key in [API_URL_VAR, LEGACY_API_URL_VAR, ROUTER_BASE_VAR] {
            if let Some(value) = read_var(key)? {
                vars.insert(key, value);
            }
        }
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (api_url_key, api_url) = match lookup(API_URL_VAR) {
            Some(value) => (API_URL_VAR, value),
            None => match lookup(LEGACY_API_URL_VAR) {
                Some(value) => (LEGACY_API_URL_VAR, value),
                None => (API_URL_VAR, DEFAULT_API_URL.to_string()),
            },
        };
        let router_base =
            lookup(ROUTER_BASE_VAR).unwrap_or_else(|| DEFAULT_ROUTER_BASE.to_string());

        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: api_url_key.to_string(),
                message: "must start with http:// or https://".to_string(),
            });
        }
        if !router_base.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                key: ROUTER_BASE_VAR.to_string(),
                message: "must start with '/'".to_string(),
            });
        }

        Ok(Self {
            api_url,
            router_base,
        })
    }
}

fn read_var(key: &str) -> Result<Option<String>, ConfigError> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "value is not valid Unicode".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.router_base, "/");
    }

    #[test]
    fn reads_both_variables() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("APP_API_URL", "https://api.example.org"),
            ("BASE_URL", "/app/"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://api.example.org");
        assert_eq!(config.router_base, "/app/");
    }

    #[test]
    fn rejects_api_url_without_scheme() {
        let err = AppConfig::from_lookup(lookup_from(&[("APP_API_URL", "localhost:5000")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "APP_API_URL"));
    }

    #[test]
    fn rejects_relative_router_base() {
        let err = AppConfig::from_lookup(lookup_from(&[("BASE_URL", "app")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "BASE_URL"));
    }

    #[test]
    fn new_keeps_default_router_base() {
        let config = AppConfig::new("http://10.0.0.2:5000");
        assert_eq!(config.api_url, "http://10.0.0.2:5000");
        assert_eq!(config.router_base, "/");
    }

    #[test]
    fn legacy_api_url_is_a_fallback() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("VUE_APP_API_URL", "http://10.0.0.7:5000")]))
                .unwrap();
        assert_eq!(config.api_url, "http://10.0.0.7:5000");

        let config = AppConfig::from_lookup(lookup_from(&[
            ("VUE_APP_API_URL", "http://old.example.org"),
            ("APP_API_URL", "http://new.example.org"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "http://new.example.org");
    }

    #[test]
    fn invalid_legacy_api_url_names_the_legacy_key() {
        let err = AppConfig::from_lookup(lookup_from(&[("VUE_APP_API_URL", "localhost")]))
            .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "VUE_APP_API_URL")
        );
    }

    #[test]
    fn unset_variable_reads_as_none() {
        assert_eq!(read_var("MICROFIN_TEST_SURELY_UNSET").unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_variable_is_invalid() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let key = "MICROFIN_TEST_NOT_UNICODE";
        env::set_var(key, OsString::from_vec(vec![0x66, 0x6f, 0xff]));
        let err = read_var(key).unwrap_err();
        env::remove_var(key);
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "MICROFIN_TEST_NOT_UNICODE"));
    }
}
