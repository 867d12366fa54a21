//! Client configuration from environment variables.
//!
//! `.env` is loaded by the binary before [`ClientConfig::from_env`] runs.

use std::time::Duration;

use crate::crypto::DEFAULT_PAYLOAD_SECRET;
use crate::session::DEFAULT_LOCALE;
use crate::storage::keychain::DEFAULT_SERVICE;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub locale: String,
    pub payload_secret: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub keychain_service: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            payload_secret: DEFAULT_PAYLOAD_SECRET.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            keychain_service: DEFAULT_SERVICE.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// API URL precedence: CLINIC_API_URL > VITE_API_URL > localhost default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let secs = |name: &str, fallback: Duration| match non_empty(name) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(n) => Duration::from_secs(n),
                Err(_) => {
                    log::warn!("Ignoring invalid {}={:?}", name, raw);
                    fallback
                }
            },
            None => fallback,
        };

        Self {
            api_url: non_empty("CLINIC_API_URL")
                .or_else(|| non_empty("VITE_API_URL"))
                .unwrap_or(defaults.api_url),
            locale: non_empty("CLINIC_LOCALE").unwrap_or(defaults.locale),
            payload_secret: non_empty("CLINIC_PAYLOAD_SECRET").unwrap_or(defaults.payload_secret),
            timeout: secs("CLINIC_TIMEOUT_SECS", defaults.timeout),
            connect_timeout: secs("CLINIC_CONNECT_TIMEOUT_SECS", defaults.connect_timeout),
            keychain_service: non_empty("CLINIC_KEYCHAIN_SERVICE")
                .unwrap_or(defaults.keychain_service),
        }
    }
}
