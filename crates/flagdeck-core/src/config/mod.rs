//! Runtime configuration for Flagdeck clients.
//!
//! Two fixed environment profiles (development and production) are selected
//! by a hostname heuristic, then individual values can be overridden from
//! `FLAGDECK_*` environment variables.

mod catalog;

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

pub use catalog::{
    CategoryCatalog, CategoryDefinition, OTHER_CATEGORY_ICON, OTHER_CATEGORY_NAME,
    OTHER_CATEGORY_PREFIX,
};

const PRODUCTION_API_BASE_URL: &str = "https://cmx-notification-be-production.up.railway.app/api";
const DEVELOPMENT_API_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_AUDIT_USER: &str = "Admin";

/// Which built-in profile a configuration starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentProfile {
    Development,
    Production,
}

impl EnvironmentProfile {
    /// `localhost` and `127.0.0.1` are development; anything else is production.
    pub fn for_hostname(hostname: &str) -> Self {
        match hostname.trim().to_ascii_lowercase().as_str() {
            "localhost" | "127.0.0.1" => Self::Development,
            _ => Self::Production,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for EnvironmentProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvironmentProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(Error::Config(format!("unknown profile '{other}'"))),
        }
    }
}

/// Values every client component reads its settings from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
    pub profile: EnvironmentProfile,
    /// Base URL without trailing slash, e.g. `http://localhost:8080/api`
    pub api_base_url: String,
    pub health_check_interval: Duration,
    /// How long a successful load is served from cache
    pub cache_timeout: Duration,
    pub max_audit_log_entries: usize,
    pub toast_duration: Duration,
    /// Retries after the first failed attempt of a load
    pub load_retry_count: u32,
    pub load_retry_delay: Duration,
    pub request_timeout: Duration,
    /// Name recorded as the acting user in audit entries
    pub audit_user: String,
}

impl EnvironmentConfig {
    pub fn production() -> Self {
        Self {
            profile: EnvironmentProfile::Production,
            api_base_url: PRODUCTION_API_BASE_URL.to_string(),
            health_check_interval: Duration::from_millis(30_000),
            cache_timeout: Duration::from_millis(300_000),
            max_audit_log_entries: 100,
            toast_duration: Duration::from_millis(5_000),
            load_retry_count: 2,
            load_retry_delay: Duration::from_millis(1_000),
            request_timeout: Duration::from_secs(10),
            audit_user: DEFAULT_AUDIT_USER.to_string(),
        }
    }

    pub fn development() -> Self {
        Self {
            profile: EnvironmentProfile::Development,
            api_base_url: DEVELOPMENT_API_BASE_URL.to_string(),
            cache_timeout: Duration::from_millis(60_000),
            max_audit_log_entries: 50,
            ..Self::production()
        }
    }

    pub fn for_profile(profile: EnvironmentProfile) -> Self {
        match profile {
            EnvironmentProfile::Development => Self::development(),
            EnvironmentProfile::Production => Self::production(),
        }
    }

    pub fn for_hostname(hostname: &str) -> Self {
        Self::for_profile(EnvironmentProfile::for_hostname(hostname))
    }

    /// Resolve configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    /// Resolve configuration through an arbitrary variable lookup.
    ///
    /// The profile comes from `FLAGDECK_PROFILE`, else from the host of
    /// `FLAGDECK_API_URL`, else production.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = optional_trimmed(&lookup, "FLAGDECK_API_URL");

        let profile = match optional_trimmed(&lookup, "FLAGDECK_PROFILE") {
            Some(raw) => raw.parse()?,
            None => api_url
                .as_deref()
                .and_then(url_host)
                .map_or(EnvironmentProfile::Production, EnvironmentProfile::for_hostname),
        };

        let mut config = Self::for_profile(profile);
        if let Some(url) = api_url {
            config = config.with_api_base_url(&url)?;
        }
        if let Some(millis) = parse_millis(&lookup, "FLAGDECK_HEALTH_CHECK_INTERVAL_MS")? {
            if millis.is_zero() {
                return Err(Error::Config(
                    "FLAGDECK_HEALTH_CHECK_INTERVAL_MS must be greater than 0".to_string(),
                ));
            }
            config.health_check_interval = millis;
        }
        if let Some(millis) = parse_millis(&lookup, "FLAGDECK_CACHE_TIMEOUT_MS")? {
            config.cache_timeout = millis;
        }
        if let Some(millis) = parse_millis(&lookup, "FLAGDECK_TOAST_DURATION_MS")? {
            config.toast_duration = millis;
        }
        if let Some(raw) = optional_trimmed(&lookup, "FLAGDECK_MAX_AUDIT_LOG_ENTRIES") {
            let max = raw.parse::<usize>().ok().filter(|max| *max > 0).ok_or_else(|| {
                Error::Config("FLAGDECK_MAX_AUDIT_LOG_ENTRIES must be a positive integer".to_string())
            })?;
            config.max_audit_log_entries = max;
        }
        if let Some(user) = optional_trimmed(&lookup, "FLAGDECK_USER") {
            config.audit_user = user;
        }

        Ok(config)
    }

    /// Replace the API base URL, validating the scheme.
    pub fn with_api_base_url(mut self, url: &str) -> Result<Self> {
        let url = url.trim();
        if !is_http_url(url) {
            return Err(Error::Config(format!(
                "API base URL must start with http:// or https://, got '{url}'"
            )));
        }
        self.api_base_url = url.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Collection endpoint, `<base>/feature-flags`
    pub fn flags_url(&self) -> String {
        format!("{}/feature-flags", self.api_base_url)
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self::production()
    }
}

fn optional_trimmed(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    normalize_text_option(lookup(name))
}

fn parse_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<Duration>> {
    optional_trimmed(lookup, name)
        .map(|raw| {
            raw.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| Error::Config(format!("{name} must be an integer number of milliseconds")))
        })
        .transpose()
}

fn url_host(url: &str) -> Option<&str> {
    let rest = url.split_once("://")?.1;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    let host = host.split(':').next()?;
    (!host.is_empty()).then_some(host)
}
