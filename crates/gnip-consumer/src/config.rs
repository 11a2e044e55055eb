use crate::error::{ConsumerError, Result};
use gnip_client::{Credential, Endpoints, Rule};
use std::env;
use std::time::Duration;

const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Consumer configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub credential: Credential,
    pub account: String,
    pub endpoints: Endpoints,
    /// Desired rule set from `GNIP_RULES` (comma separated); `None` when unset
    pub rules: Option<Vec<Rule>>,
    pub idle_timeout: Duration,
    pub max_reconnect_attempts: u32,
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    ConsumerError::Config(format!("{} environment variable is required", key))
                })
        };

        let username = required("GNIP_USERNAME")?;
        let password = required("GNIP_PASSWORD")?;
        let account = required("GNIP_ACCOUNT")?;

        let defaults = Endpoints::default();
        let endpoints = Endpoints {
            stream_base_url: lookup("GNIP_STREAM_URL").unwrap_or(defaults.stream_base_url),
            api_base_url: lookup("GNIP_API_URL").unwrap_or(defaults.api_base_url),
        };

        let rules = lookup("GNIP_RULES").map(|s| parse_rules(&s));

        let idle_timeout = lookup("GNIP_IDLE_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS));

        let max_reconnect_attempts = lookup("GNIP_MAX_RECONNECT_ATTEMPTS")
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_RECONNECT_ATTEMPTS);

        Ok(Self {
            credential: Credential::new(username, password),
            account,
            endpoints,
            rules,
            idle_timeout,
            max_reconnect_attempts,
        })
    }

    /// Rules to synchronize against. An unset `GNIP_RULES` is an error; set
    /// to an empty string it means "no rules".
    pub fn desired_rules(&self) -> Result<&[Rule]> {
        self.rules.as_deref().ok_or_else(|| {
            ConsumerError::Config("GNIP_RULES environment variable is required".to_string())
        })
    }
}

fn parse_rules(s: &str) -> Vec<Rule> {
    s.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(Rule::from)
        .collect()
}
