//! Endpoint templates and per-account URLs

/// Production host for the PowerTrack stream
pub const DEFAULT_STREAM_BASE_URL: &str = "https://stream.gnip.com:443";
/// Production host for the rules APIs
pub const DEFAULT_API_BASE_URL: &str = "https://api.gnip.com:443";

const STREAM_SUFFIX: &str = "publishers/twitter/streams/track/Production.json";
const RULES_SUFFIX: &str = "publishers/twitter/streams/track/Production/rules.json";
const REPLAY_RULES_SUFFIX: &str = "publishers/twitter/replay/track/Production/rules.json";

/// Base URLs the per-account endpoints are derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub stream_base_url: String,
    pub api_base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            stream_base_url: DEFAULT_STREAM_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Point both the stream and the rules APIs at one host (useful for mocks)
    pub fn single_host(base_url: &str) -> Self {
        Self {
            stream_base_url: base_url.to_string(),
            api_base_url: base_url.to_string(),
        }
    }
}

/// Account identifier and the URLs derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountContext {
    account: String,
    stream_url: String,
    rules_url: String,
    replay_rules_url: String,
}

impl AccountContext {
    pub fn new(account: &str, endpoints: &Endpoints) -> Self {
        let encoded = urlencoding::encode(account);
        let stream_base = endpoints.stream_base_url.trim_end_matches('/');
        let api_base = endpoints.api_base_url.trim_end_matches('/');

        Self {
            account: account.to_string(),
            stream_url: format!("{}/accounts/{}/{}", stream_base, encoded, STREAM_SUFFIX),
            rules_url: format!("{}/accounts/{}/{}", api_base, encoded, RULES_SUFFIX),
            replay_rules_url: format!("{}/accounts/{}/{}", api_base, encoded, REPLAY_RULES_SUFFIX),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn stream_url(&self) -> &str {
        &self.stream_url
    }

    pub fn rules_url(&self) -> &str {
        &self.rules_url
    }

    pub fn replay_rules_url(&self) -> &str {
        &self.replay_rules_url
    }
}
