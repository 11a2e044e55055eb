//! Rule, rules envelope and credential types
//!
//! The envelope mirrors the PowerTrack rules API body:
//! `{"rules": [{"value": "<track expression>"}, ...]}`.

use crate::error::{GnipError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single PowerTrack track rule, identified by its value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    value: String,
}

impl Rule {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl From<&str> for Rule {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Rule {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Wire envelope used to submit and retrieve rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// Borrowed form of [`RuleSet`] so encoding never clones the rules
#[derive(Serialize)]
struct RuleSetRef<'a> {
    rules: &'a [Rule],
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Serialize `rules` into an envelope body
    pub fn encode(rules: &[Rule]) -> Result<Vec<u8>> {
        serde_json::to_vec(&RuleSetRef { rules }).map_err(GnipError::Encode)
    }

    /// Parse an envelope body returned by the rules endpoint
    pub fn decode(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(GnipError::Decode)
    }

    pub fn into_rules(self) -> Vec<Rule> {
        self.rules
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self::new(rules)
    }
}

/// Basic-auth credential for a Gnip account
#[derive(Clone)]
pub struct Credential {
    username: String,
    password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
