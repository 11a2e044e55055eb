//! Rule management against the PowerTrack rules API

use crate::client::{api_error, GnipClient};
use crate::error::Result;
use crate::types::{Rule, RuleSet};
use async_trait::async_trait;
use reqwest::Method;

/// Read and mutate the remote rule state of an account
///
/// Values are passed through as-is: deduplication and syntax checks are the
/// remote service's job.
#[async_trait]
pub trait RuleRegistry: Send + Sync {
    /// Fetch the account's active rules in the order the service returns them
    async fn list_active_rules(&self) -> Result<Vec<Rule>>;

    /// Add rules to the live stream's rule set
    async fn add_rules(&self, rules: &[Rule]) -> Result<()>;

    /// Remove rules from the live stream's rule set
    async fn remove_rules(&self, rules: &[Rule]) -> Result<()>;

    /// Add rules to the replay rule set used for backfill queries
    async fn add_rules_to_replay(&self, rules: &[Rule]) -> Result<()>;
}

impl GnipClient {
    /// Encode, send, and drain one rules mutation
    async fn submit_rules(&self, method: Method, url: &str, rules: &[Rule]) -> Result<()> {
        let body = RuleSet::encode(rules)?;
        let response = self.send(method, url, Some(body)).await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        Ok(())
    }
}

#[async_trait]
impl RuleRegistry for GnipClient {
    async fn list_active_rules(&self) -> Result<Vec<Rule>> {
        let response = self
            .send(Method::GET, self.account().rules_url(), None)
            .await?;

        // Consuming the response releases the connection on every path below
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        Ok(RuleSet::decode(&body)?.into_rules())
    }

    async fn add_rules(&self, rules: &[Rule]) -> Result<()> {
        self.submit_rules(Method::POST, self.account().rules_url(), rules)
            .await
    }

    async fn remove_rules(&self, rules: &[Rule]) -> Result<()> {
        self.submit_rules(Method::DELETE, self.account().rules_url(), rules)
            .await
    }

    async fn add_rules_to_replay(&self, rules: &[Rule]) -> Result<()> {
        self.submit_rules(Method::POST, self.account().replay_rules_url(), rules)
            .await
    }
}
