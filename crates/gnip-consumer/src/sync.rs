//! Bring the remote rule set in line with a desired list

use crate::error::Result;
use gnip_client::{Rule, RuleRegistry};
use std::collections::HashSet;
use tracing::info;

/// Changes needed to turn the active rules into the desired ones
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RuleDiff {
    pub to_add: Vec<Rule>,
    pub to_remove: Vec<Rule>,
}

impl RuleDiff {
    pub fn between(active: &[Rule], desired: &[Rule]) -> Self {
        let active_set: HashSet<&Rule> = active.iter().collect();
        let desired_set: HashSet<&Rule> = desired.iter().collect();

        let mut seen = HashSet::new();
        let to_add = desired
            .iter()
            .filter(|r| !active_set.contains(*r) && seen.insert(*r))
            .cloned()
            .collect();

        let mut seen = HashSet::new();
        let to_remove = active
            .iter()
            .filter(|r| !desired_set.contains(*r) && seen.insert(*r))
            .cloned()
            .collect();

        Self { to_add, to_remove }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// List the active rules, then remove extras and add missing ones
pub async fn sync_rules<R>(registry: &R, desired: &[Rule]) -> Result<RuleDiff>
where
    R: RuleRegistry + ?Sized,
{
    let active = registry.list_active_rules().await?;
    let diff = RuleDiff::between(&active, desired);
    if diff.is_empty() {
        info!(active = active.len(), "Rules already in sync");
        return Ok(diff);
    }

    if !diff.to_remove.is_empty() {
        registry.remove_rules(&diff.to_remove).await?;
    }
    if !diff.to_add.is_empty() {
        registry.add_rules(&diff.to_add).await?;
    }

    info!(
        active = active.len(),
        added = diff.to_add.len(),
        removed = diff.to_remove.len(),
        "Rules synchronized"
    );
    Ok(diff)
}
