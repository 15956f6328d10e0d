//! Rule status reconciliation.
//!
//! Rules are selected by explicit id, by tag or by publisher, and every
//! selected rule ends up with the configured status. The selections are
//! independent; each PATCH only sets one rule's status field, so the order
//! between them does not change the outcome. The disabled-rules override
//! runs last.
//!
//! A status call is successful only when the platform answers with the
//! exact expected status line. Other answers are logged and the loop goes
//! on; transport failures abort.

use crate::api::{PageQuery, Rule, RuleStatus, WafApi};
use crate::collector::{collect_all, CollectError};
use crate::config::Config;
use crate::error::Result;
use tracing::{error, info, instrument};

pub const RULE_STATUS_OK: &str = "200 OK";
pub const WAF_STATUS_ACCEPTED: &str = "202 Accepted";

/// Outcome of one or more reconciliation passes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Rules whose status was set.
    pub applied: usize,
    /// Rule ids or tags whose status call was answered with something else.
    pub failed: Vec<String>,
    /// Tags that matched no rule.
    pub skipped_tags: Vec<String>,
}

impl ReconcileSummary {
    pub fn merge(&mut self, other: ReconcileSummary) {
        self.applied += other.applied;
        self.failed.extend(other.failed);
        self.skipped_tags.extend(other.skipped_tags);
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Identifies the WAF whose rule statuses are being changed.
#[derive(Debug, Clone, Copy)]
pub struct WafTarget<'a> {
    pub service_id: &'a str,
    pub waf_id: &'a str,
}

impl<'a> WafTarget<'a> {
    pub fn new(service_id: &'a str, waf_id: &'a str) -> Self {
        Self { service_id, waf_id }
    }
}

/// One PATCH per rule id.
pub async fn apply_rule_ids(
    api: &dyn WafApi,
    waf: WafTarget<'_>,
    rule_ids: &[String],
    status: RuleStatus,
) -> Result<ReconcileSummary> {
    let mut summary = ReconcileSummary::default();

    for rule_id in rule_ids {
        let response = api
            .patch_rule_status(waf.service_id, waf.waf_id, rule_id, status)
            .await?;

        if response.is(RULE_STATUS_OK) {
            info!("Rule {} was configured in the WAF with action {}", rule_id, status);
            summary.applied += 1;
        } else {
            error!(
                "Could not set status {} on rule {}: {} {}",
                status, rule_id, response.status, response.body
            );
            summary.failed.push(rule_id.clone());
        }
    }

    Ok(summary)
}

/// One bulk status call per tag. A tag matching no rule is skipped.
#[instrument(skip(api, waf, tags), fields(waf_id = waf.waf_id))]
pub async fn apply_tags(
    api: &dyn WafApi,
    waf: WafTarget<'_>,
    tags: &[String],
    status: RuleStatus,
    force: bool,
) -> Result<ReconcileSummary> {
    let mut summary = ReconcileSummary::default();

    for tag in tags {
        let query = PageQuery::new("/wafs/tags")
            .filter("filter[name]", tag.as_str())
            .filter("include", "rules");

        let matched = match collect_all::<Rule>(api, &query).await {
            Ok(collected) if collected.included.is_empty() => collected.len(),
            Ok(collected) => collected.included.len(),
            Err(CollectError::NoRecords { .. }) => {
                error!(
                    "Could not find any rules with tag: {}, please make sure it exists. Moving to the next tag",
                    tag
                );
                summary.skipped_tags.push(tag.clone());
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let response = api
            .set_tag_status(waf.service_id, waf.waf_id, tag, status, force)
            .await?;

        if response.is(RULE_STATUS_OK) {
            info!("{} {} rules on the WAF for tag: {}", status, matched, tag);
            summary.applied += matched;
        } else {
            error!(
                "Could not set status {} on rule tag {}: {} {}",
                status, tag, response.status, response.body
            );
            summary.failed.push(tag.clone());
        }
    }

    Ok(summary)
}

/// Every rule of each publisher, resolved across all catalog pages before
/// the first PATCH. A publisher without rules is fatal.
#[instrument(skip(api, waf, publishers), fields(waf_id = waf.waf_id))]
pub async fn apply_publishers(
    api: &dyn WafApi,
    waf: WafTarget<'_>,
    publishers: &[String],
    status: RuleStatus,
) -> Result<ReconcileSummary> {
    let mut summary = ReconcileSummary::default();

    for publisher in publishers {
        let query = PageQuery::new("/wafs/rules").filter("filter[publisher]", publisher.as_str());
        let rules = collect_all::<Rule>(api, &query).await?;
        info!("Publisher {}: {} rules", publisher, rules.len());

        let rule_ids: Vec<String> = rules.records.into_iter().map(|rule| rule.id).collect();
        summary.merge(apply_rule_ids(api, waf, &rule_ids, status).await?);
    }

    Ok(summary)
}

/// Force the given rules to `disabled`, whatever the configured action.
pub async fn apply_disabled(api: &dyn WafApi, waf: WafTarget<'_>, rule_ids: &[String]) -> Result<ReconcileSummary> {
    let summary = apply_rule_ids(api, waf, rule_ids, RuleStatus::Disabled).await?;
    info!("{} rules disabled via disabled_rules", summary.applied);
    Ok(summary)
}

/// Apply every selection of the configuration to one WAF.
#[instrument(skip(api, waf, config), fields(service_id = waf.service_id, waf_id = waf.waf_id))]
pub async fn reconcile(api: &dyn WafApi, waf: WafTarget<'_>, config: &Config, force: bool) -> Result<ReconcileSummary> {
    let mut summary = ReconcileSummary::default();

    summary.merge(apply_tags(api, waf, &config.tags, config.action, force).await?);
    summary.merge(apply_publishers(api, waf, &config.publisher, config.action).await?);

    let rules = rule_id_strings(&config.rules);
    summary.merge(apply_rule_ids(api, waf, &rules, config.action).await?);

    let disabled = rule_id_strings(&config.disabled_rules);
    summary.merge(apply_disabled(api, waf, &disabled).await?);

    info!(
        applied = summary.applied,
        failed = summary.failed.len(),
        skipped_tags = summary.skipped_tags.len(),
        "Rule reconciliation finished"
    );
    Ok(summary)
}

/// Push pending rule status changes into the WAF's active rule set.
pub async fn patch_ruleset(api: &dyn WafApi, waf: WafTarget<'_>) -> Result<()> {
    api.update_ruleset(waf.service_id, waf.waf_id).await?;
    info!("Rule set of WAF {} updated", waf.waf_id);
    Ok(())
}

/// Enable or disable a WAF. Returns whether the platform accepted it.
#[instrument(skip(api))]
pub async fn change_status(api: &dyn WafApi, waf_id: &str, status: &str) -> Result<bool> {
    let response = api.change_waf_status(waf_id, status).await?;
    if response.is(WAF_STATUS_ACCEPTED) {
        info!("WAF {} status was changed to {}", waf_id, status);
        Ok(true)
    } else {
        error!(
            "Could not change the status of WAF {} to {}: received {} with response {}",
            waf_id, status, response.status, response.body
        );
        Ok(false)
    }
}

#[instrument(skip(api))]
pub async fn set_configuration_set(api: &dyn WafApi, waf_id: &str, config_set_id: &str) -> Result<()> {
    api.set_configuration_set(waf_id, config_set_id).await?;
    info!("WAF {} bound to configuration set {}", waf_id, config_set_id);
    Ok(())
}

fn rule_id_strings(ids: &[u64]) -> Vec<String> {
    ids.iter().map(u64::to_string).collect()
}
