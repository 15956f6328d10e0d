//! Read-only views: rule statuses of a WAF, the rule catalog and the
//! configuration sets.

use crate::api::{ConfigSet, PageQuery, Rule, RuleAttributes, WafApi};
use crate::collector::{collect_all, Collected};
use crate::error::Result;
use serde_json::Value;
use tracing::{error, info, instrument};

pub fn rule_statuses_query(service_id: &str, waf_id: &str) -> PageQuery {
    PageQuery::new(format!("/service/{}/wafs/{}/rule_statuses", service_id, waf_id))
}

/// Rule statuses of a WAF, partitioned by status.
#[derive(Debug, Clone)]
pub struct StatusPartition<T> {
    pub block: Vec<T>,
    pub log: Vec<T>,
    pub disabled: Vec<T>,
}

impl<T> Default for StatusPartition<T> {
    fn default() -> Self {
        Self {
            block: Vec::new(),
            log: Vec::new(),
            disabled: Vec::new(),
        }
    }
}

impl<T> StatusPartition<T> {
    /// Sort `items` by the status string `status_of` returns. Unknown
    /// statuses are dropped.
    pub fn partition<I, F>(items: I, status_of: F) -> Self
    where
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> &str,
    {
        let mut partition = Self::default();
        for item in items {
            match status_of(&item) {
                "block" => partition.block.push(item),
                "log" => partition.log.push(item),
                "disabled" => partition.disabled.push(item),
                _ => {}
            }
        }
        partition
    }

    pub fn len(&self) -> usize {
        self.block.len() + self.log.len() + self.disabled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A rule status entry joined with its catalog details.
#[derive(Debug, Clone)]
pub struct RuleStatusEntry {
    pub modsec_rule_id: String,
    pub status: String,
    pub details: Option<RuleAttributes>,
}

impl RuleStatusEntry {
    pub fn describe(&self) -> String {
        match self.details {
            Some(ref info) => format!(
                "Rule ID: {}\tStatus: {}\tParanoia: {}\tPublisher: {}\tMessage: {}",
                self.modsec_rule_id, self.status, info.paranoia_level, info.publisher, info.message
            ),
            None => format!("Rule ID: {}\tStatus: {}", self.modsec_rule_id, self.status),
        }
    }
}

/// Catalog entry of a ModSecurity rule id, from a single filtered page.
pub async fn rule_info(api: &dyn WafApi, modsec_rule_id: &str) -> Result<Option<Rule>> {
    let query = PageQuery::new("/wafs/rules")
        .filter("page[size]", "10")
        .filter("filter[rule_id]", modsec_rule_id);
    let page = api.fetch_page(&query, 1).await?;

    match page.data.into_iter().last() {
        Some(value) => Ok(Some(serde_json::from_value(value).map_err(crate::api::ApiError::from)?)),
        None => Ok(None),
    }
}

/// Rule statuses of a WAF, each enriched with catalog details. A failed
/// lookup leaves the details empty.
#[instrument(skip(api))]
pub async fn list_rule_statuses(
    api: &dyn WafApi,
    service_id: &str,
    waf_id: &str,
) -> Result<StatusPartition<RuleStatusEntry>> {
    let statuses: Collected<Rule> = collect_all(api, &rule_statuses_query(service_id, waf_id)).await?;
    let partition = StatusPartition::partition(statuses.records, |r: &Rule| r.attributes.status.as_str());

    let mut enriched = StatusPartition::default();
    for (rules, out) in [
        (partition.block, &mut enriched.block),
        (partition.log, &mut enriched.log),
        (partition.disabled, &mut enriched.disabled),
    ] {
        for rule in rules {
            out.push(enrich(api, rule).await);
        }
    }

    Ok(enriched)
}

async fn enrich(api: &dyn WafApi, rule: Rule) -> RuleStatusEntry {
    let modsec_rule_id = rule.attributes.modsec_rule_id;
    let details = match rule_info(api, &modsec_rule_id).await {
        Ok(Some(info)) => Some(info.attributes),
        Ok(None) => {
            error!("No catalog rule found for {}", modsec_rule_id);
            None
        }
        Err(err) => {
            error!("Rule lookup for {} failed: {}", modsec_rule_id, err);
            None
        }
    };

    RuleStatusEntry {
        modsec_rule_id,
        status: rule.attributes.status,
        details,
    }
}

/// Catalog rules grouped by publisher.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    pub owasp: Vec<Rule>,
    pub fastly: Vec<Rule>,
    pub trustwave: Vec<Rule>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.owasp.len() + self.fastly.len() + self.trustwave.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn describe_catalog_rule(rule: &Rule) -> String {
    let version = match rule.attributes.version {
        Some(Value::String(ref v)) => v.clone(),
        Some(ref other) => other.to_string(),
        None => String::new(),
    };
    format!(
        "Rule ID: {}\tParanoia: {}\tVersion: {}\tMessage: {}",
        rule.id, rule.attributes.paranoia_level, version, rule.attributes.message
    )
}

/// The full rule catalog, optionally restricted to one configuration set.
#[instrument(skip(api))]
pub async fn list_catalog(api: &dyn WafApi, config_set: Option<&str>) -> Result<Catalog> {
    let mut query = PageQuery::new("/wafs/rules");
    if let Some(id) = config_set {
        query = query.filter("filter[configuration_set_id]", id);
    }

    let rules: Collected<Rule> = collect_all(api, &query).await?;
    let mut catalog = Catalog::default();
    for rule in rules.records {
        match rule.attributes.publisher.as_str() {
            "owasp" => catalog.owasp.push(rule),
            "fastly" => catalog.fastly.push(rule),
            "trustwave" => catalog.trustwave.push(rule),
            _ => {}
        }
    }

    info!(
        owasp = catalog.owasp.len(),
        fastly = catalog.fastly.len(),
        trustwave = catalog.trustwave.len(),
        "Rule catalog read"
    );
    Ok(catalog)
}

pub async fn list_configuration_sets(api: &dyn WafApi) -> Result<Vec<ConfigSet>> {
    let sets: Collected<ConfigSet> = collect_all(api, &PageQuery::new("/wafs/configuration_sets")).await?;
    Ok(sets.records)
}
