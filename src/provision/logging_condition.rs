//! Response conditions that gate the two syslog endpoints.
//!
//! The WAF log endpoint always carries `waf-soc-logging`. The web log
//! endpoint carries the same condition, or `waf-soc-logging-with-expiry`
//! when an expiry horizon is configured. Only one of the two names is ever
//! attached to the web log; turning expiry off deletes the stale one.

use super::exists::name_exists;
use crate::api::{Condition, ServiceVersion, WafApi};
use crate::config::Config;
use crate::error::{Result, WafError};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, instrument};

pub const LOGGING_CONDITION: &str = "waf-soc-logging";
pub const LOGGING_CONDITION_WITH_EXPIRY: &str = "waf-soc-logging-with-expiry";

/// Conditions left behind by older releases of the tool.
pub const LEGACY_CONDITIONS: [&str; 2] = ["waf-soc-with-px", "waf-soc-with-shielding"];

const SHIELDING_CLAUSE: &str = "(waf.executed || fastly_info.state !~ \"(MISS|PASS)\")";
const PERIMETERX_CLAUSE: &str = "(req.http.x-request-id)";
const CONDITION_TYPE: &str = "RESPONSE";
const CONDITION_PRIORITY: u32 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggingFeatures {
    pub shielding: bool,
    pub perimeterx: bool,
    /// Days the web log keeps matching; 0 means no expiry.
    pub expiry_days: u32,
}

impl LoggingFeatures {
    pub fn any(&self) -> bool {
        self.shielding || self.perimeterx || self.expiry_days > 0
    }
}

/// Names of the conditions attached by one composer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedConditions {
    pub waflog: String,
    pub weblog: String,
}

#[derive(Debug, Default)]
struct Clauses {
    statements: Vec<String>,
    labels: Vec<String>,
}

impl Clauses {
    fn for_features(features: &LoggingFeatures) -> Self {
        let mut clauses = Self::default();
        if features.shielding {
            clauses.push(SHIELDING_CLAUSE.to_string(), "Shielding".to_string());
        }
        if features.perimeterx {
            clauses.push(PERIMETERX_CLAUSE.to_string(), "PerimeterX".to_string());
        }
        clauses
    }

    fn push(&mut self, statement: String, label: String) {
        self.statements.push(statement);
        self.labels.push(label);
    }

    fn statement(&self) -> String {
        join_statement(&self.statements)
    }

    fn describe(&self) -> String {
        self.labels.join(", ")
    }
}

/// AND the clauses together. An empty selection always matches.
pub fn join_statement(clauses: &[String]) -> String {
    if clauses.is_empty() {
        "true".to_string()
    } else {
        clauses.join(" && ")
    }
}

/// Clause comparing the edge clock against an epoch fixed at build time,
/// `days` after `now`. The condition has to be regenerated to move it.
pub fn expiry_clause(now: DateTime<Utc>, days: u32) -> Result<String> {
    let epoch = now
        .checked_add_signed(Duration::days(i64::from(days)))
        .ok_or(WafError::InvalidExpiry(days))?
        .timestamp();
    Ok(format!("(std.atoi(now.sec) > {})", epoch))
}

fn response_condition(name: &str, statement: String) -> Condition {
    Condition {
        name: name.to_string(),
        statement,
        kind: CONDITION_TYPE.to_string(),
        priority: CONDITION_PRIORITY,
    }
}

async fn upsert_condition(
    api: &dyn WafApi,
    version: &ServiceVersion,
    existing: &[Condition],
    condition: &Condition,
) -> Result<()> {
    if name_exists(existing, &condition.name) {
        info!("Updating WAF logging condition: {:?}", condition.name);
        api.update_condition(version, condition).await?;
    } else {
        info!("Creating WAF logging condition: {:?}", condition.name);
        api.create_condition(version, condition).await?;
    }
    Ok(())
}

pub async fn compose_logging_condition(
    api: &dyn WafApi,
    version: &ServiceVersion,
    config: &Config,
    features: LoggingFeatures,
) -> Result<AttachedConditions> {
    compose_logging_condition_at(api, version, config, features, Utc::now()).await
}

/// Same as [`compose_logging_condition`] with an explicit build time for the
/// expiry epoch.
#[instrument(skip(api, config), fields(service_id = %version.service_id, version = version.number))]
pub async fn compose_logging_condition_at(
    api: &dyn WafApi,
    version: &ServiceVersion,
    config: &Config,
    features: LoggingFeatures,
    now: DateTime<Utc>,
) -> Result<AttachedConditions> {
    let expiry = match features.expiry_days {
        0 => None,
        days => Some(expiry_clause(now, days)?),
    };

    let existing = api.list_conditions(version).await?;
    let mut clauses = Clauses::for_features(&features);

    let base = response_condition(LOGGING_CONDITION, clauses.statement());
    upsert_condition(api, version, &existing, &base).await?;

    info!(
        "Assigning condition {:?} ({}) to WAF log {:?}",
        LOGGING_CONDITION,
        clauses.describe(),
        config.waflog.name
    );
    api.set_syslog_condition(version, &config.waflog.name, LOGGING_CONDITION)
        .await?;

    let weblog_condition = if let Some(clause) = expiry {
        clauses.push(clause, format!("{} day expiry", features.expiry_days));
        let with_expiry = response_condition(LOGGING_CONDITION_WITH_EXPIRY, clauses.statement());
        upsert_condition(api, version, &existing, &with_expiry).await?;
        LOGGING_CONDITION_WITH_EXPIRY
    } else {
        if name_exists(&existing, LOGGING_CONDITION_WITH_EXPIRY) {
            info!("Deleting logging condition: {:?}", LOGGING_CONDITION_WITH_EXPIRY);
            api.delete_condition(version, LOGGING_CONDITION_WITH_EXPIRY)
                .await?;
        }
        LOGGING_CONDITION
    };

    info!(
        "Assigning condition {:?} ({}) to web log {:?}",
        weblog_condition,
        clauses.describe(),
        config.weblog.name
    );
    api.set_syslog_condition(version, &config.weblog.name, weblog_condition)
        .await?;

    Ok(AttachedConditions {
        waflog: LOGGING_CONDITION.to_string(),
        weblog: weblog_condition.to_string(),
    })
}
