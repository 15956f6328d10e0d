//! Removal of every WAF object of a version and the objects provisioning
//! created around them.
//!
//! Deleting something that is already gone is not an error. A failure on
//! one WAF is recorded and the next WAF is still attempted.

use super::exists::name_exists;
use super::logging_condition::{LEGACY_CONDITIONS, LOGGING_CONDITION, LOGGING_CONDITION_WITH_EXPIRY};
use crate::api::{ApiResult, ServiceVersion, WafApi};
use crate::config::Config;
use crate::error::{Result, WafError};
use tracing::{error, info, instrument, warn};

/// Response object removed by deprovisioning, whatever name was provisioned.
pub const WAF_RESPONSE_OBJECT: &str = "WAF_Response";
pub const WAF_PREFETCH_CONDITION: &str = "WAF_Prefetch";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeprovisionReport {
    pub removed: Vec<String>,
    pub failures: Vec<String>,
}

impl DeprovisionReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

fn tolerate_missing(result: ApiResult<()>, what: &str) -> ApiResult<()> {
    match result {
        Err(err) if err.is_not_found() => {
            warn!("{} already absent: {}", what, err);
            Ok(())
        }
        other => other,
    }
}

/// Delete both syslog endpoints and the logging conditions, current and
/// legacy, when present.
#[instrument(skip(api, config), fields(service_id = %version.service_id, version = version.number))]
pub async fn delete_logging(api: &dyn WafApi, version: &ServiceVersion, config: &Config) -> ApiResult<()> {
    let syslogs = api.list_syslogs(version).await?;
    for name in [&config.weblog.name, &config.waflog.name] {
        if name_exists(&syslogs, name) {
            info!("Deleting logging endpoint: {:?}", name);
            tolerate_missing(api.delete_syslog(version, name).await, name)?;
        }
    }

    let conditions = api.list_conditions(version).await?;
    let names = [LOGGING_CONDITION, LOGGING_CONDITION_WITH_EXPIRY]
        .into_iter()
        .chain(LEGACY_CONDITIONS);
    for name in names {
        if name_exists(&conditions, name) {
            info!("Deleting logging condition: {:?}", name);
            tolerate_missing(api.delete_condition(version, name).await, name)?;
        }
    }

    Ok(())
}

#[instrument(skip(api, config), fields(service_id = %version.service_id, version = version.number))]
pub async fn deprovision(api: &dyn WafApi, version: &ServiceVersion, config: &Config) -> Result<DeprovisionReport> {
    let wafs = api.list_wafs(version).await?;
    if wafs.is_empty() {
        return Err(WafError::NoWaf {
            service_id: version.service_id.clone(),
            version: version.number,
        });
    }

    let conditions = api.list_conditions(version).await?;
    let has_prefetch = name_exists(&conditions, WAF_PREFETCH_CONDITION);
    let mut report = DeprovisionReport::default();

    for (index, waf) in wafs.iter().enumerate() {
        let ordinal = index + 1;

        info!("Deleting WAF #{} logging", ordinal);
        if let Err(err) = delete_logging(api, version, config).await {
            error!("Deleting WAF #{} logging failed: {}", ordinal, err);
        }

        match teardown_waf(api, version, &waf.id, has_prefetch).await {
            Ok(()) => report.removed.push(waf.id.clone()),
            Err(err) => {
                error!("Deleting WAF #{} ({}) failed: {}", ordinal, waf.id, err);
                report.failures.push(format!("{}: {}", waf.id, err));
            }
        }

        info!("Deleting WAF #{} VCL snippet", ordinal);
        if let Err(err) = api.delete_snippet(version, &config.vclsnippet.name).await {
            error!("Deleting WAF #{} VCL snippet failed: {}", ordinal, err);
        }
    }

    Ok(report)
}

async fn teardown_waf(api: &dyn WafApi, version: &ServiceVersion, waf_id: &str, has_prefetch: bool) -> ApiResult<()> {
    info!("Deleting WAF container {}", waf_id);
    tolerate_missing(api.delete_waf(version, waf_id).await, waf_id)?;

    info!("Deleting response object {:?}", WAF_RESPONSE_OBJECT);
    tolerate_missing(
        api.delete_response_object(version, WAF_RESPONSE_OBJECT).await,
        WAF_RESPONSE_OBJECT,
    )?;

    if has_prefetch {
        info!("Deleting prefetch condition {:?}", WAF_PREFETCH_CONDITION);
        tolerate_missing(
            api.delete_condition(version, WAF_PREFETCH_CONDITION).await,
            WAF_PREFETCH_CONDITION,
        )?;
    }

    Ok(())
}
