//! Creation of the WAF object and everything it references.
//!
//! The platform only accepts a `waf_debug` logging endpoint once a WAF
//! exists, and the OWASP object hangs off the WAF id, so the steps run in a
//! fixed order. The first unexpected error aborts the run; earlier steps are
//! not rolled back.

use super::exists::{name_exists, name_exists_exact};
use super::owasp::upsert_owasp;
use crate::api::{ServiceVersion, Syslog, WafApi};
use crate::config::Config;
use crate::error::Result;
use tracing::{info, instrument, warn};

/// Run every provisioning step against `version` and return the new WAF id.
///
/// The leaf objects are skipped when already present, but the WAF itself is
/// always created: running this twice leaves two WAF objects on the version.
#[instrument(skip(api, config), fields(service_id = %version.service_id, version = version.number))]
pub async fn provision(api: &dyn WafApi, version: &ServiceVersion, config: &Config) -> Result<String> {
    ensure_prefetch_condition(api, version, config).await?;
    ensure_response_object(api, version, config).await?;
    ensure_snippet(api, version, config).await?;

    let waf = api
        .create_waf(version, &config.prefetch.name, &config.response.name)
        .await?;
    info!("WAF created with ID: {}", waf.id);

    upsert_owasp(api, &version.service_id, &waf.id, &config.owasp).await?;

    create_logging_endpoint(api, version, &config.weblog.to_syslog()).await?;
    create_logging_endpoint(api, version, &config.waflog.to_syslog()).await?;

    Ok(waf.id)
}

async fn ensure_prefetch_condition(api: &dyn WafApi, version: &ServiceVersion, config: &Config) -> Result<()> {
    let conditions = api.list_conditions(version).await?;
    if name_exists(&conditions, &config.prefetch.name) {
        warn!("Condition {:?} already exists, skipping", config.prefetch.name);
        return Ok(());
    }

    api.create_condition(version, &config.prefetch.to_condition())
        .await?;
    info!("Prefetch condition {:?} created", config.prefetch.name);
    Ok(())
}

async fn ensure_response_object(api: &dyn WafApi, version: &ServiceVersion, config: &Config) -> Result<()> {
    let responses = api.list_response_objects(version).await?;
    if name_exists(&responses, &config.response.name) {
        warn!("Response object {:?} already exists, skipping", config.response.name);
        return Ok(());
    }

    api.create_response_object(version, &config.response.to_response_object())
        .await?;
    info!("Response object {:?} created", config.response.name);
    Ok(())
}

async fn ensure_snippet(api: &dyn WafApi, version: &ServiceVersion, config: &Config) -> Result<()> {
    let snippets = api.list_snippets(version).await?;
    if name_exists_exact(&snippets, &config.vclsnippet.name) {
        warn!("VCL snippet {:?} already exists, skipping", config.vclsnippet.name);
        return Ok(());
    }

    api.create_snippet(version, &config.vclsnippet.to_snippet())
        .await?;
    info!("VCL snippet {:?} created", config.vclsnippet.name);
    Ok(())
}

/// A duplicate-record answer counts as success; anything else is fatal.
async fn create_logging_endpoint(api: &dyn WafApi, version: &ServiceVersion, syslog: &Syslog) -> Result<()> {
    match api.create_syslog(version, syslog).await {
        Ok(()) => {
            info!("Logging endpoint {:?} created", syslog.name);
            Ok(())
        }
        Err(err) if err.is_duplicate() => {
            warn!("Logging endpoint {:?} already exists, skipping", syslog.name);
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
