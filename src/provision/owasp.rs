use crate::api::{Owasp, OwaspSettings, WafApi};
use crate::error::Result;
use tracing::{info, instrument};

/// Create the OWASP object of a WAF when it has none, then apply `settings`
/// to it. A WAF never ends up with two OWASP objects.
#[instrument(skip(api, settings))]
pub async fn upsert_owasp(
    api: &dyn WafApi,
    service_id: &str,
    waf_id: &str,
    settings: &OwaspSettings,
) -> Result<Owasp> {
    let existing = match api.get_owasp(service_id, waf_id).await? {
        Some(owasp) => owasp,
        None => {
            let created = api.create_owasp(service_id, waf_id).await?;
            info!("OWASP object created with ID {}", created.id);
            created
        }
    };

    let updated = api
        .update_owasp(service_id, waf_id, &existing.id, settings)
        .await?;

    info!(
        owasp_id = %updated.id,
        paranoia_level = updated.settings.paranoia_level,
        inbound_anomaly_score_threshold = updated.settings.inbound_anomaly_score_threshold,
        allowed_methods = %updated.settings.allowed_methods,
        "OWASP settings updated"
    );

    Ok(updated)
}
