//! Service version lifecycle: active lookup, draft clone and validation.

use crate::api::{ServiceVersion, WafApi};
use crate::error::{Result, WafError};
use tracing::{info, instrument};

/// The version currently flagged active on the service.
#[instrument(skip(api))]
pub async fn active_version(api: &dyn WafApi, service_id: &str) -> Result<ServiceVersion> {
    let service = api.get_service(service_id).await?;

    let active = service
        .versions
        .iter()
        .find(|v| v.active)
        .ok_or_else(|| WafError::NoActiveVersion(service_id.to_string()))?;

    info!("Active version for service {}: #{}", service_id, active.number);
    Ok(ServiceVersion::new(service_id, active.number))
}

/// Clone `version` into a new draft that further operations mutate.
#[instrument(skip(api), fields(service_id = %version.service_id, version = version.number))]
pub async fn clone_version(api: &dyn WafApi, version: &ServiceVersion) -> Result<ServiceVersion> {
    let number = api.clone_version(version).await?;
    info!("New draft version #{} cloned from #{}", number, version.number);
    Ok(ServiceVersion::new(version.service_id.clone(), number))
}

/// Active lookup followed by a clone; the usual start of a mutating command.
pub async fn draft_from_active(api: &dyn WafApi, service_id: &str) -> Result<ServiceVersion> {
    let active = active_version(api, service_id).await?;
    clone_version(api, &active).await
}

#[instrument(skip(api), fields(service_id = %version.service_id, version = version.number))]
pub async fn validate_version(api: &dyn WafApi, version: &ServiceVersion) -> Result<()> {
    let validation = api.validate_version(version).await?;
    if !validation.is_valid() {
        return Err(WafError::InvalidVersion {
            version: version.number,
            reason: validation.describe(),
        });
    }
    info!("Version #{} validated", version.number);
    Ok(())
}
