//! Point-in-time snapshot of a WAF's rule statuses and OWASP settings.

use crate::api::{OwaspSettings, Rule, WafApi};
use crate::collector::{collect_all, Collected};
use crate::error::{Result, WafError};
use crate::rules::{rule_statuses_query, StatusPartition};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub const BACKUP_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub format_version: u32,
    pub service_id: String,
    pub id: String,
    pub updated: DateTime<Utc>,
    pub disabled: Vec<String>,
    pub block: Vec<String>,
    pub log: Vec<String>,
    pub owasp: OwaspSettings,
}

#[derive(Debug, Clone)]
pub struct BackupOutcome {
    pub record: BackupRecord,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Label of a backup: hex SHA-256 of the service id and capture time.
pub fn backup_id(service_id: &str, captured: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(service_id.as_bytes());
    hasher.update(captured.to_rfc3339().as_bytes());
    format!("{:x}", hasher.finalize())
}

fn output_dir(output: &Path) -> &Path {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

pub async fn backup(api: &dyn WafApi, service_id: &str, waf_id: &str, output: &Path) -> Result<BackupOutcome> {
    backup_at(api, service_id, waf_id, output, Utc::now()).await
}

/// Write the backup of `waf_id` to `output`. The parent directory must
/// already exist; it is checked before any remote call.
#[instrument(skip(api, output, captured), fields(output = %output.display()))]
pub async fn backup_at(
    api: &dyn WafApi,
    service_id: &str,
    waf_id: &str,
    output: &Path,
    captured: DateTime<Utc>,
) -> Result<BackupOutcome> {
    let dir = output_dir(output);
    if !dir.is_dir() {
        return Err(WafError::OutputDirMissing(dir.to_path_buf()));
    }

    let statuses: Collected<Rule> = collect_all(api, &rule_statuses_query(service_id, waf_id)).await?;
    info!("Backing up {} rules", statuses.len());

    let partition = StatusPartition::partition(
        statuses
            .records
            .into_iter()
            .map(|rule| (rule.attributes.status, rule.attributes.modsec_rule_id)),
        |entry: &(String, String)| entry.0.as_str(),
    );
    let ids = |entries: Vec<(String, String)>| entries.into_iter().map(|(_, id)| id).collect::<Vec<_>>();

    let owasp = api
        .get_owasp(service_id, waf_id)
        .await?
        .filter(|owasp| !owasp.id.is_empty())
        .ok_or_else(|| WafError::MissingOwasp(waf_id.to_string()))?;

    let record = BackupRecord {
        format_version: BACKUP_FORMAT_VERSION,
        service_id: service_id.to_string(),
        id: backup_id(service_id, captured),
        updated: captured,
        disabled: ids(partition.disabled),
        block: ids(partition.block),
        log: ids(partition.log),
        owasp: owasp.settings,
    };

    let content = toml::to_string(&record)?;
    fs::write(output, &content)?;

    info!(
        "Bytes written: {}, backup {} saved to {}",
        content.len(),
        record.id,
        output.display()
    );

    Ok(BackupOutcome {
        record,
        path: output.to_path_buf(),
        bytes: content.len(),
    })
}
