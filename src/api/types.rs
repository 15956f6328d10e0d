use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use anyhow::Result;

/// A numbered configuration version of a remote service.
///
/// Every mutating operation is threaded with one of these; it is obtained
/// once (active lookup, then clone) and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceVersion {
    pub service_id: String,
    pub number: u32,
}

impl ServiceVersion {
    pub fn new(service_id: impl Into<String>, number: u32) -> Self {
        Self {
            service_id: service_id.into(),
            number,
        }
    }
}

impl fmt::Display for ServiceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} version #{}", self.service_id, self.number)
    }
}

/// Enforcement mode of a single rule inside a WAF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    Log,
    Block,
    Disabled,
}

impl Default for RuleStatus {
    fn default() -> Self {
        Self::Log
    }
}

impl RuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Block => "block",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "block" => Ok(Self::Block),
            "disabled" => Ok(Self::Disabled),
            _ => Err(anyhow::anyhow!("Invalid rule status: '{}'. Valid values: log, block, disabled", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceDetails {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub versions: Vec<VersionInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
    #[serde(deserialize_with = "lenient_u32")]
    pub number: u32,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionValidation {
    pub status: String,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl VersionValidation {
    pub fn is_valid(&self) -> bool {
        self.status == "ok"
    }

    pub fn describe(&self) -> String {
        let mut parts: Vec<String> = self.msg.iter().cloned().collect();
        parts.extend(self.errors.iter().cloned());
        if parts.is_empty() {
            self.status.clone()
        } else {
            parts.join("; ")
        }
    }
}

/// Named boolean gating expression attached to a service version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    #[serde(default)]
    pub statement: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub priority: u32,
}

/// Synthetic response served when the WAF blocks a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseObject {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub status: u32,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub priority: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub dynamic: u32,
}

/// Syslog streaming endpoint. `placement` is set to `waf_debug` on the
/// endpoint that receives WAF verdicts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Syslog {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub port: u32,
    #[serde(default)]
    pub tls_ca_cert: Option<String>,
    #[serde(default)]
    pub tls_hostname: Option<String>,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub placement: Option<String>,
    #[serde(default)]
    pub response_condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Waf {
    pub id: String,
    pub prefetch_condition: String,
    pub response: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WafAttributes {
    #[serde(default)]
    pub prefetch_condition: String,
    #[serde(default)]
    pub response: String,
}

impl From<Resource<WafAttributes>> for Waf {
    fn from(resource: Resource<WafAttributes>) -> Self {
        Self {
            id: resource.id,
            prefetch_condition: resource.attributes.prefetch_condition,
            response: resource.attributes.response,
        }
    }
}

/// OWASP policy tunables. The same shape is read from the config file,
/// sent to and read from the platform, and written into backups.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OwaspSettings {
    pub allowed_http_versions: String,
    pub allowed_methods: String,
    pub allowed_request_content_type: String,
    pub allowed_request_content_type_charset: String,
    pub arg_length: u32,
    pub arg_name_length: u32,
    pub combined_file_sizes: u32,
    pub critical_anomaly_score: u32,
    pub crs_validate_utf8_encoding: bool,
    pub error_anomaly_score: u32,
    pub http_violation_score_threshold: u32,
    pub inbound_anomaly_score_threshold: u32,
    pub lfi_score_threshold: u32,
    pub max_file_size: u32,
    pub max_num_args: u32,
    pub notice_anomaly_score: u32,
    pub paranoia_level: u32,
    pub php_injection_score_threshold: u32,
    pub rce_score_threshold: u32,
    pub restricted_extensions: String,
    pub restricted_headers: String,
    pub rfi_score_threshold: u32,
    pub session_fixation_score_threshold: u32,
    pub sql_injection_score_threshold: u32,
    pub xss_score_threshold: u32,
    pub total_arg_length: u32,
    pub warning_anomaly_score: u32,
}

impl OwaspSettings {
    /// Attributes for an update call. Numbers left at 0 and empty strings
    /// are unset tunables and are left out so the platform keeps its value.
    pub fn update_attributes(&self) -> serde_json::Value {
        let mut value = serde_json::json!(self);
        if let Some(map) = value.as_object_mut() {
            map.retain(|_, field| match field {
                serde_json::Value::Number(n) => n.as_u64() != Some(0),
                serde_json::Value::String(s) => !s.is_empty(),
                _ => true,
            });
        }
        value
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Owasp {
    pub id: String,
    pub settings: OwaspSettings,
}

impl From<Resource<OwaspSettings>> for Owasp {
    fn from(resource: Resource<OwaspSettings>) -> Self {
        Self {
            id: resource.id,
            settings: resource.attributes,
        }
    }
}

/// JSON:API top-level document carrying a single `data` member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document<T> {
    pub data: T,
}

/// JSON:API resource object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource<A> {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub attributes: A,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub record_count: u32,
    #[serde(default)]
    pub total_pages: u32,
}

/// One page of a paginated JSON:API listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default = "Vec::new")]
    pub included: Vec<T>,
    #[serde(default)]
    pub links: PageLinks,
    #[serde(default)]
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleAttributes {
    pub message: String,
    pub status: String,
    pub publisher: String,
    pub paranoia_level: u32,
    pub revision: u32,
    pub rule_id: String,
    pub modsec_rule_id: String,
    pub unique_rule_id: String,
    pub version: Option<serde_json::Value>,
}

/// Catalog rule or rule-status record, depending on the endpoint.
pub type Rule = Resource<RuleAttributes>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSetAttributes {
    pub active: bool,
    pub name: String,
}

pub type ConfigSet = Resource<ConfigSetAttributes>;

/// Listing endpoint plus its filter parameters, without the page cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub path: String,
    pub filters: Vec<(String, String)>,
}

impl PageQuery {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            filters: Vec::new(),
        }
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for PageQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (i, (key, value)) in self.filters.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, key, value)?;
        }
        Ok(())
    }
}

/// Raw outcome of a call whose success is judged by the caller against an
/// exact status line such as `200 OK`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: String,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            body: body.into(),
        }
    }

    pub fn is(&self, expected: &str) -> bool {
        self.status == expected
    }
}

// The platform reports several numeric fields as strings ("10", "403").
fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(u32),
        Text(String),
        Null(()),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(n) => Ok(n),
        Number::Text(s) if s.trim().is_empty() => Ok(0),
        Number::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        Number::Null(()) => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_status_parse_and_display() {
        assert_eq!("BLOCK".parse::<RuleStatus>().unwrap(), RuleStatus::Block);
        assert_eq!(RuleStatus::Disabled.to_string(), "disabled");
        assert!("deny".parse::<RuleStatus>().is_err());
    }

    #[test]
    fn test_condition_priority_accepts_string() {
        let json = r#"{"name":"WAF_Prefetch","statement":"req.backend.is_origin","type":"PREFETCH","priority":"10"}"#;
        let condition: Condition = serde_json::from_str(json).unwrap();
        assert_eq!(condition.priority, 10);
        assert_eq!(condition.kind, "PREFETCH");
    }

    #[test]
    fn test_page_defaults_missing_sections() {
        let page: Page<Rule> = serde_json::from_str(r#"{"data":[{"id":"1010010","type":"rule"}]}"#).unwrap();
        assert_eq!(page.data.len(), 1);
        assert!(page.included.is_empty());
        assert_eq!(page.meta, PageMeta::default());
    }

    #[test]
    fn test_owasp_update_skips_unset_tunables() {
        let settings = OwaspSettings {
            paranoia_level: 2,
            ..Default::default()
        };
        let attributes = settings.update_attributes();
        let map = attributes.as_object().unwrap();

        assert_eq!(map["paranoia_level"], serde_json::json!(2));
        assert!(!map.contains_key("inbound_anomaly_score_threshold"));
        assert!(!map.contains_key("allowed_methods"));
        assert!(!map.contains_key("max_num_args"));
        // Booleans are explicit choices, false included.
        assert_eq!(map["crs_validate_utf8_encoding"], serde_json::json!(false));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_page_query_display() {
        let query = PageQuery::new("/wafs/rules").filter("filter[publisher]", "owasp");
        assert_eq!(query.to_string(), "/wafs/rules?filter[publisher]=owasp");
    }
}
