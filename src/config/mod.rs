pub mod defaults;
pub mod parser;
pub mod types;
pub mod validator;

use crate::api::{Condition, OwaspSettings, ResponseObject, RuleStatus, Snippet, Syslog};
use anyhow::Result;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use types::LogFormat;

/// Placement marker that routes an endpoint's output to WAF verdicts.
pub const WAF_LOG_PLACEMENT: &str = "waf_debug";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub publisher: Vec<String>,
    #[serde(default)]
    pub action: RuleStatus,
    #[serde(default)]
    pub rules: Vec<u64>,
    #[serde(default)]
    pub disabled_rules: Vec<u64>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub owasp: OwaspSettings,
    #[serde(default)]
    pub weblog: WeblogConfig,
    #[serde(default)]
    pub waflog: WaflogConfig,
    #[serde(default)]
    pub vclsnippet: SnippetConfig,
    #[serde(default)]
    pub response: ResponseConfig,
    #[serde(default)]
    pub prefetch: PrefetchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Request log endpoint. `expiry` is the number of days the logging
/// condition keeps matching; 0 disables the expiry clause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeblogConfig {
    #[serde(default = "default_weblog_name")]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default = "default_syslog_port")]
    pub port: u32,
    #[serde(default)]
    pub tlscacert: String,
    #[serde(default)]
    pub tlshostname: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub expiry: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaflogConfig {
    #[serde(default = "default_waflog_name")]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default = "default_syslog_port")]
    pub port: u32,
    #[serde(default)]
    pub tlscacert: String,
    #[serde(default)]
    pub tlshostname: String,
    #[serde(default)]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnippetConfig {
    #[serde(default = "default_snippet_name")]
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type", default = "default_snippet_type")]
    pub kind: String,
    #[serde(default = "default_priority")]
    pub priority: u32,
    #[serde(default)]
    pub dynamic: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseConfig {
    #[serde(default = "default_response_name")]
    pub name: String,
    #[serde(default = "default_http_status_code")]
    pub http_status_code: u32,
    #[serde(default = "default_http_response")]
    pub http_response: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefetchConfig {
    #[serde(default = "default_prefetch_name")]
    pub name: String,
    #[serde(default = "default_prefetch_statement")]
    pub statement: String,
    #[serde(rename = "type", default = "default_prefetch_type")]
    pub kind: String,
    #[serde(default = "default_priority")]
    pub priority: u32,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        parser::parse_config(path)
    }

    /// Human-readable findings; entries prefixed `[X]` are blocking.
    pub fn validate(&self) -> Vec<String> {
        validator::validate_config(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_endpoint: default_api_endpoint(),
            tags: Vec::new(),
            publisher: Vec::new(),
            action: RuleStatus::default(),
            rules: Vec::new(),
            disabled_rules: Vec::new(),
            logging: LoggingConfig::default(),
            owasp: OwaspSettings::default(),
            weblog: WeblogConfig::default(),
            waflog: WaflogConfig::default(),
            vclsnippet: SnippetConfig::default(),
            response: ResponseConfig::default(),
            prefetch: PrefetchConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            path: None,
        }
    }
}

impl Default for WeblogConfig {
    fn default() -> Self {
        Self {
            name: default_weblog_name(),
            address: String::new(),
            port: default_syslog_port(),
            tlscacert: String::new(),
            tlshostname: String::new(),
            format: String::new(),
            expiry: 0,
        }
    }
}

impl Default for WaflogConfig {
    fn default() -> Self {
        Self {
            name: default_waflog_name(),
            address: String::new(),
            port: default_syslog_port(),
            tlscacert: String::new(),
            tlshostname: String::new(),
            format: String::new(),
        }
    }
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            name: default_snippet_name(),
            content: String::new(),
            kind: default_snippet_type(),
            priority: default_priority(),
            dynamic: 0,
        }
    }
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            name: default_response_name(),
            http_status_code: default_http_status_code(),
            http_response: default_http_response(),
            content_type: default_content_type(),
            content: String::new(),
        }
    }
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            name: default_prefetch_name(),
            statement: default_prefetch_statement(),
            kind: default_prefetch_type(),
            priority: default_priority(),
        }
    }
}

impl PrefetchConfig {
    pub fn to_condition(&self) -> Condition {
        Condition {
            name: self.name.clone(),
            statement: self.statement.clone(),
            kind: self.kind.clone(),
            priority: self.priority,
        }
    }
}

impl ResponseConfig {
    pub fn to_response_object(&self) -> ResponseObject {
        ResponseObject {
            name: self.name.clone(),
            status: self.http_status_code,
            response: self.http_response.clone(),
            content: self.content.clone(),
            content_type: self.content_type.clone(),
        }
    }
}

impl SnippetConfig {
    pub fn to_snippet(&self) -> Snippet {
        Snippet {
            name: self.name.clone(),
            content: self.content.clone(),
            kind: self.kind.clone(),
            priority: self.priority,
            dynamic: self.dynamic,
        }
    }
}

impl WeblogConfig {
    pub fn to_syslog(&self) -> Syslog {
        Syslog {
            name: self.name.clone(),
            address: self.address.clone(),
            port: self.port,
            tls_ca_cert: non_empty(&self.tlscacert),
            tls_hostname: non_empty(&self.tlshostname),
            format: self.format.clone(),
            placement: None,
            response_condition: None,
        }
    }
}

impl WaflogConfig {
    pub fn to_syslog(&self) -> Syslog {
        Syslog {
            name: self.name.clone(),
            address: self.address.clone(),
            port: self.port,
            tls_ca_cert: non_empty(&self.tlscacert),
            tls_hostname: non_empty(&self.tlshostname),
            format: self.format.clone(),
            placement: Some(WAF_LOG_PLACEMENT.to_string()),
            response_condition: None,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
