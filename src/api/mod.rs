//! Client seam for the edge platform API.
//!
//! The provisioning, reconciliation and backup code is written against the
//! [`WafApi`] trait. [`HttpClient`] talks to the real REST API; tests use an
//! in-memory fake.

pub mod error;
pub mod http;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;

pub use error::{ApiError, DUPLICATE_RECORD_MARKER};
pub use http::HttpClient;
pub use types::*;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[async_trait]
pub trait WafApi: Send + Sync {
    // Service versions
    async fn get_service(&self, service_id: &str) -> ApiResult<ServiceDetails>;
    async fn clone_version(&self, version: &ServiceVersion) -> ApiResult<u32>;
    async fn validate_version(&self, version: &ServiceVersion) -> ApiResult<VersionValidation>;

    // Conditions
    async fn list_conditions(&self, version: &ServiceVersion) -> ApiResult<Vec<Condition>>;
    async fn create_condition(&self, version: &ServiceVersion, condition: &Condition) -> ApiResult<()>;
    async fn update_condition(&self, version: &ServiceVersion, condition: &Condition) -> ApiResult<()>;
    async fn delete_condition(&self, version: &ServiceVersion, name: &str) -> ApiResult<()>;

    // Response objects
    async fn list_response_objects(&self, version: &ServiceVersion) -> ApiResult<Vec<ResponseObject>>;
    async fn create_response_object(&self, version: &ServiceVersion, response: &ResponseObject) -> ApiResult<()>;
    async fn delete_response_object(&self, version: &ServiceVersion, name: &str) -> ApiResult<()>;

    // VCL snippets
    async fn list_snippets(&self, version: &ServiceVersion) -> ApiResult<Vec<Snippet>>;
    async fn create_snippet(&self, version: &ServiceVersion, snippet: &Snippet) -> ApiResult<()>;
    async fn delete_snippet(&self, version: &ServiceVersion, name: &str) -> ApiResult<()>;

    // Syslog endpoints
    async fn list_syslogs(&self, version: &ServiceVersion) -> ApiResult<Vec<Syslog>>;
    async fn create_syslog(&self, version: &ServiceVersion, syslog: &Syslog) -> ApiResult<()>;
    async fn set_syslog_condition(&self, version: &ServiceVersion, name: &str, condition: &str) -> ApiResult<()>;
    async fn delete_syslog(&self, version: &ServiceVersion, name: &str) -> ApiResult<()>;

    // WAF containers
    async fn list_wafs(&self, version: &ServiceVersion) -> ApiResult<Vec<Waf>>;
    async fn create_waf(&self, version: &ServiceVersion, prefetch_condition: &str, response: &str) -> ApiResult<Waf>;
    async fn delete_waf(&self, version: &ServiceVersion, waf_id: &str) -> ApiResult<()>;

    // OWASP policy
    async fn get_owasp(&self, service_id: &str, waf_id: &str) -> ApiResult<Option<Owasp>>;
    async fn create_owasp(&self, service_id: &str, waf_id: &str) -> ApiResult<Owasp>;
    async fn update_owasp(
        &self,
        service_id: &str,
        waf_id: &str,
        owasp_id: &str,
        settings: &OwaspSettings,
    ) -> ApiResult<Owasp>;

    // Rule sets and configuration sets
    async fn update_ruleset(&self, service_id: &str, waf_id: &str) -> ApiResult<()>;
    async fn set_configuration_set(&self, waf_id: &str, config_set_id: &str) -> ApiResult<()>;

    /// Fetch one page of a JSON:API listing. Records stay untyped so the
    /// trait remains object safe; the collector decodes them.
    async fn fetch_page(&self, query: &PageQuery, page: u32) -> ApiResult<Page<serde_json::Value>>;

    // Raw status calls, judged by the caller on the exact status line
    async fn patch_rule_status(
        &self,
        service_id: &str,
        waf_id: &str,
        rule_id: &str,
        status: RuleStatus,
    ) -> ApiResult<ApiResponse>;
    async fn set_tag_status(
        &self,
        service_id: &str,
        waf_id: &str,
        tag: &str,
        status: RuleStatus,
        force: bool,
    ) -> ApiResult<ApiResponse>;
    async fn change_waf_status(&self, waf_id: &str, status: &str) -> ApiResult<ApiResponse>;
}
