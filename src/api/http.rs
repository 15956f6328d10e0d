use super::error::ApiError;
use super::types::*;
use super::{ApiResult, WafApi};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Media type of the JSON:API flavoured WAF endpoints.
pub const JSON_API: &str = "application/vnd.api+json";

const API_KEY_HEADER: &str = "Fastly-Key";

/// [`WafApi`] over the platform's REST API.
///
/// One request per call; no retries or backoff. Timeouts are whatever the
/// underlying `reqwest` client is built with.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wafkeeper/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(ACCEPT, "application/json")
    }

    fn json_api(&self, method: Method, path: &str) -> RequestBuilder {
        self.request(method, path)
            .header(ACCEPT, JSON_API)
            .header(CONTENT_TYPE, JSON_API)
    }

    fn json_api_body(&self, method: Method, path: &str, body: &Value) -> RequestBuilder {
        self.json_api(method, path).body(body.to_string())
    }

    /// Send and turn any non-success status into a classified [`ApiError`].
    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_response(status.as_u16(), &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let text = self.send(request).await?.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn send_unit(&self, request: RequestBuilder) -> ApiResult<()> {
        self.send(request).await?;
        Ok(())
    }

    /// Send without judging the status; only transport failures are errors.
    async fn send_raw(&self, request: RequestBuilder) -> ApiResult<ApiResponse> {
        let response = request.send().await?;
        let status = response.status().to_string();
        let body = response.text().await?;
        Ok(ApiResponse { status, body })
    }
}

fn version_path(version: &ServiceVersion, resource: &str) -> String {
    format!(
        "/service/{}/version/{}/{}",
        version.service_id, version.number, resource
    )
}

fn named_path(version: &ServiceVersion, resource: &str, name: &str) -> String {
    format!(
        "{}/{}",
        version_path(version, resource),
        urlencoding::encode(name)
    )
}

fn syslog_form(syslog: &Syslog) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("name", syslog.name.clone()),
        ("address", syslog.address.clone()),
        ("port", syslog.port.to_string()),
        ("use_tls", "1".to_string()),
        ("format", syslog.format.clone()),
        ("format_version", "2".to_string()),
        ("message_type", "blank".to_string()),
    ];
    if let Some(ref cert) = syslog.tls_ca_cert {
        form.push(("tls_ca_cert", cert.clone()));
    }
    if let Some(ref hostname) = syslog.tls_hostname {
        form.push(("tls_hostname", hostname.clone()));
    }
    if let Some(ref placement) = syslog.placement {
        form.push(("placement", placement.clone()));
    }
    if let Some(ref condition) = syslog.response_condition {
        form.push(("response_condition", condition.clone()));
    }
    form
}

pub(crate) fn rule_status_body(waf_id: &str, rule_id: &str, status: RuleStatus) -> Value {
    json!({
        "data": {
            "attributes": { "status": status.as_str() },
            "id": format!("{}-{}", waf_id, rule_id),
            "type": "rule_status"
        }
    })
}

pub(crate) fn tag_status_body(waf_id: &str, tag: &str, status: RuleStatus, force: bool) -> Value {
    json!({
        "data": {
            "attributes": { "status": status.as_str(), "name": tag, "force": force },
            "id": waf_id,
            "type": "rule_status"
        }
    })
}

pub(crate) fn page_params(query: &PageQuery, page: u32) -> Vec<(String, String)> {
    let mut params = query.filters.clone();
    params.push(("page[number]".to_string(), page.to_string()));
    params
}

#[async_trait]
impl WafApi for HttpClient {
    async fn get_service(&self, service_id: &str) -> ApiResult<ServiceDetails> {
        let path = format!("/service/{}", service_id);
        self.send_json(self.request(Method::GET, &path)).await
    }

    async fn clone_version(&self, version: &ServiceVersion) -> ApiResult<u32> {
        let path = version_path(version, "clone");
        let cloned: VersionInfo = self.send_json(self.request(Method::PUT, &path)).await?;
        Ok(cloned.number)
    }

    async fn validate_version(&self, version: &ServiceVersion) -> ApiResult<VersionValidation> {
        let path = version_path(version, "validate");
        self.send_json(self.request(Method::GET, &path)).await
    }

    async fn list_conditions(&self, version: &ServiceVersion) -> ApiResult<Vec<Condition>> {
        let path = version_path(version, "condition");
        self.send_json(self.request(Method::GET, &path)).await
    }

    async fn create_condition(&self, version: &ServiceVersion, condition: &Condition) -> ApiResult<()> {
        let path = version_path(version, "condition");
        self.send_unit(self.request(Method::POST, &path).form(condition)).await
    }

    async fn update_condition(&self, version: &ServiceVersion, condition: &Condition) -> ApiResult<()> {
        let path = named_path(version, "condition", &condition.name);
        self.send_unit(self.request(Method::PUT, &path).form(condition)).await
    }

    async fn delete_condition(&self, version: &ServiceVersion, name: &str) -> ApiResult<()> {
        let path = named_path(version, "condition", name);
        self.send_unit(self.request(Method::DELETE, &path)).await
    }

    async fn list_response_objects(&self, version: &ServiceVersion) -> ApiResult<Vec<ResponseObject>> {
        let path = version_path(version, "response_object");
        self.send_json(self.request(Method::GET, &path)).await
    }

    async fn create_response_object(&self, version: &ServiceVersion, response: &ResponseObject) -> ApiResult<()> {
        let path = version_path(version, "response_object");
        self.send_unit(self.request(Method::POST, &path).form(response)).await
    }

    async fn delete_response_object(&self, version: &ServiceVersion, name: &str) -> ApiResult<()> {
        let path = named_path(version, "response_object", name);
        self.send_unit(self.request(Method::DELETE, &path)).await
    }

    async fn list_snippets(&self, version: &ServiceVersion) -> ApiResult<Vec<Snippet>> {
        let path = version_path(version, "snippet");
        self.send_json(self.request(Method::GET, &path)).await
    }

    async fn create_snippet(&self, version: &ServiceVersion, snippet: &Snippet) -> ApiResult<()> {
        let path = version_path(version, "snippet");
        self.send_unit(self.request(Method::POST, &path).form(snippet)).await
    }

    async fn delete_snippet(&self, version: &ServiceVersion, name: &str) -> ApiResult<()> {
        let path = named_path(version, "snippet", name);
        self.send_unit(self.request(Method::DELETE, &path)).await
    }

    async fn list_syslogs(&self, version: &ServiceVersion) -> ApiResult<Vec<Syslog>> {
        let path = version_path(version, "logging/syslog");
        self.send_json(self.request(Method::GET, &path)).await
    }

    async fn create_syslog(&self, version: &ServiceVersion, syslog: &Syslog) -> ApiResult<()> {
        let path = version_path(version, "logging/syslog");
        self.send_unit(self.request(Method::POST, &path).form(&syslog_form(syslog))).await
    }

    async fn set_syslog_condition(&self, version: &ServiceVersion, name: &str, condition: &str) -> ApiResult<()> {
        let path = named_path(version, "logging/syslog", name);
        let form = [("response_condition", condition)];
        self.send_unit(self.request(Method::PUT, &path).form(&form)).await
    }

    async fn delete_syslog(&self, version: &ServiceVersion, name: &str) -> ApiResult<()> {
        let path = named_path(version, "logging/syslog", name);
        self.send_unit(self.request(Method::DELETE, &path)).await
    }

    async fn list_wafs(&self, version: &ServiceVersion) -> ApiResult<Vec<Waf>> {
        let path = version_path(version, "wafs");
        let page: Page<Resource<WafAttributes>> = self.send_json(self.json_api(Method::GET, &path)).await?;
        Ok(page.data.into_iter().map(Waf::from).collect())
    }

    async fn create_waf(&self, version: &ServiceVersion, prefetch_condition: &str, response: &str) -> ApiResult<Waf> {
        let path = version_path(version, "wafs");
        let body = json!({
            "data": {
                "type": "waf",
                "attributes": {
                    "prefetch_condition": prefetch_condition,
                    "response": response
                }
            }
        });
        let created: Document<Resource<WafAttributes>> =
            self.send_json(self.json_api_body(Method::POST, &path, &body)).await?;
        Ok(created.data.into())
    }

    async fn delete_waf(&self, version: &ServiceVersion, waf_id: &str) -> ApiResult<()> {
        let path = format!("{}/{}", version_path(version, "wafs"), waf_id);
        self.send_unit(self.json_api(Method::DELETE, &path)).await
    }

    async fn get_owasp(&self, service_id: &str, waf_id: &str) -> ApiResult<Option<Owasp>> {
        let path = format!("/service/{}/wafs/{}/owasp", service_id, waf_id);
        match self.send_json::<Document<Resource<OwaspSettings>>>(self.json_api(Method::GET, &path)).await {
            Ok(document) if document.data.id.is_empty() => Ok(None),
            Ok(document) => Ok(Some(document.data.into())),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn create_owasp(&self, service_id: &str, waf_id: &str) -> ApiResult<Owasp> {
        let path = format!("/service/{}/wafs/{}/owasp", service_id, waf_id);
        let body = json!({ "data": { "type": "owasp" } });
        let created: Document<Resource<OwaspSettings>> =
            self.send_json(self.json_api_body(Method::POST, &path, &body)).await?;
        Ok(created.data.into())
    }

    async fn update_owasp(
        &self,
        service_id: &str,
        waf_id: &str,
        owasp_id: &str,
        settings: &OwaspSettings,
    ) -> ApiResult<Owasp> {
        let path = format!("/service/{}/wafs/{}/owasp", service_id, waf_id);
        let body = json!({
            "data": {
                "id": owasp_id,
                "type": "owasp",
                "attributes": settings.update_attributes()
            }
        });
        let updated: Document<Resource<OwaspSettings>> =
            self.send_json(self.json_api_body(Method::PATCH, &path, &body)).await?;
        Ok(updated.data.into())
    }

    async fn update_ruleset(&self, service_id: &str, waf_id: &str) -> ApiResult<()> {
        let path = format!("/service/{}/wafs/{}/ruleset", service_id, waf_id);
        let body = json!({ "data": { "id": waf_id, "type": "ruleset" } });
        self.send_unit(self.json_api_body(Method::PATCH, &path, &body)).await
    }

    async fn set_configuration_set(&self, waf_id: &str, config_set_id: &str) -> ApiResult<()> {
        let path = format!("/wafs/configuration_sets/{}/relationships/wafs", config_set_id);
        let body = json!({ "data": [{ "type": "waf", "id": waf_id }] });
        self.send_unit(self.json_api_body(Method::PATCH, &path, &body)).await
    }

    async fn fetch_page(&self, query: &PageQuery, page: u32) -> ApiResult<Page<Value>> {
        let request = self
            .json_api(Method::GET, &query.path)
            .query(&page_params(query, page));
        self.send_json(request).await
    }

    async fn patch_rule_status(
        &self,
        service_id: &str,
        waf_id: &str,
        rule_id: &str,
        status: RuleStatus,
    ) -> ApiResult<ApiResponse> {
        let path = format!("/service/{}/wafs/{}/rules/{}/rule_status", service_id, waf_id, rule_id);
        let body = rule_status_body(waf_id, rule_id, status);
        self.send_raw(self.json_api_body(Method::PATCH, &path, &body)).await
    }

    async fn set_tag_status(
        &self,
        service_id: &str,
        waf_id: &str,
        tag: &str,
        status: RuleStatus,
        force: bool,
    ) -> ApiResult<ApiResponse> {
        let path = format!("/service/{}/wafs/{}/rule_statuses", service_id, waf_id);
        let body = tag_status_body(waf_id, tag, status, force);
        self.send_raw(self.json_api_body(Method::POST, &path, &body)).await
    }

    async fn change_waf_status(&self, waf_id: &str, status: &str) -> ApiResult<ApiResponse> {
        let path = format!("/wafs/{}/{}", waf_id, status);
        let body = json!({ "data": { "id": waf_id, "type": "waf" } });
        self.send_raw(self.json_api_body(Method::PATCH, &path, &body)).await
    }
}
