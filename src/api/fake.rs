//! In-memory stand-in for the platform, used by unit tests.
//!
//! Named objects behave like the real API: creating an existing name yields
//! a duplicate error, deleting a missing one yields not-found. Listings are
//! served from pre-built pages keyed by the query's display form.

use super::error::ApiError;
use super::types::*;
use super::{ApiResult, WafApi};
use async_trait::async_trait;
use parking_lot::{Mutex, MutexGuard};
use serde_json::{json, Value};
use std::collections::HashMap;

#[derive(Default)]
pub(crate) struct State {
    pub versions: Vec<VersionInfo>,
    pub validation_errors: Vec<String>,
    pub conditions: Vec<Condition>,
    pub response_objects: Vec<ResponseObject>,
    pub snippets: Vec<Snippet>,
    pub syslogs: Vec<Syslog>,
    pub wafs: Vec<Waf>,
    pub owasp: HashMap<String, Owasp>,
    pub pages: HashMap<String, Vec<Page<Value>>>,
    pub page_requests: Vec<(String, u32)>,
    pub rule_statuses: HashMap<String, RuleStatus>,
    pub rule_status_overrides: HashMap<String, String>,
    pub tag_updates: Vec<(String, RuleStatus, bool)>,
    pub tag_status_line: Option<String>,
    pub waf_status_changes: Vec<(String, String)>,
    pub rulesets_updated: Vec<String>,
    pub config_set_bindings: Vec<(String, String)>,
    pub calls: Vec<String>,
    pub failures: HashMap<String, u16>,
    next_id: u32,
}

pub(crate) struct FakePlatform {
    state: Mutex<State>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_versions(active: u32, total: u32) -> Self {
        let fake = Self::new();
        fake.state().versions = (1..=total)
            .map(|number| VersionInfo {
                number,
                active: number == active,
            })
            .collect();
        fake
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    /// Make every call of `op` fail with the given HTTP status.
    pub fn fail(&self, op: &str, status: u16) {
        self.state.lock().failures.insert(op.to_string(), status);
    }

    pub fn seed_condition(&self, name: &str, statement: &str) {
        self.state.lock().conditions.push(Condition {
            name: name.to_string(),
            statement: statement.to_string(),
            kind: "RESPONSE".to_string(),
            priority: 10,
        });
    }

    pub fn seed_response_object(&self, name: &str) {
        self.state.lock().response_objects.push(ResponseObject {
            name: name.to_string(),
            status: 403,
            response: "Forbidden".to_string(),
            content: String::new(),
            content_type: String::new(),
        });
    }

    pub fn seed_snippet(&self, name: &str) {
        self.state.lock().snippets.push(Snippet {
            name: name.to_string(),
            content: String::new(),
            kind: "recv".to_string(),
            priority: 10,
            dynamic: 0,
        });
    }

    pub fn seed_syslog(&self, name: &str) {
        self.state.lock().syslogs.push(Syslog {
            name: name.to_string(),
            ..Default::default()
        });
    }

    pub fn seed_waf(&self, id: &str) {
        self.state.lock().wafs.push(Waf {
            id: id.to_string(),
            prefetch_condition: "WAF_Prefetch".to_string(),
            response: "WAF_Response".to_string(),
        });
    }

    pub fn seed_owasp(&self, waf_id: &str, owasp_id: &str, settings: OwaspSettings) {
        self.state.lock().owasp.insert(
            waf_id.to_string(),
            Owasp {
                id: owasp_id.to_string(),
                settings,
            },
        );
    }

    pub fn serve(&self, query: &PageQuery, records: Vec<Value>, per_page: usize) {
        self.state
            .lock()
            .pages
            .insert(query.to_string(), paginate(records, per_page));
    }

    pub fn serve_pages(&self, query: &PageQuery, pages: Vec<Page<Value>>) {
        self.state.lock().pages.insert(query.to_string(), pages);
    }

    fn check(&self, op: &str) -> ApiResult<()> {
        let mut state = self.state.lock();
        if let Some(status) = state.failures.get(op).copied() {
            state.calls.push(format!("{}!", op));
            return Err(ApiError::Status {
                status,
                message: format!("injected failure in {}", op),
            });
        }
        Ok(())
    }

    fn record(&self, call: String) {
        self.state.lock().calls.push(call);
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut state = self.state.lock();
        state.next_id += 1;
        format!("{}{}", prefix, state.next_id)
    }
}

pub(crate) fn paginate(records: Vec<Value>, per_page: usize) -> Vec<Page<Value>> {
    let record_count = records.len() as u32;
    if records.is_empty() {
        return vec![Page {
            data: Vec::new(),
            included: Vec::new(),
            links: PageLinks::default(),
            meta: PageMeta {
                current_page: 1,
                per_page: per_page as u32,
                record_count: 0,
                total_pages: 0,
            },
        }];
    }

    let chunks: Vec<Vec<Value>> = records.chunks(per_page).map(|c| c.to_vec()).collect();
    let total_pages = chunks.len() as u32;
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, data)| Page {
            data,
            included: Vec::new(),
            links: PageLinks::default(),
            meta: PageMeta {
                current_page: i as u32 + 1,
                per_page: per_page as u32,
                record_count,
                total_pages,
            },
        })
        .collect()
}

pub(crate) fn rule_record(id: &str, status: &str, publisher: &str) -> Value {
    json!({
        "id": id,
        "type": "rule_status",
        "attributes": {
            "status": status,
            "publisher": publisher,
            "modsec_rule_id": id,
            "rule_id": id,
            "message": format!("rule {}", id),
            "paranoia_level": 1
        }
    })
}

/// Overlay the attributes an update call would send onto `current`.
fn merge_owasp(current: &OwaspSettings, update: &OwaspSettings) -> OwaspSettings {
    let mut merged = json!(current);
    if let (Some(base), Value::Object(changes)) = (merged.as_object_mut(), update.update_attributes()) {
        base.extend(changes);
    }
    serde_json::from_value(merged).unwrap()
}

fn not_found(what: &str, name: &str) -> ApiError {
    ApiError::NotFound {
        message: format!("{} '{}' not found", what, name),
    }
}

fn duplicate(what: &str, name: &str) -> ApiError {
    ApiError::Duplicate {
        message: format!("Duplicate record: {} '{}'", what, name),
    }
}

#[async_trait]
impl WafApi for FakePlatform {
    async fn get_service(&self, service_id: &str) -> ApiResult<ServiceDetails> {
        self.check("get_service")?;
        Ok(ServiceDetails {
            id: service_id.to_string(),
            name: "fake".to_string(),
            versions: self.state().versions.clone(),
        })
    }

    async fn clone_version(&self, version: &ServiceVersion) -> ApiResult<u32> {
        self.check("clone_version")?;
        let mut state = self.state();
        let number = state.versions.iter().map(|v| v.number).max().unwrap_or(0) + 1;
        state.versions.push(VersionInfo { number, active: false });
        state.calls.push(format!("clone_version:{}", version.number));
        Ok(number)
    }

    async fn validate_version(&self, version: &ServiceVersion) -> ApiResult<VersionValidation> {
        self.check("validate_version")?;
        let mut state = self.state();
        state.calls.push(format!("validate_version:{}", version.number));
        let errors = state.validation_errors.clone();
        Ok(VersionValidation {
            status: if errors.is_empty() { "ok" } else { "error" }.to_string(),
            msg: None,
            errors,
        })
    }

    async fn list_conditions(&self, _version: &ServiceVersion) -> ApiResult<Vec<Condition>> {
        self.check("list_conditions")?;
        Ok(self.state().conditions.clone())
    }

    async fn create_condition(&self, _version: &ServiceVersion, condition: &Condition) -> ApiResult<()> {
        self.check("create_condition")?;
        let mut state = self.state();
        if state.conditions.iter().any(|c| c.name.eq_ignore_ascii_case(&condition.name)) {
            return Err(duplicate("condition", &condition.name));
        }
        state.conditions.push(condition.clone());
        state.calls.push(format!("create_condition:{}", condition.name));
        Ok(())
    }

    async fn update_condition(&self, _version: &ServiceVersion, condition: &Condition) -> ApiResult<()> {
        self.check("update_condition")?;
        let mut state = self.state();
        let existing = state
            .conditions
            .iter_mut()
            .find(|c| c.name == condition.name)
            .ok_or_else(|| not_found("condition", &condition.name))?;
        *existing = condition.clone();
        state.calls.push(format!("update_condition:{}", condition.name));
        Ok(())
    }

    async fn delete_condition(&self, _version: &ServiceVersion, name: &str) -> ApiResult<()> {
        self.check("delete_condition")?;
        let mut state = self.state();
        let before = state.conditions.len();
        state.conditions.retain(|c| c.name != name);
        if state.conditions.len() == before {
            return Err(not_found("condition", name));
        }
        state.calls.push(format!("delete_condition:{}", name));
        Ok(())
    }

    async fn list_response_objects(&self, _version: &ServiceVersion) -> ApiResult<Vec<ResponseObject>> {
        self.check("list_response_objects")?;
        Ok(self.state().response_objects.clone())
    }

    async fn create_response_object(&self, _version: &ServiceVersion, response: &ResponseObject) -> ApiResult<()> {
        self.check("create_response_object")?;
        let mut state = self.state();
        if state.response_objects.iter().any(|r| r.name.eq_ignore_ascii_case(&response.name)) {
            return Err(duplicate("response object", &response.name));
        }
        state.response_objects.push(response.clone());
        state.calls.push(format!("create_response_object:{}", response.name));
        Ok(())
    }

    async fn delete_response_object(&self, _version: &ServiceVersion, name: &str) -> ApiResult<()> {
        self.check("delete_response_object")?;
        let mut state = self.state();
        let before = state.response_objects.len();
        state.response_objects.retain(|r| r.name != name);
        if state.response_objects.len() == before {
            return Err(not_found("response object", name));
        }
        state.calls.push(format!("delete_response_object:{}", name));
        Ok(())
    }

    async fn list_snippets(&self, _version: &ServiceVersion) -> ApiResult<Vec<Snippet>> {
        self.check("list_snippets")?;
        Ok(self.state().snippets.clone())
    }

    async fn create_snippet(&self, _version: &ServiceVersion, snippet: &Snippet) -> ApiResult<()> {
        self.check("create_snippet")?;
        let mut state = self.state();
        if state.snippets.iter().any(|s| s.name == snippet.name) {
            return Err(duplicate("snippet", &snippet.name));
        }
        state.snippets.push(snippet.clone());
        state.calls.push(format!("create_snippet:{}", snippet.name));
        Ok(())
    }

    async fn delete_snippet(&self, _version: &ServiceVersion, name: &str) -> ApiResult<()> {
        self.check("delete_snippet")?;
        let mut state = self.state();
        let before = state.snippets.len();
        state.snippets.retain(|s| s.name != name);
        if state.snippets.len() == before {
            return Err(not_found("snippet", name));
        }
        state.calls.push(format!("delete_snippet:{}", name));
        Ok(())
    }

    async fn list_syslogs(&self, _version: &ServiceVersion) -> ApiResult<Vec<Syslog>> {
        self.check("list_syslogs")?;
        Ok(self.state().syslogs.clone())
    }

    async fn create_syslog(&self, _version: &ServiceVersion, syslog: &Syslog) -> ApiResult<()> {
        self.check("create_syslog")?;
        let mut state = self.state();
        if state.syslogs.iter().any(|s| s.name.eq_ignore_ascii_case(&syslog.name)) {
            return Err(duplicate("syslog", &syslog.name));
        }
        state.syslogs.push(syslog.clone());
        state.calls.push(format!("create_syslog:{}", syslog.name));
        Ok(())
    }

    async fn set_syslog_condition(&self, _version: &ServiceVersion, name: &str, condition: &str) -> ApiResult<()> {
        self.check("set_syslog_condition")?;
        let mut state = self.state();
        let syslog = state
            .syslogs
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| not_found("syslog", name))?;
        syslog.response_condition = Some(condition.to_string());
        state.calls.push(format!("set_syslog_condition:{}={}", name, condition));
        Ok(())
    }

    async fn delete_syslog(&self, _version: &ServiceVersion, name: &str) -> ApiResult<()> {
        self.check("delete_syslog")?;
        let mut state = self.state();
        let before = state.syslogs.len();
        state.syslogs.retain(|s| s.name != name);
        if state.syslogs.len() == before {
            return Err(not_found("syslog", name));
        }
        state.calls.push(format!("delete_syslog:{}", name));
        Ok(())
    }

    async fn list_wafs(&self, _version: &ServiceVersion) -> ApiResult<Vec<Waf>> {
        self.check("list_wafs")?;
        Ok(self.state().wafs.clone())
    }

    async fn create_waf(&self, _version: &ServiceVersion, prefetch_condition: &str, response: &str) -> ApiResult<Waf> {
        self.check("create_waf")?;
        let waf = Waf {
            id: self.next_id("waf"),
            prefetch_condition: prefetch_condition.to_string(),
            response: response.to_string(),
        };
        let mut state = self.state();
        state.wafs.push(waf.clone());
        state.calls.push(format!("create_waf:{}", waf.id));
        Ok(waf)
    }

    async fn delete_waf(&self, _version: &ServiceVersion, waf_id: &str) -> ApiResult<()> {
        self.check("delete_waf")?;
        let mut state = self.state();
        let before = state.wafs.len();
        state.wafs.retain(|w| w.id != waf_id);
        if state.wafs.len() == before {
            return Err(not_found("waf", waf_id));
        }
        state.calls.push(format!("delete_waf:{}", waf_id));
        Ok(())
    }

    async fn get_owasp(&self, _service_id: &str, waf_id: &str) -> ApiResult<Option<Owasp>> {
        self.check("get_owasp")?;
        Ok(self.state().owasp.get(waf_id).cloned())
    }

    async fn create_owasp(&self, _service_id: &str, waf_id: &str) -> ApiResult<Owasp> {
        self.check("create_owasp")?;
        let owasp = Owasp {
            id: self.next_id("owasp"),
            settings: OwaspSettings::default(),
        };
        let mut state = self.state();
        state.owasp.insert(waf_id.to_string(), owasp.clone());
        state.calls.push(format!("create_owasp:{}", waf_id));
        Ok(owasp)
    }

    async fn update_owasp(
        &self,
        _service_id: &str,
        waf_id: &str,
        owasp_id: &str,
        settings: &OwaspSettings,
    ) -> ApiResult<Owasp> {
        self.check("update_owasp")?;
        let mut state = self.state();
        let owasp = state
            .owasp
            .get_mut(waf_id)
            .filter(|o| o.id == owasp_id)
            .ok_or_else(|| not_found("owasp", owasp_id))?;
        owasp.settings = merge_owasp(&owasp.settings, settings);
        let updated = owasp.clone();
        state.calls.push(format!("update_owasp:{}", owasp_id));
        Ok(updated)
    }

    async fn update_ruleset(&self, _service_id: &str, waf_id: &str) -> ApiResult<()> {
        self.check("update_ruleset")?;
        let mut state = self.state();
        state.rulesets_updated.push(waf_id.to_string());
        state.calls.push(format!("update_ruleset:{}", waf_id));
        Ok(())
    }

    async fn set_configuration_set(&self, waf_id: &str, config_set_id: &str) -> ApiResult<()> {
        self.check("set_configuration_set")?;
        let mut state = self.state();
        state
            .config_set_bindings
            .push((waf_id.to_string(), config_set_id.to_string()));
        state.calls.push(format!("set_configuration_set:{}", config_set_id));
        Ok(())
    }

    async fn fetch_page(&self, query: &PageQuery, page: u32) -> ApiResult<Page<Value>> {
        self.check("fetch_page")?;
        let key = query.to_string();
        let mut state = self.state();
        state.page_requests.push((key.clone(), page));
        state.calls.push(format!("fetch_page:{}", page));
        if state.failures.get(&format!("fetch_page:{}", page)).is_some() {
            return Err(ApiError::Status {
                status: 502,
                message: format!("injected failure on page {}", page),
            });
        }
        let pages = state.pages.get(&key).cloned().unwrap_or_default();
        Ok(pages
            .into_iter()
            .nth(page.saturating_sub(1) as usize)
            .unwrap_or_else(|| paginate(Vec::new(), 100).remove(0)))
    }

    async fn patch_rule_status(
        &self,
        _service_id: &str,
        _waf_id: &str,
        rule_id: &str,
        status: RuleStatus,
    ) -> ApiResult<ApiResponse> {
        self.check("patch_rule_status")?;
        let mut state = self.state();
        state.calls.push(format!("patch_rule_status:{}={}", rule_id, status));
        if let Some(line) = state.rule_status_overrides.get(rule_id).cloned() {
            return Ok(ApiResponse::new(line, "{}"));
        }
        state.rule_statuses.insert(rule_id.to_string(), status);
        Ok(ApiResponse::new("200 OK", "{}"))
    }

    async fn set_tag_status(
        &self,
        _service_id: &str,
        _waf_id: &str,
        tag: &str,
        status: RuleStatus,
        force: bool,
    ) -> ApiResult<ApiResponse> {
        self.check("set_tag_status")?;
        let mut state = self.state();
        state.calls.push(format!("set_tag_status:{}={}", tag, status));
        state.tag_updates.push((tag.to_string(), status, force));
        let line = state.tag_status_line.clone().unwrap_or_else(|| "200 OK".to_string());
        Ok(ApiResponse::new(line, "{}"))
    }

    async fn change_waf_status(&self, waf_id: &str, status: &str) -> ApiResult<ApiResponse> {
        self.check("change_waf_status")?;
        let mut state = self.state();
        state
            .waf_status_changes
            .push((waf_id.to_string(), status.to_string()));
        state.calls.push(format!("change_waf_status:{}={}", waf_id, status));
        Ok(ApiResponse::new("202 Accepted", "{}"))
    }
}
