//! Default values for configuration options

// API defaults
pub(super) fn default_api_endpoint() -> String {
    "https://api.fastly.com".to_string()
}

// Logging defaults
pub(super) fn default_log_level() -> String {
    "info".to_string()
}

// Syslog endpoint defaults
pub(super) fn default_weblog_name() -> String {
    "weblogs".to_string()
}

pub(super) fn default_waflog_name() -> String {
    "waflogs".to_string()
}

pub(super) fn default_syslog_port() -> u32 {
    514
}

// VCL snippet defaults
pub(super) fn default_snippet_name() -> String {
    "Fastly_WAF_Snippet".to_string()
}

pub(super) fn default_snippet_type() -> String {
    "recv".to_string()
}

pub(super) fn default_priority() -> u32 {
    10
}

// Response object defaults
pub(super) fn default_response_name() -> String {
    "WAF_Response".to_string()
}

pub(super) fn default_http_status_code() -> u32 {
    403
}

pub(super) fn default_http_response() -> String {
    "Forbidden".to_string()
}

pub(super) fn default_content_type() -> String {
    "text/html".to_string()
}

// Prefetch condition defaults
pub(super) fn default_prefetch_name() -> String {
    "WAF_Prefetch".to_string()
}

pub(super) fn default_prefetch_statement() -> String {
    "req.backend.is_origin".to_string()
}

pub(super) fn default_prefetch_type() -> String {
    "PREFETCH".to_string()
}
