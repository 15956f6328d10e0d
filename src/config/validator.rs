use super::Config;
use crate::api::RuleStatus;

/// Longest expiry horizon accepted for the web log condition.
pub const MAX_LOG_EXPIRY_DAYS: u32 = 3650;

pub fn validate_config(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.api_endpoint.starts_with("https://") && !config.api_endpoint.starts_with("http://") {
        warnings.push(format!(
            "[X] api_endpoint must be an http(s) URL, got: {}",
            config.api_endpoint
        ));
    } else if config.api_endpoint.starts_with("http://") {
        warnings.push("[!] api_endpoint uses plain HTTP. The API key will be sent unencrypted".to_string());
    }

    if config.tags.is_empty() && config.publisher.is_empty() && config.rules.is_empty() {
        warnings.push("[i] No tags, publishers or rules configured. Only disabled_rules will be applied".to_string());
    }

    if config.tags.iter().chain(config.publisher.iter()).any(|s| s.trim().is_empty()) {
        warnings.push("[X] Empty entry in tags or publisher list".to_string());
    }

    for rule in &config.disabled_rules {
        if config.rules.contains(rule) && config.action != RuleStatus::Disabled {
            warnings.push(format!(
                "[!] Rule {} is listed in both rules and disabled_rules. It will end up disabled",
                rule
            ));
        }
    }

    if !["trace", "debug", "info", "warn", "error"].contains(&config.logging.level.as_str()) {
        warnings.push(format!(
            "[X] Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
            config.logging.level
        ));
    }

    if let Some(ref path) = config.logging.path {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                warnings.push(format!(
                    "[X] Log file directory does not exist: {}",
                    parent.display()
                ));
            }
        }
    }

    for (section, name, address, port) in [
        ("weblog", &config.weblog.name, &config.weblog.address, config.weblog.port),
        ("waflog", &config.waflog.name, &config.waflog.address, config.waflog.port),
    ] {
        if name.is_empty() {
            warnings.push(format!("[X] [{}] name is not configured", section));
        }
        if address.is_empty() {
            warnings.push(format!("[X] [{}] address is not configured", section));
        }
        if port == 0 || port > 65535 {
            warnings.push(format!("[X] [{}] port {} is out of range", section, port));
        }
    }

    if config.weblog.name == config.waflog.name {
        warnings.push("[X] [weblog] and [waflog] must use different endpoint names".to_string());
    }

    if config.weblog.format.is_empty() || config.waflog.format.is_empty() {
        warnings.push("[!] Empty log format. The endpoints will stream blank lines".to_string());
    }

    if config.weblog.expiry > MAX_LOG_EXPIRY_DAYS {
        warnings.push(format!(
            "[X] Log expiry of {} days is over the {} day limit",
            config.weblog.expiry, MAX_LOG_EXPIRY_DAYS
        ));
    } else if config.weblog.expiry > 365 {
        warnings.push(format!(
            "[!] Log expiry of {} days is more than a year",
            config.weblog.expiry
        ));
    }

    if config.prefetch.name.is_empty() || config.response.name.is_empty() || config.vclsnippet.name.is_empty() {
        warnings.push("[X] [prefetch], [response] and [vclsnippet] need a name".to_string());
    }

    if !(100..=599).contains(&config.response.http_status_code) {
        warnings.push(format!(
            "[X] [response] http_status_code {} is not an HTTP status",
            config.response.http_status_code
        ));
    }

    if config.response.name != "WAF_Response" {
        warnings.push(format!(
            "[i] Response object '{}' will not be removed by deprovision, which deletes 'WAF_Response'",
            config.response.name
        ));
    }

    if config.vclsnippet.content.is_empty() {
        warnings.push("[!] [vclsnippet] content is empty".to_string());
    }

    if config.owasp.paranoia_level > 4 {
        warnings.push(format!(
            "[!] [owasp] paranoia_level {} is above 4",
            config.owasp.paranoia_level
        ));
    }

    if config.owasp.paranoia_level == 0 || config.owasp.inbound_anomaly_score_threshold == 0 {
        warnings.push(
            "[i] [owasp] tunables left at 0 or empty are not sent; the platform keeps its current values".to_string()
        );
    }

    if config.action == RuleStatus::Block {
        warnings.push(
            "[*] Recommendation: Run with action = \"log\" first and review the WAF logs before blocking".to_string()
        );
    }

    if config.logging.level == "debug" || config.logging.level == "trace" {
        warnings.push(
            "[*] Recommendation: Use 'info' or 'warn' log level for routine runs".to_string()
        );
    }

    warnings
}

/// True when any finding is blocking.
pub fn has_errors(warnings: &[String]) -> bool {
    warnings.iter().any(|w| w.starts_with("[X]"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usable_config() -> Config {
        let mut config = Config::default();
        config.tags = vec!["language-php".to_string()];
        config.weblog.address = "logs.example.com".to_string();
        config.weblog.format = "%h".to_string();
        config.waflog.address = "logs.example.com".to_string();
        config.waflog.format = "%h".to_string();
        config.vclsnippet.content = "set req.http.x = \"1\";".to_string();
        config.owasp.paranoia_level = 1;
        config.owasp.inbound_anomaly_score_threshold = 10;
        config
    }

    #[test]
    fn test_usable_config_has_no_errors() {
        let warnings = validate_config(&usable_config());
        assert!(!has_errors(&warnings), "{:?}", warnings);
    }

    #[test]
    fn test_missing_address_is_error() {
        let mut config = usable_config();
        config.waflog.address.clear();
        let warnings = validate_config(&config);
        assert!(has_errors(&warnings));
        assert!(warnings.iter().any(|w| w.contains("[waflog] address")));
    }

    #[test]
    fn test_same_endpoint_names_is_error() {
        let mut config = usable_config();
        config.waflog.name = config.weblog.name.clone();
        assert!(has_errors(&validate_config(&config)));
    }

    #[test]
    fn test_expiry_horizon_is_bounded() {
        let mut config = usable_config();
        config.weblog.expiry = 400;
        let warnings = validate_config(&config);
        assert!(!has_errors(&warnings));
        assert!(warnings.iter().any(|w| w.starts_with("[!] Log expiry of 400 days")));

        config.weblog.expiry = 200_000_000;
        let warnings = validate_config(&config);
        assert!(warnings.iter().any(|w| w.starts_with("[X] Log expiry of 200000000 days")));
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = usable_config();
        config.logging.level = "verbose".to_string();
        let warnings = validate_config(&config);
        assert!(warnings.iter().any(|w| w.starts_with("[X] Invalid log level")));
    }

    #[test]
    fn test_custom_response_name_is_noted() {
        let mut config = usable_config();
        config.response.name = "Custom_Response".to_string();
        let warnings = validate_config(&config);
        assert!(!has_errors(&warnings));
        assert!(warnings.iter().any(|w| w.starts_with("[i]") && w.contains("Custom_Response")));
    }
}
