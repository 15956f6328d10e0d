//! Existence checks against collections listed from a service version.

use crate::api::{Condition, ResponseObject, Snippet, Syslog};

pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Condition {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ResponseObject {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Snippet {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Syslog {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Case-insensitive name match.
pub fn name_exists<T: Named>(items: &[T], name: &str) -> bool {
    items.iter().any(|item| item.name().eq_ignore_ascii_case(name))
}

/// Exact name match; snippet names are case-sensitive on the platform.
pub fn name_exists_exact<T: Named>(items: &[T], name: &str) -> bool {
    items.iter().any(|item| item.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(name: &str) -> ResponseObject {
        ResponseObject {
            name: name.to_string(),
            status: 403,
            response: "Forbidden".to_string(),
            content: String::new(),
            content_type: String::new(),
        }
    }

    fn snippet(name: &str) -> Snippet {
        Snippet {
            name: name.to_string(),
            content: String::new(),
            kind: "recv".to_string(),
            priority: 10,
            dynamic: 0,
        }
    }

    #[test]
    fn test_name_match_ignores_case() {
        let existing = vec![response("waf_response")];
        assert!(name_exists(&existing, "WAF_Response"));
        assert!(!name_exists(&existing, "WAF_Response_2"));
    }

    #[test]
    fn test_empty_collection_has_nothing() {
        let existing: Vec<Syslog> = Vec::new();
        assert!(!name_exists(&existing, "weblogs"));
    }

    #[test]
    fn test_exact_match_is_case_sensitive() {
        let existing = vec![snippet("Fastly_WAF_Snippet")];
        assert!(name_exists_exact(&existing, "Fastly_WAF_Snippet"));
        assert!(!name_exists_exact(&existing, "fastly_waf_snippet"));
    }
}
