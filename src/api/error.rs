use serde::Deserialize;
use thiserror::Error;

/// Marker the platform puts in the error message when a named object already
/// exists. It carries no structured error code, so this substring is the only
/// way to tell "already there" apart from a real failure.
pub const DUPLICATE_RECORD_MARKER: &str = "Duplicate record";

/// Errors surfaced by the platform client, classified at the boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("duplicate record: {message}")]
    Duplicate { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    errors: Vec<JsonApiError>,
}

#[derive(Debug, Default, Deserialize)]
struct JsonApiError {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

impl ApiError {
    /// Classify a non-success response from its status code and raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = extract_message(body);

        if status == 404 {
            return Self::NotFound { message };
        }
        if is_duplicate_message(&message) || is_duplicate_message(body) {
            return Self::Duplicate { message };
        }
        Self::Status { status, message }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub fn is_duplicate_message(message: &str) -> bool {
    message.contains(DUPLICATE_RECORD_MARKER)
}

fn extract_message(body: &str) -> String {
    let payload: ErrorPayload = match serde_json::from_str(body) {
        Ok(payload) => payload,
        Err(_) => return body.trim().to_string(),
    };

    let mut parts: Vec<String> = Vec::new();
    parts.extend(payload.msg);
    parts.extend(payload.detail);
    for error in payload.errors {
        parts.extend(error.title);
        parts.extend(error.detail);
    }

    if parts.is_empty() {
        body.trim().to_string()
    } else {
        parts.join(": ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_classified_from_legacy_payload() {
        let body = r#"{"msg":"Duplicate record","detail":"Duplicate syslog: 'weblogs'"}"#;
        let err = ApiError::from_response(409, body);
        assert!(err.is_duplicate());
    }

    #[test]
    fn test_duplicate_marker_is_case_sensitive() {
        // Only the exact marker counts; anything else stays a hard failure.
        let err = ApiError::from_response(400, r#"{"msg":"duplicate RECORD"}"#);
        assert!(!err.is_duplicate());
        assert!(matches!(err, ApiError::Status { status: 400, .. }));
    }

    #[test]
    fn test_not_found_wins_over_message() {
        let err = ApiError::from_response(404, r#"{"msg":"Record not found"}"#);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_json_api_errors_are_joined() {
        let body = r#"{"errors":[{"title":"Bad request","detail":"invalid status"}]}"#;
        match ApiError::from_response(400, body) {
            ApiError::Status { message, .. } => assert_eq!(message, "Bad request: invalid status"),
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn test_plain_text_body_kept() {
        match ApiError::from_response(500, "upstream exploded\n") {
            ApiError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("unexpected classification: {:?}", other),
        }
    }
}
