// Error types for content resolution

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// Missing or malformed caller input (API key, query)
    #[error("{0}")]
    InvalidInput(String),

    /// The API returned an empty item set
    #[error("{0}")]
    NotFound(String),

    /// Video is 60 seconds or shorter
    #[error("This tool is for long-form videos only (over 60 seconds).")]
    TooShort,

    /// Thumbnail aspect ratio is not 16:9
    #[error("This tool is for landscape (16:9) videos only.")]
    WrongAspectRatio,

    /// Non-success HTTP status from the Data API, already rendered into a
    /// user-facing message
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// The API could not be reached at all
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Payload was missing fields the resolver needs
    #[error("Unexpected API response: {0}")]
    UnexpectedShape(String),
}

/// Render an upstream HTTP status into the message shown to the user.
/// `detail` is the API's own error message, when the body carried one.
pub fn upstream_message(status: u16, detail: Option<&str>) -> String {
    let detail = detail.unwrap_or("");
    match status {
        400 => format!(
            "Bad Request: {}",
            if detail.is_empty() {
                "Please check your inputs and API Key."
            } else {
                detail
            }
        ),
        403 => format!(
            "Forbidden: Your API key might be invalid, restricted, or have exceeded its quota. ({})",
            detail
        ),
        404 => format!(
            "Not Found: The requested item could not be found. ({})",
            detail
        ),
        500 | 503 => "YouTube service is temporarily unavailable. Please try again later.".to_string(),
        _ => format!(
            "An unexpected API error occurred (Status: {}). {}",
            status, detail
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_without_detail() {
        assert_eq!(
            upstream_message(400, None),
            "Bad Request: Please check your inputs and API Key."
        );
    }

    #[test]
    fn test_bad_request_with_detail() {
        assert_eq!(
            upstream_message(400, Some("API key not valid")),
            "Bad Request: API key not valid"
        );
    }

    #[test]
    fn test_forbidden_mentions_quota() {
        let message = upstream_message(403, Some("quotaExceeded"));
        assert!(message.starts_with("Forbidden:"));
        assert!(message.contains("quotaExceeded"));
    }

    #[test]
    fn test_service_unavailable() {
        assert_eq!(upstream_message(500, None), upstream_message(503, None));
        assert!(upstream_message(503, None).contains("temporarily unavailable"));
    }

    #[test]
    fn test_unknown_status_includes_code() {
        assert!(upstream_message(418, None).contains("Status: 418"));
    }
}
