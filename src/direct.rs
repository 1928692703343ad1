// Third-party media-resolution API client
//
// Single POST boundary: the service answers with a direct stream
// descriptor, a picker list of candidates, or a structured error payload.

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MEDIA_RESOLVER_URL: &str = "https://co.wuk.sh/api/json";

#[derive(Debug, Error)]
pub enum DirectLinkError {
    #[error("Please enter a YouTube URL first.")]
    MissingUrl,

    #[error("Network error: Unable to connect to the download service.")]
    Network(#[source] reqwest::Error),

    #[error("Access forbidden: The download service is blocking requests from this application.")]
    Forbidden,

    #[error("Too many requests: The download service is rate-limiting requests. Please try again later.")]
    RateLimited,

    #[error("Service unavailable: The download service is currently experiencing issues. Please try again later.")]
    Unavailable,

    /// Any other non-success status
    #[error("Download service error (Status: {0}).")]
    Upstream(u16),

    /// The service reported a processing error of its own
    #[error("{0}")]
    Service(String),

    #[error("Received an unexpected response from the download service.")]
    UnexpectedResponse,
}

/// One resolved candidate stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectLink {
    pub url: String,
    pub quality: String,
    pub kind: String,
}

#[derive(Debug, Serialize)]
struct ResolveRequest<'a> {
    url: &'a str,
    #[serde(rename = "vQuality")]
    v_quality: &'a str,
    #[serde(rename = "isAudioOnly")]
    is_audio_only: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ResolveResponse {
    #[serde(default)]
    status: String,
    url: Option<String>,
    #[serde(default)]
    picker: Vec<PickerItem>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PickerItem {
    url: String,
    quality: Option<String>,
    #[serde(rename = "type", default)]
    kind: String,
}

/// Client for the media-resolution service.
pub struct MediaResolver {
    http: reqwest::Client,
}

impl MediaResolver {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Ask the service for direct stream candidates for a video URL.
    /// Quality selection is left to the service.
    pub async fn resolve_links(&self, url: &str) -> Result<Vec<DirectLink>, DirectLinkError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(DirectLinkError::MissingUrl);
        }

        let request = ResolveRequest {
            url,
            v_quality: "max",
            is_audio_only: false,
        };
        debug!("resolving direct links for {}", url);
        let response = self
            .http
            .post(MEDIA_RESOLVER_URL)
            .json(&request)
            .send()
            .await
            .map_err(DirectLinkError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                403 => DirectLinkError::Forbidden,
                429 => DirectLinkError::RateLimited,
                500 | 502 | 503 | 504 => DirectLinkError::Unavailable,
                code => DirectLinkError::Upstream(code),
            });
        }

        let payload: ResolveResponse = response
            .json()
            .await
            .map_err(|_| DirectLinkError::UnexpectedResponse)?;
        interpret_response(payload)
    }
}

impl Default for MediaResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn interpret_response(payload: ResolveResponse) -> Result<Vec<DirectLink>, DirectLinkError> {
    match payload.status.as_str() {
        "stream" => match payload.url {
            Some(url) => Ok(vec![DirectLink {
                url,
                quality: "Best".to_string(),
                kind: "Video".to_string(),
            }]),
            None => Err(DirectLinkError::UnexpectedResponse),
        },
        "picker" if !payload.picker.is_empty() => Ok(payload
            .picker
            .into_iter()
            .map(|item| DirectLink {
                url: item.url,
                quality: item.quality.unwrap_or_else(|| "N/A".to_string()),
                kind: item.kind,
            })
            .collect()),
        "error" => Err(DirectLinkError::Service(payload.text.unwrap_or_else(
            || "The download service could not process the URL.".to_string(),
        ))),
        _ => Err(DirectLinkError::UnexpectedResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_response_yields_single_best_link() {
        let payload: ResolveResponse =
            serde_json::from_str(r#"{"status": "stream", "url": "https://cdn/x"}"#).unwrap();
        let links = interpret_response(payload).unwrap();
        assert_eq!(
            links,
            vec![DirectLink {
                url: "https://cdn/x".to_string(),
                quality: "Best".to_string(),
                kind: "Video".to_string(),
            }]
        );
    }

    #[test]
    fn test_picker_response_maps_candidates() {
        let payload: ResolveResponse = serde_json::from_str(
            r#"{"status": "picker", "picker": [
                {"url": "https://cdn/a", "quality": "1080", "type": "video"},
                {"url": "https://cdn/b", "type": "photo"}
            ]}"#,
        )
        .unwrap();
        let links = interpret_response(payload).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].quality, "1080");
        assert_eq!(links[1].quality, "N/A");
        assert_eq!(links[1].kind, "photo");
    }

    #[test]
    fn test_error_response_surfaces_service_text() {
        let payload: ResolveResponse =
            serde_json::from_str(r#"{"status": "error", "text": "unsupported service"}"#).unwrap();
        match interpret_response(payload) {
            Err(DirectLinkError::Service(text)) => assert_eq!(text, "unsupported service"),
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_response_without_text_gets_default_message() {
        let payload: ResolveResponse = serde_json::from_str(r#"{"status": "error"}"#).unwrap();
        match interpret_response(payload) {
            Err(DirectLinkError::Service(text)) => {
                assert_eq!(text, "The download service could not process the URL.");
            }
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_status_is_unexpected() {
        let payload: ResolveResponse =
            serde_json::from_str(r#"{"status": "tunnel"}"#).unwrap();
        assert!(matches!(
            interpret_response(payload),
            Err(DirectLinkError::UnexpectedResponse)
        ));
        // Empty picker counts as unexpected too.
        let payload: ResolveResponse =
            serde_json::from_str(r#"{"status": "picker", "picker": []}"#).unwrap();
        assert!(matches!(
            interpret_response(payload),
            Err(DirectLinkError::UnexpectedResponse)
        ));
    }

    #[tokio::test]
    async fn test_blank_url_is_rejected_before_any_request() {
        let resolver = MediaResolver::new();
        assert!(matches!(
            resolver.resolve_links("  ").await,
            Err(DirectLinkError::MissingUrl)
        ));
    }
}
