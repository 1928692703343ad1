// Fictional download-link text generation with rate-limit retry

use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;
use tokio::time::{sleep, Duration};

use crate::resolver::models::VideoRecord;

/// Prefix the prompt instructs every fabricated link to start with.
pub const FICTIONAL_LINK_PREFIX: &str = "https://fictional-stream-link.com/";

/// Lines starting with this (after trimming) are treated as link lines.
const LINK_LINE_PREFIX: &str = "https://";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const GENERATE_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const MAX_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(2_000);

/// Resolution bucket the caller prefers for the fabricated links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityPreference {
    #[default]
    BestAvailable,
    Uhd8k,
    Uhd4k,
    Qhd1440,
    Fhd1080,
    Hd720,
}

impl QualityPreference {
    pub const ALL: [QualityPreference; 6] = [
        QualityPreference::BestAvailable,
        QualityPreference::Uhd8k,
        QualityPreference::Uhd4k,
        QualityPreference::Qhd1440,
        QualityPreference::Fhd1080,
        QualityPreference::Hd720,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::BestAvailable => "Best Available",
            Self::Uhd8k => "8K",
            Self::Uhd4k => "4K",
            Self::Qhd1440 => "1440p",
            Self::Fhd1080 => "1080p",
            Self::Hd720 => "720p",
        }
    }
}

/// Build the generation prompt for one video.
pub fn build_prompt(video: &VideoRecord, quality: QualityPreference) -> String {
    let quality_instruction = match quality {
        QualityPreference::BestAvailable => {
            "Provide 5-6 options with different high resolutions (e.g., 8K, 4K, 1440p, 1080p, 720p) \
             and formats (e.g., MP4, WebM)."
                .to_string()
        }
        preferred => format!(
            "Prioritize generating a fictional download link for {} resolution. \
             Also include a few other high-resolution options like 8K, 4K, 1440p, and 1080p.",
            preferred.label()
        ),
    };

    format!(
        "Generate a list of fictional download stream links for the following YouTube video.\n\
         {}\n\
         The links should be illustrative and not real. Start each link with \"{}\".\n\n\
         Video Title: {}\n\
         Video ID: {}\n",
        quality_instruction, FICTIONAL_LINK_PREFIX, video.snippet.title, video.id
    )
}

/// Raw failure surfaced by a text model call, before classification.
/// `payload` may be a structured JSON error document or a bare message.
#[derive(Debug, Clone)]
pub struct ModelFailure {
    pub status: Option<u16>,
    pub payload: String,
}

/// A text-generation backend. The real implementation talks to the
/// generativelanguage REST API; tests substitute scripted models.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ModelFailure>;
}

/// reqwest-backed `generateContent` client.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelFailure> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            GENERATE_API_URL, self.model, self.api_key
        );
        let body = serde_json::json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelFailure {
                status: None,
                payload: e.to_string(),
            })?;
        let status = response.status();
        let text = response.text().await.map_err(|e| ModelFailure {
            status: Some(status.as_u16()),
            payload: e.to_string(),
        })?;
        if !status.is_success() {
            return Err(ModelFailure {
                status: Some(status.as_u16()),
                payload: text,
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| ModelFailure {
                status: None,
                payload: format!("unexpected response shape: {}", e),
            })?;
        let output = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        if output.trim().is_empty() {
            return Err(ModelFailure {
                status: None,
                payload: "response contained no generated text".to_string(),
            });
        }
        Ok(output.trim().to_string())
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Error)]
pub enum GenerateError {
    /// Still rate-limited after the last attempt
    #[error("{0}")]
    RateLimited(String),

    /// Any other generation failure; no retry
    #[error("{0}")]
    Api(String),
}

/// Outcome of defensively parsing an error payload.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ClassifiedFailure {
    pub rate_limited: bool,
    pub message: String,
}

/// Error payloads may be structured JSON carrying `error.code` and
/// `error.message`, or arbitrary text. A parse failure is not itself an
/// error: fall back to the raw message, or a generic one when empty.
pub(crate) fn classify_failure(failure: &ModelFailure) -> ClassifiedFailure {
    const FALLBACK: &str = "Could not generate download options.";

    let mut rate_limited = failure.status == Some(429);
    let mut message = if failure.payload.trim().is_empty() {
        FALLBACK.to_string()
    } else {
        failure.payload.clone()
    };
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&failure.payload) {
        if let Some(error) = envelope.error {
            if let Some(text) = error.message {
                message = text;
            }
            if error.code == Some(429) {
                rate_limited = true;
            }
        }
    }
    ClassifiedFailure {
        rate_limited,
        message,
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

/// Free-text string produced per video, plus the link-looking lines
/// derived from it. Replaced wholesale on regeneration, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub text: String,
    pub links: Vec<String>,
}

impl SummaryResult {
    pub fn new(text: String) -> Self {
        let links = extract_links(&text);
        Self { text, links }
    }
}

/// Lines of a summary that look like links.
pub fn extract_links(summary: &str) -> Vec<String> {
    summary
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with(LINK_LINE_PREFIX))
        .map(str::to_string)
        .collect()
}

/// Retry/backoff wrapper around a text model.
pub struct SummaryGenerator<M: TextModel> {
    model: M,
}

impl<M: TextModel> SummaryGenerator<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Generate fictional download-link text for one video.
    ///
    /// At most 3 attempts. Rate-limited attempts back off 2s, then 4s,
    /// before retrying; any other failure is surfaced immediately with
    /// the message extracted from the payload.
    pub async fn generate_summary(
        &self,
        video: &VideoRecord,
        quality: QualityPreference,
    ) -> Result<String, GenerateError> {
        let prompt = build_prompt(video, quality);
        let mut backoff = INITIAL_BACKOFF;

        for attempt in 1..=MAX_ATTEMPTS {
            match self.model.generate(&prompt).await {
                Ok(text) => return Ok(text.trim().to_string()),
                Err(failure) => {
                    let classified = classify_failure(&failure);
                    warn!(
                        "generation attempt {}/{} failed: {}",
                        attempt, MAX_ATTEMPTS, classified.message
                    );
                    if !classified.rate_limited {
                        return Err(GenerateError::Api(classified.message));
                    }
                    if attempt == MAX_ATTEMPTS {
                        return Err(GenerateError::RateLimited(classified.message));
                    }
                    debug!("rate limited, retrying in {}ms", backoff.as_millis());
                    sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }
        unreachable!("attempt loop always returns")
    }
}
