//! Google Gemini `generateContent` client.
//!
//! One request per call, authenticated with an API key in the query string.
//! No retries here: failures are returned as [`LLMCallError`] with the HTTP
//! status and the service's status string preserved, and the retry policy
//! decides what to do with them.
//!
//! Request timeouts are left to reqwest's defaults.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::llms::base_llm::TextGenerator;
use crate::llms::response::{Candidate, ContentPart, RawResponse};
use crate::persona::template::RenderedPrompt;
use crate::utilities::errors::LLMCallError;

/// Model used when none is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

/// Public Gemini API base URL.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// HTTP client for the Gemini API.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client for `model` using `api_key`.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root (proxies, local stubs).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    fn request_body(prompt: &RenderedPrompt) -> GenerateContentRequest<'_> {
        GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: &prompt.text }],
            }],
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &RenderedPrompt) -> Result<RawResponse, LLMCallError> {
        log::debug!(
            "GeminiClient.generate: model={}, persona={}, prompt_chars={}",
            self.model,
            prompt.persona,
            prompt.text.chars().count(),
        );

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(map_http_error(status.as_u16(), body));
        }

        let parsed: WireResponse = serde_json::from_str(&body).map_err(|e| {
            LLMCallError::Decode(format!(
                "{} - Body: {}",
                e,
                body.chars().take(500).collect::<String>()
            ))
        })?;

        if let Some(error) = parsed.error {
            return Err(error.into_call_error(status.as_u16()));
        }

        Ok(parsed.into_raw())
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    candidates: Option<Vec<WireCandidate>>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct WireCandidate {
    #[serde(default)]
    content: Option<WireContent>,
}

#[derive(Deserialize)]
struct WireContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

impl WireResponse {
    /// Candidates are used only when some part carries text; otherwise the
    /// flat `text` field, if any.
    fn into_raw(self) -> RawResponse {
        let candidates: Vec<Candidate> = self
            .candidates
            .unwrap_or_default()
            .into_iter()
            .map(|c| Candidate {
                parts: c.content.map(|content| content.parts).unwrap_or_default(),
            })
            .collect();
        let has_text = candidates
            .iter()
            .flat_map(|c| c.parts.iter())
            .any(|p| p.text.as_deref().is_some_and(|t| !t.is_empty()));

        match self.text {
            _ if has_text => RawResponse::Candidates(candidates),
            Some(text) => RawResponse::FlatText(text),
            None => RawResponse::Empty,
        }
    }
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<u16>,
    message: Option<String>,
    status: Option<String>,
}

impl ErrorBody {
    fn into_call_error(self, http_status: u16) -> LLMCallError {
        LLMCallError::Api {
            code: self.code.unwrap_or(http_status),
            status: self.status.unwrap_or_default(),
            message: self.message.unwrap_or_else(|| "Unknown Gemini API error".to_string()),
        }
    }
}

fn map_http_error(status: u16, body: String) -> LLMCallError {
    match serde_json::from_str::<ErrorWrapper>(&body) {
        Ok(wrapper) => wrapper.error.into_call_error(status),
        Err(_) => LLMCallError::Http { status, body },
    }
}
