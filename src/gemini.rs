//! Single-shot client for the Gemini `generateContent` endpoint.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::prompt::Prompt;

static CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(concat!("credgen/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

pub const UNEXPECTED_RESPONSE: &str = "Unexpected API response structure or no content generated.";

/// Why a generation call produced no text. `Display` is the user-facing reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("{}", UNEXPECTED_RESPONSE)]
    UnexpectedResponse,
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Decode(String),
}

/// Model tuning options, forwarded to the service untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GenerationConfig(pub Map<String, Value>);

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: Prompt,
    pub config: GenerationConfig,
}

impl GenerationRequest {
    pub fn new(prompt: Prompt) -> Self {
        Self {
            prompt,
            config: GenerationConfig::default(),
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// One attempt, no retry. Every failure comes back as `Err`, never a panic.
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Turn<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: &'a GenerationConfig,
}

#[derive(Serialize)]
struct Turn<'a> {
    role: &'a str,
    parts: Vec<OutPart<'a>>,
}

#[derive(Serialize)]
struct OutPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    parts: Option<Vec<InPart>>,
}

#[derive(Deserialize)]
struct InPart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Maps a raw HTTP status and body to the generated text or a failure reason.
pub fn interpret_response(status: u16, body: &str) -> Result<String, GenerationError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|env| env.error)
            .and_then(|err| err.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(GenerationError::Api { status, message });
    }

    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Decode(e.to_string()))?;

    parsed
        .candidates
        .into_iter()
        .flatten()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().flatten().next())
        .and_then(|p| p.text)
        // An empty first part counts as no content.
        .filter(|text| !text.is_empty())
        .ok_or(GenerationError::UnexpectedResponse)
}

pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            http: CLIENT.clone(),
            endpoint,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let body = GenerateContentRequest {
            contents: vec![Turn {
                role: "user",
                parts: vec![OutPart {
                    text: request.prompt.as_str(),
                }],
            }],
            generation_config: &request.config,
        };

        tracing::debug!("POST generateContent ({} prompt chars)", request.prompt.as_str().len());
        let resp = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            // The URL carries the API key.
            .map_err(|e| GenerationError::Transport(e.without_url().to_string()))?;

        let status = resp.status().as_u16();
        tracing::debug!("Response status: {}", status);
        let text = resp
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.without_url().to_string()))?;

        let result = interpret_response(status, &text);
        if let Err(e) = &result {
            tracing::warn!("Generation failed: {}", e);
        }
        result
    }
}
