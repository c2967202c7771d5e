//! Gemini `generateContent` client with a structured JSON response.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use rpm_store::models::RpmPlan;

use super::parser::parse_plan_json;
use super::prompt::{build_prompt, response_schema};
use super::trait_def::PlanGenerator;
use super::GenerateError;

/// Settings for [`GeminiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    /// API key. `None` defers the failure to call time.
    pub api_key: Option<String>,
    pub model: String,
    /// Scheme and host, without the `/v1beta` path.
    pub base_url: String,
}

impl GeminiConfig {
    pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
    pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Full endpoint for `generateContent` on the configured model.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// Generates plans by calling Gemini once per request.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Send one request and return the raw text of the first candidate.
    async fn request_text(&self, api_key: &str, prompt: &str) -> Result<String, GenerateError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };

        let response = self
            .client
            .post(self.config.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerateError::Generation(format!(
                "Gemini API error ({status}): {error_text}"
            )));
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            GenerateError::Generation(format!("failed to decode Gemini response: {e}"))
        })?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerateError::Generation("No response from AI".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl PlanGenerator for GeminiClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, tasks: &str, goals: &str) -> Result<RpmPlan, GenerateError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GenerateError::Configuration("API Key is missing.".to_string()))?;

        let prompt = build_prompt(tasks, goals);
        info!(model = %self.config.model, "requesting reason matrix");

        let result = match self.request_text(api_key, &prompt).await {
            Ok(text) => {
                debug!(bytes = text.len(), "received generation response");
                parse_plan_json(&text).map_err(GenerateError::from)
            }
            Err(e) => Err(e),
        };

        match &result {
            Ok(plan) => info!(
                categories = plan.categories.len(),
                reasons = plan.reason_count(),
                "reason matrix generated"
            ),
            Err(e) => error!(error = %e, "Gemini API error"),
        }
        result
    }
}

// API types

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
