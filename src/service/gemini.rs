use super::{AnalysisService, ServiceError, types::*};
use crate::{config::Config, model::AnalysisRequest, prompt};
use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// `generateContent` client for the Gemini REST API.
pub struct GeminiService {
    http: Client,
    api_base: String,
    temperature: f32,
    content_type: String,
    max_list_items: usize,
}

impl GeminiService {
    pub fn new(cfg: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if cfg.service.request_timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(cfg.service.request_timeout_seconds));
        }
        let http = builder.build().with_context(|| "building HTTP client")?;

        Ok(Self {
            http,
            api_base: cfg.service.api_base.trim_end_matches('/').to_string(),
            temperature: cfg.service.temperature,
            content_type: cfg.service.content_type.clone(),
            max_list_items: cfg.normalize.max_list_items,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, model)
    }

    pub fn build_request(&self, request: &AnalysisRequest<'_>) -> GenerateRequest {
        let mime_type = if request.document.content_type.is_empty() {
            self.content_type.clone()
        } else {
            request.document.content_type.clone()
        };

        GenerateRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type,
                            data: base64::engine::general_purpose::STANDARD
                                .encode(&request.document.bytes),
                        }),
                        ..Default::default()
                    },
                    Part {
                        text: Some(prompt::build_prompt(request.job_description)),
                        ..Default::default()
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".into(),
                response_schema: prompt::response_schema(self.max_list_items),
                temperature: self.temperature,
            },
        }
    }
}

#[async_trait]
impl AnalysisService for GeminiService {
    async fn generate(&self, request: &AnalysisRequest<'_>) -> Result<String, ServiceError> {
        let body = self.build_request(request);
        debug!(
            "gemini call model={} file={} bytes={}",
            request.model, request.document.name, request.document.size
        );

        let response = self
            .http
            .post(self.endpoint(request.model))
            .header("x-goog-api-key", request.credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), &raw));
        }

        let parsed: GenerateResponse = serde_json::from_str(&raw)
            .map_err(|e| ServiceError::Transport(format!("undecodable response envelope: {e}")))?;

        parsed.text().ok_or(ServiceError::EmptyResponse)
    }
}

/// Maps a non-2xx body to a `ServiceError`, keeping the service's own status
/// label (`UNAVAILABLE`, `NOT_FOUND`, ...) in the message.
pub fn error_from_body(status: u16, body: &str) -> ServiceError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => match env.error.status {
            Some(label) if !label.is_empty() => format!("{label}: {}", env.error.message),
            _ => env.error.message,
        },
        Err(_) => body.trim().to_string(),
    };
    ServiceError::Status { status, message }
}
