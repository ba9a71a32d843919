pub mod gemini;
pub mod types;

use crate::model::AnalysisRequest;
use async_trait::async_trait;

pub use gemini::GeminiService;

/// Raw failure signal from the analysis service, before classification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("service returned no content")]
    EmptyResponse,
}

/// The external analysis service: one document plus an instruction in,
/// text meant to parse as a candidate analysis out.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn generate(&self, request: &AnalysisRequest<'_>) -> Result<String, ServiceError>;
}

#[async_trait]
impl<S: AnalysisService + ?Sized> AnalysisService for std::sync::Arc<S> {
    async fn generate(&self, request: &AnalysisRequest<'_>) -> Result<String, ServiceError> {
        (**self).generate(request).await
    }
}
