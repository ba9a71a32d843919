use crate::{
    model::AnalysisRequest,
    policy::{FailureClass, RetryPolicy, classify},
    service::{AnalysisService, ServiceError},
};
use tracing::{debug, warn};

/// Classified outcome of a failed analysis call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("API key is missing; set it before starting a batch")]
    MissingCredential,

    #[error("service overloaded after retry: {message}")]
    TransientExhausted { message: String },

    #[error("service rejected the request ({status}): {message}")]
    PermanentService {
        status: u16,
        message: String,
        model_not_found: bool,
    },

    #[error("network error: {0}")]
    Network(String),

    #[error("service returned no content")]
    EmptyResponse,
}

impl ClientError {
    /// Only a missing credential halts the batch.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ClientError::MissingCredential)
    }

    fn from_service(err: ServiceError, class: FailureClass) -> Self {
        match err {
            ServiceError::Status { status, message } => match class {
                FailureClass::TransientOverload => ClientError::TransientExhausted { message },
                _ => ClientError::PermanentService {
                    status,
                    message,
                    model_not_found: class == FailureClass::ModelNotFound,
                },
            },
            ServiceError::Transport(msg) => ClientError::Network(msg),
            ServiceError::EmptyResponse => ClientError::EmptyResponse,
        }
    }
}

/// Wraps one document's call to the analysis service. Holds no per-document state.
pub struct AnalysisClient<S> {
    service: S,
    retry: RetryPolicy,
}

impl<S: AnalysisService> AnalysisClient<S> {
    pub fn new(service: S, retry: RetryPolicy) -> Self {
        Self { service, retry }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub async fn analyze(&self, request: &AnalysisRequest<'_>) -> Result<String, ClientError> {
        if request.credential.is_empty() {
            return Err(ClientError::MissingCredential);
        }

        let mut retries = 0u32;
        loop {
            match self.service.generate(request).await {
                Ok(text) => {
                    debug!(
                        "analysis ok file={} retries={} chars={}",
                        request.document.name,
                        retries,
                        text.len()
                    );
                    return Ok(text);
                }
                Err(err) => {
                    let class = classify(&err);
                    if self.retry.should_retry(class, retries) {
                        warn!(
                            "service overloaded for {}; retrying once after {}ms: {err}",
                            request.document.name,
                            self.retry.delay.as_millis()
                        );
                        tokio::time::sleep(self.retry.delay).await;
                        retries += 1;
                        continue;
                    }
                    warn!(
                        "analysis failed file={} class={class:?}: {err}",
                        request.document.name
                    );
                    return Err(ClientError::from_service(err, class));
                }
            }
        }
    }
}
