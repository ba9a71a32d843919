use crate::{config::Config, service::ServiceError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureClass {
    TransientOverload,
    ModelNotFound,
    Permanent,
    Network,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// One retry, transient overload only, after a fixed delay.
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            max_retries: 1,
            delay: Duration::from_millis(cfg.service.retry_delay_ms),
        }
    }

    pub fn should_retry(&self, class: FailureClass, retries_done: u32) -> bool {
        class == FailureClass::TransientOverload && retries_done < self.max_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub fn classify(err: &ServiceError) -> FailureClass {
    match err {
        ServiceError::Status { status, message } => {
            let msg = message.to_ascii_lowercase();
            if matches!(status, 503 | 529)
                || msg.contains("unavailable")
                || msg.contains("overloaded")
            {
                FailureClass::TransientOverload
            } else if *status == 404 || msg.contains("not found") {
                FailureClass::ModelNotFound
            } else {
                FailureClass::Permanent
            }
        }
        ServiceError::Transport(_) => FailureClass::Network,
        ServiceError::EmptyResponse => FailureClass::Empty,
    }
}
