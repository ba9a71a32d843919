use crate::{
    client::ClientError,
    config::{Config, Normalize},
    model::{CandidateAnalysis, HiringRecommendation},
    sanitize,
};
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("service returned an empty response")]
    Empty,

    #[error("response could not be parsed as an analysis: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("match_score {0} is not an integer between 0 and 100")]
    InvalidScore(String),

    #[error("hiring_recommendation {0:?} is not one of Strong Hire, Interview, Keep on File, Reject")]
    InvalidRecommendation(String),
}

/// Fields the service must supply. Unknown keys are ignored.
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    candidate_name: String,
    match_score: Value,
    key_strengths: Vec<String>,
    missing_skills: Vec<String>,
    hiring_recommendation: String,
    summary: String,
}

/// Turns raw service output (or a classified failure) into exactly one record.
pub struct ResponseNormalizer {
    cfg: Normalize,
    fallback_model: String,
    fence: Regex,
}

impl ResponseNormalizer {
    pub fn new(cfg: &Config) -> Result<Self> {
        let fence = Regex::new(r"(?s)\A```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)(?:```)?\z")
            .with_context(|| "compiling fence pattern")?;
        Ok(Self {
            cfg: cfg.normalize.clone(),
            fallback_model: cfg.service.fallback_model.clone(),
            fence,
        })
    }

    /// Maps every outcome to a record tagged with `document_name`, except a
    /// fatal client error (see [`ClientError::is_fatal`]), which is handed
    /// back so the caller can halt the batch.
    pub fn normalize(
        &self,
        outcome: Result<String, ClientError>,
        document_name: &str,
        model: &str,
    ) -> Result<CandidateAnalysis, ClientError> {
        match outcome {
            Ok(raw) => Ok(match self.parse(&raw, document_name) {
                Ok(record) => record,
                Err(err) => {
                    warn!("normalization failed for {document_name}: {err}");
                    CandidateAnalysis::failed(document_name, err)
                }
            }),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => Ok(self.failure_record(&err, document_name, model)),
        }
    }

    pub fn parse(&self, raw: &str, document_name: &str) -> Result<CandidateAnalysis, NormalizeError> {
        let body = self.unwrap_fences(raw);
        if body.is_empty() {
            return Err(NormalizeError::Empty);
        }

        let parsed: RawAnalysis = serde_json::from_str(body)?;
        let match_score = coerce_score(&parsed.match_score)?;
        let hiring_recommendation = parsed
            .hiring_recommendation
            .parse::<HiringRecommendation>()
            .map_err(NormalizeError::InvalidRecommendation)?;

        Ok(CandidateAnalysis {
            id: Uuid::new_v4(),
            candidate_name: sanitize::clean_name(&self.cfg, &parsed.candidate_name),
            match_score,
            key_strengths: sanitize::clean_list(&self.cfg, &parsed.key_strengths),
            missing_skills: sanitize::clean_list(&self.cfg, &parsed.missing_skills),
            hiring_recommendation,
            summary: sanitize::clean_summary(&self.cfg, &parsed.summary),
            file_name: document_name.to_string(),
        })
    }

    pub fn failure_record(&self, err: &ClientError, document_name: &str, model: &str) -> CandidateAnalysis {
        match err {
            ClientError::PermanentService {
                model_not_found: true,
                ..
            } => CandidateAnalysis::failed(
                document_name,
                format!(
                    "Model '{model}' not found. Check your API Key permissions or try '{}'.",
                    self.fallback_model
                ),
            ),
            other => CandidateAnalysis::failed(document_name, other),
        }
    }

    /// Strips a surrounding code fence (with or without a language tag) and whitespace.
    pub fn unwrap_fences<'a>(&self, raw: &'a str) -> &'a str {
        let text = raw.trim();
        if !text.starts_with("```") {
            return text;
        }
        self.fence
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .unwrap_or(text)
    }
}

fn coerce_score(value: &Value) -> Result<u8, NormalizeError> {
    let invalid = || NormalizeError::InvalidScore(value.to_string());

    let n = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i as f64,
            None => n.as_f64().ok_or_else(invalid)?,
        },
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };

    if !n.is_finite() {
        return Err(invalid());
    }
    let rounded = n.round();
    if !(0.0..=100.0).contains(&rounded) {
        return Err(invalid());
    }
    Ok(rounded as u8)
}
