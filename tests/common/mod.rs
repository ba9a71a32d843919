#![allow(dead_code)]

use async_trait::async_trait;
use cv_screen::{
    batch::BatchJob,
    model::{AnalysisRequest, BatchStatus, CandidateAnalysis, Credential, Document},
    progress::{ProgressPhase, ProgressSink},
    service::{AnalysisService, ServiceError},
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// In-process stand-in for the analysis service. Responses are scripted per
/// document name and consumed in order; unscripted calls get a neutral analysis.
#[derive(Default)]
pub struct ScriptedService {
    scripts: Mutex<HashMap<String, VecDeque<Result<String, ServiceError>>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, name: &str, responses: Vec<Result<String, ServiceError>>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(name.to_string(), responses.into());
        self
    }

    pub fn calls_for(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|n| *n == name).count()
    }

    pub fn call_order(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisService for ScriptedService {
    async fn generate(&self, request: &AnalysisRequest<'_>) -> Result<String, ServiceError> {
        let name = request.document.name.clone();
        self.calls.lock().unwrap().push(name.clone());
        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&name)
            .and_then(|q| q.pop_front());
        next.unwrap_or_else(|| Ok(analysis_json("Default Candidate", 50, "Interview")))
    }
}

/// Collects every snapshot the orchestrator publishes.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<(ProgressPhase, BatchStatus, Vec<String>)>>,
}

impl RecordingSink {
    pub fn statuses(&self) -> Vec<BatchStatus> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(_, s, _)| s.clone())
            .collect()
    }

    pub fn phases(&self) -> Vec<ProgressPhase> {
        self.events.lock().unwrap().iter().map(|(p, _, _)| *p).collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl ProgressSink for RecordingSink {
    fn on_progress(&self, phase: ProgressPhase, status: &BatchStatus, results: &[CandidateAnalysis]) {
        let names = results.iter().map(|r| r.file_name.clone()).collect();
        self.events.lock().unwrap().push((phase, status.clone(), names));
    }
}

pub fn pdf_doc(name: &str) -> Document {
    Document::new(name, "application/pdf", format!("%PDF-1.4 {name}").into_bytes())
}

pub fn pdf_docs(n: usize) -> Vec<Document> {
    (0..n).map(|i| pdf_doc(&format!("resume_{i:03}.pdf"))).collect()
}

pub fn analysis_json(name: &str, score: u8, recommendation: &str) -> String {
    serde_json::json!({
        "candidate_name": name,
        "match_score": score,
        "key_strengths": ["Rust", "Distributed systems"],
        "missing_skills": ["Kubernetes"],
        "hiring_recommendation": recommendation,
        "summary": format!("{name} fits the role reasonably well.")
    })
    .to_string()
}

pub fn overloaded() -> ServiceError {
    ServiceError::Status {
        status: 503,
        message: "UNAVAILABLE: The model is overloaded. Please try again later.".into(),
    }
}

pub fn job() -> BatchJob {
    BatchJob {
        job_description: "Senior Rust engineer. Tokio, gRPC, Postgres.".into(),
        model: "gemini-2.5-flash".into(),
        credential: Credential::new("test-key"),
        consent: true,
    }
}
