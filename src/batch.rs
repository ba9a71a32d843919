use crate::{
    admission::AdmissionPlan,
    client::{AnalysisClient, ClientError},
    config::Config,
    model::{AnalysisRequest, BatchStatus, CandidateAnalysis, Credential, Document},
    normalize::ResponseNormalizer,
    policy::RetryPolicy,
    progress::{ProgressPhase, ProgressSink},
    service::AnalysisService,
};
use anyhow::Result;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Inputs shared read-only by every document of one batch.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub job_description: String,
    pub model: String,
    pub credential: Credential,
    /// Must be re-confirmed by the caller on every run.
    pub consent: bool,
}

/// Conditions that stop a batch before the first document. Per-document
/// failures never show up here; they become sentinel records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    #[error("API key is missing; configure it before starting a batch")]
    MissingCredential,

    #[error("data processing consent was not given for this run")]
    ConsentRequired,

    #[error("job description is empty")]
    EmptyJobDescription,
}

impl BatchJob {
    /// Pre-start checks, credential first. Nothing is emitted when these fail.
    pub fn check(&self) -> Result<(), BatchError> {
        if self.credential.is_empty() {
            return Err(BatchError::MissingCredential);
        }
        if !self.consent {
            return Err(BatchError::ConsentRequired);
        }
        if self.job_description.trim().is_empty() {
            return Err(BatchError::EmptyJobDescription);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub plan: AdmissionPlan,
    pub status: BatchStatus,
    pub results: Vec<CandidateAnalysis>,
}

pub struct BatchOrchestrator<S> {
    client: AnalysisClient<S>,
    normalizer: ResponseNormalizer,
    max_documents: usize,
    chunk_size: usize,
}

impl<S: AnalysisService> BatchOrchestrator<S> {
    pub fn new(cfg: &Config, service: S) -> Result<Self> {
        Ok(Self {
            client: AnalysisClient::new(service, RetryPolicy::from_config(cfg)),
            normalizer: ResponseNormalizer::new(cfg)?,
            max_documents: cfg.batch.max_documents,
            chunk_size: cfg.batch.chunk_size,
        })
    }

    pub fn client(&self) -> &AnalysisClient<S> {
        &self.client
    }

    /// Runs every admitted document in input order, one at a time.
    ///
    /// For each document the sink sees an in-flight snapshot
    /// (`processed` = index, `current_file` = its name) and then a completed
    /// snapshot with `processed` incremented and the new record appended.
    /// A final snapshot with `is_complete` set closes the batch.
    pub async fn run(
        &self,
        job: &BatchJob,
        documents: &[Document],
        sink: &dyn ProgressSink,
    ) -> Result<BatchOutput, BatchError> {
        job.check()?;

        let plan = AdmissionPlan::new(documents.len(), self.max_documents, self.chunk_size);
        if plan.dropped > 0 {
            warn!(
                "admission cap {} reached; dropping {} of {} documents",
                self.max_documents, plan.dropped, plan.submitted
            );
        }
        info!(
            "batch start documents={} chunks={} model={}",
            plan.admitted,
            plan.chunks.len(),
            job.model
        );

        let admitted = &documents[..plan.admitted];
        let started = Instant::now();
        let mut status = BatchStatus {
            total: plan.admitted,
            ..Default::default()
        };
        let mut results: Vec<CandidateAnalysis> = Vec::with_capacity(plan.admitted);

        // Sequential for now; a bounded worker pool could fan out within a chunk.
        for (chunk_index, chunk) in plan.chunks.iter().enumerate() {
            debug!(
                "chunk {} documents {}-{}",
                chunk_index,
                chunk.start + 1,
                chunk.end
            );

            for (index, document) in admitted[chunk.start..chunk.end]
                .iter()
                .enumerate()
                .map(|(i, d)| (chunk.start + i, d))
            {
                status.processed = index;
                status.current_file = document.name.clone();
                sink.on_progress(ProgressPhase::Analyzing, &status, &results);

                let record = self.analyze_one(job, document).await?;
                results.push(record);

                status.processed = index + 1;
                sink.on_progress(ProgressPhase::Analyzed, &status, &results);
            }
        }

        status.is_complete = true;
        sink.on_progress(ProgressPhase::Complete, &status, &results);

        info!(
            "batch done documents={} failed={} elapsed_ms={}",
            results.len(),
            results.iter().filter(|r| r.is_sentinel()).count(),
            started.elapsed().as_millis()
        );

        Ok(BatchOutput {
            plan,
            status,
            results,
        })
    }

    /// Normalization hands back only fatal client errors, and a missing
    /// credential is the only fatal one.
    async fn analyze_one(
        &self,
        job: &BatchJob,
        document: &Document,
    ) -> Result<CandidateAnalysis, BatchError> {
        let request = AnalysisRequest {
            document,
            job_description: &job.job_description,
            model: &job.model,
            credential: &job.credential,
        };
        let outcome = self.client.analyze(&request).await;
        self.normalizer
            .normalize(outcome, &document.name, &job.model)
            .map_err(|err: ClientError| {
                warn!("halting batch at {}: {err}", document.name);
                BatchError::MissingCredential
            })
    }
}
