use crate::config::Config;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionPlan {
    pub submitted: usize,
    pub admitted: usize,
    pub dropped: usize,
    pub chunk_size: usize,
    pub chunks: Vec<ChunkRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRange {
    pub start: usize, // 0-based inclusive
    pub end: usize,   // 0-based exclusive
}

impl ChunkRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl AdmissionPlan {
    pub fn from_config(cfg: &Config, submitted: usize) -> Self {
        Self::new(submitted, cfg.batch.max_documents, cfg.batch.chunk_size)
    }

    /// Admits the first `cap` documents and splits them into contiguous chunks.
    /// Chunks are a reporting seam only; they do not change processing order.
    pub fn new(submitted: usize, cap: usize, chunk_size: usize) -> Self {
        let admitted = submitted.min(cap);
        let chunk_size = chunk_size.max(1);

        let chunks = (0..admitted)
            .step_by(chunk_size)
            .map(|start| ChunkRange {
                start,
                end: (start + chunk_size).min(admitted),
            })
            .collect();

        Self {
            submitted,
            admitted,
            dropped: submitted - admitted,
            chunk_size,
            chunks,
        }
    }
}
