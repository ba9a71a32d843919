use crate::{config::Config, model::Document};
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use time::format_description::well_known::Rfc3339;

pub fn ensure_dir(p: &Path) -> Result<()> {
    std::fs::create_dir_all(p).with_context(|| format!("create_dir_all {}", p.display()))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    format!("{:x}", h.finalize())
}

pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// Same config, job description and documents give the same id.
pub fn job_id(cfg: &Config, model: &str, job_description: &str, documents: &[Document]) -> String {
    let mut h = Sha256::new();
    h.update(sha256_hex(cfg.normalized_for_hash().as_bytes()));
    h.update(b":");
    h.update(model.as_bytes());
    h.update(b":");
    h.update(sha256_hex(job_description.as_bytes()));
    for doc in documents {
        h.update(b":");
        h.update(doc.name.as_bytes());
        h.update(sha256_hex(&doc.bytes));
    }
    format!("{:x}", h.finalize())
}
