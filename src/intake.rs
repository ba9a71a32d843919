use crate::{config::Config, model::Document};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedInput {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct IntakeResult {
    pub documents: Vec<Document>,
    pub skipped: Vec<SkippedInput>,
}

impl IntakeResult {
    pub fn names(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.name.clone()).collect()
    }
}

/// Expands files and directories into documents, in argument order.
/// Directory entries are visited sorted by file name. Document names are
/// unique within one intake: a repeated file name gets a ` (2)`, ` (3)`...
/// suffix before its extension.
pub fn collect_documents(cfg: &Config, inputs: &[PathBuf]) -> Result<IntakeResult> {
    let mut candidates = Vec::new();
    for input in inputs {
        if !input.exists() {
            bail!("input does not exist: {}", input.display());
        }
        if input.is_dir() {
            list_dir(input, cfg.intake.recursive, &mut candidates)?;
        } else {
            candidates.push(input.clone());
        }
    }

    let mut documents = Vec::new();
    let mut skipped = Vec::new();
    let mut taken = HashSet::new();
    for path in candidates {
        match admit_file(cfg, &path)? {
            Ok(mut doc) => {
                let name = unique_name(&doc.name, &mut taken);
                if name != doc.name {
                    debug!("renaming {} to {name}; file name already admitted", path.display());
                    doc.name = name;
                }
                debug!("intake {} ({} bytes)", doc.name, doc.size);
                documents.push(doc);
            }
            Err(reason) => {
                warn!("skipping {}: {reason}", path.display());
                skipped.push(SkippedInput {
                    path: path.display().to_string(),
                    reason,
                });
            }
        }
    }

    Ok(IntakeResult { documents, skipped })
}

fn unique_name(name: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.to_string()) {
        return name.to_string();
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{ext}")),
        _ => (name, String::new()),
    };
    let mut n = 2;
    loop {
        let candidate = format!("{stem} ({n}){ext}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn list_dir(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("reading directory: {}", dir.display()))?
        .map(|e| e.map(|e| e.path()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("listing directory: {}", dir.display()))?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            if recursive {
                list_dir(&path, recursive, out)?;
            }
        } else {
            out.push(path);
        }
    }
    Ok(())
}

/// Outer error is an I/O failure; inner error is a skip reason.
fn admit_file(cfg: &Config, path: &Path) -> Result<std::result::Result<Document, String>> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();
    if !cfg
        .intake
        .accepted_extensions
        .iter()
        .any(|a| a.eq_ignore_ascii_case(&ext))
    {
        return Ok(Err(format!("unsupported file type: {ext:?}")));
    }

    let meta = std::fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    if cfg.intake.max_document_bytes > 0 && meta.len() > cfg.intake.max_document_bytes {
        return Ok(Err(format!(
            "exceeds max_document_bytes ({} > {})",
            meta.len(),
            cfg.intake.max_document_bytes
        )));
    }

    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    if cfg.intake.check_magic && !bytes.starts_with(PDF_MAGIC) {
        return Ok(Err("missing %PDF- header".to_string()));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(Ok(Document::new(name, cfg.service.content_type.clone(), bytes)))
}

/// Reads the job description from a file, or stdin for `-`.
pub fn load_job_description(path: &Path) -> Result<String> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .with_context(|| "reading job description from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading job description: {}", path.display()))?
    };

    let jd = raw.trim().to_string();
    if jd.is_empty() {
        bail!("job description is empty: {}", path.display());
    }
    Ok(jd)
}
