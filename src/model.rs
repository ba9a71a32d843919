use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const SENTINEL_NAME: &str = "Error Processing";
pub const SENTINEL_MISSING_SKILL: &str = "Analysis Failed";

/// One candidate's submitted file, held in memory for the duration of a batch.
#[derive(Clone, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub size: u64,
    pub content_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            content_type: content_type.into(),
            bytes,
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Opaque secret for the analysis service. Never printed.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into().trim().to_string())
    }

    /// Reads the credential from `var`. Unset reads as empty.
    pub fn from_env(var: &str) -> Self {
        Self::new(std::env::var(var).unwrap_or_default())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Credential(<empty>)")
        } else {
            f.write_str("Credential(<redacted>)")
        }
    }
}

/// Everything one service call needs. Built per document, per attempt.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    pub document: &'a Document,
    pub job_description: &'a str,
    pub model: &'a str,
    pub credential: &'a Credential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HiringRecommendation {
    #[serde(rename = "Strong Hire")]
    StrongHire,
    #[serde(rename = "Interview")]
    Interview,
    #[serde(rename = "Keep on File")]
    KeepOnFile,
    #[serde(rename = "Reject")]
    Reject,
}

impl HiringRecommendation {
    pub const ALL: [HiringRecommendation; 4] = [
        HiringRecommendation::StrongHire,
        HiringRecommendation::Interview,
        HiringRecommendation::KeepOnFile,
        HiringRecommendation::Reject,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HiringRecommendation::StrongHire => "Strong Hire",
            HiringRecommendation::Interview => "Interview",
            HiringRecommendation::KeepOnFile => "Keep on File",
            HiringRecommendation::Reject => "Reject",
        }
    }
}

impl fmt::Display for HiringRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HiringRecommendation {
    type Err = String;

    /// Matches the four labels, ignoring surrounding whitespace and ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| s.to_string())
    }
}

/// One record per admitted document. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateAnalysis {
    pub id: Uuid,
    pub candidate_name: String,
    pub match_score: u8,
    pub key_strengths: Vec<String>,
    pub missing_skills: Vec<String>,
    pub hiring_recommendation: HiringRecommendation,
    pub summary: String,
    pub file_name: String,
}

impl CandidateAnalysis {
    /// Sentinel record standing in for a document that could not be analyzed.
    pub fn failed(file_name: impl Into<String>, cause: impl fmt::Display) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate_name: SENTINEL_NAME.to_string(),
            match_score: 0,
            key_strengths: Vec::new(),
            missing_skills: vec![SENTINEL_MISSING_SKILL.to_string()],
            hiring_recommendation: HiringRecommendation::Reject,
            summary: format!("Failed to analyze file: {cause}"),
            file_name: file_name.into(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.candidate_name == SENTINEL_NAME
            && self.match_score == 0
            && self.missing_skills.len() == 1
            && self.missing_skills[0] == SENTINEL_MISSING_SKILL
    }
}

/// Progress snapshot handed to observers. `processed <= total` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStatus {
    pub total: usize,
    pub processed: usize,
    pub current_file: String,
    pub is_complete: bool,
}

impl BatchStatus {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.processed * 100) / self.total) as u8
    }
}
