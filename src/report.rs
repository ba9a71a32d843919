use crate::{
    admission::AdmissionPlan,
    model::{CandidateAnalysis, HiringRecommendation},
};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => ScoreBand::Excellent,
            60..=79 => ScoreBand::Good,
            40..=59 => ScoreBand::Fair,
            _ => ScoreBand::Poor,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub rank: usize,
    pub band: ScoreBand,
    #[serde(flatten)]
    pub analysis: CandidateAnalysis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationCount {
    pub recommendation: HiringRecommendation,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub submitted: usize,
    pub admitted: usize,
    pub dropped: usize,
    pub analyzed: usize,
    pub failed: usize,
    pub average_score: Option<f32>,
    pub recommendations: Vec<RecommendationCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedReport {
    pub job_id: String,
    pub model: String,
    pub generated_at: String,
    pub summary: ReportSummary,
    pub candidates: Vec<RankedCandidate>,
}

/// Highest score first; equal scores keep their input order.
pub fn rank(results: &[CandidateAnalysis]) -> Vec<RankedCandidate> {
    let mut sorted: Vec<&CandidateAnalysis> = results.iter().collect();
    sorted.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, a)| RankedCandidate {
            rank: i + 1,
            band: ScoreBand::from_score(a.match_score),
            analysis: a.clone(),
        })
        .collect()
}

impl RankedReport {
    pub fn build(
        job_id: &str,
        model: &str,
        generated_at: &str,
        plan: &AdmissionPlan,
        results: &[CandidateAnalysis],
    ) -> Self {
        let failed = results.iter().filter(|r| r.is_sentinel()).count();
        let scores: Vec<u32> = results
            .iter()
            .filter(|r| !r.is_sentinel())
            .map(|r| r.match_score as u32)
            .collect();
        let average_score = if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<u32>() as f32 / scores.len() as f32)
        };

        let recommendations = HiringRecommendation::ALL
            .into_iter()
            .map(|rec| RecommendationCount {
                recommendation: rec,
                count: results
                    .iter()
                    .filter(|r| r.hiring_recommendation == rec)
                    .count(),
            })
            .collect();

        Self {
            job_id: job_id.to_string(),
            model: model.to_string(),
            generated_at: generated_at.to_string(),
            summary: ReportSummary {
                submitted: plan.submitted,
                admitted: plan.admitted,
                dropped: plan.dropped,
                analyzed: results.len() - failed,
                failed,
                average_score,
                recommendations,
            },
            candidates: rank(results),
        }
    }

    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        let s = &self.summary;

        let _ = writeln!(md, "# Candidate ranking\n");
        let _ = writeln!(md, "- Job: `{}`", self.job_id);
        let _ = writeln!(md, "- Model: `{}`", self.model);
        let _ = writeln!(md, "- Generated: {}", self.generated_at);
        let _ = writeln!(
            md,
            "- Documents: {} submitted, {} analyzed, {} failed, {} dropped by cap",
            s.submitted, s.analyzed, s.failed, s.dropped
        );
        if let Some(avg) = s.average_score {
            let _ = writeln!(md, "- Average score: {avg:.1}");
        }
        let counts: Vec<String> = s
            .recommendations
            .iter()
            .map(|c| format!("{} {}", c.recommendation, c.count))
            .collect();
        let _ = writeln!(md, "- Recommendations: {}\n", counts.join(", "));

        let _ = writeln!(
            md,
            "| Rank | Candidate | Score | Band | Recommendation | Strengths | Missing | File |"
        );
        let _ = writeln!(md, "|---:|---|---:|---|---|---|---|---|");
        for c in &self.candidates {
            let a = &c.analysis;
            let _ = writeln!(
                md,
                "| {} | {} | {} | {:?} | {} | {} | {} | {} |",
                c.rank,
                cell(&a.candidate_name),
                a.match_score,
                c.band,
                a.hiring_recommendation,
                cell(&a.key_strengths.join("; ")),
                cell(&a.missing_skills.join("; ")),
                cell(&a.file_name)
            );
        }

        let _ = writeln!(md, "\n## Summaries\n");
        for c in &self.candidates {
            let _ = writeln!(
                md,
                "**{}. {}** ({})\n\n{}\n",
                c.rank, c.analysis.candidate_name, c.analysis.file_name, c.analysis.summary
            );
        }

        md
    }
}

fn cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}
