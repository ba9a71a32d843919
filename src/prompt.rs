use crate::model::HiringRecommendation;
use serde_json::{Value, json};

/// Instruction text sent alongside each resume.
pub fn build_prompt(job_description: &str) -> String {
    format!(
        "You are an expert HR recruiter. Analyze the attached resume against the Job Description.

JOB DESCRIPTION:
{jd}

Output must strictly match the provided JSON schema; do not wrap in markdown.

Rules:
- Derive candidate_name from the resume; if missing, infer from context (not from JD).
- match_score: 0-100, grounded in JD requirements (not arbitrary).
- key_strengths: only JD-relevant strengths; short bullet phrases.
- missing_skills: critical JD gaps only; keep concise.
- hiring_recommendation: pick one of the allowed enum values, consistent with the score.
- summary: 2-4 sentences, JD-focused, no contact info or PII. Omit phone, email, address.
- If data is ambiguous, state uncertainty briefly in summary rather than hallucinating.
",
        jd = job_description.trim()
    )
}

/// Structured-output schema mirroring `CandidateAnalysis` minus the fields
/// assigned locally (`id`, `file_name`).
pub fn response_schema(max_list_items: usize) -> Value {
    let recommendations: Vec<&str> = HiringRecommendation::ALL
        .iter()
        .map(|r| r.as_str())
        .collect();

    let mut schema = json!({
        "type": "OBJECT",
        "properties": {
            "candidate_name": {
                "type": "STRING",
                "description": "The full name of the candidate extracted from the resume."
            },
            "match_score": {
                "type": "INTEGER",
                "minimum": 0,
                "maximum": 100,
                "description": "A score from 0 to 100 indicating how well the candidate fits the job description."
            },
            "key_strengths": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "The candidate's top strengths relevant to the job description."
            },
            "missing_skills": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Critical skills from the job description that the candidate is missing."
            },
            "hiring_recommendation": {
                "type": "STRING",
                "enum": recommendations,
                "description": "The final recommendation based on the analysis."
            },
            "summary": {
                "type": "STRING",
                "description": "A brief professional summary of the analysis. Do not include phone numbers or emails (PII)."
            }
        },
        "required": [
            "candidate_name",
            "match_score",
            "key_strengths",
            "missing_skills",
            "hiring_recommendation",
            "summary"
        ]
    });

    // 0 leaves the lists unbounded.
    if max_list_items > 0 {
        for field in ["key_strengths", "missing_skills"] {
            schema["properties"][field]["maxItems"] = json!(max_list_items);
        }
    }
    schema
}
