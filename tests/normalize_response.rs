mod common;

use common::analysis_json;
use cv_screen::{
    client::ClientError,
    config::Config,
    model::{HiringRecommendation, SENTINEL_MISSING_SKILL, SENTINEL_NAME},
    normalize::{NormalizeError, ResponseNormalizer},
};

fn normalizer() -> ResponseNormalizer {
    ResponseNormalizer::new(&Config::default()).expect("normalizer")
}

#[test]
fn fenced_json_matches_unwrapped() {
    let n = normalizer();
    let raw = analysis_json("Grace Hopper", 91, "Strong Hire");
    let fenced = format!("```json\n{raw}\n```");

    let plain = n.parse(&raw, "grace.pdf").unwrap();
    let unwrapped = n.parse(&fenced, "grace.pdf").unwrap();

    assert_eq!(plain.candidate_name, unwrapped.candidate_name);
    assert_eq!(plain.match_score, unwrapped.match_score);
    assert_eq!(plain.key_strengths, unwrapped.key_strengths);
    assert_eq!(plain.missing_skills, unwrapped.missing_skills);
    assert_eq!(plain.hiring_recommendation, unwrapped.hiring_recommendation);
    assert_eq!(plain.summary, unwrapped.summary);
    assert_eq!(unwrapped.file_name, "grace.pdf");
    assert_ne!(plain.id, unwrapped.id);
}

#[test]
fn unwraps_fence_variants() {
    let n = normalizer();
    assert_eq!(n.unwrap_fences("  {\"a\":1}  "), "{\"a\":1}");
    assert_eq!(n.unwrap_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
    assert_eq!(n.unwrap_fences("```JSON {\"a\":1} ```"), "{\"a\":1}");
    assert_eq!(n.unwrap_fences("```json\n{\"a\":1}"), "{\"a\":1}");
}

#[test]
fn unparseable_text_becomes_sentinel() {
    let n = normalizer();
    let record = n
        .normalize(Ok("I could not read this resume.".into()), "bad.pdf", "gemini-2.5-flash")
        .unwrap();

    assert!(record.is_sentinel());
    assert_eq!(record.candidate_name, SENTINEL_NAME);
    assert_eq!(record.match_score, 0);
    assert!(record.key_strengths.is_empty());
    assert_eq!(record.missing_skills, vec![SENTINEL_MISSING_SKILL.to_string()]);
    assert_eq!(record.hiring_recommendation, HiringRecommendation::Reject);
    assert!(record.summary.starts_with("Failed to analyze file:"));
    assert!(record.summary.contains("parsed"));
    assert_eq!(record.file_name, "bad.pdf");
}

#[test]
fn missing_field_is_rejected() {
    let n = normalizer();
    let raw = r#"{"candidate_name":"Ada","match_score":70,"key_strengths":[],"missing_skills":[],"hiring_recommendation":"Interview"}"#;
    let err = n.parse(raw, "ada.pdf").unwrap_err();
    assert!(matches!(err, NormalizeError::Parse(_)));
    assert!(err.to_string().contains("summary"));
}

#[test]
fn out_of_range_score_is_rejected() {
    let n = normalizer();
    let raw = analysis_json("Ada", 50, "Interview").replace("50", "140");
    assert!(matches!(
        n.parse(&raw, "ada.pdf"),
        Err(NormalizeError::InvalidScore(_))
    ));

    let negative = analysis_json("Ada", 50, "Interview").replace("50", "-3");
    assert!(matches!(
        n.parse(&negative, "ada.pdf"),
        Err(NormalizeError::InvalidScore(_))
    ));
}

#[test]
fn score_coercion_accepts_numeric_forms() {
    let n = normalizer();
    let as_string = analysis_json("Ada", 50, "Interview").replace("50", "\"72\"");
    assert_eq!(n.parse(&as_string, "a.pdf").unwrap().match_score, 72);

    let as_float = analysis_json("Ada", 50, "Interview").replace("50", "79.6");
    assert_eq!(n.parse(&as_float, "a.pdf").unwrap().match_score, 80);

    let non_numeric = analysis_json("Ada", 50, "Interview").replace("50", "\"high\"");
    assert!(n.parse(&non_numeric, "a.pdf").is_err());
}

#[test]
fn recommendation_must_be_closed_value() {
    let n = normalizer();
    let loose = analysis_json("Ada", 85, " strong hire ");
    assert_eq!(
        n.parse(&loose, "a.pdf").unwrap().hiring_recommendation,
        HiringRecommendation::StrongHire
    );

    let free_text = analysis_json("Ada", 85, "Definitely hire");
    let record = n.normalize(Ok(free_text), "a.pdf", "m").unwrap();
    assert!(record.is_sentinel());
    assert_eq!(record.hiring_recommendation, HiringRecommendation::Reject);
}

#[test]
fn unknown_fields_are_ignored() {
    let n = normalizer();
    let raw = r#"{
        "candidate_name": "Linus",
        "match_score": 64,
        "key_strengths": ["C"],
        "missing_skills": [],
        "hiring_recommendation": "Keep on File",
        "summary": "Solid systems background.",
        "years_experience": 30,
        "email": "ignored@example.com"
    }"#;
    let record = n.parse(raw, "linus.pdf").unwrap();
    assert_eq!(record.match_score, 64);
    assert_eq!(record.hiring_recommendation, HiringRecommendation::KeepOnFile);
}

#[test]
fn model_not_found_hint_names_model_and_default() {
    let n = normalizer();
    let err = ClientError::PermanentService {
        status: 404,
        message: "NOT_FOUND: models/gemini-9 is not found".into(),
        model_not_found: true,
    };
    let record = n.normalize(Err(err), "x.pdf", "gemini-9").unwrap();
    assert!(record.is_sentinel());
    assert!(record.summary.contains("Model 'gemini-9' not found"));
    assert!(record.summary.contains("gemini-2.5-flash"));
    assert_eq!(record.file_name, "x.pdf");
}

#[test]
fn client_failures_always_yield_a_record() {
    let n = normalizer();
    for err in [
        ClientError::TransientExhausted {
            message: "overloaded".into(),
        },
        ClientError::Network("reset".into()),
        ClientError::EmptyResponse,
        ClientError::PermanentService {
            status: 403,
            message: "PERMISSION_DENIED".into(),
            model_not_found: false,
        },
    ] {
        let cause = err.to_string();
        let record = n.normalize(Err(err), "f.pdf", "m").unwrap();
        assert!(record.is_sentinel());
        assert!(record.summary.contains(&cause));
    }
}

#[test]
fn missing_credential_is_not_turned_into_a_record() {
    let n = normalizer();
    let out = n.normalize(Err(ClientError::MissingCredential), "f.pdf", "m");
    assert_eq!(out.unwrap_err(), ClientError::MissingCredential);
}

#[test]
fn text_fields_are_cleaned_and_bounded() {
    let n = normalizer();
    let strengths: Vec<String> = (0..12).map(|i| format!("  skill\t{i} ")).collect();
    let raw = serde_json::json!({
        "candidate_name": "  Ｊａｎｅ\u{0007}  Doe ",
        "match_score": 60,
        "key_strengths": strengths,
        "missing_skills": ["", "   ", "Go"],
        "hiring_recommendation": "Interview",
        "summary": "Line one.\nLine   two."
    })
    .to_string();

    let record = n.parse(&raw, "jane.pdf").unwrap();
    assert_eq!(record.candidate_name, "Jane Doe");
    assert_eq!(record.key_strengths.len(), 8);
    assert_eq!(record.key_strengths[0], "skill 0");
    assert_eq!(record.missing_skills, vec!["Go".to_string()]);
    assert_eq!(record.summary, "Line one. Line two.");
}
