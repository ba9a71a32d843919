use cv_screen::{
    admission::AdmissionPlan,
    model::{CandidateAnalysis, HiringRecommendation},
    report::{RankedReport, ScoreBand, rank},
};
use uuid::Uuid;

fn record(name: &str, file: &str, score: u8, rec: HiringRecommendation) -> CandidateAnalysis {
    CandidateAnalysis {
        id: Uuid::new_v4(),
        candidate_name: name.into(),
        match_score: score,
        key_strengths: vec!["Rust".into(), "SQL".into()],
        missing_skills: vec!["Go".into()],
        hiring_recommendation: rec,
        summary: format!("{name} summary."),
        file_name: file.into(),
    }
}

#[test]
fn rank_is_descending_and_stable_on_ties() {
    use HiringRecommendation::*;
    let results = vec![
        record("A", "a.pdf", 55, KeepOnFile),
        record("B", "b.pdf", 90, StrongHire),
        record("C", "c.pdf", 55, Interview),
        record("D", "d.pdf", 20, Reject),
    ];

    let ranked = rank(&results);
    let order: Vec<&str> = ranked.iter().map(|c| c.analysis.file_name.as_str()).collect();
    assert_eq!(order, vec!["b.pdf", "a.pdf", "c.pdf", "d.pdf"]);
    let ranks: Vec<usize> = ranked.iter().map(|c| c.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4]);
}

#[test]
fn bands_follow_thresholds() {
    assert_eq!(ScoreBand::from_score(100), ScoreBand::Excellent);
    assert_eq!(ScoreBand::from_score(80), ScoreBand::Excellent);
    assert_eq!(ScoreBand::from_score(79), ScoreBand::Good);
    assert_eq!(ScoreBand::from_score(60), ScoreBand::Good);
    assert_eq!(ScoreBand::from_score(59), ScoreBand::Fair);
    assert_eq!(ScoreBand::from_score(40), ScoreBand::Fair);
    assert_eq!(ScoreBand::from_score(39), ScoreBand::Poor);
    assert_eq!(ScoreBand::from_score(0), ScoreBand::Poor);
}

#[test]
fn summary_counts_exclude_failed_records_from_average() {
    use HiringRecommendation::*;
    let results = vec![
        record("A", "a.pdf", 90, StrongHire),
        record("B", "b.pdf", 60, Interview),
        CandidateAnalysis::failed("c.pdf", "service returned 400: bad request"),
    ];
    let plan = AdmissionPlan::new(4, 3, 10);

    let report = RankedReport::build("job", "gemini-2.5-flash", "2026-01-01T00:00:00Z", &plan, &results);
    let s = &report.summary;

    assert_eq!(s.submitted, 4);
    assert_eq!(s.admitted, 3);
    assert_eq!(s.dropped, 1);
    assert_eq!(s.analyzed, 2);
    assert_eq!(s.failed, 1);
    assert_eq!(s.average_score, Some(75.0));

    let count = |rec| {
        s.recommendations
            .iter()
            .find(|c| c.recommendation == rec)
            .map(|c| c.count)
            .unwrap()
    };
    assert_eq!(count(StrongHire), 1);
    assert_eq!(count(Interview), 1);
    assert_eq!(count(KeepOnFile), 0);
    assert_eq!(count(Reject), 1);

    assert_eq!(report.candidates.last().unwrap().analysis.file_name, "c.pdf");
}

#[test]
fn no_average_when_everything_failed() {
    let results = vec![CandidateAnalysis::failed("a.pdf", "boom")];
    let plan = AdmissionPlan::new(1, 150, 10);
    let report = RankedReport::build("job", "m", "t", &plan, &results);
    assert_eq!(report.summary.average_score, None);
    assert_eq!(report.summary.analyzed, 0);
}

#[test]
fn markdown_has_a_row_per_candidate_and_escapes_pipes() {
    use HiringRecommendation::*;
    let results = vec![
        record("Pat | Lee", "pat.pdf", 81, StrongHire),
        record("Sam", "sam.pdf", 42, KeepOnFile),
    ];
    let plan = AdmissionPlan::new(2, 150, 10);
    let md = RankedReport::build("job-1", "m", "t", &plan, &results).to_markdown();

    assert!(md.contains("| 1 | Pat \\| Lee | 81 | Excellent | Strong Hire |"));
    assert!(md.contains("| 2 | Sam | 42 | Fair | Keep on File |"));
    assert!(md.contains("- Average score: 61.5"));
    assert!(md.contains("## Summaries"));
}

#[test]
fn report_json_flattens_the_record() {
    let results = vec![record("Ann", "ann.pdf", 70, HiringRecommendation::Interview)];
    let plan = AdmissionPlan::new(1, 150, 10);
    let report = RankedReport::build("job", "m", "t", &plan, &results);
    let v = serde_json::to_value(&report).unwrap();

    let first = &v["candidates"][0];
    assert_eq!(first["rank"], 1);
    assert_eq!(first["band"], "Good");
    assert_eq!(first["candidate_name"], "Ann");
    assert_eq!(first["hiring_recommendation"], "Interview");
}
