use std::path::PathBuf;

use fourth_down_terminal::epa_model::{DecisionOutcome, PlayOption, evaluate};
use fourth_down_terminal::play_data::{self, PlayRow};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn fixture_dataset() -> Vec<PlayRow> {
    play_data::read_snapshot(&fixture_path("pbp_small.csv")).expect("fixture should parse")
}

#[test]
fn fixture_admits_only_qualifying_rows() {
    // 20 rows in the file; 6 fail admission (wrong down, EPA out of range or
    // missing, ignored play type, beyond the field cutoff).
    let dataset = fixture_dataset();
    assert_eq!(dataset.len(), 14);
}

#[test]
fn recommends_go_at_midfield() {
    let dataset = fixture_dataset();
    let outcome = evaluate(&dataset, 2, 50);

    let DecisionOutcome::Recommend { option, epa } = &outcome.decision else {
        panic!("expected a recommendation, got {:?}", outcome.decision);
    };
    assert_eq!(*option, PlayOption::GoForIt);
    // rate 3/5, bucket-50 means +0.75/-0.8.
    assert!((epa - 0.13).abs() < 1e-6);
    assert_eq!(
        outcome.decision.summary(),
        "Recommended decision: **Go for it** (EPA: 0.13)"
    );
}

#[test]
fn punt_chart_joins_only_shared_buckets() {
    let dataset = fixture_dataset();
    let outcome = evaluate(&dataset, 2, 50);

    // Go-for-it has buckets 30 and 50, punts only 50.
    assert_eq!(outcome.vs_punt.len(), 1);
    let (bucket, diff) = outcome.vs_punt[0];
    assert_eq!(bucket, 50.0);
    assert!((diff - 0.33).abs() < 1e-6);
}

#[test]
fn field_goal_chart_blends_by_make_rate() {
    let dataset = fixture_dataset();
    let outcome = evaluate(&dataset, 2, 50);

    // Bucket 30: go blended -0.1, field goal blended 0.5*0.9 + 0.5*(-1.2).
    assert_eq!(outcome.vs_field_goal.len(), 1);
    let (bucket, diff) = outcome.vs_field_goal[0];
    assert_eq!(bucket, 30.0);
    assert!((diff - 0.05).abs() < 1e-6);
}

#[test]
fn field_goal_decision_uses_the_plain_bucket_mean() {
    let dataset = fixture_dataset();
    let outcome = evaluate(&dataset, 2, 22);

    let DecisionOutcome::Recommend { option, epa } = &outcome.decision else {
        panic!("expected a recommendation, got {:?}", outcome.decision);
    };
    // Bucket 20 has a lone missed kick and nothing else; its raw mean wins
    // over the two undefined options.
    assert_eq!(*option, PlayOption::FieldGoal);
    assert!((epa - (-1.1)).abs() < 1e-6);
}

#[test]
fn full_pass_is_idempotent() {
    let dataset = fixture_dataset();
    let first = evaluate(&dataset, 2, 50);
    let second = evaluate(&dataset, 2, 50);
    assert_eq!(first, second);
}

#[test]
fn boundary_distances_resolve_without_panicking() {
    let dataset = fixture_dataset();

    let short = evaluate(&dataset, 1, 40);
    let DecisionOutcome::Recommend { option, epa } = &short.decision else {
        panic!("4th and 1 at the 40 should resolve");
    };
    assert_eq!(*option, PlayOption::GoForIt);
    assert!((epa - 0.10).abs() < 1e-6);

    // 4th and 1 at midfield: the distance exists, but bucket 50 is empty.
    let empty_bucket = evaluate(&dataset, 1, 50);
    assert_eq!(empty_bucket.decision, DecisionOutcome::InsufficientData);

    // 4th and 10 has no plays at all; the pass still answers and the charts
    // come back empty rather than failing.
    let long = evaluate(&dataset, 10, 50);
    assert_eq!(long.decision, DecisionOutcome::InsufficientData);
    assert!(long.vs_punt.is_empty());
    assert!(long.vs_field_goal.is_empty());
}
