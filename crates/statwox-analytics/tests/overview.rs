mod common;

use jiff::{SignedDuration, Timestamp};
use serde_json::json;

use statwox_analytics::Snapshot;
use statwox_analytics::overview::{conversion_rate, response_stats, survey_analytics};
use statwox_analytics::timeline::responses_timeline;
use statwox_core::models::question::QuestionType;

use common::{complete, partial, question, record, survey};

#[test]
fn conversion_rate_is_responses_per_view() {
    assert_eq!(conversion_rate(5, 20), 25.0);
    assert_eq!(conversion_rate(5, 0), 0.0);
    assert_eq!(conversion_rate(0, 0), 0.0);
}

#[test]
fn stats_split_on_completion() {
    let stats = response_stats(&[complete(&[]), partial(&[]), complete(&[])]);
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.partial, 1);
}

#[test]
fn timeline_buckets_by_utc_day_within_window() {
    let now: Timestamp = "2024-06-30T12:00:00Z".parse().unwrap();
    let responses = vec![
        record(true, "2024-06-30T01:00:00Z".parse().unwrap(), &[]),
        record(false, "2024-06-30T23:59:59Z".parse().unwrap(), &[]),
        record(true, "2024-06-29T23:30:00-02:00".parse().unwrap(), &[]),
        record(true, now - SignedDuration::from_hours(24 * 31), &[]),
    ];

    let timeline = responses_timeline(&responses, now, 30);
    assert_eq!(timeline.get("2024-06-30"), Some(&3));
    assert_eq!(timeline.len(), 1);

    let wide = responses_timeline(&responses, now, 365);
    assert_eq!(wide.values().sum::<u32>(), 4);
}

#[test]
fn timeline_window_edge_is_inclusive() {
    let now: Timestamp = "2024-06-30T12:00:00Z".parse().unwrap();
    let edge = record(true, now - SignedDuration::from_hours(24 * 7), &[]);

    assert_eq!(responses_timeline(&[edge.clone()], now, 7).get("2024-06-23"), Some(&1));
    assert!(responses_timeline(&[edge], now, 6).is_empty());
}

#[test]
fn empty_survey_report() {
    let snapshot = Snapshot {
        survey: survey(0, 0),
        questions: vec![question(1, QuestionType::Rating, 1)],
        responses: Vec::new(),
    };

    let report = survey_analytics(&snapshot, Timestamp::now(), 30);
    assert_eq!(report.survey_info.conversion_rate, 0.0);
    assert_eq!(report.question_analytics.len(), 1);
    assert!(report.responses_timeline.is_empty());

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["responseStats"], json!({"completed": 0, "partial": 0}));
    assert_eq!(value["surveyInfo"]["status"], json!("published"));
    assert!(value["questionAnalytics"][0].get("average").is_none());
}

#[test]
fn survey_info_uses_counters_not_window() {
    let snapshot = Snapshot {
        survey: survey(5, 20),
        questions: Vec::new(),
        responses: vec![complete(&[])],
    };

    let report = survey_analytics(&snapshot, Timestamp::now(), 30);
    assert_eq!(report.survey_info.total_responses, 5);
    assert_eq!(report.survey_info.total_views, 20);
    assert_eq!(report.survey_info.conversion_rate, 25.0);
    assert_eq!(report.response_stats.completed, 1);
}
