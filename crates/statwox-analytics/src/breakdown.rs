//! Per-question answer breakdowns, shaped by question type.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use ts_rs::TS;
use uuid::Uuid;

use statwox_core::models::question::{Question, QuestionType};
use statwox_core::models::response::ResponseRecord;
use statwox_core::numeric::{parse_float_prefix, round_half_up};

use crate::percentage;

/// Number of raw text answers exposed per text question.
pub const TEXT_SAMPLE_SIZE: usize = 10;

/// Aggregates for one question.
///
/// The common fields are always present. The remaining fields belong to
/// a single question type and are omitted for every other type, or when
/// there is nothing to report (e.g. a rating question with no numeric
/// answers).
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QuestionAnalytics {
    pub question_id: Uuid,
    pub question_title: String,
    pub question_type: QuestionType,
    pub total_responses: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub option_counts: Option<BTreeMap<String, u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub options: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub distribution: Option<BTreeMap<String, u32>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub yes_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub no_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub yes_percentage: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub responses: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub unique_responses: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub date_range: Option<DateRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct DateRange {
    pub earliest: String,
    pub latest: String,
}

/// Numeric summary of a rating question.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingSummary {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    /// Count per rating, keyed by the rating rounded half up.
    pub distribution: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YesNoSummary {
    pub yes_count: u32,
    pub no_count: u32,
    pub yes_percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextSummary {
    /// The first [`TEXT_SAMPLE_SIZE`] values, in input order.
    pub samples: Vec<String>,
    pub unique: u32,
}

/// Build the breakdown for `question` from every answer to it across
/// `responses`.
pub fn question_breakdown(question: &Question, responses: &[ResponseRecord]) -> QuestionAnalytics {
    let values: Vec<&str> = responses
        .iter()
        .flat_map(|r| &r.answers)
        .filter(|a| a.question_id == question.id)
        .map(|a| a.value.as_str())
        .collect();

    let mut analytics = QuestionAnalytics {
        question_id: question.id,
        question_title: question.title.clone(),
        question_type: question.question_type,
        total_responses: count(values.len()),
        option_counts: None,
        options: None,
        average: None,
        min: None,
        max: None,
        distribution: None,
        yes_count: None,
        no_count: None,
        yes_percentage: None,
        responses: None,
        unique_responses: None,
        date_range: None,
    };

    match question.question_type {
        QuestionType::MultipleChoice => {
            if let Some(options) = &question.options {
                let options = options.choices().to_vec();
                analytics.option_counts = Some(count_options(&options, &values));
                analytics.options = Some(options);
            }
        }
        QuestionType::Rating => {
            if let Some(summary) = summarize_ratings(&values) {
                analytics.average = Some(summary.average);
                analytics.min = Some(summary.min);
                analytics.max = Some(summary.max);
                analytics.distribution = Some(summary.distribution);
            }
        }
        QuestionType::YesNo => {
            let summary = summarize_yes_no(&values);
            analytics.yes_count = Some(summary.yes_count);
            analytics.no_count = Some(summary.no_count);
            analytics.yes_percentage = Some(summary.yes_percentage);
        }
        QuestionType::Date => {
            analytics.date_range = date_range(&values);
        }
        t if t.is_text() => {
            let summary = summarize_text(&values);
            analytics.responses = Some(summary.samples);
            analytics.unique_responses = Some(summary.unique);
        }
        _ => {}
    }

    analytics
}

/// Count answers per declared option. Every option is present, even at
/// zero; values outside the option list are ignored.
pub fn count_options(options: &[String], values: &[&str]) -> BTreeMap<String, u32> {
    let mut counts: BTreeMap<String, u32> = options.iter().map(|o| (o.clone(), 0)).collect();
    for value in values {
        if let Some(n) = counts.get_mut(*value) {
            *n += 1;
        }
    }
    counts
}

/// Mean, extremes and distribution of the values with a numeric prefix.
/// `None` when no value parses.
pub fn summarize_ratings(values: &[&str]) -> Option<RatingSummary> {
    let ratings: Vec<f64> = values
        .iter()
        .filter_map(|v| parse_float_prefix(v))
        .collect();
    if ratings.is_empty() {
        return None;
    }

    let average = ratings.iter().sum::<f64>() / ratings.len() as f64;
    let min = ratings.iter().copied().fold(f64::INFINITY, f64::min);
    let max = ratings.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut distribution = BTreeMap::new();
    for rating in &ratings {
        *distribution.entry(rating_bucket(*rating)).or_insert(0) += 1;
    }

    Some(RatingSummary {
        average,
        min,
        max,
        distribution,
    })
}

/// `"yes"` and `"true"` (any case) count as yes; anything else as no.
pub fn summarize_yes_no(values: &[&str]) -> YesNoSummary {
    let yes_count = count(
        values
            .iter()
            .filter(|v| v.eq_ignore_ascii_case("yes") || v.eq_ignore_ascii_case("true"))
            .count(),
    );
    let total = count(values.len());

    YesNoSummary {
        yes_count,
        no_count: total - yes_count,
        yes_percentage: percentage(yes_count, total),
    }
}

pub fn summarize_text(values: &[&str]) -> TextSummary {
    TextSummary {
        samples: values
            .iter()
            .take(TEXT_SAMPLE_SIZE)
            .map(|v| v.to_string())
            .collect(),
        unique: count(values.iter().collect::<HashSet<_>>().len()),
    }
}

/// Lexicographic first and last of the non-empty values. Dates are stored
/// as `YYYY-MM-DD`, so this is chronological.
pub fn date_range(values: &[&str]) -> Option<DateRange> {
    let mut dates: Vec<&str> = values.iter().copied().filter(|v| !v.is_empty()).collect();
    dates.sort_unstable();

    match (dates.first(), dates.last()) {
        (Some(earliest), Some(latest)) => Some(DateRange {
            earliest: earliest.to_string(),
            latest: latest.to_string(),
        }),
        _ => None,
    }
}

fn rating_bucket(rating: f64) -> String {
    if rating.is_finite() {
        (round_half_up(rating) as i64).to_string()
    } else if rating > 0.0 {
        "Infinity".to_string()
    } else {
        "-Infinity".to_string()
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
