use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::Serialize;
use ts_rs::TS;

use statwox_core::models::response::ResponseRecord;
use statwox_core::models::survey::{Survey, SurveyStatus};

use crate::Snapshot;
use crate::breakdown::{QuestionAnalytics, question_breakdown};
use crate::percentage;
use crate::timeline::responses_timeline;

/// The full analytics report for one survey.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SurveyAnalytics {
    pub survey_info: SurveyInfo,
    pub question_analytics: Vec<QuestionAnalytics>,
    /// UTC date (`YYYY-MM-DD`) to number of responses started that day.
    pub responses_timeline: BTreeMap<String, u32>,
    pub response_stats: ResponseStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SurveyInfo {
    pub title: String,
    pub status: SurveyStatus,
    pub created_at: Timestamp,
    pub published_at: Option<Timestamp>,
    /// The survey's response counter, not the size of the loaded window.
    pub total_responses: u32,
    pub total_views: u32,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ResponseStats {
    pub completed: u32,
    pub partial: u32,
}

/// Assemble the report. `days` bounds the timeline only.
pub fn survey_analytics(snapshot: &Snapshot, now: Timestamp, days: i64) -> SurveyAnalytics {
    SurveyAnalytics {
        survey_info: survey_info(&snapshot.survey),
        question_analytics: snapshot
            .questions
            .iter()
            .map(|q| question_breakdown(q, &snapshot.responses))
            .collect(),
        responses_timeline: responses_timeline(&snapshot.responses, now, days),
        response_stats: response_stats(&snapshot.responses),
    }
}

pub fn survey_info(survey: &Survey) -> SurveyInfo {
    SurveyInfo {
        title: survey.title.clone(),
        status: survey.status,
        created_at: survey.created_at,
        published_at: survey.published_at,
        total_responses: survey.response_count,
        total_views: survey.view_count,
        conversion_rate: conversion_rate(survey.response_count, survey.view_count),
    }
}

/// Responses per view as a percentage; 0 for a survey nobody has viewed.
pub fn conversion_rate(response_count: u32, view_count: u32) -> f64 {
    percentage(response_count, view_count)
}

pub fn response_stats(responses: &[ResponseRecord]) -> ResponseStats {
    let completed = responses.iter().filter(|r| r.response.is_complete).count();
    let completed = u32::try_from(completed).unwrap_or(u32::MAX);
    let total = u32::try_from(responses.len()).unwrap_or(u32::MAX);
    ResponseStats {
        completed,
        partial: total - completed,
    }
}
