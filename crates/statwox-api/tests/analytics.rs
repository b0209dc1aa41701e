mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{TestApp, app, basic_survey};

async fn answered_survey(app: &TestApp, token: &str) -> (String, Vec<String>) {
    let (id, questions) = app.published_survey(token, basic_survey("Pulse")).await;
    for (name, score) in [("a", 10), ("b", 9), ("c", 3)] {
        let (status, body) = app
            .submit(
                &id,
                None,
                json!({ "answers": [
                    { "questionId": questions[0], "value": name },
                    { "questionId": questions[1], "value": score }
                ] }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }
    (id, questions)
}

#[tokio::test]
async fn overview_counts_completed_responses() {
    let app = app().await;
    let (token, _) = app.register("author@example.com").await;
    let (id, _) = answered_survey(&app, &token).await;

    let (status, body) = app
        .send(Method::GET, &format!("/api/surveys/{id}/analytics?days=7"), Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    let data = &body["data"];
    assert_eq!(data["surveyInfo"]["title"], "Pulse");
    assert_eq!(data["responseStats"]["completed"], 3);
    assert_eq!(data["responseStats"]["partial"], 0);
    assert_eq!(data["questionAnalytics"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn days_reads_a_leading_integer() {
    let app = app().await;
    let (token, _) = app.register("author@example.com").await;
    let (id, _) = answered_survey(&app, &token).await;
    let timeline = |body: &serde_json::Value| body["data"]["responsesTimeline"].as_object().unwrap().len();

    // A zero-day window ends now, so the responses just submitted fall outside it.
    let (status, body) = app
        .send(Method::GET, &format!("/api/surveys/{id}/analytics?days=0abc"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(timeline(&body), 0);

    for days in ["10abc", "abc", "7.9"] {
        let (status, body) = app
            .send(Method::GET, &format!("/api/surveys/{id}/analytics?days={days}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert!(timeline(&body) >= 1, "days={days}");
    }
}

#[tokio::test]
async fn nps_scores_rating_questions() {
    let app = app().await;
    let (token, _) = app.register("author@example.com").await;
    let (id, questions) = answered_survey(&app, &token).await;

    let (status, body) = app
        .send(Method::GET, &format!("/api/surveys/{id}/analytics/nps"), Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    let nps = &body["data"][questions[1].as_str()];
    assert_eq!(nps["promoters"], 2);
    assert_eq!(nps["detractors"], 1);
    assert_eq!(nps["totalResponses"], 3);
    assert_eq!(nps["score"], 33);
    assert!(body["data"].get(questions[0].as_str()).is_none());
}

#[tokio::test]
async fn funnel_reports_completion() {
    let app = app().await;
    let (token, _) = app.register("author@example.com").await;
    let (id, _) = answered_survey(&app, &token).await;

    let (status, body) = app
        .send(Method::GET, &format!("/api/surveys/{id}/analytics/funnel"), Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["totalStarted"], 3);
    assert_eq!(body["data"]["totalCompleted"], 3);
    assert_eq!(body["data"]["overallCompletionRate"], 100);
}

#[tokio::test]
async fn crosstab_validates_params() {
    let app = app().await;
    let (token, _) = app.register("author@example.com").await;
    let (id, questions) = answered_survey(&app, &token).await;

    let (status, body) = app
        .send(Method::GET, &format!("/api/surveys/{id}/analytics/crosstab"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "questionA and questionB params required");

    let (status, body) = app
        .send(
            Method::GET,
            &format!("/api/surveys/{id}/analytics/crosstab?questionA=bogus&questionB={}", questions[1]),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid question ID: bogus");

    let (status, body) = app
        .send(
            Method::GET,
            &format!(
                "/api/surveys/{id}/analytics/crosstab?questionA={}&questionB={}",
                questions[0], questions[1]
            ),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

#[tokio::test]
async fn analytics_are_author_only() {
    let app = app().await;
    let (author, _) = app.register("author@example.com").await;
    let (other, _) = app.register("other@example.com").await;
    let (id, _) = answered_survey(&app, &author).await;

    for path in ["analytics", "analytics/nps", "analytics/funnel", "export/csv"] {
        let (status, body) = app
            .send(Method::GET, &format!("/api/surveys/{id}/{path}"), Some(&other), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{path}");
        assert_eq!(body["message"], "Not authorized");
    }
}
