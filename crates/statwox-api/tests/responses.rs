mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::json;

use common::{app, basic_survey};

#[tokio::test]
async fn signed_in_respondent_may_answer_once() {
    let app = app().await;
    let (author, _) = app.register("author@example.com").await;
    let (respondent, _) = app.register("respondent@example.com").await;
    let (id, questions) = app.published_survey(&author, basic_survey("Once")).await;

    let answers = json!({
        "answers": [
            { "questionId": questions[0], "value": "Ada" },
            { "questionId": questions[1], "value": 9 }
        ]
    });

    let (status, body) = app.submit(&id, Some(&respondent), answers.clone()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Response submitted successfully");
    assert!(body["data"]["responseId"].is_string());

    let (status, body) = app.submit(&id, Some(&respondent), answers).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "You have already responded to this survey");
}

#[tokio::test]
async fn anonymous_responses_are_not_deduplicated() {
    let app = app().await;
    let (author, _) = app.register("author@example.com").await;
    let (id, questions) = app.published_survey(&author, basic_survey("Open")).await;

    let answers = json!({ "answers": [{ "questionId": questions[0], "value": "anon" }] });
    for _ in 0..2 {
        let (status, body) = app.submit(&id, None, answers.clone()).await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    let (_, body) = app.send(Method::GET, &format!("/api/surveys/{id}"), None, None).await;
    assert_eq!(body["data"]["survey"]["responseCount"], 2);
}

#[tokio::test]
async fn quota_stops_further_responses() {
    let app = app().await;
    let (author, _) = app.register("author@example.com").await;
    let mut survey = basic_survey("Limited");
    survey["maxResponses"] = json!(1);
    let (id, questions) = app.published_survey(&author, survey).await;

    let answers = json!({ "answers": [{ "questionId": questions[0], "value": "first" }] });
    let (status, _) = app.submit(&id, None, answers.clone()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.submit(&id, None, answers).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Survey has reached maximum responses");
}

#[tokio::test]
async fn draft_survey_is_not_accepting_responses() {
    let app = app().await;
    let (author, _) = app.register("author@example.com").await;
    let (_, body) = app
        .send(Method::POST, "/api/surveys", Some(&author), Some(basic_survey("Draft")))
        .await;
    let id = body["data"]["survey"]["id"].as_str().unwrap().to_string();

    let (status, body) = app.submit(&id, None, json!({ "answers": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Survey is not accepting responses");
}

#[tokio::test]
async fn unknown_survey_is_not_found() {
    let app = app().await;

    let (status, body) = app
        .submit("00000000-0000-0000-0000-000000000001", None, json!({ "answers": [] }))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Survey not found");
}

#[tokio::test]
async fn missing_required_answer_is_reported() {
    let app = app().await;
    let (author, _) = app.register("author@example.com").await;
    let (id, questions) = app.published_survey(&author, basic_survey("Required")).await;

    let (status, body) = app.submit(&id, None, json!({ "answers": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Missing answer"));

    let (status, body) = app
        .submit(&id, None, json!({ "answers": [{ "questionId": questions[1], "value": 4 }] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        format!("Missing answer for required question: {}", questions[0])
    );
}

#[tokio::test]
async fn unknown_question_is_reported_verbatim() {
    let app = app().await;
    let (author, _) = app.register("author@example.com").await;
    let (id, questions) = app.published_survey(&author, basic_survey("Strict")).await;

    let (status, body) = app
        .submit(
            &id,
            None,
            json!({ "answers": [
                { "questionId": questions[0], "value": "x" },
                { "questionId": "not-a-question", "value": "y" }
            ] }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid questionId: not-a-question");
}

#[tokio::test]
async fn closed_to_anonymous_requires_sign_in() {
    let app = app().await;
    let (author, _) = app.register("author@example.com").await;
    let mut survey = basic_survey("Members only");
    survey["allowAnon"] = json!(false);
    let (id, questions) = app.published_survey(&author, survey).await;

    let answers = json!({ "answers": [{ "questionId": questions[0], "value": "x" }] });
    let (status, body) = app.submit(&id, None, answers.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentication required");

    let (status, _) = app.submit(&id, Some(&author), answers).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn password_protected_survey() {
    let app = app().await;
    let (author, _) = app.register("author@example.com").await;
    let mut survey = basic_survey("Secret");
    survey["password"] = json!("open sesame");
    let (id, questions) = app.published_survey(&author, survey).await;

    let answer = json!({ "questionId": questions[0], "value": "x" });

    let (status, body) = app
        .submit(&id, None, json!({ "answers": [answer.clone()], "password": "guess" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Incorrect password");

    let (status, _) = app
        .submit(&id, None, json!({ "answers": [answer], "password": "open sesame" }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn ip_allowlist_uses_forwarded_address() {
    let app = app().await;
    let (author, _) = app.register("author@example.com").await;
    let mut survey = basic_survey("Office only");
    survey["ipAllowlist"] = json!(["10.0.0.0/8"]);
    let (id, questions) = app.published_survey(&author, survey).await;

    let body = json!({ "answers": [{ "questionId": questions[0], "value": "x" }] });
    let request = |ip: &str| {
        Request::builder()
            .method(Method::POST)
            .uri(format!("/api/surveys/{id}/respond"))
            .header("content-type", "application/json")
            .header("x-forwarded-for", ip)
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    let (status, body_out) = app.request(request("203.0.113.9, 10.0.0.1")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body_out["message"], "Access denied: IP not allowed");

    let (status, _) = app.request(request("10.20.30.40")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn fast_responses_are_flagged() {
    let app = app().await;
    let (author, _) = app.register("author@example.com").await;
    let (id, questions) = app.published_survey(&author, basic_survey("Speedrun")).await;

    let (status, body) = app
        .submit(
            &id,
            None,
            json!({
                "answers": [{ "questionId": questions[0], "value": "x" }],
                "metadata": { "duration": 1 }
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["flagged"], true);
}

#[tokio::test]
async fn submission_notifies_survey_channel() {
    let app = app().await;
    let (author, _) = app.register("author@example.com").await;
    let (id, questions) = app.published_survey(&author, basic_survey("Live")).await;

    let (_, body) = app
        .submit(&id, None, json!({ "answers": [{ "questionId": questions[0], "value": "x" }] }))
        .await;
    let response_id = body["data"]["responseId"].clone();

    let published = app.sink.published.lock().unwrap();
    let (channel, event, payload) = published
        .iter()
        .find(|(_, event, _)| event == "new-response")
        .expect("new-response notification");
    assert_eq!(channel, &format!("survey-{id}"));
    assert_eq!(event, "new-response");
    assert_eq!(payload["responseId"], response_id);
}

#[tokio::test]
async fn malformed_bodies_use_the_error_envelope() {
    let app = app().await;
    let (author, _) = app.register("author@example.com").await;
    let (id, _) = app.published_survey(&author, basic_survey("Shape")).await;

    for body in [
        json!({ "answers": "nope" }),
        json!({ "answers": [{ "value": "no question id" }] }),
    ] {
        let (status, body) = app.submit(&id, None, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string(), "{body}");
    }

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/surveys/{id}/respond"))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.request(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn unparsable_survey_id_is_not_found() {
    let app = app().await;

    let (status, body) = app.submit("not-a-uuid", None, json!({ "answers": [] })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Survey not found");

    let (status, body) = app.send(Method::GET, "/api/surveys/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Survey not found");
}

#[tokio::test]
async fn closed_survey_stops_accepting_responses() {
    let app = app().await;
    let (author, _) = app.register("author@example.com").await;
    let (id, questions) = app.published_survey(&author, basic_survey("Closing")).await;

    let (status, body) = app
        .send(Method::PATCH, &format!("/api/surveys/{id}/close"), Some(&author), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["survey"]["status"], "closed");

    let (status, body) = app
        .submit(&id, None, json!({ "answers": [{ "questionId": questions[0], "value": "late" }] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Survey is not accepting responses");
}
