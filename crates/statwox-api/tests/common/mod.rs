#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use statwox_api::config::Config;
use statwox_api::notify::NotificationSink;
use statwox_api::state::AppState;
use statwox_storage::db;

pub const SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const PASSWORD: &str = "correct-horse-battery";

pub fn config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("JWT_SECRET", SECRET),
        ("BCRYPT_COST", "4"),
        ("WEBHOOK_MAX_ATTEMPTS", "1"),
        ("WEBHOOK_TIMEOUT_SECS", "1"),
    ]);
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
}

/// Notification sink that keeps every publication for inspection.
#[derive(Default)]
pub struct RecordingSink {
    pub published: Mutex<Vec<(String, String, Value)>>,
}

impl NotificationSink for RecordingSink {
    fn publish(&self, channel: &str, event: &str, payload: &Value) {
        self.published
            .lock()
            .unwrap()
            .push((channel.to_string(), event.to_string(), payload.clone()));
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub sink: Arc<RecordingSink>,
}

pub async fn app() -> TestApp {
    let pool = db::connect_memory().await.unwrap();
    db::migrate(&pool).await.unwrap();

    let sink = Arc::new(RecordingSink::default());
    let state = AppState::new(pool, config()).unwrap().with_notifier(sink.clone());

    TestApp {
        router: statwox_api::app(state.clone()),
        state,
        sink,
    }
}

impl TestApp {
    pub async fn request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.request(build(method, uri, token, body)).await
    }

    /// Register an account and return its token and user ID.
    pub async fn register(&self, email: &str) -> (String, String) {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "email": email, "password": PASSWORD, "name": "Tester" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        (
            body["data"]["token"].as_str().unwrap().to_string(),
            body["data"]["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    /// Create a survey from `survey` and publish it. Returns the survey ID
    /// and its question IDs in order.
    pub async fn published_survey(&self, token: &str, survey: Value) -> (String, Vec<String>) {
        let (status, body) = self
            .send(Method::POST, "/api/surveys", Some(token), Some(survey))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let id = body["data"]["survey"]["id"].as_str().unwrap().to_string();
        let questions = body["data"]["survey"]["questions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|q| q["id"].as_str().unwrap().to_string())
            .collect();

        let (status, body) = self
            .send(
                Method::PATCH,
                &format!("/api/surveys/{id}/publish"),
                Some(token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        (id, questions)
    }

    pub async fn submit(&self, survey_id: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            &format!("/api/surveys/{survey_id}/respond"),
            token,
            Some(body),
        )
        .await
    }
}

pub fn build(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// A survey with one required short-text question and one optional rating.
pub fn basic_survey(title: &str) -> Value {
    json!({
        "title": title,
        "questions": [
            { "type": "shortText", "title": "Name", "required": true },
            { "type": "rating", "title": "Score", "min": 0, "max": 10 }
        ]
    })
}
