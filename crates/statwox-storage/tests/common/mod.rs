#![allow(dead_code)]

use jiff::Timestamp;
use sqlx::SqlitePool;
use uuid::Uuid;

use statwox_core::models::answer::NewAnswer;
use statwox_core::models::question::{QuestionOptions, QuestionType};
use statwox_core::models::response::ResponseMetadata;
use statwox_core::models::survey::{ShareType, SurveyCategory};
use statwox_core::models::user::User;
use statwox_storage::questions::NewQuestion;
use statwox_storage::responses::NewResponse;
use statwox_storage::surveys::NewSurvey;
use statwox_storage::{db, users};

pub async fn pool() -> SqlitePool {
    let pool = db::connect_memory().await.unwrap();
    db::migrate(&pool).await.unwrap();
    pool
}

pub async fn user(pool: &SqlitePool, email: &str) -> User {
    users::create(
        pool,
        &users::NewUser {
            email: email.to_string(),
            username: None,
            name: Some("Test User".to_string()),
            password_hash: "not-a-real-hash".to_string(),
        },
        Timestamp::now(),
    )
    .await
    .unwrap()
}

pub fn question(title: &str, question_type: QuestionType, page: u32) -> NewQuestion {
    NewQuestion {
        question_type,
        title: title.to_string(),
        description: None,
        required: false,
        options: None,
        page,
        min: None,
        max: None,
        placeholder: None,
        logic: Vec::new(),
    }
}

pub fn choice(title: &str, options: &[&str]) -> NewQuestion {
    NewQuestion {
        options: Some(QuestionOptions::Choices(
            options.iter().map(|o| o.to_string()).collect(),
        )),
        ..question(title, QuestionType::MultipleChoice, 1)
    }
}

pub fn new_survey(author_id: Uuid, title: &str, questions: Vec<NewQuestion>) -> NewSurvey {
    NewSurvey {
        author_id,
        title: title.to_string(),
        description: None,
        category: SurveyCategory::Survey,
        is_public: true,
        share_type: ShareType::Public,
        allow_anon: true,
        conversational: false,
        max_responses: None,
        closes_at: None,
        password_hash: None,
        ip_allowlist: Vec::new(),
        webhook_url: None,
        webhook_secret: None,
        theme: None,
        locale: None,
        translations: None,
        thank_you_message: None,
        redirect_url: None,
        show_progress: true,
        show_question_numbers: true,
        shuffle_questions: false,
        questions,
    }
}

pub fn response(survey_id: Uuid, respondent_id: Option<Uuid>, answers: &[(Uuid, &str)]) -> NewResponse {
    response_at(survey_id, respondent_id, Timestamp::now(), answers)
}

pub fn response_at(
    survey_id: Uuid,
    respondent_id: Option<Uuid>,
    started_at: Timestamp,
    answers: &[(Uuid, &str)],
) -> NewResponse {
    NewResponse {
        survey_id,
        respondent_id,
        started_at,
        completed_at: started_at,
        ip_address: Some("203.0.113.1".to_string()),
        user_agent: None,
        duration: Some(42),
        flagged: false,
        flag_reason: None,
        metadata: ResponseMetadata {
            device_type: Some("desktop".to_string()),
            ..ResponseMetadata::default()
        },
        answers: answers
            .iter()
            .map(|(question_id, value)| NewAnswer {
                question_id: *question_id,
                value: value.to_string(),
                file_url: None,
                signature_url: None,
            })
            .collect(),
    }
}
