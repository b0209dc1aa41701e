#![allow(dead_code)]

use jiff::Timestamp;
use uuid::Uuid;

use statwox_core::models::answer::Answer;
use statwox_core::models::question::{Question, QuestionOptions, QuestionType};
use statwox_core::models::response::{Response, ResponseMetadata, ResponseRecord};
use statwox_core::models::survey::{ShareType, Survey, SurveyCategory, SurveyStatus};

pub const SURVEY_ID: Uuid = Uuid::from_u128(0x5eed);

pub fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

pub fn question(n: u128, question_type: QuestionType, page: u32) -> Question {
    Question {
        id: id(n),
        survey_id: SURVEY_ID,
        question_type,
        title: format!("Question {n}"),
        description: None,
        required: false,
        options: None,
        order: n as i32,
        page,
        min: None,
        max: None,
        placeholder: None,
        logic: Vec::new(),
    }
}

pub fn choice_question(n: u128, options: &[&str]) -> Question {
    Question {
        options: Some(QuestionOptions::Choices(
            options.iter().map(|o| o.to_string()).collect(),
        )),
        ..question(n, QuestionType::MultipleChoice, 1)
    }
}

/// A response started at `started_at` answering `(question, value)` pairs.
pub fn record(complete: bool, started_at: Timestamp, answers: &[(u128, &str)]) -> ResponseRecord {
    let response_id = Uuid::new_v4();
    ResponseRecord {
        response: Response {
            id: response_id,
            survey_id: SURVEY_ID,
            respondent_id: None,
            is_complete: complete,
            started_at,
            completed_at: complete.then_some(started_at),
            ip_address: None,
            user_agent: None,
            duration: None,
            flagged: false,
            flag_reason: None,
            metadata: ResponseMetadata::default(),
        },
        answers: answers
            .iter()
            .map(|(q, value)| Answer {
                id: Uuid::new_v4(),
                response_id,
                question_id: id(*q),
                value: value.to_string(),
                file_url: None,
                signature_url: None,
            })
            .collect(),
    }
}

pub fn complete(answers: &[(u128, &str)]) -> ResponseRecord {
    record(true, Timestamp::now(), answers)
}

pub fn partial(answers: &[(u128, &str)]) -> ResponseRecord {
    record(false, Timestamp::now(), answers)
}

pub fn survey(response_count: u32, view_count: u32) -> Survey {
    let now = Timestamp::now();
    Survey {
        id: SURVEY_ID,
        author_id: id(1),
        title: "Customer feedback".to_string(),
        description: None,
        category: SurveyCategory::Survey,
        status: SurveyStatus::Published,
        is_public: true,
        share_type: ShareType::Public,
        allow_anon: true,
        conversational: false,
        max_responses: None,
        closes_at: None,
        published_at: Some(now),
        password_hash: None,
        ip_allowlist: Vec::new(),
        response_count,
        view_count,
        like_count: 0,
        comment_count: 0,
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
        created_at: now,
        updated_at: now,
    }
}
