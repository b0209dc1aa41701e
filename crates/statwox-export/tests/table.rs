use jiff::Timestamp;
use uuid::Uuid;

use statwox_core::models::answer::Answer;
use statwox_core::models::question::{Question, QuestionType};
use statwox_core::models::response::{Response, ResponseMetadata, ResponseRecord};
use statwox_export::table::{export_filename, header_row, responses_csv};

fn question(n: u128, title: &str) -> Question {
    Question {
        id: Uuid::from_u128(n),
        survey_id: Uuid::nil(),
        question_type: QuestionType::ShortText,
        title: title.to_string(),
        description: None,
        required: false,
        options: None,
        order: n as i32,
        page: 1,
        min: None,
        max: None,
        placeholder: None,
        logic: Vec::new(),
    }
}

fn record(complete: bool, respondent: Option<Uuid>, answers: &[(u128, &str)]) -> ResponseRecord {
    let id = Uuid::from_u128(0xabc);
    let started_at: Timestamp = "2024-05-01T09:30:00Z".parse().unwrap();
    ResponseRecord {
        response: Response {
            id,
            survey_id: Uuid::nil(),
            respondent_id: respondent,
            is_complete: complete,
            started_at,
            completed_at: complete.then_some(started_at),
            ip_address: Some("198.51.100.4".to_string()),
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
                response_id: id,
                question_id: Uuid::from_u128(*q),
                value: value.to_string(),
                file_url: None,
                signature_url: None,
            })
            .collect(),
    }
}

#[test]
fn headers_name_every_question() {
    let headers = header_row(&[question(1, "Name"), question(2, "  ")]);
    assert_eq!(headers.len(), 9);
    assert_eq!(headers[0], "Response ID");
    assert_eq!(headers[6], "User Agent");
    assert_eq!(headers[7], "Name");
    assert_eq!(headers[8], "Untitled");
}

#[test]
fn rows_render_status_identity_and_answers() {
    let questions = vec![question(1, "Name"), question(2, "Comment")];
    let records = vec![
        record(true, None, &[(1, "Ada")]),
        record(false, Some(Uuid::from_u128(7)), &[(2, "Loved it, \"really\"")]),
    ];

    let csv = responses_csv(&questions, &records).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Response ID,Status,Started At"));

    let first = lines[1];
    assert!(first.contains(",Complete,2024-05-01T09:30:00.000Z,2024-05-01T09:30:00.000Z,Anonymous,"));
    assert!(first.ends_with(",198.51.100.4,,Ada,"));

    let second = lines[2];
    assert!(second.contains(",Partial,2024-05-01T09:30:00.000Z,,"));
    assert!(second.contains(&Uuid::from_u128(7).to_string()));
    assert!(second.ends_with(",,\"Loved it, \"\"really\"\"\""));
}

#[test]
fn empty_export_is_just_the_header() {
    let csv = responses_csv(&[], &[]).unwrap();
    assert_eq!(csv.lines().count(), 1);
}

#[test]
fn filename_embeds_survey_id() {
    let id = Uuid::from_u128(5);
    assert_eq!(export_filename(id), format!("survey_{id}_export.csv"));
}
