use jiff::Timestamp;
use jiff::fmt::temporal::DateTimePrinter;
use uuid::Uuid;

use statwox_core::models::question::Question;
use statwox_core::models::response::ResponseRecord;

use crate::error::ExportError;

/// Columns preceding the per-question columns.
pub const FIXED_COLUMNS: [&str; 7] = [
    "Response ID",
    "Status",
    "Started At",
    "Completed At",
    "Respondent ID",
    "IP Address",
    "User Agent",
];

pub const UNTITLED_QUESTION: &str = "Untitled";
pub const ANONYMOUS_RESPONDENT: &str = "Anonymous";

static TIMESTAMP_PRINTER: DateTimePrinter = DateTimePrinter::new().precision(Some(3));

/// Attachment filename for a survey's export.
pub fn export_filename(survey_id: Uuid) -> String {
    format!("survey_{survey_id}_export.csv")
}

pub fn header_row(questions: &[Question]) -> Vec<String> {
    FIXED_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(questions.iter().map(|q| {
            if q.title.trim().is_empty() {
                UNTITLED_QUESTION.to_string()
            } else {
                q.title.clone()
            }
        }))
        .collect()
}

/// One CSV row per record, in the order given. A question the response did
/// not answer is an empty cell.
pub fn responses_csv(questions: &[Question], records: &[ResponseRecord]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(header_row(questions))?;

    for record in records {
        let response = &record.response;
        let mut row = vec![
            response.id.to_string(),
            if response.is_complete { "Complete" } else { "Partial" }.to_string(),
            iso(response.started_at),
            response.completed_at.map(iso).unwrap_or_default(),
            response
                .respondent_id
                .map_or_else(|| ANONYMOUS_RESPONDENT.to_string(), |id| id.to_string()),
            response.ip_address.clone().unwrap_or_default(),
            response.user_agent.clone().unwrap_or_default(),
        ];
        row.extend(questions.iter().map(|q| {
            record
                .answer_for(q.id)
                .map(|a| a.value.clone())
                .unwrap_or_default()
        }));
        writer.write_record(&row)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn iso(timestamp: Timestamp) -> String {
    TIMESTAMP_PRINTER.timestamp_to_string(&timestamp)
}
