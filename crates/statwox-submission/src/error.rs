use thiserror::Error;
use uuid::Uuid;

/// Broad category of a rejection, used to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    InvalidState,
    Unauthorized,
    Forbidden,
    Conflict,
    Validation,
}

#[derive(Debug, Error, PartialEq)]
pub enum SubmissionError {
    #[error("Survey is not accepting responses")]
    NotPublished,

    #[error("Survey has closed")]
    Closed,

    #[error("Survey has reached maximum responses")]
    QuotaReached,

    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("Access denied: IP not allowed")]
    IpDenied,

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("You have already responded to this survey")]
    Duplicate,

    #[error("At least one answer is required")]
    EmptyAnswers,

    #[error("Invalid questionId: {0}")]
    UnknownQuestion(String),

    #[error("Missing answer for required question: {0}")]
    MissingRequired(Uuid),
}

impl SubmissionError {
    pub fn kind(&self) -> RejectionKind {
        match self {
            SubmissionError::NotPublished
            | SubmissionError::Closed
            | SubmissionError::QuotaReached => RejectionKind::InvalidState,
            SubmissionError::IncorrectPassword | SubmissionError::AuthenticationRequired => {
                RejectionKind::Unauthorized
            }
            SubmissionError::IpDenied => RejectionKind::Forbidden,
            SubmissionError::Duplicate => RejectionKind::Conflict,
            SubmissionError::EmptyAnswers
            | SubmissionError::UnknownQuestion(_)
            | SubmissionError::MissingRequired(_) => RejectionKind::Validation,
        }
    }
}
