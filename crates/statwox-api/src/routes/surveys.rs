use axum::extract::State;
use axum::{Extension, Json};
use jiff::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use tracing::info;

use statwox_audit::events::{AuditAction, AuditEvent, EntityType};
use statwox_auth::password::hash_password;
use statwox_core::models::question::{Question, QuestionOptions, QuestionType, SkipLogicRule};
use statwox_core::models::survey::{ShareType, Survey, SurveyCategory, SurveyStatus};
use statwox_core::numeric::parse_int_prefix;
use statwox_storage::questions::{self, NewQuestion};
use statwox_storage::surveys::{self, NewSurvey, SurveyScope};

use crate::audit_trail;
use crate::envelope::{Envelope, done, ok, ok_with_message};
use crate::error::ApiError;
use crate::extract::{JsonBody, QueryParams, SurveyId};
use crate::middleware::auth::AuthUser;
use crate::routes::{authored_survey, blocking, clean};
use crate::state::AppState;
use crate::webhook::{WebhookEvent, WebhookPayload};

/// Largest accepted `options` payload per question, in bytes of JSON.
pub const MAX_OPTIONS_BYTES: usize = 10 * 1024;

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

const UNTITLED_QUESTION: &str = "Untitled Question";

/// A question as sent by the builder. Everything but the content is
/// optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    #[serde(default, rename = "type")]
    pub question_type: Option<QuestionType>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub options: Option<Value>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub logic: Option<Vec<SkipLogicRule>>,
}

impl QuestionInput {
    fn into_new_question(self) -> Result<NewQuestion, ApiError> {
        let options = match self.options {
            None | Some(Value::Null) => None,
            Some(raw) => {
                if serde_json::to_string(&raw)?.len() > MAX_OPTIONS_BYTES {
                    return Err(ApiError::Validation(
                        "Question options exceed 10KB limit".to_string(),
                    ));
                }
                Some(serde_json::from_value::<QuestionOptions>(raw)?)
            }
        };

        Ok(NewQuestion {
            question_type: self.question_type.unwrap_or(QuestionType::ShortText),
            title: clean(self.title).unwrap_or_else(|| UNTITLED_QUESTION.to_string()),
            description: clean(self.description),
            required: self.required.unwrap_or(false),
            options,
            page: self.page.filter(|p| *p > 0).unwrap_or(1),
            min: self.min,
            max: self.max,
            placeholder: clean(self.placeholder),
            logic: self.logic.unwrap_or_default(),
        })
    }
}

fn new_questions(inputs: Vec<QuestionInput>) -> Result<Vec<NewQuestion>, ApiError> {
    inputs.into_iter().map(QuestionInput::into_new_question).collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSurveyRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<SurveyCategory>,
    #[serde(default)]
    pub questions: Vec<QuestionInput>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub share_type: Option<ShareType>,
    #[serde(default)]
    pub allow_anon: Option<bool>,
    #[serde(default)]
    pub conversational: Option<bool>,
    #[serde(default)]
    pub max_responses: Option<u32>,
    #[serde(default)]
    pub closes_at: Option<Timestamp>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub ip_allowlist: Vec<String>,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub webhook_secret: Option<String>,
    #[serde(default)]
    pub theme: Option<Value>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub translations: Option<Value>,
    #[serde(default)]
    pub thank_you_message: Option<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub show_progress: Option<bool>,
    #[serde(default)]
    pub show_question_numbers: Option<bool>,
    #[serde(default)]
    pub shuffle_questions: Option<bool>,
}

/// Partial survey update. For nullable fields, an absent key leaves the
/// value alone and an explicit `null` clears it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSurveyRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub category: Option<SurveyCategory>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub share_type: Option<ShareType>,
    #[serde(default)]
    pub allow_anon: Option<bool>,
    #[serde(default)]
    pub conversational: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub max_responses: Option<Option<u32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub closes_at: Option<Option<Timestamp>>,
    #[serde(default, deserialize_with = "double_option")]
    pub password: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub ip_allowlist: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub webhook_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub webhook_secret: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub theme: Option<Option<Value>>,
    #[serde(default, deserialize_with = "double_option")]
    pub locale: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub translations: Option<Option<Value>>,
    #[serde(default, deserialize_with = "double_option")]
    pub thank_you_message: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub redirect_url: Option<Option<String>>,
    #[serde(default)]
    pub show_progress: Option<bool>,
    #[serde(default)]
    pub show_question_numbers: Option<bool>,
    #[serde(default)]
    pub shuffle_questions: Option<bool>,
    #[serde(default)]
    pub questions: Option<Vec<QuestionInput>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateSurveyRequest {
    /// Copy every present field onto `survey`. `password_hash` is the
    /// already-hashed replacement for `password`.
    fn apply(self, survey: &mut Survey, password_hash: Option<Option<String>>) -> Result<(), ApiError> {
        if let Some(title) = self.title {
            survey.title = required_title(Some(title))?;
        }
        if let Some(description) = self.description {
            survey.description = clean(description);
        }
        if let Some(category) = self.category {
            survey.category = category;
        }
        if let Some(is_public) = self.is_public {
            survey.is_public = is_public;
        }
        if let Some(share_type) = self.share_type {
            survey.share_type = share_type;
        }
        if let Some(allow_anon) = self.allow_anon {
            survey.allow_anon = allow_anon;
        }
        if let Some(conversational) = self.conversational {
            survey.conversational = conversational;
        }
        if let Some(max_responses) = self.max_responses {
            survey.max_responses = max_responses.filter(|n| *n > 0);
        }
        if let Some(closes_at) = self.closes_at {
            survey.closes_at = closes_at;
        }
        if let Some(password_hash) = password_hash {
            survey.password_hash = password_hash;
        }
        if let Some(ip_allowlist) = self.ip_allowlist {
            survey.ip_allowlist = ip_allowlist.unwrap_or_default();
        }
        if let Some(webhook_url) = self.webhook_url {
            survey.webhook_url = clean(webhook_url);
        }
        if let Some(webhook_secret) = self.webhook_secret {
            survey.webhook_secret = clean(webhook_secret);
        }
        if let Some(theme) = self.theme {
            survey.theme = theme;
        }
        if let Some(locale) = self.locale {
            survey.locale = clean(locale);
        }
        if let Some(translations) = self.translations {
            survey.translations = translations;
        }
        if let Some(thank_you_message) = self.thank_you_message {
            survey.thank_you_message = clean(thank_you_message);
        }
        if let Some(redirect_url) = self.redirect_url {
            survey.redirect_url = clean(redirect_url);
        }
        if let Some(show_progress) = self.show_progress {
            survey.show_progress = show_progress;
        }
        if let Some(show_question_numbers) = self.show_question_numbers {
            survey.show_question_numbers = show_question_numbers;
        }
        if let Some(shuffle_questions) = self.shuffle_questions {
            survey.shuffle_questions = shuffle_questions;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub filter: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total_items: u32,
    pub total_pages: u32,
}

#[derive(Debug, Serialize)]
pub struct SurveyList {
    pub surveys: Vec<Survey>,
    pub pagination: Pagination,
}

/// A survey together with its questions in order.
#[derive(Debug, Serialize)]
pub struct SurveyDetail {
    #[serde(flatten)]
    pub survey: Survey,
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize)]
pub struct SurveyBody<T> {
    pub survey: T,
}

pub async fn create_survey(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<CreateSurveyRequest>,
) -> Result<Json<Envelope<SurveyBody<SurveyDetail>>>, ApiError> {
    let title = required_title(body.title)?;
    let questions = new_questions(body.questions)?;
    let password_hash = hash_survey_password(&state, clean(body.password)).await?;

    let new_survey = NewSurvey {
        author_id: user.id,
        title,
        description: clean(body.description),
        category: body.category.unwrap_or(SurveyCategory::Survey),
        is_public: body.is_public.unwrap_or(true),
        share_type: body.share_type.unwrap_or(ShareType::Public),
        allow_anon: body.allow_anon.unwrap_or(true),
        conversational: body.conversational.unwrap_or(false),
        max_responses: body.max_responses.filter(|n| *n > 0),
        closes_at: body.closes_at,
        password_hash,
        ip_allowlist: body.ip_allowlist,
        webhook_url: clean(body.webhook_url),
        webhook_secret: clean(body.webhook_secret),
        theme: body.theme,
        locale: clean(body.locale),
        translations: body.translations,
        thank_you_message: clean(body.thank_you_message),
        redirect_url: clean(body.redirect_url),
        show_progress: body.show_progress.unwrap_or(true),
        show_question_numbers: body.show_question_numbers.unwrap_or(true),
        shuffle_questions: body.shuffle_questions.unwrap_or(false),
        questions,
    };

    let survey = surveys::create(&state.pool, &new_survey, Timestamp::now()).await?;
    let questions = questions::list(&state.pool, survey.id).await?;

    audit_trail::record(
        &state,
        AuditEvent::new(AuditAction::Create, EntityType::Survey, survey.id, user.id)
            .with_metadata(json!({ "title": survey.title })),
    )
    .await;

    Ok(ok_with_message(
        "Survey created successfully",
        SurveyBody {
            survey: SurveyDetail { survey, questions },
        },
    ))
}

pub async fn list_surveys(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Envelope<SurveyList>>, ApiError> {
    let (page, limit) = page_window(params.page.as_deref(), params.limit.as_deref());

    let scope = match params.filter.as_deref() {
        Some("public") => SurveyScope::Public,
        _ => SurveyScope::AuthoredBy(user.id),
    };

    let listing = surveys::list(&state.pool, scope, page, limit).await?;

    Ok(ok(SurveyList {
        pagination: Pagination {
            page,
            limit,
            total_items: listing.total,
            total_pages: listing.total.div_ceil(limit),
        },
        surveys: listing.surveys,
    }))
}

/// Public read. Each read counts as a view.
pub async fn get_survey(
    State(state): State<AppState>,
    SurveyId(id): SurveyId,
) -> Result<Json<Envelope<SurveyBody<SurveyDetail>>>, ApiError> {
    let survey = surveys::get(&state.pool, id)
        .await?
        .ok_or_else(ApiError::survey_not_found)?;
    let questions = questions::list(&state.pool, id).await?;

    surveys::record_view(&state.pool, id).await?;

    Ok(ok(SurveyBody {
        survey: SurveyDetail { survey, questions },
    }))
}

pub async fn update_survey(
    State(state): State<AppState>,
    SurveyId(id): SurveyId,
    Extension(user): Extension<AuthUser>,
    JsonBody(mut body): JsonBody<UpdateSurveyRequest>,
) -> Result<Json<Envelope<SurveyBody<SurveyDetail>>>, ApiError> {
    let mut survey = authored_survey(&state, id, &user).await?;

    let replacement = body.questions.take().map(new_questions).transpose()?;
    let password_hash = match body.password.take() {
        Some(password) => Some(hash_survey_password(&state, clean(password)).await?),
        None => None,
    };
    body.apply(&mut survey, password_hash)?;

    let survey = surveys::update(&state.pool, &survey, replacement.as_deref(), Timestamp::now()).await?;
    let questions = questions::list(&state.pool, id).await?;

    audit_trail::record(
        &state,
        AuditEvent::new(AuditAction::Update, EntityType::Survey, id, user.id)
            .with_metadata(json!({ "questionsReplaced": replacement.is_some() })),
    )
    .await;

    Ok(ok_with_message(
        "Survey updated successfully",
        SurveyBody {
            survey: SurveyDetail { survey, questions },
        },
    ))
}

pub async fn delete_survey(
    State(state): State<AppState>,
    SurveyId(id): SurveyId,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let survey = authored_survey(&state, id, &user).await?;
    surveys::delete(&state.pool, id).await?;

    audit_trail::record(
        &state,
        AuditEvent::new(AuditAction::Delete, EntityType::Survey, id, user.id)
            .with_metadata(json!({ "title": survey.title })),
    )
    .await;

    Ok(done("Survey deleted successfully"))
}

pub async fn publish_survey(
    State(state): State<AppState>,
    SurveyId(id): SurveyId,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Envelope<SurveyBody<Survey>>>, ApiError> {
    authored_survey(&state, id, &user).await?;

    if questions::count(&state.pool, id).await? == 0 {
        return Err(ApiError::InvalidState(
            "Cannot publish survey without questions".to_string(),
        ));
    }

    let survey = surveys::set_status(&state.pool, id, SurveyStatus::Published, Timestamp::now()).await?;
    info!(survey_id = %id, "published survey");

    if let Some(url) = &survey.webhook_url {
        state.webhooks.dispatch(
            url.clone(),
            survey.webhook_secret.clone(),
            WebhookPayload::new(
                WebhookEvent::SurveyPublished,
                id,
                json!({ "title": survey.title, "publishedAt": survey.published_at }),
            ),
        );
    }

    audit_trail::record(
        &state,
        AuditEvent::new(AuditAction::Publish, EntityType::Survey, id, user.id),
    )
    .await;

    Ok(ok_with_message("Survey published successfully", SurveyBody { survey }))
}

pub async fn unpublish_survey(
    State(state): State<AppState>,
    SurveyId(id): SurveyId,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Envelope<SurveyBody<Survey>>>, ApiError> {
    let survey = authored_survey(&state, id, &user).await?;

    if survey.status != SurveyStatus::Published {
        return Err(ApiError::InvalidState("Survey is not published".to_string()));
    }

    let survey = surveys::set_status(&state.pool, id, SurveyStatus::Draft, Timestamp::now()).await?;
    info!(survey_id = %id, "unpublished survey");

    audit_trail::record(
        &state,
        AuditEvent::new(AuditAction::Unpublish, EntityType::Survey, id, user.id),
    )
    .await;

    Ok(ok_with_message("Survey unpublished successfully", SurveyBody { survey }))
}

fn required_title(title: Option<String>) -> Result<String, ApiError> {
    clean(title).ok_or_else(|| ApiError::Validation("Title is required".to_string()))
}

async fn hash_survey_password(
    state: &AppState,
    password: Option<String>,
) -> Result<Option<String>, ApiError> {
    let Some(password) = password else {
        return Ok(None);
    };
    let cost = state.config.bcrypt_cost;
    Ok(Some(blocking(move || hash_password(&password, cost)).await??))
}

fn parse_param(raw: Option<&str>) -> Option<i64> {
    raw.and_then(parse_int_prefix)
}

/// Page number (from 1) and page size (1 to `MAX_PAGE_SIZE`) from raw query
/// values.
pub(crate) fn page_window(page: Option<&str>, limit: Option<&str>) -> (u32, u32) {
    let page = parse_param(page).unwrap_or(1).max(1);
    let limit = parse_param(limit)
        .unwrap_or(i64::from(DEFAULT_PAGE_SIZE))
        .clamp(1, i64::from(MAX_PAGE_SIZE));
    (
        u32::try_from(page).unwrap_or(u32::MAX),
        u32::try_from(limit).unwrap_or(DEFAULT_PAGE_SIZE),
    )
}

/// Stop accepting responses. Only a published survey can be closed; the
/// publication time is kept.
pub async fn close_survey(
    State(state): State<AppState>,
    SurveyId(id): SurveyId,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Envelope<SurveyBody<Survey>>>, ApiError> {
    let survey = authored_survey(&state, id, &user).await?;

    if survey.status != SurveyStatus::Published {
        return Err(ApiError::InvalidState("Survey is not published".to_string()));
    }

    let now = Timestamp::now();
    let survey = surveys::set_status(&state.pool, id, SurveyStatus::Closed, now).await?;
    info!(survey_id = %id, "closed survey");

    if let Some(url) = &survey.webhook_url {
        state.webhooks.dispatch(
            url.clone(),
            survey.webhook_secret.clone(),
            WebhookPayload::new(
                WebhookEvent::SurveyClosed,
                id,
                json!({ "title": survey.title, "responseCount": survey.response_count, "closedAt": now }),
            ),
        );
    }

    audit_trail::record(
        &state,
        AuditEvent::new(AuditAction::Close, EntityType::Survey, id, user.id),
    )
    .await;

    Ok(ok_with_message("Survey closed successfully", SurveyBody { survey }))
}
