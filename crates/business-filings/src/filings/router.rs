use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{EntityType, FilingType};
use super::registry::{BusinessLookup, FilingSubmitter, SubmissionError};
use super::rules::RuleSet;
use super::sections::SectionData;
use super::service::{
    FilingService, FilingServiceError, NavigateCommand, SessionStore, SessionStoreError,
    StartFilingRequest,
};
use super::session::SessionId;
use super::wizard::WizardError;

/// Router builder exposing the filing wizard over HTTP.
pub fn filing_router<S, L, F>(service: Arc<FilingService<S, L, F>>) -> Router
where
    S: SessionStore + 'static,
    L: BusinessLookup + 'static,
    F: FilingSubmitter + 'static,
{
    Router::new()
        .route("/api/v1/filings/sessions", post(start_handler::<S, L, F>))
        .route(
            "/api/v1/filings/sessions/:session_id",
            get(session_handler::<S, L, F>).delete(cancel_handler::<S, L, F>),
        )
        .route(
            "/api/v1/filings/sessions/:session_id/sections",
            put(section_handler::<S, L, F>),
        )
        .route(
            "/api/v1/filings/sessions/:session_id/navigate",
            post(navigate_handler::<S, L, F>),
        )
        .route(
            "/api/v1/filings/sessions/:session_id/submit",
            post(submit_handler::<S, L, F>),
        )
        .route(
            "/api/v1/filings/resources/:filing_type/:entity_type",
            get(resource_handler::<S, L, F>),
        )
        .route("/api/v1/filings/rules/:rule_set", post(rule_handler))
        .with_state(service)
}

pub(crate) async fn start_handler<S, L, F>(
    State(service): State<Arc<FilingService<S, L, F>>>,
    Json(request): Json<StartFilingRequest>,
) -> Response
where
    S: SessionStore + 'static,
    L: BusinessLookup + 'static,
    F: FilingSubmitter + 'static,
{
    match service.start(request).await {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn session_handler<S, L, F>(
    State(service): State<Arc<FilingService<S, L, F>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    L: BusinessLookup + 'static,
    F: FilingSubmitter + 'static,
{
    match service.get(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn section_handler<S, L, F>(
    State(service): State<Arc<FilingService<S, L, F>>>,
    Path(session_id): Path<String>,
    Json(data): Json<SectionData>,
) -> Response
where
    S: SessionStore + 'static,
    L: BusinessLookup + 'static,
    F: FilingSubmitter + 'static,
{
    match service.update_section(&SessionId(session_id), data) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn navigate_handler<S, L, F>(
    State(service): State<Arc<FilingService<S, L, F>>>,
    Path(session_id): Path<String>,
    Json(command): Json<NavigateCommand>,
) -> Response
where
    S: SessionStore + 'static,
    L: BusinessLookup + 'static,
    F: FilingSubmitter + 'static,
{
    match service.navigate(&SessionId(session_id), command) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<S, L, F>(
    State(service): State<Arc<FilingService<S, L, F>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    L: BusinessLookup + 'static,
    F: FilingSubmitter + 'static,
{
    match service.submit(&SessionId(session_id)).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cancel_handler<S, L, F>(
    State(service): State<Arc<FilingService<S, L, F>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    L: BusinessLookup + 'static,
    F: FilingSubmitter + 'static,
{
    match service.cancel(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn resource_handler<S, L, F>(
    State(service): State<Arc<FilingService<S, L, F>>>,
    Path((filing_type, entity_type)): Path<(String, String)>,
) -> Response
where
    S: SessionStore + 'static,
    L: BusinessLookup + 'static,
    F: FilingSubmitter + 'static,
{
    let parsed = filing_type
        .parse::<FilingType>()
        .and_then(|filing_type| Ok((filing_type, entity_type.parse::<EntityType>()?)));
    let (filing_type, entity_type) = match parsed {
        Ok(pair) => pair,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::NOT_FOUND, Json(payload)).into_response();
        }
    };

    match service.resources().resource(filing_type, entity_type) {
        Ok(resource) => (StatusCode::OK, Json(resource)).into_response(),
        Err(error) => error_response(error.into()),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RuleCheck {
    #[serde(default)]
    value: String,
}

pub(crate) async fn rule_handler(
    Path(rule_set): Path<String>,
    Json(check): Json<RuleCheck>,
) -> Response {
    let rule_set = match rule_set.parse::<RuleSet>() {
        Ok(rule_set) => rule_set,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::NOT_FOUND, Json(payload)).into_response();
        }
    };

    let payload = match rule_set.check(&check.value) {
        Ok(()) => json!({ "ruleSet": rule_set.name(), "valid": true }),
        Err(message) => json!({ "ruleSet": rule_set.name(), "valid": false, "message": message }),
    };
    (StatusCode::OK, Json(payload)).into_response()
}

fn error_response(error: FilingServiceError) -> Response {
    let (status, payload) = match &error {
        FilingServiceError::Validation(validation) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({
                "error": error.to_string(),
                "stepId": validation.step_id,
                "section": validation.section,
                "reason": validation.reason,
            }),
        ),
        FilingServiceError::Submission(submission) => (
            StatusCode::BAD_GATEWAY,
            json!({
                "error": error.to_string(),
                "fieldErrors": submission.field_errors(),
                "retryable": matches!(submission, SubmissionError::Transport(_)),
            }),
        ),
        FilingServiceError::InvalidRequest(_)
        | FilingServiceError::BusinessState { .. }
        | FilingServiceError::SectionNotInFiling { .. }
        | FilingServiceError::SectionNotPermitted(_)
        | FilingServiceError::Configuration(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "error": error.to_string() }),
        ),
        FilingServiceError::BusinessNotFound(_) | FilingServiceError::Store(SessionStoreError::NotFound) => {
            (StatusCode::NOT_FOUND, json!({ "error": error.to_string() }))
        }
        FilingServiceError::Wizard(WizardError::Assembly(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": error.to_string() }),
        ),
        FilingServiceError::Wizard(_)
        | FilingServiceError::SubmissionInProgress
        | FilingServiceError::Store(SessionStoreError::Conflict | SessionStoreError::Stale) => {
            (StatusCode::CONFLICT, json!({ "error": error.to_string() }))
        }
        FilingServiceError::Lookup(_) => (
            StatusCode::BAD_GATEWAY,
            json!({ "error": error.to_string() }),
        ),
        FilingServiceError::Store(SessionStoreError::Unavailable(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": error.to_string() }),
        ),
    };

    (status, Json(payload)).into_response()
}
