//! Call Routes
//!
//! HTTP handlers for placing calls and reading call history. All handlers
//! run behind the bearer-token middleware and only see the caller's calls.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::{
    domain_error, validation_error, ApiError, CallDetailResponse, CallListResponse, CallSummary,
    CreateCallRequest, CreateCallResponse, ErrorResponse, ListCallsQuery,
};
use crate::AppState;

/// Place an outbound call
#[utoipa::path(
    post,
    path = "/calls",
    request_body = CreateCallRequest,
    responses(
        (status = 200, description = "Call originated", body = CreateCallResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Provider rejected the call; the record still exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Call"
)]
pub async fn create_call(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    payload: Result<Json<CreateCallRequest>, JsonRejection>,
) -> Result<Json<CreateCallResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| validation_error(e.body_text()))?;
    let strategy = payload.validate().map_err(validation_error)?;

    let call = state
        .originator
        .originate_call(user, &payload.target_number, strategy)
        .await
        .map_err(domain_error)?;

    Ok(Json(CreateCallResponse::from_domain(call)))
}

/// List the caller's calls, newest first
#[utoipa::path(
    get,
    path = "/calls",
    params(ListCallsQuery),
    responses(
        (status = 200, description = "Page of calls", body = CallListResponse),
        (status = 400, description = "Unknown filter value", body = ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Call"
)]
pub async fn list_calls(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    query: Result<Query<ListCallsQuery>, QueryRejection>,
) -> Result<Json<CallListResponse>, ApiError> {
    let Query(query) = query.map_err(|e| validation_error(e.body_text()))?;
    let filter = query.to_filter().map_err(validation_error)?;

    let page = state
        .call_repo
        .list_calls(&user, &filter)
        .await
        .map_err(domain_error)?;

    Ok(Json(CallListResponse::from_domain(page)))
}

/// Get one of the caller's calls with its event log and AMD results
#[utoipa::path(
    get,
    path = "/calls/{call_id}",
    params(
        ("call_id" = Uuid, Path, description = "Call ID")
    ),
    responses(
        (status = 200, description = "Call found", body = CallDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Call not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Call"
)]
pub async fn get_call(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(call_id): Path<Uuid>,
) -> Result<Json<CallDetailResponse>, ApiError> {
    let not_found = || ErrorResponse::new("Call not found").into_api_error(StatusCode::NOT_FOUND);

    let call = state
        .call_repo
        .find_call_by_id(call_id)
        .await
        .map_err(domain_error)?
        .ok_or_else(not_found)?;

    // Other users' calls are indistinguishable from missing ones
    if !call.is_owned_by(&user) {
        return Err(not_found());
    }

    let events = state
        .call_repo
        .list_events(call_id)
        .await
        .map_err(domain_error)?;
    let amd_results = state
        .call_repo
        .list_amd_results(call_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(CallDetailResponse {
        call: CallSummary::from_domain(call),
        events: events.into_iter().map(Into::into).collect(),
        amd_results: amd_results.into_iter().map(Into::into).collect(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calls", get(list_calls).post(create_call))
        .route("/calls/:call_id", get(get_call))
}
