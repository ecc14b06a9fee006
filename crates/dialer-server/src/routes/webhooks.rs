//! Webhook Routes - Provider and Analyzer Callbacks
//!
//! Public endpoints (no user auth). The status callback always answers 200
//! so the provider never retries; the decision endpoint reports errors to
//! the analyzer that sent it.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{rejection::FormRejection, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Form, Json, Router,
};

use crate::adapters::signature::SIGNATURE_HEADER;
use crate::application::IngestResult;
use crate::models::{
    domain_error, status_event_from_form, ApiError, DecisionWebhookRequest, ErrorResponse,
    WebhookAck,
};
use crate::AppState;

/// Provider status callback (form-encoded)
#[utoipa::path(
    post,
    path = "/webhooks/status",
    request_body(
        content = HashMap<String, String>,
        content_type = "application/x-www-form-urlencoded",
        description = "CallSid, CallStatus, To and optionally AnsweredBy"
    ),
    responses(
        (status = 200, description = "Acknowledged", body = WebhookAck)
    ),
    tag = "Webhook"
)]
pub async fn status_webhook(
    State(state): State<AppState>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Json<WebhookAck> {
    let Form(form) = match form {
        Ok(form) => form,
        Err(e) => {
            tracing::warn!("Undecodable status callback: {}", e);
            return Json(WebhookAck::rejected(e.body_text()));
        }
    };

    match state.correlator.ingest(status_event_from_form(form)).await {
        Ok(IngestResult::Correlated(outcome)) => {
            tracing::debug!(
                "Status callback for call {} via {:?} (status changed: {}, bound: {})",
                outcome.call_id,
                outcome.correlation,
                outcome.status_changed(),
                outcome.provider_id_bound
            );
            Json(WebhookAck::ok(Some(outcome.call_id)))
        }
        Ok(IngestResult::Uncorrelated) => Json(WebhookAck::ok(None)),
        Err(e) => {
            tracing::error!("Failed to ingest status callback: {}", e);
            Json(WebhookAck::ok(None))
        }
    }
}

/// AMD decision from the provider or a second-party analyzer
#[utoipa::path(
    post,
    path = "/webhooks/decision",
    request_body = DecisionWebhookRequest,
    params(
        ("X-Dialer-Signature" = Option<String>, Header, description = "sha256=<hex HMAC-SHA256 of the body>, required when a shared secret is configured")
    ),
    responses(
        (status = 200, description = "Decision recorded", body = WebhookAck),
        (status = 400, description = "Invalid JSON or missing providerCallId", body = ErrorResponse),
        (status = 401, description = "Missing or invalid signature", body = ErrorResponse),
        (status = 404, description = "No call matches the event", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Webhook"
)]
pub async fn decision_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    if !state.webhook_signature.verify(signature, &body) {
        tracing::warn!("Rejected decision webhook with invalid signature");
        return Err(ErrorResponse::new("Invalid signature").into_api_error(StatusCode::UNAUTHORIZED));
    }

    let bad_request = |details: String| {
        ErrorResponse::new("Invalid payload")
            .with_details(details)
            .into_api_error(StatusCode::BAD_REQUEST)
    };

    let json: serde_json::Value =
        serde_json::from_slice(&body).map_err(|e| bad_request(e.to_string()))?;
    let request: DecisionWebhookRequest =
        serde_json::from_value(json.clone()).map_err(|e| bad_request(e.to_string()))?;

    if request.provider_call_id().is_none() {
        return Err(bad_request("providerCallId is required".to_string()));
    }

    match state.correlator.ingest(request.into_event(json)).await {
        Ok(IngestResult::Correlated(outcome)) => {
            tracing::debug!(
                "Decision for call {} via {:?} (recorded: {}, status changed: {})",
                outcome.call_id,
                outcome.correlation,
                outcome.amd_result_recorded,
                outcome.status_changed()
            );
            Ok(Json(WebhookAck::ok(Some(outcome.call_id))))
        }
        Ok(IngestResult::Uncorrelated) => {
            Err(ErrorResponse::new("Call not found").into_api_error(StatusCode::NOT_FOUND))
        }
        Err(e) => Err(domain_error(e)),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/webhooks/status", post(status_webhook))
        .route("/webhooks/decision", post(decision_webhook))
}
