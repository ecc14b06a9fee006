//! Voice Answer Route
//!
//! The provider fetches this when the callee picks up.

use axum::{
    extract::Query,
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::AppState;

const ANSWER_TWIML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Response><Say voice="Polly.Matthew">Please hold while we connect your call.</Say></Response>"#;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VoiceAnswerQuery {
    /// Our call id, as passed in the answer URL
    pub call_id: Option<String>,
}

/// TwiML for an answered call
#[utoipa::path(
    get,
    path = "/voice-answer",
    params(VoiceAnswerQuery),
    responses(
        (status = 200, description = "TwiML document", content_type = "text/xml", body = String)
    ),
    tag = "Webhook"
)]
pub async fn voice_answer(Query(query): Query<VoiceAnswerQuery>) -> impl IntoResponse {
    tracing::debug!("Voice answer requested for call {:?}", query.call_id);
    ([(header::CONTENT_TYPE, "text/xml")], ANSWER_TWIML)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/voice-answer", get(voice_answer))
}
