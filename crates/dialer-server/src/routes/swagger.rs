//! OpenAPI Documentation
//!
//! Centralized API documentation using utoipa.

use utoipa::OpenApi;

use crate::models::{
    AmdResultResponse,
    CallDetailResponse,
    CallEventResponse,
    CallListResponse,
    CallSummary,
    // Call models
    CreateCallRequest,
    CreateCallResponse,
    // Webhook models
    DecisionWebhookRequest,
    ErrorResponse,
    WebhookAck,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Call endpoints
        super::calls::create_call,
        super::calls::list_calls,
        super::calls::get_call,
        // Webhook endpoints
        super::webhooks::status_webhook,
        super::webhooks::decision_webhook,
        super::voice::voice_answer,
    ),
    info(
        title = "Dialer API",
        version = "0.2.0",
        description = "Outbound dialer with answering machine detection.\n\nPlaces calls through the telephony provider and folds provider callbacks and analyzer decisions into a monotonic call status.\n\n`/calls` endpoints require `Authorization: Bearer <token>`.",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Call", description = "Call - Origination and history"),
        (name = "Webhook", description = "Webhook - Provider callbacks and AMD decisions"),
    ),
    components(
        schemas(
            // Call
            CreateCallRequest,
            CreateCallResponse,
            CallSummary,
            CallListResponse,
            CallEventResponse,
            AmdResultResponse,
            CallDetailResponse,
            // Webhook
            DecisionWebhookRequest,
            WebhookAck,
            // Errors
            ErrorResponse,
        )
    ),
)]
pub struct ApiDoc;
