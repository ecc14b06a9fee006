//! Error DTOs

use axum::{http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use dialer::DomainError;

/// JSON error body
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Set when the call record exists despite the failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<Uuid>,
}

/// Error half of every route's `Result`
pub type ApiError = (StatusCode, Json<ErrorResponse>);

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            call_id: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_call_id(mut self, call_id: Uuid) -> Self {
        self.call_id = Some(call_id);
        self
    }

    pub fn into_api_error(self, status: StatusCode) -> ApiError {
        (status, Json(self))
    }
}

pub fn validation_error(details: impl Into<String>) -> ApiError {
    ErrorResponse::new("Validation failed")
        .with_details(details)
        .into_api_error(StatusCode::BAD_REQUEST)
}

/// Map a domain error onto its HTTP status
pub fn domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::NotFound { entity_type, .. } => {
            ErrorResponse::new(format!("{} not found", entity_type))
                .into_api_error(StatusCode::NOT_FOUND)
        }
        DomainError::ProviderOrigination { call, message } => {
            ErrorResponse::new("Failed to initiate call with provider")
                .with_details(message)
                .with_call_id(call.id)
                .into_api_error(StatusCode::BAD_GATEWAY)
        }
        DomainError::ExternalService(msg) => ErrorResponse::new("Upstream service error")
            .with_details(msg)
            .into_api_error(StatusCode::BAD_GATEWAY),
        DomainError::Repository(msg) => {
            tracing::error!("Repository error: {}", msg);
            ErrorResponse::new("Internal server error")
                .into_api_error(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialer::{normalize, AmdStrategy, Call, UserId};

    #[test]
    fn test_provider_failure_carries_call_id() {
        let call = Call::new(UserId::new("alice"), normalize("8007742678"), AmdStrategy::Gemini);
        let call_id = call.id;

        let (status, Json(body)) =
            domain_error(DomainError::provider_origination(call, "unreachable"));

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.call_id, Some(call_id));
        assert_eq!(body.details.as_deref(), Some("unreachable"));
    }

    #[test]
    fn test_repository_details_are_not_leaked() {
        let (status, Json(body)) = domain_error(DomainError::Repository("pg: secret".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.details.is_none());
    }
}
