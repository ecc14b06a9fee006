//! Domain Errors
//!
//! Error types for domain operations.

use thiserror::Error;
use uuid::Uuid;

use super::entities::Call;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// The call row exists; only the provider request failed.
    #[error("Provider origination failed for call {}: {message}", call.id)]
    ProviderOrigination { call: Box<Call>, message: String },

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("External service error: {0}")]
    ExternalService(String),
}

impl DomainError {
    pub fn not_found<T: AsRef<str>>(entity_type: T, id: Uuid) -> Self {
        Self::NotFound {
            entity_type: entity_type.as_ref().to_string(),
            id: id.to_string(),
        }
    }

    pub fn provider_origination(call: Call, message: impl Into<String>) -> Self {
        Self::ProviderOrigination {
            call: Box::new(call),
            message: message.into(),
        }
    }
}
