//! Telephony Provider Port
//!
//! Abstract interface for originating outbound calls. Actual SIP/PSTN
//! signalling happens on the provider side; we only build the request and
//! later consume its asynchronous callbacks.

use async_trait::async_trait;

use crate::domain::errors::DomainError;

/// Provider-native answering machine detection parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineDetection {
    /// Provider mode, e.g. `DetectMessageEnd`
    pub mode: String,
    /// Where the provider posts its asynchronous AMD answer
    pub callback_url: String,
}

/// Everything the provider needs to place one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginationRequest {
    /// Destination in provider format (`+` and digits)
    pub to: String,
    pub from: String,
    /// Receives status callbacks
    pub status_callback_url: String,
    /// Fetched by the provider when the callee answers
    pub answer_url: String,
    pub machine_detection: Option<MachineDetection>,
}

/// Service interface for the telephony provider
#[async_trait]
pub trait TelephonyProvider: Send + Sync {
    /// Originate a call; returns the provider call id
    async fn originate(&self, request: &OriginationRequest) -> Result<String, DomainError>;
}
