//! CallEvent - Append-only audit log of everything observed for a call

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One observed event. Never updated or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallEvent {
    pub id: Uuid,
    pub call_id: Uuid,
    /// Free-form tag; see [`CallEventType`] for the ones written by the system
    pub event_type: String,
    pub occurred_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

/// Event tags written by the dialer itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEventType {
    CallInitiated,
    ProviderCallCreated,
    ProviderError,
    ProviderStatus,
    ProviderEvent,
    UnknownEvent,
}

impl CallEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            CallEventType::CallInitiated => "call_initiated",
            CallEventType::ProviderCallCreated => "provider_call_created",
            CallEventType::ProviderError => "provider_error",
            CallEventType::ProviderStatus => "provider_status",
            CallEventType::ProviderEvent => "provider_event",
            CallEventType::UnknownEvent => "unknown_event",
        }
    }
}

impl std::fmt::Display for CallEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CallEvent {
    pub fn new(call_id: Uuid, event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            call_id,
            event_type: event_type.into(),
            occurred_at: Utc::now(),
            payload,
        }
    }

    pub fn of_type(call_id: Uuid, event_type: CallEventType, payload: serde_json::Value) -> Self {
        Self::new(call_id, event_type.as_str(), payload)
    }
}
