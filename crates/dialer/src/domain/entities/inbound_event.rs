//! InboundEvent - Provider callbacks and analyzer decisions
//!
//! Webhook payloads are loosely typed; they are decoded once at the HTTP
//! boundary into one of these shapes. The raw payload travels along so the
//! audit log keeps exactly what was received.

use serde::{Deserialize, Serialize};

use super::CallEventType;

/// A provider status callback (optionally with a provider-native AMD answer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEvent {
    pub provider_call_id: Option<String>,
    pub status_label: Option<String>,
    /// Destination number as the provider reports it (E.164)
    pub to_number: Option<String>,
    /// Provider-native AMD result (`AnsweredBy`)
    pub answered_by: Option<String>,
    pub raw: serde_json::Value,
}

/// An AMD decision from the provider or a second-party analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionEvent {
    pub event_type: String,
    pub provider_call_id: Option<String>,
    pub target_number: Option<String>,
    pub decision: String,
    pub strategy: Option<String>,
    pub confidence: Option<f64>,
    pub details: Option<serde_json::Value>,
    pub raw: serde_json::Value,
}

/// Anything else; only ever written to the audit log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnknownEvent {
    pub event_type: String,
    pub provider_call_id: Option<String>,
    pub to_number: Option<String>,
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundEvent {
    Status(StatusEvent),
    Decision(DecisionEvent),
    Unknown(UnknownEvent),
}

impl InboundEvent {
    pub fn provider_call_id(&self) -> Option<&str> {
        let id = match self {
            InboundEvent::Status(e) => e.provider_call_id.as_deref(),
            InboundEvent::Decision(e) => e.provider_call_id.as_deref(),
            InboundEvent::Unknown(e) => e.provider_call_id.as_deref(),
        };
        id.map(str::trim).filter(|s| !s.is_empty())
    }

    /// Destination number used for fallback correlation
    pub fn destination_number(&self) -> Option<&str> {
        let number = match self {
            InboundEvent::Status(e) => e.to_number.as_deref(),
            InboundEvent::Decision(e) => e.target_number.as_deref(),
            InboundEvent::Unknown(e) => e.to_number.as_deref(),
        };
        number.map(str::trim).filter(|s| !s.is_empty())
    }

    /// Tag written to the call's event log
    pub fn event_type(&self) -> &str {
        match self {
            InboundEvent::Status(_) => CallEventType::ProviderStatus.as_str(),
            InboundEvent::Decision(e) => &e.event_type,
            InboundEvent::Unknown(e) => &e.event_type,
        }
    }

    pub fn raw(&self) -> &serde_json::Value {
        match self {
            InboundEvent::Status(e) => &e.raw,
            InboundEvent::Decision(e) => &e.raw,
            InboundEvent::Unknown(e) => &e.raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_identifiers_are_absent() {
        let event = InboundEvent::Status(StatusEvent {
            provider_call_id: Some("  ".into()),
            status_label: Some("ringing".into()),
            to_number: Some("".into()),
            answered_by: None,
            raw: json!({}),
        });
        assert_eq!(event.provider_call_id(), None);
        assert_eq!(event.destination_number(), None);
        assert_eq!(event.event_type(), "provider_status");
    }

    #[test]
    fn test_decision_uses_its_own_event_type() {
        let event = InboundEvent::Decision(DecisionEvent {
            event_type: "gemini_decision".into(),
            provider_call_id: Some("CA123".into()),
            target_number: Some("18007742678".into()),
            decision: "human".into(),
            strategy: Some("gemini".into()),
            confidence: Some(0.8),
            details: None,
            raw: json!({"decision": "human"}),
        });
        assert_eq!(event.event_type(), "gemini_decision");
        assert_eq!(event.provider_call_id(), Some("CA123"));
        assert_eq!(event.destination_number(), Some("18007742678"));
    }
}
