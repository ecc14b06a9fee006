//! Webhook DTOs
//!
//! Provider and analyzer payloads are loosely typed. They are decoded here,
//! once, into a [`dialer::InboundEvent`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use dialer::{CallEventType, DecisionEvent, InboundEvent, StatusEvent, UnknownEvent};

/// Analyzer or provider decision payload
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecisionWebhookRequest {
    /// Tag for the call's event log (default `provider_event`, or
    /// `unknown_event` when the payload carries no decision)
    pub event_type: Option<String>,
    /// Provider call id (`callSid` accepted as an alias)
    #[serde(alias = "callSid")]
    pub provider_call_id: Option<String>,
    /// Destination number; used to correlate when the provider id is unknown
    pub target_number: Option<String>,
    /// Event data; logged instead of the whole body when present
    pub data: Option<Value>,
    /// `human`, `machine`, `voicemail` or `unknown`
    pub decision: Option<String>,
    pub strategy: Option<String>,
    pub confidence: Option<f64>,
    pub details: Option<Value>,
}

impl DecisionWebhookRequest {
    /// Provider call id, if present and non-blank
    pub fn provider_call_id(&self) -> Option<&str> {
        self.provider_call_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Decode into an inbound event. `body` is the full JSON as received.
    ///
    /// A payload with a decision (top level or inside `data`) becomes a
    /// decision event; anything else is only logged.
    pub fn into_event(self, body: Value) -> InboundEvent {
        let event_type = self.event_type.filter(|t| !t.trim().is_empty());

        let decision = self
            .decision
            .clone()
            .or_else(|| {
                self.data
                    .as_ref()
                    .and_then(|d| d.get("decision"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .filter(|d| !d.trim().is_empty());

        let raw = self.data.unwrap_or(body);

        match decision {
            Some(decision) => InboundEvent::Decision(DecisionEvent {
                event_type: event_type
                    .unwrap_or_else(|| CallEventType::ProviderEvent.to_string()),
                provider_call_id: self.provider_call_id,
                target_number: self.target_number,
                decision,
                strategy: self.strategy,
                confidence: self.confidence,
                details: self.details,
                raw,
            }),
            None => InboundEvent::Unknown(UnknownEvent {
                event_type: event_type
                    .unwrap_or_else(|| CallEventType::UnknownEvent.to_string()),
                provider_call_id: self.provider_call_id,
                to_number: self.target_number,
                raw,
            }),
        }
    }
}

/// Decode a form-encoded provider status callback
pub fn status_event_from_form(form: HashMap<String, String>) -> InboundEvent {
    let field = |name: &str| form.get(name).cloned().filter(|v| !v.trim().is_empty());

    InboundEvent::Status(StatusEvent {
        provider_call_id: field("CallSid"),
        status_label: field("CallStatus"),
        to_number: field("To"),
        answered_by: field("AnsweredBy"),
        raw: serde_json::to_value(&form).unwrap_or(Value::Null),
    })
}

/// Webhook acknowledgement
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<Uuid>,
}

impl WebhookAck {
    pub fn ok(call_id: Option<Uuid>) -> Self {
        Self {
            ok: true,
            message: None,
            call_id,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
            call_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(body: Value) -> InboundEvent {
        let request: DecisionWebhookRequest = serde_json::from_value(body.clone()).unwrap();
        request.into_event(body)
    }

    #[test]
    fn test_decision_payload() {
        let event = decode(json!({
            "eventType": "gemini_decision",
            "providerCallId": "CA123",
            "decision": "voicemail",
            "strategy": "gemini",
            "confidence": 0.93
        }));

        match event {
            InboundEvent::Decision(d) => {
                assert_eq!(d.event_type, "gemini_decision");
                assert_eq!(d.decision, "voicemail");
                assert_eq!(d.confidence, Some(0.93));
                assert_eq!(d.raw["providerCallId"], "CA123");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_decision_inside_data() {
        let event = decode(json!({
            "callSid": "CA123",
            "data": { "decision": "human", "score": 0.7 }
        }));

        match event {
            InboundEvent::Decision(d) => {
                assert_eq!(d.event_type, "provider_event");
                assert_eq!(d.provider_call_id.as_deref(), Some("CA123"));
                assert_eq!(d.decision, "human");
                assert_eq!(d.raw, json!({ "decision": "human", "score": 0.7 }));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_payload_without_decision_is_unknown() {
        let event = decode(json!({ "eventType": "stream_started", "providerCallId": "CA123" }));
        assert!(matches!(event, InboundEvent::Unknown(_)));
        assert_eq!(event.event_type(), "stream_started");
    }

    #[test]
    fn test_untagged_payload_without_decision_is_tagged_unknown_event() {
        let event = decode(json!({ "callSid": "CA123", "data": { "score": 0.4 } }));
        match &event {
            InboundEvent::Unknown(u) => {
                assert_eq!(u.event_type, "unknown_event");
                assert_eq!(u.raw, json!({ "score": 0.4 }));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_status_form() {
        let form: HashMap<String, String> = [
            ("CallSid", "CA123"),
            ("CallStatus", "in-progress"),
            ("To", "+18007742678"),
            ("AnsweredBy", ""),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        match status_event_from_form(form) {
            InboundEvent::Status(s) => {
                assert_eq!(s.provider_call_id.as_deref(), Some("CA123"));
                assert_eq!(s.status_label.as_deref(), Some("in-progress"));
                assert_eq!(s.to_number.as_deref(), Some("+18007742678"));
                assert!(s.answered_by.is_none());
                assert_eq!(s.raw["CallStatus"], "in-progress");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
