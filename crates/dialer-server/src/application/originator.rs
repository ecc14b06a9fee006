//! Call Originator (Use Case)
//!
//! Records the call first, then asks the telephony provider to place it.
//! The record is never rolled back: a provider failure leaves a PENDING call
//! with a `provider_error` event explaining why.

use std::sync::Arc;

use serde_json::json;

use dialer::{
    normalize, to_provider_format, AmdStrategy, Call, CallEvent, CallEventType, CallRepository,
    CallStatus, DomainError, MachineDetection, OriginationRequest, TelephonyProvider, UserId,
};

use super::advance;

/// Per-deployment origination parameters
#[derive(Debug, Clone)]
pub struct OriginationSettings {
    pub from_number: String,
    pub status_callback_url: String,
    pub answer_url: String,
    /// Provider AMD mode for provider-native strategies
    pub machine_detection_mode: String,
}

/// Application service for placing outbound calls
pub struct CallOriginator<R: CallRepository + ?Sized, T: TelephonyProvider + ?Sized> {
    repo: Arc<R>,
    provider: Arc<T>,
    settings: OriginationSettings,
}

impl<R, T> CallOriginator<R, T>
where
    R: CallRepository + ?Sized,
    T: TelephonyProvider + ?Sized,
{
    pub fn new(repo: Arc<R>, provider: Arc<T>, settings: OriginationSettings) -> Self {
        Self {
            repo,
            provider,
            settings,
        }
    }

    /// Create a call record and originate it with the provider.
    ///
    /// Exactly one provider request is made. On provider failure the error
    /// carries the persisted call so callers can still report its id.
    pub async fn originate_call(
        &self,
        owner_id: UserId,
        raw_target_number: &str,
        amd_strategy: AmdStrategy,
    ) -> Result<Call, DomainError> {
        let target_number = normalize(raw_target_number);
        let call = self
            .repo
            .create_call(&Call::new(owner_id, target_number, amd_strategy))
            .await?;

        tracing::info!(
            "Created call {} to {} ({})",
            call.id,
            call.target_number,
            call.amd_strategy
        );

        self.log_event(
            &call,
            CallEventType::CallInitiated,
            json!({
                "targetNumber": call.target_number,
                "amdStrategy": call.amd_strategy,
                "userId": call.owner_id,
            }),
        )
        .await;

        let request = self.build_request(&call);
        let provider_call_id = match self.provider.originate(&request).await {
            Ok(id) => id,
            Err(e) => {
                let message = e.to_string();
                tracing::warn!("Origination failed for call {}: {}", call.id, message);
                self.log_event(
                    &call,
                    CallEventType::ProviderError,
                    json!({ "error": message }),
                )
                .await;
                return Err(DomainError::provider_origination(call, message));
            }
        };

        // The provider id is logged even when the bind below fails
        self.log_event(
            &call,
            CallEventType::ProviderCallCreated,
            json!({ "providerCallId": provider_call_id }),
        )
        .await;

        match self
            .repo
            .set_provider_call_id(call.id, &provider_call_id)
            .await
        {
            Ok(true) => {}
            // A fast callback already bound an id via number fallback
            Ok(false) => tracing::warn!(
                "Call {} already bound before origination returned {}",
                call.id,
                provider_call_id
            ),
            Err(e) => {
                let message = e.to_string();
                tracing::error!(
                    "Failed to bind provider id {} to call {}: {}",
                    provider_call_id,
                    call.id,
                    message
                );
                self.log_event(
                    &call,
                    CallEventType::ProviderError,
                    json!({ "error": message, "providerCallId": provider_call_id }),
                )
                .await;
            }
        }

        advance(self.repo.as_ref(), call.id, call.status, CallStatus::Ringing).await?;

        tracing::info!("Call {} originated as {}", call.id, provider_call_id);

        self.repo
            .find_call_by_id(call.id)
            .await?
            .ok_or_else(|| DomainError::not_found("Call", call.id))
    }

    fn build_request(&self, call: &Call) -> OriginationRequest {
        let machine_detection = call
            .amd_strategy
            .is_provider_native()
            .then(|| MachineDetection {
                mode: self.settings.machine_detection_mode.clone(),
                callback_url: self.settings.status_callback_url.clone(),
            });

        OriginationRequest {
            to: to_provider_format(&call.target_number),
            from: self.settings.from_number.clone(),
            status_callback_url: self.settings.status_callback_url.clone(),
            answer_url: format!("{}?callId={}", self.settings.answer_url, call.id),
            machine_detection,
        }
    }

    /// Best effort: a failed append never fails the origination
    async fn log_event(&self, call: &Call, event_type: CallEventType, payload: serde_json::Value) {
        let event = CallEvent::of_type(call.id, event_type, payload);
        if let Err(e) = self.repo.append_event(&event).await {
            tracing::warn!("Failed to log {} for call {}: {}", event_type, call.id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryCallRepository, ScriptedTelephony};

    fn settings() -> OriginationSettings {
        OriginationSettings {
            from_number: "+15550001111".to_string(),
            status_callback_url: "https://dialer.example.com/webhooks/status".to_string(),
            answer_url: "https://dialer.example.com/voice-answer".to_string(),
            machine_detection_mode: "DetectMessageEnd".to_string(),
        }
    }

    fn event_types(events: &[CallEvent]) -> Vec<&str> {
        events.iter().map(|e| e.event_type.as_str()).collect()
    }

    #[tokio::test]
    async fn test_successful_origination() {
        let repo = Arc::new(InMemoryCallRepository::new());
        let provider = Arc::new(ScriptedTelephony::succeeding("CA123"));
        let originator = CallOriginator::new(repo.clone(), provider.clone(), settings());

        let call = originator
            .originate_call(UserId::new("alice"), "8007742678", AmdStrategy::Gemini)
            .await
            .unwrap();

        assert_eq!(call.target_number.as_str(), "18007742678");
        assert_eq!(call.provider_call_id.as_deref(), Some("CA123"));
        assert_eq!(call.status, CallStatus::Ringing);

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].to, "+18007742678");
        assert_eq!(
            requests[0].answer_url,
            format!("https://dialer.example.com/voice-answer?callId={}", call.id)
        );
        assert!(requests[0].machine_detection.is_none());

        let events = repo.list_events(call.id).await.unwrap();
        assert_eq!(
            event_types(&events),
            vec!["call_initiated", "provider_call_created"]
        );
        assert_eq!(events[1].payload["providerCallId"], "CA123");
    }

    #[tokio::test]
    async fn test_provider_native_strategy_requests_machine_detection() {
        let repo = Arc::new(InMemoryCallRepository::new());
        let provider = Arc::new(ScriptedTelephony::succeeding("CA900"));
        let originator = CallOriginator::new(repo, provider.clone(), settings());

        originator
            .originate_call(UserId::new("alice"), "+18007742678", AmdStrategy::Twilio)
            .await
            .unwrap();

        let detection = provider.requests()[0].machine_detection.clone().unwrap();
        assert_eq!(detection.mode, "DetectMessageEnd");
        assert_eq!(detection.callback_url, "https://dialer.example.com/webhooks/status");
    }

    #[tokio::test]
    async fn test_provider_failure_keeps_pending_call() {
        let repo = Arc::new(InMemoryCallRepository::new());
        let provider = Arc::new(ScriptedTelephony::failing("invalid number"));
        let originator = CallOriginator::new(repo.clone(), provider, settings());

        let err = originator
            .originate_call(UserId::new("alice"), "8007742678", AmdStrategy::Jambonz)
            .await
            .unwrap_err();

        let call = match err {
            DomainError::ProviderOrigination { call, message } => {
                assert!(message.contains("invalid number"));
                call
            }
            other => panic!("unexpected error: {other}"),
        };

        let stored = repo.find_call_by_id(call.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CallStatus::Pending);
        assert!(stored.provider_call_id.is_none());

        let events = repo.list_events(call.id).await.unwrap();
        assert_eq!(event_types(&events), vec!["call_initiated", "provider_error"]);
    }

    #[tokio::test]
    async fn test_failed_bind_still_records_provider_id() {
        let repo = Arc::new(InMemoryCallRepository::new());
        repo.fail_provider_binds();
        let provider = Arc::new(ScriptedTelephony::succeeding("CA123"));
        let originator = CallOriginator::new(repo.clone(), provider.clone(), settings());

        let call = originator
            .originate_call(UserId::new("alice"), "8007742678", AmdStrategy::Gemini)
            .await
            .unwrap();

        assert_eq!(provider.requests().len(), 1);
        assert!(call.provider_call_id.is_none());
        assert_eq!(call.status, CallStatus::Ringing);

        let events = repo.list_events(call.id).await.unwrap();
        assert_eq!(
            event_types(&events),
            vec!["call_initiated", "provider_call_created", "provider_error"]
        );
        assert_eq!(events[1].payload["providerCallId"], "CA123");
        assert_eq!(events[2].payload["providerCallId"], "CA123");
    }

    #[tokio::test]
    async fn test_provider_id_is_bound_once() {
        let repo = Arc::new(InMemoryCallRepository::new());
        let provider = Arc::new(ScriptedTelephony::succeeding("CA123"));
        let originator = CallOriginator::new(repo.clone(), provider, settings());

        let call = originator
            .originate_call(UserId::new("alice"), "8007742678", AmdStrategy::Gemini)
            .await
            .unwrap();

        // Second bind attempt is a no-op
        assert!(!repo.set_provider_call_id(call.id, "CA999").await.unwrap());
        let stored = repo.find_call_by_id(call.id).await.unwrap().unwrap();
        assert_eq!(stored.provider_call_id.as_deref(), Some("CA123"));
    }
}
