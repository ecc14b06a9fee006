//! Twilio Telephony Implementation
//!
//! Originates calls through the Twilio REST API using reqwest.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use dialer::{DomainError, OriginationRequest, TelephonyProvider};

use crate::config::TwilioConfig;

/// Provider callbacks we subscribe to
const STATUS_CALLBACK_EVENTS: [&str; 4] = ["initiated", "ringing", "answered", "completed"];

#[derive(Debug, Deserialize)]
struct TwilioCallResponse {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorResponse {
    code: Option<i64>,
    message: Option<String>,
}

/// HTTP implementation of TelephonyProvider
pub struct TwilioClient {
    client: Client,
    config: TwilioConfig,
}

impl TwilioClient {
    pub fn new(config: TwilioConfig, timeout: Duration) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("Dialer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::ExternalService(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn calls_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Calls.json",
            self.config.api_base, self.config.account_sid
        )
    }

    /// Form body for the Calls resource
    fn form_params(request: &OriginationRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("To", request.to.clone()),
            ("From", request.from.clone()),
            ("Url", request.answer_url.clone()),
            ("Method", "GET".to_string()),
            ("StatusCallback", request.status_callback_url.clone()),
            ("StatusCallbackMethod", "POST".to_string()),
        ];
        params.extend(
            STATUS_CALLBACK_EVENTS
                .iter()
                .map(|event| ("StatusCallbackEvent", event.to_string())),
        );

        if let Some(amd) = &request.machine_detection {
            params.push(("MachineDetection", amd.mode.clone()));
            params.push(("AsyncAmd", "true".to_string()));
            params.push(("AsyncAmdStatusCallback", amd.callback_url.clone()));
            params.push(("AsyncAmdStatusCallbackMethod", "POST".to_string()));
        }

        params
    }
}

#[async_trait]
impl TelephonyProvider for TwilioClient {
    async fn originate(&self, request: &OriginationRequest) -> Result<String, DomainError> {
        let response = self
            .client
            .post(self.calls_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&Self::form_params(request))
            .send()
            .await
            .map_err(|e| DomainError::ExternalService(format!("Twilio request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            let call: TwilioCallResponse = response.json().await.map_err(|e| {
                DomainError::ExternalService(format!("Invalid Twilio response: {e}"))
            })?;
            return Ok(call.sid);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<TwilioErrorResponse>(&body) {
            Ok(TwilioErrorResponse {
                code,
                message: Some(message),
            }) => match code {
                Some(code) => format!("{message} (code {code})"),
                None => message,
            },
            _ if body.is_empty() => "No response body".to_string(),
            _ => body,
        };

        Err(DomainError::ExternalService(format!(
            "Twilio rejected call ({}): {}",
            status.as_u16(),
            message
        )))
    }
}

/// Used when no Twilio credentials are configured: every origination fails,
/// but the call record is still created and the failure logged against it.
pub struct UnconfiguredTelephony;

#[async_trait]
impl TelephonyProvider for UnconfiguredTelephony {
    async fn originate(&self, _request: &OriginationRequest) -> Result<String, DomainError> {
        Err(DomainError::ExternalService(
            "Twilio credentials are not configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialer::MachineDetection;

    fn request(machine_detection: Option<MachineDetection>) -> OriginationRequest {
        OriginationRequest {
            to: "+18007742678".to_string(),
            from: "+15550001111".to_string(),
            status_callback_url: "https://dialer.example.com/webhooks/status".to_string(),
            answer_url: "https://dialer.example.com/voice-answer?callId=abc".to_string(),
            machine_detection,
        }
    }

    fn values<'a>(params: &'a [(&'static str, String)], key: &str) -> Vec<&'a str> {
        params
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn test_form_params_without_amd() {
        let params = TwilioClient::form_params(&request(None));

        assert_eq!(values(&params, "To"), vec!["+18007742678"]);
        assert_eq!(values(&params, "From"), vec!["+15550001111"]);
        assert_eq!(
            values(&params, "StatusCallbackEvent"),
            vec!["initiated", "ringing", "answered", "completed"]
        );
        assert!(values(&params, "MachineDetection").is_empty());
    }

    #[test]
    fn test_form_params_with_provider_amd() {
        let params = TwilioClient::form_params(&request(Some(MachineDetection {
            mode: "DetectMessageEnd".to_string(),
            callback_url: "https://dialer.example.com/webhooks/status".to_string(),
        })));

        assert_eq!(values(&params, "MachineDetection"), vec!["DetectMessageEnd"]);
        assert_eq!(values(&params, "AsyncAmd"), vec!["true"]);
        assert_eq!(
            values(&params, "AsyncAmdStatusCallback"),
            vec!["https://dialer.example.com/webhooks/status"]
        );
    }

    #[tokio::test]
    async fn test_unconfigured_always_fails() {
        let err = UnconfiguredTelephony
            .originate(&request(None))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }
}
