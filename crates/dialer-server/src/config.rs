//! Server configuration
//!
//! Read once at start-up from the Shuttle secret store and passed down
//! explicitly; nothing here is global.

use std::time::Duration;

use dialer::UserId;

use crate::application::OriginationSettings;

pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 15;
/// Provider-native AMD mode requested for the `twilio` strategy
pub const MACHINE_DETECTION_MODE: &str = "DetectMessageEnd";

/// Twilio REST credentials
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct DialerConfig {
    /// `None` when credentials are missing; origination then always fails
    pub twilio: Option<TwilioConfig>,
    pub from_number: String,
    /// Public URL the provider uses to reach our webhooks
    pub public_base_url: String,
    /// Bearer token to user id
    pub api_keys: Vec<(String, UserId)>,
    /// Shared secret for analyzer decision webhooks
    pub analyzer_webhook_secret: Option<String>,
    pub provider_timeout: Duration,
}

impl DialerConfig {
    pub fn from_secrets(secrets: &shuttle_runtime::SecretStore) -> Self {
        Self::from_lookup(|key| secrets.get(key))
    }

    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let twilio = match (get("TWILIO_ACCOUNT_SID"), get("TWILIO_AUTH_TOKEN")) {
            (Some(account_sid), Some(auth_token)) => Some(TwilioConfig {
                account_sid,
                auth_token,
                api_base: get("TWILIO_API_BASE")
                    .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string())
                    .trim_end_matches('/')
                    .to_string(),
            }),
            _ => None,
        };

        let provider_timeout = get("PROVIDER_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS);

        Self {
            twilio,
            from_number: get("TWILIO_PHONE_NUMBER").unwrap_or_default(),
            public_base_url: get("PUBLIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_keys: get("DIALER_API_KEYS")
                .map(|raw| parse_api_keys(&raw))
                .unwrap_or_default(),
            analyzer_webhook_secret: get("ANALYZER_WEBHOOK_SECRET"),
            provider_timeout: Duration::from_secs(provider_timeout),
        }
    }

    pub fn status_callback_url(&self) -> String {
        format!("{}/webhooks/status", self.public_base_url)
    }

    pub fn answer_url(&self) -> String {
        format!("{}/voice-answer", self.public_base_url)
    }

    pub fn origination_settings(&self) -> OriginationSettings {
        OriginationSettings {
            from_number: self.from_number.clone(),
            status_callback_url: self.status_callback_url(),
            answer_url: self.answer_url(),
            machine_detection_mode: MACHINE_DETECTION_MODE.to_string(),
        }
    }
}

/// Parse `user_id:token` pairs separated by commas
fn parse_api_keys(raw: &str) -> Vec<(String, UserId)> {
    raw.split(',')
        .filter_map(|pair| {
            let pair = pair.trim();
            if pair.is_empty() {
                return None;
            }
            match pair.split_once(':') {
                Some((user, token)) if !user.trim().is_empty() && !token.trim().is_empty() => {
                    Some((token.trim().to_string(), UserId::new(user.trim())))
                }
                _ => {
                    tracing::warn!("Ignoring malformed DIALER_API_KEYS entry");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> DialerConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DialerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_secrets() {
        let config = config_from(&[]);
        assert!(config.twilio.is_none());
        assert!(config.api_keys.is_empty());
        assert_eq!(config.public_base_url, DEFAULT_PUBLIC_BASE_URL);
        assert_eq!(config.provider_timeout, Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS));
        assert_eq!(config.status_callback_url(), "http://localhost:8000/webhooks/status");
    }

    #[test]
    fn test_full_configuration() {
        let config = config_from(&[
            ("TWILIO_ACCOUNT_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", "secret"),
            ("TWILIO_PHONE_NUMBER", "+15550001111"),
            ("PUBLIC_BASE_URL", "https://dialer.example.com/"),
            ("DIALER_API_KEYS", "alice:tok-a, bob:tok-b"),
            ("ANALYZER_WEBHOOK_SECRET", "shh"),
            ("PROVIDER_TIMEOUT_SECS", "5"),
        ]);

        let twilio = config.twilio.as_ref().expect("twilio configured");
        assert_eq!(twilio.account_sid, "AC123");
        assert_eq!(twilio.api_base, DEFAULT_TWILIO_API_BASE);
        assert_eq!(config.from_number, "+15550001111");
        assert_eq!(config.answer_url(), "https://dialer.example.com/voice-answer");
        assert_eq!(
            config.api_keys,
            vec![
                ("tok-a".to_string(), UserId::new("alice")),
                ("tok-b".to_string(), UserId::new("bob")),
            ]
        );
        assert_eq!(config.analyzer_webhook_secret.as_deref(), Some("shh"));
        assert_eq!(config.provider_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_partial_twilio_credentials_are_ignored() {
        let config = config_from(&[("TWILIO_ACCOUNT_SID", "AC123"), ("TWILIO_AUTH_TOKEN", " ")]);
        assert!(config.twilio.is_none());
    }

    #[test]
    fn test_malformed_api_keys_are_skipped() {
        assert_eq!(
            parse_api_keys("alice:tok-a,nocolon,:orphan,bob:"),
            vec![("tok-a".to_string(), UserId::new("alice"))]
        );
    }
}
