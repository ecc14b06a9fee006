//! Dialer API Client

use anyhow::{bail, Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

/// API Client for Dialer
pub struct DialerClient {
    client: Client,
    base_url: String,
    api_key: String,
}

// ============================================
// API Response Types
// ============================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCallRequest {
    pub target_number: String,
    pub amd_strategy: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCallResponse {
    pub call_id: Uuid,
    pub status: String,
    pub target_number: String,
    pub amd_strategy: String,
    pub provider_sid: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSummary {
    pub id: Uuid,
    pub target_number: String,
    pub amd_strategy: String,
    pub status: String,
    pub provider_sid: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallListResponse {
    pub calls: Vec<CallSummary>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallEvent {
    pub event_type: String,
    pub occurred_at: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmdResult {
    pub strategy: String,
    pub decision: String,
    pub confidence: Option<f64>,
    pub recorded_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallDetail {
    #[serde(flatten)]
    pub call: CallSummary,
    pub updated_at: String,
    pub events: Vec<CallEvent>,
    pub amd_results: Vec<AmdResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    details: Option<String>,
    call_id: Option<Uuid>,
}

/// History filters; `None` leaves the server default
#[derive(Debug, Default)]
pub struct HistoryQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub strategy: Option<String>,
    pub status: Option<String>,
}

impl HistoryQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            pairs.push(("pageSize", page_size.to_string()));
        }
        if let Some(strategy) = &self.strategy {
            pairs.push(("strategy", strategy.clone()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status", status.to_uppercase()));
        }
        pairs
    }
}

/// Turn an error response into a readable message
fn describe_error(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => {
            let mut message = format!("{} ({})", err.error, status);
            if let Some(details) = err.details {
                message.push_str(&format!(": {}", details));
            }
            if let Some(call_id) = err.call_id {
                message.push_str(&format!(" [call {}]", call_id));
            }
            message
        }
        Err(_) if body.is_empty() => format!("API error ({})", status),
        Err(_) => format!("API error ({}): {}", status, body),
    }
}

impl DialerClient {
    /// Create a new API client
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Test connection with health check
    pub async fn health(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        let resp = self.client.get(&url).send().await?;
        Ok(resp.status().is_success())
    }

    /// Check that the API key is accepted
    pub async fn verify_key(&self) -> Result<bool> {
        let url = format!("{}/calls", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("pageSize", "1")])
            .bearer_auth(&self.api_key)
            .send()
            .await
            .context("Failed to connect to Dialer API")?;
        Ok(resp.status() != StatusCode::UNAUTHORIZED)
    }

    /// Place a call
    pub async fn create_call(
        &self,
        target_number: &str,
        amd_strategy: &str,
    ) -> Result<CreateCallResponse> {
        let url = format!("{}/calls", self.base_url);
        let request = CreateCallRequest {
            target_number: target_number.to_string(),
            amd_strategy: amd_strategy.to_string(),
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to connect to Dialer API")?;

        Self::parse(resp).await
    }

    /// One page of call history
    pub async fn list_calls(&self, query: &HistoryQuery) -> Result<CallListResponse> {
        let url = format!("{}/calls", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&query.pairs())
            .bearer_auth(&self.api_key)
            .send()
            .await
            .context("Failed to connect to Dialer API")?;

        Self::parse(resp).await
    }

    /// A call with its events and AMD results
    pub async fn get_call(&self, call_id: Uuid) -> Result<CallDetail> {
        let url = format!("{}/calls/{}", self.base_url, call_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .context("Failed to connect to Dialer API")?;

        Self::parse(resp).await
    }

    async fn parse<T: DeserializeOwned>(resp: Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("{}", describe_error(status, &body));
        }

        resp.json().await.context("Failed to parse response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_provider_failure() {
        let call_id = Uuid::new_v4();
        let body = format!(
            r#"{{"error":"Failed to initiate call with provider","details":"busy","callId":"{}"}}"#,
            call_id
        );

        let message = describe_error(StatusCode::BAD_GATEWAY, &body);
        assert!(message.starts_with("Failed to initiate call with provider (502 Bad Gateway): busy"));
        assert!(message.contains(&call_id.to_string()));
    }

    #[test]
    fn test_describe_plain_errors() {
        assert_eq!(
            describe_error(StatusCode::UNAUTHORIZED, ""),
            "API error (401 Unauthorized)"
        );
        assert_eq!(
            describe_error(StatusCode::BAD_REQUEST, "nope"),
            "API error (400 Bad Request): nope"
        );
    }

    #[test]
    fn test_history_query_pairs() {
        let query = HistoryQuery {
            page: Some(2),
            strategy: Some("gemini".into()),
            status: Some("completed".into()),
            ..Default::default()
        };
        assert_eq!(
            query.pairs(),
            vec![
                ("page", "2".to_string()),
                ("strategy", "gemini".to_string()),
                ("status", "COMPLETED".to_string()),
            ]
        );
    }
}
