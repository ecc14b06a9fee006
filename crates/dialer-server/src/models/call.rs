//! Call DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use dialer::{AmdResult, AmdStrategy, Call, CallEvent, CallFilter, CallPage, CallStatus};

/// Request to place an outbound call
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCallRequest {
    /// 10 or 11 digits, e.g. `8007742678`
    #[schema(example = "8007742678")]
    pub target_number: String,
    /// `gemini`, `huggingface`, `jambonz` or `twilio`
    #[schema(example = "gemini")]
    pub amd_strategy: String,
}

impl CreateCallRequest {
    /// Check the request shape; returns the parsed strategy
    pub fn validate(&self) -> Result<AmdStrategy, String> {
        let digits = self.target_number.trim();
        if !(10..=11).contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err("targetNumber must be 10 or 11 digits".to_string());
        }
        self.amd_strategy.parse::<AmdStrategy>()
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCallResponse {
    pub call_id: Uuid,
    pub status: String,
    pub target_number: String,
    pub amd_strategy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_sid: Option<String>,
}

impl CreateCallResponse {
    pub fn from_domain(call: Call) -> Self {
        Self {
            call_id: call.id,
            status: call.status.to_string(),
            target_number: call.target_number.into_inner(),
            amd_strategy: call.amd_strategy.to_string(),
            provider_sid: call.provider_call_id,
        }
    }
}

/// History query; `all` (or nothing) disables a filter
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListCallsQuery {
    /// 1-based page (default 1)
    pub page: Option<u32>,
    /// Page size, 1 to 100 (default 10)
    pub page_size: Option<u32>,
    /// AMD strategy filter
    pub strategy: Option<String>,
    /// Status filter, e.g. `COMPLETED`
    pub status: Option<String>,
}

fn filter_value(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl ListCallsQuery {
    pub fn to_filter(&self) -> Result<CallFilter, String> {
        let defaults = CallFilter::default();

        let strategy = filter_value(&self.strategy)
            .map(str::parse::<AmdStrategy>)
            .transpose()?;
        let status = filter_value(&self.status)
            .map(|s| s.to_uppercase().parse::<CallStatus>())
            .transpose()?;

        Ok(CallFilter {
            strategy,
            status,
            page: self.page.unwrap_or(defaults.page),
            page_size: self.page_size.unwrap_or(defaults.page_size),
        }
        .normalized())
    }
}

/// One row of the history table
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallSummary {
    pub id: Uuid,
    pub target_number: String,
    pub amd_strategy: String,
    pub status: String,
    pub provider_sid: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CallSummary {
    pub fn from_domain(call: Call) -> Self {
        Self {
            id: call.id,
            target_number: call.target_number.into_inner(),
            amd_strategy: call.amd_strategy.to_string(),
            status: call.status.to_string(),
            provider_sid: call.provider_call_id,
            created_at: call.created_at,
            updated_at: call.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallListResponse {
    pub calls: Vec<CallSummary>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

impl CallListResponse {
    pub fn from_domain(page: CallPage) -> Self {
        let total_pages = page.total_pages();
        Self {
            calls: page.calls.into_iter().map(CallSummary::from_domain).collect(),
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallEventResponse {
    pub id: Uuid,
    pub event_type: String,
    pub occurred_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl From<CallEvent> for CallEventResponse {
    fn from(event: CallEvent) -> Self {
        Self {
            id: event.id,
            event_type: event.event_type,
            occurred_at: event.occurred_at,
            payload: event.payload,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AmdResultResponse {
    pub id: Uuid,
    pub strategy: String,
    pub decision: String,
    pub confidence: Option<f64>,
    pub details: Option<serde_json::Value>,
    pub recorded_at: DateTime<Utc>,
}

impl From<AmdResult> for AmdResultResponse {
    fn from(result: AmdResult) -> Self {
        Self {
            id: result.id,
            strategy: result.strategy,
            decision: result.decision.to_string(),
            confidence: result.confidence,
            details: result.details,
            recorded_at: result.recorded_at,
        }
    }
}

/// A call with its full audit trail
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallDetailResponse {
    #[serde(flatten)]
    pub call: CallSummary,
    pub events: Vec<CallEventResponse>,
    pub amd_results: Vec<AmdResultResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(number: &str, strategy: &str) -> CreateCallRequest {
        CreateCallRequest {
            target_number: number.to_string(),
            amd_strategy: strategy.to_string(),
        }
    }

    #[test]
    fn test_create_call_validation() {
        assert_eq!(request("8007742678", "gemini").validate(), Ok(AmdStrategy::Gemini));
        assert_eq!(request("18007742678", "Twilio").validate(), Ok(AmdStrategy::Twilio));
        assert!(request("800774267", "gemini").validate().is_err());
        assert!(request("+18007742678", "gemini").validate().is_err());
        assert!(request("800-774-2678", "gemini").validate().is_err());
        assert!(request("8007742678", "carrier-pigeon").validate().is_err());
    }

    #[test]
    fn test_list_query_defaults_and_clamping() {
        let filter = ListCallsQuery::default().to_filter().unwrap();
        assert_eq!((filter.page, filter.page_size), (1, 10));
        assert!(filter.strategy.is_none() && filter.status.is_none());

        let filter = ListCallsQuery {
            page: Some(0),
            page_size: Some(500),
            strategy: Some("all".into()),
            status: Some("completed".into()),
        }
        .to_filter()
        .unwrap();
        assert_eq!((filter.page, filter.page_size), (1, 100));
        assert!(filter.strategy.is_none());
        assert_eq!(filter.status, Some(CallStatus::Completed));
    }

    #[test]
    fn test_list_query_rejects_unknown_filters() {
        let query = ListCallsQuery {
            strategy: Some("psychic".into()),
            ..Default::default()
        };
        assert!(query.to_filter().is_err());

        let query = ListCallsQuery {
            status: Some("EXPLODED".into()),
            ..Default::default()
        };
        assert!(query.to_filter().is_err());
    }
}
