//! AmdResult - Decision recorded by an AMD strategy for a call

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::value_objects::AmdDecision;

/// Strategy name used when an analyzer does not identify itself
pub const EXTERNAL_STRATEGY: &str = "external";

/// A decision reported for a call. Several may exist per call; none is
/// mutated after insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmdResult {
    pub id: Uuid,
    pub call_id: Uuid,
    pub strategy: String,
    pub decision: AmdDecision,
    pub confidence: Option<f64>,
    pub details: Option<serde_json::Value>,
    pub recorded_at: DateTime<Utc>,
    /// Content hash; identical re-deliveries share it and are stored once
    pub fingerprint: String,
}

impl AmdResult {
    pub fn new(
        call_id: Uuid,
        strategy: Option<String>,
        decision: AmdDecision,
        confidence: Option<f64>,
        details: Option<serde_json::Value>,
    ) -> Self {
        let strategy = strategy
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| EXTERNAL_STRATEGY.to_string());
        let confidence = confidence.map(|c| c.clamp(0.0, 1.0));
        let fingerprint = fingerprint(&strategy, decision, confidence, details.as_ref());

        Self {
            id: Uuid::new_v4(),
            call_id,
            strategy,
            decision,
            confidence,
            details,
            recorded_at: Utc::now(),
            fingerprint,
        }
    }
}

fn fingerprint(
    strategy: &str,
    decision: AmdDecision,
    confidence: Option<f64>,
    details: Option<&serde_json::Value>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(strategy.as_bytes());
    hasher.update([0u8]);
    hasher.update(decision.as_str().as_bytes());
    hasher.update([0u8]);
    if let Some(c) = confidence {
        hasher.update(c.to_bits().to_be_bytes());
    }
    hasher.update([0u8]);
    if let Some(d) = details {
        hasher.update(d.to_string().as_bytes());
    }
    hex::encode(hasher.finalize())
}
