//! Call - Outbound call attempt
//!
//! Pure domain entity without infrastructure dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{AmdStrategy, CallStatus, CanonicalNumber, UserId};

/// Call - Record of one outbound call attempt
///
/// `provider_call_id` starts absent and is bound at most once; `status` only
/// moves through [`crate::domain::StatusMachine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Call {
    pub id: Uuid,
    pub owner_id: UserId,
    pub target_number: CanonicalNumber,
    pub amd_strategy: AmdStrategy,
    pub provider_call_id: Option<String>,
    pub status: CallStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Call {
    /// Create a new pending call record
    pub fn new(owner_id: UserId, target_number: CanonicalNumber, amd_strategy: AmdStrategy) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            target_number,
            amd_strategy,
            provider_call_id: None,
            status: CallStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.provider_call_id.is_some()
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner_id == user
    }
}
