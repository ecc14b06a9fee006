//! Call Repository Port
//!
//! Abstract interface for Call, CallEvent and AmdResult persistence.
//!
//! Implementations must make `update_call_status` and
//! `set_provider_call_id` atomic per row: concurrent webhook deliveries for
//! the same call race on them, and a plain read-then-write would let two
//! callbacks both act on the same stale status.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{AmdResult, Call, CallEvent};
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{AmdStrategy, CallStatus, CanonicalNumber, UserId};

/// Default history page size
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Largest page a caller may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// History filter; `None` means "all"
#[derive(Debug, Clone)]
pub struct CallFilter {
    pub strategy: Option<AmdStrategy>,
    pub status: Option<CallStatus>,
    /// 1-based
    pub page: u32,
    pub page_size: u32,
}

impl Default for CallFilter {
    fn default() -> Self {
        Self {
            strategy: None,
            status: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl CallFilter {
    /// Clamp page and page size into their valid ranges
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// One page of a user's call history, newest first
#[derive(Debug, Clone, Serialize)]
pub struct CallPage {
    pub calls: Vec<Call>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl CallPage {
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size))
    }
}

/// Repository interface for the Call aggregate
#[async_trait]
pub trait CallRepository: Send + Sync {
    /// Insert a new call. Must be durable when this returns.
    async fn create_call(&self, call: &Call) -> Result<Call, DomainError>;

    /// Find a call by ID
    async fn find_call_by_id(&self, id: Uuid) -> Result<Option<Call>, DomainError>;

    /// Find the call bound to a provider call id
    async fn find_call_by_provider_id(
        &self,
        provider_call_id: &str,
    ) -> Result<Option<Call>, DomainError>;

    /// Most recently created call for `number` that has no provider call id yet
    async fn find_latest_unbound_call_by_number(
        &self,
        number: &CanonicalNumber,
    ) -> Result<Option<Call>, DomainError>;

    /// Set `status` only if the stored status ranks strictly below it.
    ///
    /// Returns whether the update was applied. Bumps `updated_at` when it is.
    async fn update_call_status(
        &self,
        call_id: Uuid,
        status: CallStatus,
    ) -> Result<bool, DomainError>;

    /// Bind the provider call id if none is set yet.
    ///
    /// Returns `false` (and changes nothing) when one is already bound.
    async fn set_provider_call_id(
        &self,
        call_id: Uuid,
        provider_call_id: &str,
    ) -> Result<bool, DomainError>;

    /// Append to the audit log
    async fn append_event(&self, event: &CallEvent) -> Result<(), DomainError>;

    /// Insert an AMD result; returns `false` when an identical result
    /// (same fingerprint) already exists for the call
    async fn insert_amd_result(&self, result: &AmdResult) -> Result<bool, DomainError>;

    /// Paginated history scoped to one owner
    async fn list_calls(&self, owner_id: &UserId, filter: &CallFilter)
        -> Result<CallPage, DomainError>;

    /// Audit log for a call, oldest first
    async fn list_events(&self, call_id: Uuid) -> Result<Vec<CallEvent>, DomainError>;

    /// AMD results for a call, oldest first
    async fn list_amd_results(&self, call_id: Uuid) -> Result<Vec<AmdResult>, DomainError>;
}
