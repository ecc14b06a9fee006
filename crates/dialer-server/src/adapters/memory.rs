//! In-memory test doubles
//!
//! `InMemoryCallRepository` has the same conditional-update semantics as the
//! Postgres adapter, including the unique provider call id; a single mutex
//! makes every operation atomic. It can also be scripted to miss provider id
//! lookups (a read that raced a concurrent bind) or to fail binds.
//! `ScriptedTelephony` answers every origination the same way and records
//! the requests it saw.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use dialer::{
    AmdResult, Call, CallEvent, CallFilter, CallPage, CallRepository, CallStatus, CanonicalNumber,
    DomainError, OriginationRequest, TelephonyProvider, UserId,
};

#[derive(Default)]
struct State {
    calls: HashMap<Uuid, Call>,
    events: Vec<CallEvent>,
    amd_results: Vec<AmdResult>,
}

#[derive(Default)]
pub struct InMemoryCallRepository {
    state: Mutex<State>,
    missed_provider_lookups: AtomicUsize,
    fail_binds: AtomicBool,
}

impl InMemoryCallRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `count` lookups by provider id find nothing
    pub fn miss_provider_lookups(&self, count: usize) {
        self.missed_provider_lookups.store(count, Ordering::SeqCst);
    }

    /// Every later provider id bind fails with a repository error
    pub fn fail_provider_binds(&self) {
        self.fail_binds.store(true, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::Repository("in-memory state poisoned".to_string()))
    }
}

#[async_trait]
impl CallRepository for InMemoryCallRepository {
    async fn create_call(&self, call: &Call) -> Result<Call, DomainError> {
        self.lock()?.calls.insert(call.id, call.clone());
        Ok(call.clone())
    }

    async fn find_call_by_id(&self, id: Uuid) -> Result<Option<Call>, DomainError> {
        Ok(self.lock()?.calls.get(&id).cloned())
    }

    async fn find_call_by_provider_id(
        &self,
        provider_call_id: &str,
    ) -> Result<Option<Call>, DomainError> {
        let missed = self
            .missed_provider_lookups
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if missed {
            return Ok(None);
        }

        Ok(self
            .lock()?
            .calls
            .values()
            .find(|c| c.provider_call_id.as_deref() == Some(provider_call_id))
            .cloned())
    }

    async fn find_latest_unbound_call_by_number(
        &self,
        number: &CanonicalNumber,
    ) -> Result<Option<Call>, DomainError> {
        Ok(self
            .lock()?
            .calls
            .values()
            .filter(|c| &c.target_number == number && !c.is_bound())
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn update_call_status(
        &self,
        call_id: Uuid,
        status: CallStatus,
    ) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        match state.calls.get_mut(&call_id) {
            Some(call) if call.status.rank() < status.rank() => {
                call.status = status;
                call.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_provider_call_id(
        &self,
        call_id: Uuid,
        provider_call_id: &str,
    ) -> Result<bool, DomainError> {
        if self.fail_binds.load(Ordering::SeqCst) {
            return Err(DomainError::Repository("provider id bind failed".to_string()));
        }

        let mut state = self.lock()?;
        let taken = state
            .calls
            .values()
            .any(|c| c.id != call_id && c.provider_call_id.as_deref() == Some(provider_call_id));
        if taken {
            return Err(DomainError::Repository(format!(
                "duplicate key: provider call id {} already bound",
                provider_call_id
            )));
        }

        match state.calls.get_mut(&call_id) {
            Some(call) if !call.is_bound() => {
                call.provider_call_id = Some(provider_call_id.to_string());
                call.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn append_event(&self, event: &CallEvent) -> Result<(), DomainError> {
        self.lock()?.events.push(event.clone());
        Ok(())
    }

    async fn insert_amd_result(&self, result: &AmdResult) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        let duplicate = state
            .amd_results
            .iter()
            .any(|r| r.call_id == result.call_id && r.fingerprint == result.fingerprint);
        if duplicate {
            return Ok(false);
        }
        state.amd_results.push(result.clone());
        Ok(true)
    }

    async fn list_calls(
        &self,
        owner_id: &UserId,
        filter: &CallFilter,
    ) -> Result<CallPage, DomainError> {
        let state = self.lock()?;
        let mut calls: Vec<Call> = state
            .calls
            .values()
            .filter(|c| c.is_owned_by(owner_id))
            .filter(|c| filter.strategy.map_or(true, |s| c.amd_strategy == s))
            .filter(|c| filter.status.map_or(true, |s| c.status == s))
            .cloned()
            .collect();
        calls.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = calls.len() as u64;
        let calls = calls
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.page_size as usize)
            .collect();

        Ok(CallPage {
            calls,
            total,
            page: filter.page,
            page_size: filter.page_size,
        })
    }

    async fn list_events(&self, call_id: Uuid) -> Result<Vec<CallEvent>, DomainError> {
        Ok(self
            .lock()?
            .events
            .iter()
            .filter(|e| e.call_id == call_id)
            .cloned()
            .collect())
    }

    async fn list_amd_results(&self, call_id: Uuid) -> Result<Vec<AmdResult>, DomainError> {
        Ok(self
            .lock()?
            .amd_results
            .iter()
            .filter(|r| r.call_id == call_id)
            .cloned()
            .collect())
    }
}

pub struct ScriptedTelephony {
    response: Result<String, String>,
    requests: Mutex<Vec<OriginationRequest>>,
}

impl ScriptedTelephony {
    pub fn succeeding(provider_call_id: &str) -> Self {
        Self {
            response: Ok(provider_call_id.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<OriginationRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TelephonyProvider for ScriptedTelephony {
    async fn originate(&self, request: &OriginationRequest) -> Result<String, DomainError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.response.clone().map_err(DomainError::ExternalService)
    }
}
