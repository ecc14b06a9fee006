//! Event Correlator (Use Case)
//!
//! Matches inbound provider callbacks and analyzer decisions to their call,
//! logs them and drives the status machine.
//!
//! Correlation order:
//! 1. provider call id, when present and bound to a call;
//! 2. otherwise the most recent call to the same destination number that has
//!    no provider call id yet. The event's id is bound to that call before
//!    anything is logged; if the bind loses a race, the call that won it is
//!    looked up by id instead;
//! 3. otherwise the event is uncorrelated and nothing is written.

use std::sync::Arc;

use dialer::{
    normalize, AmdDecision, AmdResult, AmdStrategy, Call, CallEvent, CallRepository, CallStatus,
    DomainError, InboundEvent, Transition,
};

use super::advance;

/// How an event found its call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correlation {
    ProviderId,
    NumberFallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    pub call_id: uuid::Uuid,
    pub correlation: Correlation,
    /// Every status submitted to the machine, in order; empty when the
    /// event carried nothing that maps to a status
    pub transitions: Vec<Transition>,
    pub amd_result_recorded: bool,
    /// The event's provider id was bound to the call by this ingestion
    pub provider_id_bound: bool,
}

impl IngestOutcome {
    pub fn status_changed(&self) -> bool {
        self.transitions.iter().any(Transition::is_applied)
    }
}

/// A correlated call, after any number-fallback bind
struct Matched {
    call: Call,
    correlation: Correlation,
    provider_id_bound: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IngestResult {
    Correlated(IngestOutcome),
    Uncorrelated,
}

/// Application service for webhook ingestion
pub struct EventCorrelator<R: CallRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: CallRepository + ?Sized> EventCorrelator<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Ingest one inbound event.
    ///
    /// Safe to call repeatedly with the same event: each delivery is logged,
    /// but status never regresses and identical AMD results are stored once.
    pub async fn ingest(&self, event: InboundEvent) -> Result<IngestResult, DomainError> {
        let Some(Matched {
            call,
            correlation,
            provider_id_bound,
        }) = self.correlate(&event).await?
        else {
            tracing::warn!(
                "Uncorrelated {} event (provider id: {:?}, number: {:?})",
                event.event_type(),
                event.provider_call_id(),
                event.destination_number()
            );
            return Ok(IngestResult::Uncorrelated);
        };

        let log = CallEvent::new(call.id, event.event_type(), event.raw().clone());
        if let Err(e) = self.repo.append_event(&log).await {
            tracing::warn!("Failed to log {} for call {}: {}", log.event_type, call.id, e);
        }

        let mut current = call.status;
        let mut transitions = Vec::new();
        let mut amd_result_recorded = false;

        match &event {
            InboundEvent::Status(status) => {
                // Detection ranks below the terminals, so it goes first when a
                // callback carries both
                if let Some(answered_by) = status
                    .answered_by
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                {
                    let result = AmdResult::new(
                        call.id,
                        Some(AmdStrategy::Twilio.to_string()),
                        AmdDecision::from_label(answered_by),
                        None,
                        None,
                    );
                    amd_result_recorded = self
                        .record_decision(&call, result, &mut current, &mut transitions)
                        .await?;
                }

                if let Some(label) = status.status_label.as_deref() {
                    match CallStatus::from_provider_label(label) {
                        Some(incoming) => {
                            self.submit(&call, incoming, &mut current, &mut transitions)
                                .await?;
                        }
                        None => {
                            tracing::info!("Ignoring unknown status label {:?} for call {}", label, call.id);
                        }
                    }
                }
            }
            InboundEvent::Decision(decision) => {
                let result = AmdResult::new(
                    call.id,
                    decision.strategy.clone(),
                    AmdDecision::from_label(&decision.decision),
                    decision.confidence,
                    decision.details.clone(),
                );
                amd_result_recorded = self
                    .record_decision(&call, result, &mut current, &mut transitions)
                    .await?;
            }
            InboundEvent::Unknown(_) => {}
        }

        Ok(IngestResult::Correlated(IngestOutcome {
            call_id: call.id,
            correlation,
            transitions,
            amd_result_recorded,
            provider_id_bound,
        }))
    }

    async fn correlate(&self, event: &InboundEvent) -> Result<Option<Matched>, DomainError> {
        let provider_call_id = event.provider_call_id();

        if let Some(provider_call_id) = provider_call_id {
            if let Some(call) = self.repo.find_call_by_provider_id(provider_call_id).await? {
                return Ok(Some(Matched {
                    call,
                    correlation: Correlation::ProviderId,
                    provider_id_bound: false,
                }));
            }
        }

        let Some(number) = event.destination_number() else {
            return Ok(None);
        };
        let Some(call) = self
            .repo
            .find_latest_unbound_call_by_number(&normalize(number))
            .await?
        else {
            return Ok(None);
        };

        let Some(provider_call_id) = provider_call_id else {
            return Ok(Some(Matched {
                call,
                correlation: Correlation::NumberFallback,
                provider_id_bound: false,
            }));
        };

        let bind_error = match self.repo.set_provider_call_id(call.id, provider_call_id).await {
            Ok(true) => {
                tracing::info!(
                    "Bound provider id {} to call {} by number",
                    provider_call_id,
                    call.id
                );
                return Ok(Some(Matched {
                    call,
                    correlation: Correlation::NumberFallback,
                    provider_id_bound: true,
                }));
            }
            Ok(false) => None,
            Err(e) => Some(e),
        };

        // A concurrent delivery bound the id first; follow it to its call
        if let Some(bound) = self.repo.find_call_by_provider_id(provider_call_id).await? {
            tracing::debug!(
                "Provider id {} was bound to call {} concurrently",
                provider_call_id,
                bound.id
            );
            return Ok(Some(Matched {
                call: bound,
                correlation: Correlation::ProviderId,
                provider_id_bound: false,
            }));
        }

        match bind_error {
            Some(e) => Err(e),
            None => {
                // The candidate was claimed by a different provider call
                tracing::warn!(
                    "Call {} was bound to another provider id before {} could bind",
                    call.id,
                    provider_call_id
                );
                Ok(None)
            }
        }
    }

    /// Store the result (deduplicated) and advance to its status.
    ///
    /// The status is submitted even for a duplicate so a re-delivery can
    /// finish a previous attempt that failed halfway.
    async fn record_decision(
        &self,
        call: &Call,
        result: AmdResult,
        current: &mut CallStatus,
        transitions: &mut Vec<Transition>,
    ) -> Result<bool, DomainError> {
        let recorded = self.repo.insert_amd_result(&result).await?;
        if recorded {
            tracing::info!(
                "AMD result for call {}: {} ({})",
                call.id,
                result.decision,
                result.strategy
            );
        } else {
            tracing::debug!("Duplicate AMD result for call {}", call.id);
        }

        if let Some(incoming) = result.decision.status() {
            self.submit(call, incoming, current, transitions).await?;
        }

        Ok(recorded)
    }

    async fn submit(
        &self,
        call: &Call,
        incoming: CallStatus,
        current: &mut CallStatus,
        transitions: &mut Vec<Transition>,
    ) -> Result<(), DomainError> {
        let transition = advance(self.repo.as_ref(), call.id, *current, incoming).await?;
        match transition {
            Transition::Apply(status) => *current = status,
            Transition::Stale { current: seen, .. } => {
                tracing::debug!(
                    "Stale status {} for call {} (currently {})",
                    incoming,
                    call.id,
                    seen
                );
            }
        }
        transitions.push(transition);
        Ok(())
    }
}
