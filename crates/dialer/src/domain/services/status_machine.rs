//! Call Status State Machine
//!
//! Derives a monotonic status from an unordered, duplicate-prone stream of
//! provider callbacks. There are no sequence numbers to rely on, so the only
//! input is the rank of each status.
//!
//! Rules:
//! - an incoming status is applied when its rank is strictly greater than
//!   the current one;
//! - terminal statuses are sticky: nothing is applied once one is reached;
//! - detection outcomes share a rank, so the first detector to report wins.
//!
//! Terminal statuses hold the maximum rank, so "terminal and current is not
//! terminal" is covered by the strict rank comparison. This is what lets the
//! repository enforce the same rule as a single conditional update.

use crate::domain::value_objects::CallStatus;

/// Outcome of submitting a status to the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The call moves to this status
    Apply(CallStatus),
    /// Out-of-order or duplicate; the call row stays untouched
    Stale {
        current: CallStatus,
        incoming: CallStatus,
    },
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Apply(_))
    }
}

pub struct StatusMachine;

impl StatusMachine {
    /// Decide whether `incoming` may replace `current`
    pub fn decide(current: CallStatus, incoming: CallStatus) -> Transition {
        if current.is_terminal() {
            return Transition::Stale { current, incoming };
        }

        if incoming.rank() > current.rank() || (incoming.is_terminal() && !current.is_terminal()) {
            Transition::Apply(incoming)
        } else {
            Transition::Stale { current, incoming }
        }
    }

    /// Replay a sequence of statuses from `initial`
    pub fn replay<I>(initial: CallStatus, incoming: I) -> CallStatus
    where
        I: IntoIterator<Item = CallStatus>,
    {
        incoming
            .into_iter()
            .fold(initial, |current, next| match Self::decide(current, next) {
                Transition::Apply(status) => status,
                Transition::Stale { .. } => current,
            })
    }
}
