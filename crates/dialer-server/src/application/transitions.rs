//! Status transitions against the repository

use uuid::Uuid;

use dialer::{CallRepository, CallStatus, DomainError, StatusMachine, Transition};

/// Move a call towards `incoming`.
///
/// `current` is the caller's last known status and only short-circuits
/// obviously stale input; the repository's conditional update has the final
/// say, so a concurrent writer that got there first turns an `Apply` into
/// `Stale`.
pub async fn advance<R>(
    repo: &R,
    call_id: Uuid,
    current: CallStatus,
    incoming: CallStatus,
) -> Result<Transition, DomainError>
where
    R: CallRepository + ?Sized,
{
    match StatusMachine::decide(current, incoming) {
        Transition::Apply(status) => {
            if repo.update_call_status(call_id, status).await? {
                tracing::debug!("Call {} -> {}", call_id, status);
                Ok(Transition::Apply(status))
            } else {
                tracing::debug!("Call {} lost race for {}", call_id, status);
                Ok(Transition::Stale { current, incoming })
            }
        }
        stale => Ok(stale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryCallRepository;
    use dialer::{normalize, AmdStrategy, Call, UserId};

    #[tokio::test]
    async fn test_advance_applies_and_rejects() {
        let repo = InMemoryCallRepository::new();
        let call = Call::new(UserId::new("alice"), normalize("8007742678"), AmdStrategy::Gemini);
        repo.create_call(&call).await.unwrap();

        let t = advance(&repo, call.id, CallStatus::Pending, CallStatus::Ringing)
            .await
            .unwrap();
        assert_eq!(t, Transition::Apply(CallStatus::Ringing));

        // Caller believes the call is still pending; the store knows better
        let t = advance(&repo, call.id, CallStatus::Pending, CallStatus::Ringing)
            .await
            .unwrap();
        assert!(!t.is_applied());

        let t = advance(&repo, call.id, CallStatus::Ringing, CallStatus::Completed)
            .await
            .unwrap();
        assert!(t.is_applied());

        let t = advance(&repo, call.id, CallStatus::Completed, CallStatus::HumanDetected)
            .await
            .unwrap();
        assert!(!t.is_applied());

        let stored = repo.find_call_by_id(call.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CallStatus::Completed);
    }
}
