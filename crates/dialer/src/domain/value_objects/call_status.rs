//! CallStatus - Lifecycle status of an outbound call

use serde::{Deserialize, Serialize};

/// Lifecycle status of a call.
///
/// `PENDING → RINGING → IN_PROGRESS → {HUMAN,VOICEMAIL,MACHINE}_DETECTED → COMPLETED`,
/// with `FAILED` reachable from any non-terminal status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallStatus {
    #[default]
    Pending,
    Ringing,
    InProgress,
    HumanDetected,
    VoicemailDetected,
    MachineDetected,
    Completed,
    Failed,
}

impl CallStatus {
    pub const ALL: [CallStatus; 8] = [
        CallStatus::Pending,
        CallStatus::Ringing,
        CallStatus::InProgress,
        CallStatus::HumanDetected,
        CallStatus::VoicemailDetected,
        CallStatus::MachineDetected,
        CallStatus::Completed,
        CallStatus::Failed,
    ];

    /// Rank used for staleness detection.
    ///
    /// Detection outcomes share a rank; both terminal statuses hold the
    /// maximum rank so nothing outranks them.
    pub fn rank(self) -> i16 {
        match self {
            CallStatus::Pending => 0,
            CallStatus::Ringing => 1,
            CallStatus::InProgress => 2,
            CallStatus::HumanDetected
            | CallStatus::VoicemailDetected
            | CallStatus::MachineDetected => 3,
            CallStatus::Completed | CallStatus::Failed => 4,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CallStatus::Completed | CallStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CallStatus::Pending => "PENDING",
            CallStatus::Ringing => "RINGING",
            CallStatus::InProgress => "IN_PROGRESS",
            CallStatus::HumanDetected => "HUMAN_DETECTED",
            CallStatus::VoicemailDetected => "VOICEMAIL_DETECTED",
            CallStatus::MachineDetected => "MACHINE_DETECTED",
            CallStatus::Completed => "COMPLETED",
            CallStatus::Failed => "FAILED",
        }
    }

    /// Map a provider status label (Twilio `CallStatus`) to a call status.
    ///
    /// Our own upper-case names are accepted too. Unknown labels map to `None`.
    pub fn from_provider_label(label: &str) -> Option<CallStatus> {
        let label = label.trim();
        if let Ok(status) = label.parse::<CallStatus>() {
            return Some(status);
        }
        match label.to_lowercase().replace('_', "-").as_str() {
            "queued" | "initiated" => Some(CallStatus::Pending),
            "ringing" => Some(CallStatus::Ringing),
            "in-progress" | "answered" => Some(CallStatus::InProgress),
            "completed" => Some(CallStatus::Completed),
            "busy" | "failed" | "no-answer" | "canceled" | "cancelled" => Some(CallStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CallStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CallStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown call status: {}", s))
    }
}
