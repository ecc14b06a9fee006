//! AmdDecision - Classification reported by an AMD strategy

use serde::{Deserialize, Serialize};

use super::CallStatus;

/// Who (or what) answered the call
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AmdDecision {
    Human,
    Machine,
    Voicemail,
    Unknown,
}

impl AmdDecision {
    /// Parse an analyzer decision or a provider `AnsweredBy` value.
    ///
    /// Unrecognized labels become `Unknown` rather than an error: the raw
    /// label is kept in the event log either way.
    pub fn from_label(label: &str) -> AmdDecision {
        match label.trim().to_lowercase().as_str() {
            "human" => AmdDecision::Human,
            "voicemail" | "machine_end_beep" | "machine_end_silence" | "machine_end_other" => {
                AmdDecision::Voicemail
            }
            "machine" | "machine_start" | "fax" => AmdDecision::Machine,
            _ => AmdDecision::Unknown,
        }
    }

    /// Status label the decision advances the call to, if any
    pub fn status(self) -> Option<CallStatus> {
        match self {
            AmdDecision::Human => Some(CallStatus::HumanDetected),
            AmdDecision::Voicemail => Some(CallStatus::VoicemailDetected),
            AmdDecision::Machine => Some(CallStatus::MachineDetected),
            AmdDecision::Unknown => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AmdDecision::Human => "human",
            AmdDecision::Machine => "machine",
            AmdDecision::Voicemail => "voicemail",
            AmdDecision::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for AmdDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_answered_by_values() {
        assert_eq!(AmdDecision::from_label("human"), AmdDecision::Human);
        assert_eq!(AmdDecision::from_label("machine_start"), AmdDecision::Machine);
        assert_eq!(AmdDecision::from_label("fax"), AmdDecision::Machine);
        assert_eq!(AmdDecision::from_label("machine_end_beep"), AmdDecision::Voicemail);
        assert_eq!(AmdDecision::from_label("Voicemail"), AmdDecision::Voicemail);
        assert_eq!(AmdDecision::from_label("unknown"), AmdDecision::Unknown);
        assert_eq!(AmdDecision::from_label("maybe"), AmdDecision::Unknown);
    }

    #[test]
    fn test_unknown_has_no_status() {
        assert_eq!(AmdDecision::Unknown.status(), None);
        assert_eq!(AmdDecision::Machine.status(), Some(CallStatus::MachineDetected));
    }
}
