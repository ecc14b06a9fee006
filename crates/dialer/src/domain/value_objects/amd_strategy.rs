//! AmdStrategy - Answering machine detection strategy chosen by the caller

use serde::{Deserialize, Serialize};

/// AMD strategy identifier.
///
/// `gemini`, `huggingface` and `jambonz` are second-party analyzers that
/// report through the decision webhook. `twilio` asks the provider itself to
/// run machine detection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AmdStrategy {
    Gemini,
    Huggingface,
    Jambonz,
    Twilio,
}

impl AmdStrategy {
    pub fn is_provider_native(self) -> bool {
        matches!(self, AmdStrategy::Twilio)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AmdStrategy::Gemini => "gemini",
            AmdStrategy::Huggingface => "huggingface",
            AmdStrategy::Jambonz => "jambonz",
            AmdStrategy::Twilio => "twilio",
        }
    }
}

impl std::fmt::Display for AmdStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AmdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(AmdStrategy::Gemini),
            "huggingface" => Ok(AmdStrategy::Huggingface),
            "jambonz" => Ok(AmdStrategy::Jambonz),
            "twilio" => Ok(AmdStrategy::Twilio),
            _ => Err(format!("Unknown AMD strategy: {}", s)),
        }
    }
}
