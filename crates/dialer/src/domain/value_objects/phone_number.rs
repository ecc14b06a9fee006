//! CanonicalNumber - Digits-only destination number used for storage and matching

use serde::{Deserialize, Serialize};

/// Canonical storage form of a phone number: digits only, no leading `+`.
///
/// Built by [`crate::domain::normalize`]; no validity check is implied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalNumber(String);

impl CanonicalNumber {
    /// Wrap digits that are already canonical (e.g. read back from storage)
    pub fn from_stored(digits: impl Into<String>) -> Self {
        Self(digits.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for CanonicalNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
