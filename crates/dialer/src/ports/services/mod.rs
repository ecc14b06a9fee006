//! Service Ports
//!
//! Abstract interfaces for external services.

mod identity;
mod telephony;

pub use identity::*;
pub use telephony::*;
