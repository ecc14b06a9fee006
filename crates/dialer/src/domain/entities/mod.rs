//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - Call: One outbound call attempt (aggregate root)
//! - CallEvent: Append-only audit log entry
//! - AmdResult: Decision recorded by an AMD strategy
//! - InboundEvent: Decoded provider / analyzer webhook

mod amd_result;
mod call;
mod call_event;
mod inbound_event;

pub use amd_result::*;
pub use call::*;
pub use call_event::*;
pub use inbound_event::*;
