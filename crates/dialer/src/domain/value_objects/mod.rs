//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod amd_decision;
mod amd_strategy;
mod call_status;
mod phone_number;
mod user_id;

pub use amd_decision::*;
pub use amd_strategy::*;
pub use call_status::*;
pub use phone_number::*;
pub use user_id::*;
