//! API Data Models
//!
//! - Call: origination, history and detail
//! - Webhook: provider status callbacks and analyzer decisions
//! - Error: JSON error body shared by all routes

mod call;
mod error;
mod webhook;

pub use call::*;
pub use error::*;
pub use webhook::*;
