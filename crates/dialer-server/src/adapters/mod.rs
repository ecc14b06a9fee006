//! Infrastructure Adapters
//!
//! Implementations of domain ports for external systems.

pub mod identity;
#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod signature;
pub mod twilio;

// Re-exports
pub use identity::StaticTokenResolver;
pub use postgres::PgCallRepository;
pub use signature::WebhookSignature;
pub use twilio::{TwilioClient, UnconfiguredTelephony};
