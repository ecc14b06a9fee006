//! Dialer API Routes
//!
//! - /calls - Call origination and history (bearer auth)
//! - /webhooks/status - Provider status callbacks
//! - /webhooks/decision - AMD decisions from the provider or analyzers
//! - /voice-answer - TwiML served when the callee answers

pub mod calls;
pub mod swagger;
pub mod voice;
pub mod webhooks;
