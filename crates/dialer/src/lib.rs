//! Dialer Domain Library
//!
//! Core domain types and interfaces for placing outbound calls with
//! answering machine detection (AMD) and reconciling the provider's
//! asynchronous callbacks into one authoritative call status.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Core domain models (Call, CallEvent, AmdResult, InboundEvent)
//!   - `value_objects/`: Immutable value types (CallStatus, AmdStrategy, CanonicalNumber)
//!   - `services/`: Pure domain services (number normalizer, status machine)
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `repositories/`: Data access interfaces
//!   - `services/`: External service interfaces (telephony, identity)
//!
//! # Usage
//!
//! ```rust,ignore
//! use dialer::domain::{normalize, StatusMachine, CallStatus};
//! use dialer::ports::{CallRepository, TelephonyProvider};
//! ```

pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    normalize, to_provider_format, AmdDecision, AmdResult, AmdStrategy, Call, CallEvent,
    CallEventType, CallStatus, CanonicalNumber, DecisionEvent, DomainError, InboundEvent,
    StatusEvent, StatusMachine, Transition, UnknownEvent, UserId,
};
pub use ports::{
    CallFilter, CallPage, CallRepository, MachineDetection, OriginationRequest,
    TelephonyProvider, UserResolver,
};
