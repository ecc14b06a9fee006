//! Application Layer (Use Cases)
//!
//! Orchestrates domain operations and coordinates between
//! repositories and external services.

mod correlator;
mod originator;
mod transitions;

pub use correlator::{EventCorrelator, IngestResult};
pub use originator::{CallOriginator, OriginationSettings};
pub use transitions::advance;
