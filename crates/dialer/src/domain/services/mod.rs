//! Domain Services
//!
//! Stateless business rules shared by the application layer.

mod normalizer;
mod status_machine;

pub use normalizer::*;
pub use status_machine::*;
