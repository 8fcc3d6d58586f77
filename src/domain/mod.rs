//! Domain layer for the report pipeline
//!
//! Chart vocabulary, step outputs, run envelopes and the port traits that
//! remote collaborators implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult, ErrorInfo, ErrorKind};
