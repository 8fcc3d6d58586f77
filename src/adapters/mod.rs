//! Implementations of the domain ports.

pub mod http;
pub mod mock;
