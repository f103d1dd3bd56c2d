//! Application layer with services used by front ends.

/// Service implementations.
pub mod services;

pub use services::{CoverEvent, CoverService};
