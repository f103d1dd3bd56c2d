//! Application services.

mod cover_service;

pub use cover_service::{CoverEvent, CoverService};
