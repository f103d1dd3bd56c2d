//! Domain error types.

mod cover_error;

pub use cover_error::{CoverError, CoverResult};
