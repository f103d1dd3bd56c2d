//! Domain layer with core entities, errors and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{ChannelInfo, CoverRequest, SyncedEpisode};
pub use errors::{CoverError, CoverResult};
pub use ports::{CoverFetcher, DeviceFolderResolver};
