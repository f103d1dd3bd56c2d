//! Domain entity definitions.

mod channel;
mod cover;
mod device_art;

pub use channel::{BasicAuth, ChannelInfo, SyncedEpisode};
pub use cover::{CoverId, CoverRequest, ResolvedCover};
pub use device_art::{
    ArtInspection, DeviceArtFormat, DeviceArtTarget, LOCK_SUFFIX, SyncDecision, SyncOutcome,
};
