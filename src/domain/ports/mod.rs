//! Port definitions.

mod cover_fetcher_port;
mod device_folder_port;

pub use cover_fetcher_port::{CoverFetcher, FetchedCover};
pub use device_folder_port::{DeviceFolderResolver, FixedFolder};

#[cfg(test)]
pub mod mocks {
    pub use super::cover_fetcher_port::mock::MockCoverFetcher;
    pub use super::device_folder_port::MockDeviceFolderResolver;
}
