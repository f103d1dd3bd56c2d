//! Cover art on synced devices.

pub mod art_lock;
pub mod art_sync;
pub mod inspect;

pub use art_lock::ArtLock;
pub use art_sync::{DeviceArtSync, FOLDER_ART_NAME, write_device_art};
pub use inspect::{inspect_bytes, inspect_file, is_progressive};
