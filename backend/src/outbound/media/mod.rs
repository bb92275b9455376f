//! Media storage adapters.

mod cap_std_media_store;

pub use cap_std_media_store::CapStdMediaStore;
