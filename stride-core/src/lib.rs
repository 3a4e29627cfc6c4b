pub mod analytics;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod integrity;
pub mod tracker;

#[cfg(feature = "uniffi")]
pub mod runtime;

#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();
#[cfg(feature = "uniffi")]
pub mod uniffi_interface;

pub use config::StoreConfig;
pub use error::TrackerError;
pub use tracker::Tracker;
