pub mod db;
pub mod logging;
pub mod progress;
pub mod repository;
pub mod runtime;
pub mod workout;

#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();
#[cfg(feature = "uniffi")]
pub mod uniffi_interface;
