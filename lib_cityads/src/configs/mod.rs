//! # Configuration Modules
//!
//! Runtime configuration for binaries built on this crate.

/// Layered file/environment configuration for the CityAds client.
pub mod config_sys;

pub use config_sys::{CityadsConfig, ConfigError};
