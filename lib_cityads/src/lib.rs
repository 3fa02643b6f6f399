//! # lib_cityads
//!
//! A typed asynchronous client for the CityAds webmaster REST API, plus the
//! configuration and logging plumbing the `cityads` binary is built on.
//!
//! Each top-level module sits behind a cargo feature of the same name so that
//! downstream crates only compile what they use:
//!
//! - **`retrieve`**: generic HTTP GET client with ordered query encoding.
//! - **`affiliates`** (default): the CityAds client and its normalized models.
//! - **`configs`**: layered configuration (JSON files, environment, `.env`).
//! - **`loggers`**: `tracing` subscriber setup for binaries.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

/// Generic HTTP client used by every provider client.
#[cfg(feature = "retrieve")]
pub mod retrieve;

/// Clients for affiliate-network APIs.
#[cfg(feature = "affiliates")]
pub mod affiliates;

/// Runtime configuration loading.
#[cfg(feature = "configs")]
pub mod configs;

/// Logging setup for binaries.
#[cfg(feature = "loggers")]
pub mod loggers;

#[cfg(feature = "affiliates")]
pub use affiliates::cityads::{CityadsApi, CityadsApiBuilder, CityadsError};
