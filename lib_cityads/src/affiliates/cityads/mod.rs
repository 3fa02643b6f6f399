//! # CityAds Webmaster API Integration
//!
//! Typed access to `https://cityads.com/api/rest/webmaster/json/`.
//!
//! ## Contained Modules:
//!
//! - **`apicall`**: low-level request execution and validation of the
//!   `{error, status, data}` envelope every CityAds response is wrapped in.
//! - **`client`**: `CityadsApi`, the public operations and the pagination loop.
//! - **`dates`**: conversion of date-like inputs to the provider's
//!   `YYYY-MM-DD` format and parsing of its `DD.MM.YYYY HH:MM:SS` timestamps.
//! - **`error`**: the `CityadsError` failure type.
//! - **`models`**: normalized output entities.
//! - **`normalize`**: pure functions reshaping raw JSON items into models.

/// Request execution and envelope validation.
pub mod apicall;
/// The public CityAds client.
pub mod client;
/// Date formatting and timestamp parsing in the provider's formats.
pub mod dates;
/// Failure type shared by every CityAds operation.
pub mod error;
/// Normalized output entities.
pub mod models;
/// Raw-item normalization.
pub mod normalize;

pub use client::{CityadsApi, CityadsApiBuilder, LeadQuery};
pub use dates::{to_provider_date_format, EpochMillis, ProviderDate};
pub use error::CityadsError;
pub use models::*;
