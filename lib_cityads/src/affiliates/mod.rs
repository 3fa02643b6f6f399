//! # Affiliate Network APIs Module
//!
//! This module groups client implementations for affiliate-marketing
//! networks. Each provider lives in its own submodule and exposes typed,
//! normalized results so callers never touch the provider's raw wire format.
//!
//! ## Contained Modules:
//!
//! - **`cityads`**: Client and data models for the CityAds webmaster API
//!   (profile, balance, traffic channels, offers, leads, statistics and
//!   offer links).

/// Client for the CityAds webmaster REST API.
pub mod cityads;
