//! # Data Retrieval Module
//!
//! This module provides a centralized location for generic data retrieval
//! clients, primarily focused on HTTP-based interactions.
//!
//! ## Purpose:
//! Provider clients (such as the CityAds client in `affiliates`) should only
//! deal with endpoint paths, parameters and response shapes. URL joining,
//! query encoding, authentication parameters and JSON decoding live here so
//! they are written once.
//!
//! ## Contained Modules:
//!
//! - **`ky_http`**: A generic HTTP `ApiClient` built on `reqwest`. It performs
//!   GET requests against a base URL with an ordered query parameter list and
//!   an optional authentication parameter that is always appended last.

/// Generic HTTP GET client with ordered query encoding and query-string authentication.
pub mod ky_http;
