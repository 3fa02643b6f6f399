//! # Shared Fixtures for CityAds Integration Tests
//!
//! Every test in `tests/` starts a `wiremock` server, mounts the responses
//! it needs and points a `CityadsApi` at it. These helpers keep the envelope
//! and base-URL details in one place.

#![forbid(unsafe_code)]

use serde_json::{json, Value};
use wiremock::MockServer;

use lib_cityads::CityadsApi;

/// Token every test client authenticates with.
pub const TOKEN: &str = "test-token";

/// Path prefix the production API lives under.
pub const API_PREFIX: &str = "/api/rest/webmaster/json";

/// A successful `{status, error, data}` envelope around `data`.
pub fn envelope(data: Value) -> Value {
    json!({ "status": 200, "error": null, "data": data })
}

/// One page of a list endpoint.
pub fn page(items: Vec<Value>, total: u64) -> Value {
    envelope(json!({ "items": items, "total": total }))
}

/// Full mock path for an endpoint, e.g. `api_path("profile")`.
pub fn api_path(endpoint: &str) -> String {
    format!("{API_PREFIX}/{endpoint}")
}

/// A client talking to `server` with the given page size.
pub fn client(server: &MockServer, page_size: u32) -> CityadsApi {
    CityadsApi::builder(TOKEN)
        .base_url(format!("{}{API_PREFIX}/", server.uri()))
        .page_size(page_size)
        .build()
        .expect("client builds against mock server")
}

/// `n` numbered items, `{"n": start..start+n}`.
pub fn numbered(start: u64, n: u64) -> Vec<Value> {
    (start..start + n).map(|i| json!({ "n": i })).collect()
}
