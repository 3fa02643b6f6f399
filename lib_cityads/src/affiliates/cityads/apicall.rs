//! # CityAds API Call
//!
//! Executes one request against the CityAds webmaster API and validates the
//! `{error, status, data}` envelope every response is wrapped in.
//!
//! ## Success condition
//! `error` is absent or falsy, `status` is exactly the number 200, and `data`
//! is present and truthy. Only then is `data` handed back to the caller.
//!
//! ## Failure handling
//! Transport problems (network, non-JSON body, non-2xx HTTP) are logged and
//! returned before the envelope is looked at. Envelope failures are logged as
//! warnings. Nothing is retried.

use std::time::Duration;

use serde_json::Value;
use tracing::{error, warn};

use super::error::{CityadsError, Result};
use super::normalize::is_truthy;
use crate::retrieve::ky_http::{ApiClient, QueryAuth};

/// Production base URL of the webmaster JSON API.
pub const CITYADS_API_URL: &str = "https://cityads.com/api/rest/webmaster/json/";

/// Query parameter carrying the webmaster token.
pub const AUTH_PARAM: &str = "remote_auth";

/// Low-level CityAds request executor.
#[derive(Debug, Clone)]
pub struct ApiCall {
    client: ApiClient,
}

impl ApiCall {
    /// Builds an executor for `base_url` that authenticates with `token`.
    pub fn new(base_url: &str, token: &str, timeout: Option<Duration>) -> Result<Self> {
        let auth = QueryAuth::new(AUTH_PARAM, token);
        Ok(Self {
            client: ApiClient::new(base_url, Some(auth), timeout)?,
        })
    }

    /// GETs `path` with `params` and returns the envelope's `data`.
    pub async fn fetch_cityads(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let response = match self.client.get::<Value>(path, params).await {
            Ok(response) => response,
            Err(e) => {
                error!(path, error = %e, "CityAds transport failure");
                return Err(CityadsError::Transport(e));
            }
        };

        if !response.success {
            error!(path, status = response.status, "CityAds HTTP request failed");
            return Err(CityadsError::HttpStatus {
                status: response.status,
                body: response.error_body,
            });
        }

        validate_envelope(response.data.unwrap_or(Value::Null)).inspect_err(|e| {
            warn!(path, error = %e, "CityAds envelope rejected");
        })
    }
}

/// Checks the `{error, status, data}` envelope and extracts `data`.
pub fn validate_envelope(mut body: Value) -> Result<Value> {
    let error = body.get("error").filter(|e| is_truthy(e)).map(describe_error);
    let status = body.get("status").and_then(Value::as_i64);

    if error.is_some() || status != Some(200) {
        return Err(CityadsError::Envelope { status, error });
    }

    match body.get_mut("data").map(Value::take) {
        Some(data) if is_truthy(&data) => Ok(data),
        _ => Err(CityadsError::MissingData),
    }
}

fn describe_error(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    }
}
