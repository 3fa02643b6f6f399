use thiserror::Error;

/// Every way a CityAds call can fail to produce a usable result.
///
/// Operations return `Err` instead of panicking; transport failures are
/// reported before the response envelope is ever inspected.
#[derive(Debug, Error)]
pub enum CityadsError {
    /// Network failure, invalid URL or an undecodable (non-JSON) body.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),

    /// The server answered with a non-2xx HTTP status.
    #[error("HTTP status {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// The envelope carried an `error` or a `status` other than 200.
    #[error("CityAds envelope rejected (status {status:?}): {}", .error.as_deref().unwrap_or("no error message"))]
    Envelope {
        status: Option<i64>,
        error: Option<String>,
    },

    /// Status 200 without error, but no `data` in the envelope.
    #[error("CityAds envelope has no data")]
    MissingData,

    /// `data` is present but not shaped as the operation expects.
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
}

pub type Result<T> = std::result::Result<T, CityadsError>;
