use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum AlertError {
    /// An error occurred during an HTTP request.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The server returned an unexpected or unsuccessful HTTP status code.
    #[error("Unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// A JSON document (API response or persisted file) could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A feed document could not be decoded.
    #[error("XML error: {0}")]
    Xml(String),

    /// Reading or writing a persisted file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The data received from the API was in an unexpected format or was missing a required field.
    #[error("Data format unexpected or missing field: {0}")]
    Data(String),

    /// Neither intraday granularity nor the daily fallback produced a price sample.
    #[error("no price data available for {symbol}")]
    NoData {
        /// The symbol that could not be resolved.
        symbol: String,
    },

    /// The session open is zero, so a percentage move is undefined.
    #[error("open price is 0 for {symbol}; cannot compute delta")]
    ZeroOpen {
        /// The symbol with the unusable open.
        symbol: String,
    },

    /// The configuration is missing a required value or carries an invalid one.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<quick_xml::DeError> for AlertError {
    fn from(e: quick_xml::DeError) -> Self {
        AlertError::Xml(e.to_string())
    }
}
