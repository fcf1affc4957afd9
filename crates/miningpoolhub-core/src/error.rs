//! Shared error type across exporter crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid scrape parameters.
    BadRequest,
    /// Upstream API failed or answered with an error.
    Upstream,
    /// Upstream API did not answer in time.
    Timeout,
    /// Upstream API answered with a body we could not decode.
    Decode,
    /// Invalid configuration.
    Config,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::Upstream => "UPSTREAM",
            ClientCode::Timeout => "TIMEOUT",
            ClientCode::Decode => "DECODE",
            ClientCode::Config => "CONFIG",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Which upstream API an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Api {
    /// Pool balance API.
    Pool,
    /// Price conversion API.
    Price,
}

impl Api {
    /// Label value used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Api::Pool => "pool",
            Api::Price => "price",
        }
    }
}

impl std::fmt::Display for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ExporterError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("{api} api: {msg}")]
    Upstream { api: Api, msg: String },
    #[error("{api} api: request timed out")]
    Timeout { api: Api },
    #[error("{api} api: decode failed: {msg}")]
    Decode { api: Api, msg: String },
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ExporterError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            ExporterError::BadRequest(_) => ClientCode::BadRequest,
            ExporterError::Upstream { .. } => ClientCode::Upstream,
            ExporterError::Timeout { .. } => ClientCode::Timeout,
            ExporterError::Decode { .. } => ClientCode::Decode,
            ExporterError::Config(_) => ClientCode::Config,
            ExporterError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Upstream API this error is attributed to, if any.
    pub fn api(&self) -> Option<Api> {
        match self {
            ExporterError::Upstream { api, .. }
            | ExporterError::Timeout { api }
            | ExporterError::Decode { api, .. } => Some(*api),
            _ => None,
        }
    }
}
