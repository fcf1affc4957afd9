//! HTTP mapping for `ExporterError` (non-metrics responses).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use miningpoolhub_core::error::{ClientCode, ExporterError};

/// `ExporterError` rendered as a JSON HTTP response.
#[derive(Debug)]
pub struct HttpError(pub ExporterError);

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = match code {
            ClientCode::BadRequest => StatusCode::BAD_REQUEST,
            ClientCode::Upstream | ClientCode::Decode => StatusCode::BAD_GATEWAY,
            ClientCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ClientCode::Config | ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({
            "error": code.as_str(),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
