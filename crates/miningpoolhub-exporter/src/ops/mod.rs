//! HTTP endpoints.
//!
//! - `/`        : landing page with usage
//! - `/healthz` : liveness
//! - `/metrics` : one scrape, Prometheus text format (path is configurable)

use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::app_state::AppState;
use crate::collector::{ScrapeQuery, ScrapeRequest};
use crate::error::HttpError;
use crate::obs::Registry;

const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn landing(State(state): State<AppState>) -> Html<String> {
    let path = &state.cfg().web.telemetry_path;
    Html(format!(
        "<html>\n\
         <head><title>MiningPoolHub Exporter</title></head>\n\
         <body>\n\
         <h1>MiningPoolHub Exporter</h1>\n\
         <p>Usage: <a href=\"{path}?apikey=apikey&amp;fiat={fiat}\">{path}?apikey=apikey&amp;fiat={fiat}</a></p>\n\
         </body>\n\
         </html>\n",
        fiat = state.cfg().scrape.default_fiat,
    ))
}

pub async fn metrics(State(state): State<AppState>, Query(q): Query<ScrapeQuery>) -> Response {
    let req = match ScrapeRequest::from_query(q, &state.cfg().scrape.default_fiat) {
        Ok(req) => req,
        Err(e) => return HttpError(e).into_response(),
    };

    let started = Instant::now();
    let registry = match state.collector().collect(&req).await {
        Ok(reg) => {
            tracing::debug!(
                fiat = %req.fiat,
                samples = reg.sample_count(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "scrape ok"
            );
            reg
        }
        Err(e) => {
            tracing::warn!(
                fiat = %req.fiat,
                api = e.api().map(|a| a.as_str()).unwrap_or("-"),
                code = e.client_code().as_str(),
                error = %e,
                "scrape failed"
            );
            Registry::new()
        }
    };

    (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], registry.render()).into_response()
}
