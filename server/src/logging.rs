//! Per-request access logging.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request},
    http::header::USER_AGENT,
    middleware::Next,
    response::Response,
};
use tracing::info;
use uuid::Uuid;

/// Log each request once on arrival and once with its outcome.
///
/// The remote address is only known when the server was started with
/// `ConnectInfo`; in-process callers are logged as `-`.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_owned());
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_owned();

    info!(%request_id, %method, %path, %remote, %user_agent, "incoming request");

    let response = next.run(request).await;

    info!(
        %request_id,
        %method,
        %path,
        %remote,
        status = response.status().as_u16(),
        duration_ms = started.elapsed().as_secs_f64() * 1000.0,
        "request completed"
    );
    response
}
