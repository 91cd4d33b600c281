//! Forwards raw `/api/` requests to the sample service while developing, so a browser pointed at
//! this server can reach the service without cross-origin trouble.
use crate::{error::Error, state::AppState};
use anyhow::anyhow;
use axum::{
    Router,
    body::{Body, Bytes},
    extract::{Path, State},
    http::{HeaderMap, Method, Uri, header},
    response::Response,
    routing::any,
};
use tracing::{debug, warn};

/// Request and response headers that are passed through unchanged
const FORWARDED_HEADERS: [header::HeaderName; 2] = [header::CONTENT_TYPE, header::ACCEPT];

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/api/{*path}", any(forward))
}

/// The address on the sample service that a proxied request for `path` should go to
pub(crate) fn target_url(base_url: &str, path: &str, query: Option<&str>) -> String {
    let mut url = format!(
        "{}/api/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

async fn forward(
    State(state): State<AppState>,
    Path(path): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, Error> {
    let url = target_url(&state.api_base_url, &path, uri.query());
    debug!(%method, %url, "Proxying request");
    let mut request = state.http.request(method, &url).body(body);
    for name in FORWARDED_HEADERS.iter() {
        if let Some(value) = headers.get(name) {
            request = request.header(name, value);
        }
    }
    let upstream = request.send().await.map_err(|e| {
        warn!(%url, "Proxied request failed: {e}");
        Error::Proxy(e)
    })?;

    let mut response = Response::builder().status(upstream.status());
    for name in FORWARDED_HEADERS.iter() {
        if let Some(value) = upstream.headers().get(name) {
            response = response.header(name, value);
        }
    }
    let bytes = upstream.bytes().await.map_err(Error::Proxy)?;
    response
        .body(Body::from(bytes))
        .map_err(|e| anyhow!(e).into())
}
