use crate::{app, state::SharedState};
use axum::{
    Router,
    body::{Body, Bytes, HttpBody},
    http::{Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use libsample::{
    sample::{Sample, SampleType},
    test_helpers::{FakeApi, sample},
};
use std::sync::Arc;
use tower::Service;

mod sample;

/// usage:
/// let (_parts, body) = response.into_parts();
/// print_response_body(body).await;
///
/// note that this consumes body, so it can't be used again
#[allow(dead_code)]
async fn print_response_body<B>(body: B)
where
    B: HttpBody<Data = Bytes>,
    B::Error: std::fmt::Display,
{
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            tracing::warn!("failed to collect body: {err}");
            return;
        }
    };

    if let Ok(body) = std::str::from_utf8(&bytes) {
        tracing::debug!("body = {body:?}");
    } else {
        tracing::warn!("Couldn't convert body to utf8");
    }
}

fn test_app_with_base_url(api: Arc<FakeApi>, api_base_url: &str) -> Router {
    let state = Arc::new(SharedState::test(api, api_base_url));
    app(state, concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}

fn test_app(api: Arc<FakeApi>) -> Router {
    test_app_with_base_url(api, "http://localhost:8080")
}

/// Drives the app the way a browser would, holding on to the session cookie between requests
struct Browser {
    app: Router,
    cookie: Option<String>,
}

impl Browser {
    fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    /// Another tab of the same browser
    fn same_session(&self) -> Self {
        Self {
            app: self.app.clone(),
            cookie: self.cookie.clone(),
        }
    }

    async fn send(&mut self, mut request: Request<Body>) -> Response {
        if let Some(cookie) = &self.cookie {
            request.headers_mut().insert(
                header::COOKIE,
                cookie.parse().expect("invalid cookie header"),
            );
        }
        let response = self
            .app
            .as_service()
            .call(request)
            .await
            .expect("Failed to execute request");
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let value = set_cookie.to_str().expect("non-ascii cookie");
            self.cookie = value.split(';').next().map(str::to_string);
        }
        response
    }

    async fn get(&mut self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .uri(uri)
            .method("GET")
            .body(Body::empty())
            .expect("Failed to build request");
        let response = self.send(request).await;
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    async fn post(&mut self, uri: &str, form: &[(&str, &str)]) -> Response {
        let body = serde_urlencoded::to_string(form).expect("Failed to encode form");
        let request = Request::builder()
            .uri(uri)
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(request).await
    }

    /// Posts an action and follows the redirect back to the page
    async fn act(&mut self, uri: &str, form: &[(&str, &str)]) -> String {
        let response = self.post(uri, form).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "POST {uri}");
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|l| l.to_str().ok())
            .expect("no redirect location")
            .to_string();
        let (status, body) = self.get(&location).await;
        assert_eq!(status, StatusCode::OK);
        body
    }
}
