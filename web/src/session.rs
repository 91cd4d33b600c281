//! Requests that belong to the same browser session are handled one at a time.
//!
//! Every handler loads the [libsample::shell::AppShell] from the session, works on it and writes
//! it back. Two tabs sharing a session would otherwise overwrite each other's shell, which can
//! leave a stale in-flight flag behind after the operation that set it has finished.
use crate::{error::Error, state::AppState};
use anyhow::anyhow;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};
use tracing::trace;

/// Name of the cookie carrying the session id
pub(crate) const SESSION_COOKIE: &str = "sampleweb.sid";

type SessionLock = Arc<tokio::sync::Mutex<()>>;

/// One lock per session that currently has a request in progress
#[derive(Default)]
pub(crate) struct SessionLocks {
    locks: Mutex<HashMap<String, SessionLock>>,
}

impl SessionLocks {
    fn acquire(&self, session: &str) -> SessionLock {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(session.to_string()).or_default().clone()
    }

    fn release(&self, session: &str, lock: SessionLock) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // only the map and the caller hold it, so nobody is waiting
        if Arc::strong_count(&lock) == 2 {
            locks.remove(session);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn session_cookie(request: &Request) -> Option<String> {
    request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// Middleware that runs each request of a session only after the previous one has finished.
///
/// The request runs in its own task, so it still completes and saves the session if the browser
/// goes away while the sample service is answering.
pub(crate) async fn one_request_per_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(session) = session_cookie(&request) else {
        return next.run(request).await;
    };
    let lock = state.session_locks.acquire(&session);
    let task = tokio::spawn(async move {
        let response = {
            let _guard = lock.lock().await;
            trace!("Handling request for session");
            next.run(request).await
        };
        state.session_locks.release(&session, lock);
        response
    });
    match task.await {
        Ok(response) => response,
        Err(e) => Error::Other(anyhow!(e)).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http};

    #[test]
    fn test_session_cookie() {
        let request = http::Request::builder()
            .header(header::COOKIE, "theme=dark; sampleweb.sid=abc123; other=1")
            .body(Body::empty())
            .expect("Failed to build request");
        assert_eq!(session_cookie(&request).as_deref(), Some("abc123"));

        let request = http::Request::builder()
            .header(header::COOKIE, "sampleweb.sidx=nope")
            .body(Body::empty())
            .expect("Failed to build request");
        assert_eq!(session_cookie(&request), None);

        let request = http::Request::builder()
            .body(Body::empty())
            .expect("Failed to build request");
        assert_eq!(session_cookie(&request), None);
    }

    #[test]
    fn test_locks_are_released() {
        let locks = SessionLocks::default();
        let first = locks.acquire("a");
        let second = locks.acquire("a");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(locks.len(), 1);

        // still wanted by the second request
        locks.release("a", first);
        assert_eq!(locks.len(), 1);
        locks.release("a", second);
        assert_eq!(locks.len(), 0);
    }
}
