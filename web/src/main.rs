use anyhow::{Context, Result};
use axum::{
    Json, Router,
    http::Uri,
    middleware,
    response::{IntoResponse, Redirect},
    routing::get,
};
use axum_template::engine::Engine;
use clap::Parser;
use minijinja::Environment;
use serde_json::json;
use state::{AppState, SharedState, TemplateEngine};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use time::{Duration, OffsetDateTime, format_description::well_known::Rfc3339};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tracing::{debug, info};
use tracing_subscriber::filter::EnvFilter;

mod config;
mod error;
mod html;
mod proxy;
mod session;
mod state;
mod util;

const APP_PREFIX: &str = "/app/";
const SERVICE_NAME: &str = "sampleweb";

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Which environment from the config file to use
    #[arg(short, long, default_value = "dev")]
    pub env: String,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Directory holding the `templates` and `static` directories
    #[arg(short, long, default_value = "web")]
    pub datadir: PathBuf,
}

fn default_config_path() -> PathBuf {
    directories::ProjectDirs::from("org", "sampleweb", "sampleweb")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
        .unwrap_or_else(|| PathBuf::from("sampleweb.yaml"))
}

pub(crate) fn template_engine(envname: &str, template_dir: impl AsRef<Path>) -> TemplateEngine {
    let mut jinja = Environment::new();
    jinja.set_loader(minijinja::path_loader(template_dir));
    jinja.add_filter("app_url", util::app_url);
    jinja.add_filter("append_query_param", util::append_query_param);
    jinja.add_filter("title_case", util::title_case);
    jinja.add_global("environment", envname.to_string());
    Engine::from(jinja)
}

/// Builds the whole application, serving static files from `static_dir`
pub(crate) fn app(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(session::SESSION_COOKIE)
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)));

    let mut router = Router::new()
        .route("/", get(root))
        .route("/healthcheck", get(healthcheck))
        .nest_service("/static", ServeDir::new(static_dir))
        .nest(APP_PREFIX, html::router())
        .fallback(not_found);
    if state.config.proxy_enabled() {
        debug!(upstream = %state.api_base_url, "Forwarding /api/ requests");
        router = router.merge(proxy::router());
    }
    router
        .with_state(state.clone())
        .layer(session_layer)
        .layer(middleware::from_fn_with_state(
            state,
            session::one_request_per_session,
        ))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("SAMPLEWEB_LOG"))
        .init();
    let args = Cli::parse();
    let configfile = args.config.unwrap_or_else(default_config_path);
    debug!(?configfile, env = %args.env, "Loading configuration");
    let mut env = config::load(&configfile, &args.env)?;
    env.init()?;

    let shared_state = Arc::new(SharedState::new(&args.env, env, &args.datadir)?);
    let listen = shared_state.config.listen.clone();
    let app = app(shared_state, args.datadir.join("static"));

    let listener = tokio::net::TcpListener::bind((listen.host.as_str(), listen.port))
        .await
        .with_context(|| format!("Unable to listen on {}:{}", listen.host, listen.port))?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Unable to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn root() -> impl IntoResponse {
    Redirect::permanent(APP_PREFIX)
}

async fn not_found(uri: Uri) -> error::Error {
    error::Error::NotFound(uri.to_string())
}

async fn healthcheck() -> impl IntoResponse {
    Json(json!({
        "status": "UP",
        "service": SERVICE_NAME,
        "timestamp": OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
    }))
}
