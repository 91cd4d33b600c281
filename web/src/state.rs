use crate::{config::EnvConfig, session::SessionLocks, template_engine};
use anyhow::{Context, Result};
use axum_template::{RenderHtml, engine::Engine};
use libsample::api::{ApiClient, SampleApi};
use serde::Serialize;
use std::{path::Path, sync::Arc};
use tracing::{info, trace};

pub(crate) type TemplateEngine = Engine<minijinja::Environment<'static>>;

pub struct SharedState {
    pub api: Arc<dyn SampleApi>,
    pub tmpl: TemplateEngine,
    pub config: EnvConfig,
    /// The resolved address of the sample service
    pub api_base_url: String,
    /// Client used to forward raw requests in development mode
    pub http: reqwest::Client,
    pub(crate) session_locks: SessionLocks,
}

impl SharedState {
    pub fn new(envname: &str, env: EnvConfig, datadir: &Path) -> Result<Self> {
        trace!("Creating shared app state");
        let api_base_url = env
            .base_url_settings()
            .resolve()
            .with_context(|| "Unable to determine the address of the sample service")?;
        info!(%api_base_url, "Using sample service");
        let client = ApiClient::new(&api_base_url)
            .with_context(|| format!("Unable to create client for '{api_base_url}'"))?;
        Ok(Self {
            api: Arc::new(client),
            tmpl: template_engine(envname, datadir.join("templates")),
            config: env,
            api_base_url,
            http: reqwest::Client::new(),
            session_locks: SessionLocks::default(),
        })
    }

    pub fn render_template<S: Serialize>(
        &self,
        key: &str,
        ctx: S,
    ) -> RenderHtml<String, TemplateEngine, S> {
        RenderHtml(key.to_string(), self.tmpl.clone(), ctx)
    }

    #[cfg(test)]
    pub fn test(api: Arc<dyn SampleApi>, api_base_url: &str) -> Self {
        tracing::debug!("Creating test shared app state");
        Self {
            api,
            tmpl: template_engine("test", concat!(env!("CARGO_MANIFEST_DIR"), "/templates")),
            config: EnvConfig {
                api_base_url: Some(api_base_url.to_string()),
                ..Default::default()
            },
            api_base_url: api_base_url.to_string(),
            http: reqwest::Client::new(),
            session_locks: SessionLocks::default(),
        }
    }
}

pub type AppState = Arc<SharedState>;
