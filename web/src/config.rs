use anyhow::{Context, Result, anyhow};
use libsample::api::BaseUrlSettings;
use serde::{Deserialize, Deserializer};
use std::{collections::HashMap, path::Path};
use tracing::{debug, warn};

pub(crate) const API_BASE_URL_VAR: &str = "SAMPLEWEB_API_BASE_URL";
pub(crate) const BASE_PATH_VAR: &str = "SAMPLEWEB_BASE_PATH";

#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct ListenConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
}

const DEFAULT_HTTP_PORT: u16 = 3000;
const DEFAULT_HOST: &str = "0.0.0.0";
fn default_listen() -> ListenConfig {
    ListenConfig {
        host: DEFAULT_HOST.to_string(),
        port: DEFAULT_HTTP_PORT,
    }
}

// This handles the case where the `listen` block is PRESENT, but a field may be missing.
fn deserialize_listen_with_default_port<'de, D>(deserializer: D) -> Result<ListenConfig, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct PartialListenConfig {
        host: Option<String>,
        port: Option<u16>,
    }

    let partial_config = PartialListenConfig::deserialize(deserializer)?;

    Ok(ListenConfig {
        host: partial_config
            .host
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: partial_config.port.unwrap_or(DEFAULT_HTTP_PORT),
    })
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct EnvConfig {
    #[serde(default = "default_listen")]
    #[serde(deserialize_with = "deserialize_listen_with_default_port")]
    pub(crate) listen: ListenConfig,
    /// Talk to the sample service at exactly this address
    #[serde(default)]
    pub(crate) api_base_url: Option<String>,
    /// Whether this is a deployment rather than a developer's machine
    #[serde(default)]
    pub(crate) deployed: bool,
    /// The path the sample service is served from, relative to `public_base_url`
    #[serde(default)]
    pub(crate) base_path: Option<String>,
    #[serde(default)]
    pub(crate) public_base_url: Option<String>,
    /// Forward `/api/` requests to the sample service. Only honored when not deployed.
    #[serde(default)]
    pub(crate) dev_proxy: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            listen: ListenConfig {
                host: "localhost".to_string(),
                port: DEFAULT_HTTP_PORT,
            },
            api_base_url: None,
            deployed: false,
            base_path: None,
            public_base_url: None,
            dev_proxy: true,
        }
    }
}

impl EnvConfig {
    /// Applies overrides from the process environment
    pub(crate) fn init(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok());
        self.base_url_settings()
            .resolve()
            .with_context(|| "Unable to determine the address of the sample service")?;
        Ok(())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_BASE_URL_VAR).filter(|s| !s.is_empty()) {
            debug!(%url, "Overriding api base url from {API_BASE_URL_VAR}");
            self.api_base_url = Some(url);
        }
        if let Some(path) = lookup(BASE_PATH_VAR).filter(|s| !s.is_empty()) {
            debug!(%path, "Overriding base path from {BASE_PATH_VAR}");
            self.base_path = Some(path);
        }
    }

    pub(crate) fn base_url_settings(&self) -> BaseUrlSettings {
        BaseUrlSettings {
            explicit: self.api_base_url.clone(),
            deployed: self.deployed,
            base_path: self.base_path.clone(),
            public_base_url: self.public_base_url.clone(),
        }
    }

    pub(crate) fn proxy_enabled(&self) -> bool {
        self.dev_proxy && !self.deployed
    }
}

/// Loads the configuration for environment `envname` from the yaml file at `path`.
///
/// A missing file is not an error: the built-in development defaults are used instead.
pub(crate) fn load(path: &Path, envname: &str) -> Result<EnvConfig> {
    if !path.exists() {
        warn!(
            path = %path.display(),
            "Config file not found, using development defaults"
        );
        return Ok(EnvConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read config file '{}'", path.display()))?;
    let mut configs: HashMap<String, EnvConfig> = serde_yaml::from_str(&contents)
        .with_context(|| format!("Unable to parse config file '{}'", path.display()))?;
    configs.remove(envname).ok_or_else(|| {
        anyhow!(
            "No environment '{envname}' found in config file '{}'",
            path.display()
        )
    })
}
