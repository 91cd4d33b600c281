//! Access to the remote sample service
//!
//! [SampleApi] describes the five operations the service offers and [ApiClient] implements them
//! over http. Every failure is normalized into an [Error] whose display text is ready to be shown
//! to a user.
use crate::{
    error::{Error, Result},
    sample::{ListParams, Page, Sample, SampleRequest},
};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, Url};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, trace, warn};

/// The address of the sample service when running everything on a development machine
pub const LOCAL_DEV_BASE_URL: &str = "http://localhost:8080";

/// Path segments of the samples collection, relative to the base url
const SAMPLES_PATH: [&str; 3] = ["api", "v1", "samples"];

/// The operations offered by the sample service
#[async_trait]
pub trait SampleApi: Send + Sync {
    /// Fetch one page of samples
    async fn list(&self, params: &ListParams) -> Result<Page<Sample>>;

    /// Fetch a single sample
    async fn get(&self, id: &str) -> Result<Sample>;

    /// Create a new sample and return it as stored by the server
    async fn create(&self, request: &SampleRequest) -> Result<Sample>;

    /// Replace the mutable fields of an existing sample
    async fn update(&self, id: &str, request: &SampleRequest) -> Result<Sample>;

    /// Remove a sample. The server answers with no content.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Inputs for deciding where the sample service lives
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BaseUrlSettings {
    /// An explicit address, which always wins when present
    pub explicit: Option<String>,
    /// Whether this is a deployed (as opposed to development) build
    pub deployed: bool,
    /// The path the application is deployed under, e.g. `/geological-sample-api/`
    pub base_path: Option<String>,
    /// The public origin of the deployment, which the base path is relative to
    pub public_base_url: Option<String>,
}

impl BaseUrlSettings {
    /// Resolves the base url of the sample service.
    ///
    /// An explicit override takes precedence. Otherwise a deployed build uses its base path on the
    /// deployment's origin, and a development build talks to [LOCAL_DEV_BASE_URL].
    pub fn resolve(&self) -> Result<String> {
        let non_empty = |val: &Option<String>| {
            val.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let resolved = if let Some(explicit) = non_empty(&self.explicit) {
            trace!(%explicit, "Using explicit api base url");
            explicit
        } else if self.deployed {
            let base_path = non_empty(&self.base_path).unwrap_or_default();
            let origin = non_empty(&self.public_base_url)
                .ok_or_else(|| Error::MissingPublicBaseUrl(base_path.clone()))?;
            trace!(%origin, %base_path, "Using deployment base path");
            format!(
                "{}/{}",
                origin.trim_end_matches('/'),
                base_path.trim_matches('/')
            )
        } else {
            trace!("Using local development api base url");
            LOCAL_DEV_BASE_URL.to_string()
        };

        let resolved = resolved.trim_end_matches('/').to_string();
        Url::parse(&resolved).map_err(|_| Error::InvalidBaseUrl(resolved.clone()))?;
        Ok(resolved)
    }
}

/// An http client for the sample service
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|_| Error::InvalidBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the url for the samples collection, optionally followed by a sample id
    fn url(&self, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base() was ruled out in new()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(SAMPLES_PATH);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    /// Sends the request and turns anything but a success status into an [Error]
    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            warn!("Request to sample service failed: {e}");
            Error::from_transport(e)
        })?;
        let status = response.status();
        trace!(%status, url = %response.url(), "Got response");
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = Error::from_response_body(status.as_u16(), &body);
        warn!(%status, %err, "Sample service reported an error");
        Err(err)
    }

    async fn execute_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.execute(request).await?.json::<T>().await.map_err(|e| {
            warn!("Failed to parse response from sample service: {e}");
            Error::unexpected(e.to_string())
        })
    }
}

#[async_trait]
impl SampleApi for ApiClient {
    async fn list(&self, params: &ListParams) -> Result<Page<Sample>> {
        debug!(?params, "Fetching samples");
        self.execute_json(self.http.get(self.url(None)).query(&[
            ("page", params.page.to_string()),
            ("size", params.size.to_string()),
            ("sort", params.sort.clone()),
        ]))
        .await
    }

    async fn get(&self, id: &str) -> Result<Sample> {
        debug!(id, "Fetching sample");
        self.execute_json(self.http.get(self.url(Some(id)))).await
    }

    async fn create(&self, request: &SampleRequest) -> Result<Sample> {
        debug!(?request, "Creating sample");
        self.execute_json(self.http.post(self.url(None)).json(request))
            .await
    }

    async fn update(&self, id: &str, request: &SampleRequest) -> Result<Sample> {
        debug!(id, ?request, "Updating sample");
        self.execute_json(self.http.put(self.url(Some(id))).json(request))
            .await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        debug!(id, "Deleting sample");
        self.execute(self.http.delete(self.url(Some(id))))
            .await
            .map(|_| ())
    }
}
