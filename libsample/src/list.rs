//! The paginated list of samples
use crate::{
    api::SampleApi,
    card::SampleCard,
    error::Result,
    sample::{DEFAULT_PAGE_SIZE, ListParams, Page, Sample},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Page sizes larger than this are clamped
pub const MAX_PAGE_SIZE: u32 = 100;

/// Which page of samples is being looked at, and what was last fetched for it.
///
/// The fetched page itself is never serialized; it is expected to be re-fetched with
/// [SampleList::load] whenever the list is going to be shown.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SampleList {
    params: ListParams,
    #[serde(skip)]
    page: Option<Page<Sample>>,
    #[serde(skip)]
    error: Option<String>,
}

impl SampleList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(&self) -> &ListParams {
        &self.params
    }

    /// Moves to a different page, size or sort order. Previously fetched contents are dropped.
    pub fn set_params(&mut self, mut params: ListParams) {
        if params.size == 0 {
            params.size = DEFAULT_PAGE_SIZE;
        }
        params.size = params.size.min(MAX_PAGE_SIZE);
        if params.sort.trim().is_empty() {
            params.sort = ListParams::default().sort;
        }
        if params != self.params {
            self.params = params;
            self.page = None;
            self.error = None;
        }
    }

    /// Fetches the current page from `api`. A failure is remembered so it can be shown in place
    /// of the list, and also returned.
    pub async fn load(&mut self, api: &dyn SampleApi) -> Result<()> {
        debug!(params = ?self.params, "Loading samples");
        let mut result = api.list(&self.params).await;
        // stepping past the end, e.g. after deleting the last item of the last page
        if let Ok(page) = &result
            && page.content.is_empty()
            && self.params.page > 0
            && page.total_pages > 0
        {
            self.params.page = page.total_pages - 1;
            debug!(page = self.params.page, "Requested page is past the end");
            result = api.list(&self.params).await;
        }
        match result {
            Ok(page) => {
                self.page = Some(page);
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load samples");
                self.page = None;
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn page(&self) -> Option<&Page<Sample>> {
        self.page.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn samples(&self) -> &[Sample] {
        self.page.as_ref().map(|p| p.content.as_slice()).unwrap_or_default()
    }

    pub fn find(&self, id: &str) -> Option<&Sample> {
        self.samples().iter().find(|s| s.id == id)
    }

    pub fn cards(&self) -> Vec<SampleCard> {
        self.samples().iter().map(SampleCard::from).collect()
    }

    /// True only once a page was fetched and turned out to have nothing in it
    pub fn is_empty(&self) -> bool {
        self.page.as_ref().is_some_and(|p| p.content.is_empty())
    }

    pub fn total_elements(&self) -> u64 {
        self.page.as_ref().map(|p| p.total_elements).unwrap_or(0)
    }

    pub fn previous_params(&self) -> Option<ListParams> {
        let page = self.page.as_ref()?;
        if page.first || self.params.page == 0 {
            return None;
        }
        Some(ListParams {
            page: self.params.page - 1,
            ..self.params.clone()
        })
    }

    pub fn next_params(&self) -> Option<ListParams> {
        let page = self.page.as_ref()?;
        if page.last || self.params.page + 1 >= page.total_pages {
            return None;
        }
        Some(ListParams {
            page: self.params.page + 1,
            ..self.params.clone()
        })
    }
}
