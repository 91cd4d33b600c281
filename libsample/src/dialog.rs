//! The modal confirmation that gates deleting a sample
use crate::sample::Sample;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::debug;

/// A delete confirmation dialog. It is only visible while it has a target sample.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DeleteDialog {
    target: Option<Sample>,
    deleting: bool,
}

impl DeleteDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows the dialog for `sample`. Ignored while a deletion is in flight.
    pub fn open(&mut self, sample: Sample) -> bool {
        if self.deleting {
            return false;
        }
        debug!(id = %sample.id, "Opening delete dialog");
        self.target = Some(sample);
        true
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&Sample> {
        self.target.as_ref()
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    /// Hides the dialog without doing anything. Ignored while a deletion is in flight.
    pub fn cancel(&mut self) -> bool {
        if self.deleting {
            debug!("Ignoring cancel while deleting");
            return false;
        }
        self.target = None;
        true
    }

    /// Starts the deletion of the target and returns its id. Returns `None` if the dialog is not
    /// open or a deletion is already in flight.
    pub fn begin_confirm(&mut self) -> Option<String> {
        if self.deleting {
            debug!("Ignoring confirm while deleting");
            return None;
        }
        let id = self.target.as_ref()?.id.clone();
        self.deleting = true;
        Some(id)
    }

    /// Ends an in-flight deletion. The dialog closes on success and stays open on failure so the
    /// user can retry or cancel.
    pub fn finish_confirm(&mut self, succeeded: bool) {
        self.deleting = false;
        if succeeded {
            self.target = None;
        }
    }

    /// Confirms the deletion by handing the target's id to `handler`. The handler's result
    /// decides whether the dialog closes. Returns `None` if nothing was started.
    pub async fn confirm_with<F, Fut, T, E>(&mut self, handler: F) -> Option<Result<T, E>>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let id = self.begin_confirm()?;
        let result = handler(id).await;
        self.finish_confirm(result.is_ok());
        Some(result)
    }

    /// The confirmation question, naming the sample by its human-readable identifier
    pub fn prompt(&self) -> Option<String> {
        self.target.as_ref().map(|s| {
            format!(
                "Are you sure you want to delete the sample {}? This action cannot be undone.",
                s.sample_identifier
            )
        })
    }

    pub fn confirm_label(&self) -> &'static str {
        match self.deleting {
            true => "Deleting...",
            false => "Delete",
        }
    }
}
