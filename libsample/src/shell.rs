//! The state of the whole sample manager application
//!
//! [AppShell] is a small state machine. It is always showing either the sample list or the
//! sample form, and on top of that it may be showing the delete confirmation dialog and a
//! notification. Every user action maps to one method on the shell.
//!
//! Operations that call the sample service come in two flavors. The convenience methods such as
//! [AppShell::submit] and [AppShell::confirm_delete] do the whole thing. They are built on top of
//! `begin_*`/`finish_*` pairs, which a caller can use directly when it needs to observe or
//! persist the in-flight state while the request is running.
use crate::{
    Error,
    api::SampleApi,
    dialog::DeleteDialog,
    error::Result,
    form::{FormValues, SampleForm},
    list::SampleList,
    sample::{ListParams, Sample, SampleRequest},
};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

/// How long a notification stays up unless it is dismissed earlier
pub const NOTIFICATION_LIFETIME: Duration = Duration::seconds(5);

pub const SAVE_FAILED_MESSAGE: &str = "Failed to save sample";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete sample";

/// The top-level screens of the application
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum View {
    #[default]
    List,
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// A transient banner reporting the outcome of an action
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub expires_at: OffsetDateTime,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>, now: OffsetDateTime) -> Self {
        Self {
            kind,
            message: message.into(),
            expires_at: now + NOTIFICATION_LIFETIME,
        }
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }

    /// Time left before the notification expires, never negative
    pub fn remaining(&self, now: OffsetDateTime) -> Duration {
        (self.expires_at - now).max(Duration::ZERO)
    }
}

/// A validated form, ready to be sent to the sample service
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Create(SampleRequest),
    Update { id: String, request: SampleRequest },
}

fn message_or(err: &Error, fallback: &str) -> String {
    let msg = err.to_string();
    match msg.is_empty() {
        true => fallback.to_string(),
        false => msg,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppShell {
    view: View,
    list: SampleList,
    /// Present exactly when the view is [View::Form]
    form: Option<SampleForm>,
    /// The sample being edited; `None` when creating
    editing: Option<Sample>,
    dialog: DeleteDialog,
    notification: Option<Notification>,
}

impl AppShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn list(&self) -> &SampleList {
        &self.list
    }

    pub fn form(&self) -> Option<&SampleForm> {
        self.form.as_ref()
    }

    pub fn editing(&self) -> Option<&Sample> {
        self.editing.as_ref()
    }

    pub fn dialog(&self) -> &DeleteDialog {
        &self.dialog
    }

    pub fn is_submitting(&self) -> bool {
        self.form.as_ref().is_some_and(SampleForm::is_submitting)
    }

    pub fn is_deleting(&self) -> bool {
        self.dialog.is_deleting()
    }

    /// The current notification, unless it has expired by `now`
    pub fn notification_at(&self, now: OffsetDateTime) -> Option<&Notification> {
        self.notification.as_ref().filter(|n| !n.is_expired(now))
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification_at(OffsetDateTime::now_utc())
    }

    pub fn notify_at(&mut self, kind: NotificationKind, message: &str, now: OffsetDateTime) {
        match kind {
            NotificationKind::Success => info!(message, "Notifying user"),
            NotificationKind::Error => warn!(message, "Notifying user of error"),
        }
        self.notification = Some(Notification::new(kind, message, now));
    }

    pub fn notify(&mut self, kind: NotificationKind, message: &str) {
        self.notify_at(kind, message, OffsetDateTime::now_utc());
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    /// Drops the notification if it has expired by `now`
    pub fn prune_notification_at(&mut self, now: OffsetDateTime) {
        if self.notification.as_ref().is_some_and(|n| n.is_expired(now)) {
            debug!("Notification expired");
            self.notification = None;
        }
    }

    pub fn prune_notification(&mut self) {
        self.prune_notification_at(OffsetDateTime::now_utc());
    }

    /// Switches to a different page of the list
    pub fn set_list_params(&mut self, params: ListParams) {
        self.list.set_params(params);
    }

    /// Re-fetches the current page of the list. A failure is kept by the list and shown in its
    /// place.
    pub async fn refresh(&mut self, api: &dyn SampleApi) -> Result<()> {
        self.list.load(api).await
    }

    /// Opens an empty form for creating a sample. Ignored while a submission is in flight.
    pub fn create_new(&mut self) -> bool {
        if self.is_submitting() {
            return false;
        }
        debug!("Opening create form");
        self.view = View::Form;
        self.editing = None;
        self.form = Some(SampleForm::new());
        true
    }

    /// Opens the form pre-populated with `sample`. Ignored while a submission is in flight.
    pub fn edit(&mut self, sample: Sample) -> bool {
        if self.is_submitting() {
            return false;
        }
        debug!(id = %sample.id, "Opening edit form");
        self.view = View::Form;
        self.form = Some(SampleForm::for_sample(&sample));
        self.editing = Some(sample);
        true
    }

    /// Fetches the sample with `id` and opens the form for it. A failure is shown as a
    /// notification and the view stays as it was.
    pub async fn edit_by_id(&mut self, api: &dyn SampleApi, id: &str) -> bool {
        if self.is_submitting() {
            return false;
        }
        match api.get(id).await {
            Ok(sample) => self.edit(sample),
            Err(e) => {
                self.notify(NotificationKind::Error, &e.to_string());
                false
            }
        }
    }

    /// Leaves the form without saving. Ignored while a submission is in flight.
    pub fn cancel_form(&mut self) -> bool {
        if self.is_submitting() {
            return false;
        }
        self.close_form();
        true
    }

    fn close_form(&mut self) {
        self.view = View::List;
        self.form = None;
        self.editing = None;
    }

    /// Applies the latest inputs to the form, validates it, and marks it as submitting.
    ///
    /// Returns `None` if there is no form, a submission is already in flight, or the form is
    /// invalid. In the last case the form now shows the validation errors.
    pub fn begin_submit(&mut self, values: Option<&FormValues>) -> Option<Submission> {
        let form = self.form.as_mut()?;
        if form.is_submitting() {
            debug!("Ignoring submit while submitting");
            return None;
        }
        if let Some(values) = values {
            form.apply(values);
        }
        let request = form.submit()?;
        form.set_submitting(true);
        Some(match &self.editing {
            Some(sample) => Submission::Update {
                id: sample.id.clone(),
                request,
            },
            None => Submission::Create(request),
        })
    }

    /// Ends an in-flight submission. On success the form closes and a success notification is
    /// shown; on failure the form stays open with an error notification.
    pub fn finish_submit(&mut self, result: &Result<Sample>) {
        if let Some(form) = self.form.as_mut() {
            form.set_submitting(false);
        }
        match result {
            Ok(sample) => {
                let message = match self.editing.is_some() {
                    true => "Sample updated successfully",
                    false => "Sample created successfully",
                };
                info!(id = %sample.id, "Saved sample");
                self.close_form();
                self.notify(NotificationKind::Success, message);
            }
            Err(e) => {
                self.notify(NotificationKind::Error, &message_or(e, SAVE_FAILED_MESSAGE));
            }
        }
    }

    /// Sends a [Submission] to the sample service
    pub async fn send(api: &dyn SampleApi, submission: &Submission) -> Result<Sample> {
        match submission {
            Submission::Create(request) => api.create(request).await,
            Submission::Update { id, request } => api.update(id, request).await,
        }
    }

    /// Submits the form with the latest inputs, creating or updating a sample as appropriate.
    /// The list is re-fetched after a successful save. Returns true if something was saved.
    pub async fn submit(&mut self, api: &dyn SampleApi, values: Option<&FormValues>) -> bool {
        let Some(submission) = self.begin_submit(values) else {
            return false;
        };
        let result = Self::send(api, &submission).await;
        self.finish_submit(&result);
        if result.is_ok() {
            // list failures are shown by the list itself
            let _ = self.refresh(api).await;
        }
        result.is_ok()
    }

    /// Opens the delete confirmation for `sample`. Only possible from the list.
    pub fn request_delete(&mut self, sample: Sample) -> bool {
        if self.view != View::List {
            return false;
        }
        self.dialog.open(sample)
    }

    /// Fetches the sample with `id` and asks for confirmation to delete it
    pub async fn request_delete_by_id(&mut self, api: &dyn SampleApi, id: &str) -> bool {
        if self.view != View::List || self.is_deleting() {
            return false;
        }
        let sample = match self.list.find(id).cloned() {
            Some(s) => s,
            None => match api.get(id).await {
                Ok(s) => s,
                Err(e) => {
                    self.notify(NotificationKind::Error, &e.to_string());
                    return false;
                }
            },
        };
        self.request_delete(sample)
    }

    pub fn cancel_delete(&mut self) -> bool {
        self.dialog.cancel()
    }

    /// Marks the pending deletion as in flight and returns the id to delete. Returns `None` if
    /// no deletion is pending or one is already in flight.
    pub fn begin_delete(&mut self) -> Option<String> {
        self.dialog.begin_confirm()
    }

    /// Ends an in-flight deletion. The dialog stays open if it failed.
    pub fn finish_delete(&mut self, result: &Result<()>) {
        self.dialog.finish_confirm(result.is_ok());
        match result {
            Ok(()) => {
                self.notify(NotificationKind::Success, "Sample deleted successfully");
            }
            Err(e) => {
                self.notify(NotificationKind::Error, &message_or(e, DELETE_FAILED_MESSAGE));
            }
        }
    }

    /// Deletes the sample the dialog was opened for, then re-fetches the list. Returns true if
    /// the sample was deleted.
    pub async fn confirm_delete(&mut self, api: &dyn SampleApi) -> bool {
        let Some(id) = self.begin_delete() else {
            return false;
        };
        let result = api.delete(&id).await;
        self.finish_delete(&result);
        if result.is_ok() {
            let _ = self.refresh(api).await;
        }
        result.is_ok()
    }
}
