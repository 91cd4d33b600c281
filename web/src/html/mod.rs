use crate::{
    error::Error,
    state::AppState,
    util::{app_url, list_url},
};
use axum::{
    Router,
    routing::{get, post},
};
use libsample::{
    card::SampleCard,
    form::{Field, FormValues},
    sample::SampleType,
    shell::{AppShell, NotificationKind, View},
};
use serde::Serialize;
use std::collections::BTreeMap;
use strum::IntoEnumIterator;
use time::{Duration, OffsetDateTime};
use tower_sessions::Session;
use tracing::trace;

mod sample;
#[cfg(test)]
mod tests;

/// Session key under which each browser's [AppShell] is stored
const SHELL_KEY: &str = "app_shell";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sample::show_app))
        .route("/new", post(sample::new_sample))
        .route("/form", post(sample::submit_form))
        .route("/form/cancel", post(sample::cancel_form))
        .route("/{id}/edit", post(sample::edit_sample))
        .route("/{id}/delete", post(sample::request_delete))
        .route("/dialog/confirm", post(sample::confirm_delete))
        .route("/dialog/cancel", post(sample::cancel_delete))
        .route("/notification/dismiss", post(sample::dismiss_notification))
}

pub(crate) async fn load_shell(session: &Session) -> Result<AppShell, Error> {
    Ok(session.get::<AppShell>(SHELL_KEY).await?.unwrap_or_default())
}

/// Stores the shell and writes the session out straight away
pub(crate) async fn persist_shell(session: &Session, shell: &AppShell) -> Result<(), Error> {
    trace!(view = %shell.view(), "Saving shell to session");
    session.insert(SHELL_KEY, shell).await?;
    session.save().await?;
    Ok(())
}

#[derive(Serialize)]
struct ListContext {
    cards: Vec<SampleCard>,
    error: Option<String>,
    empty: bool,
    total: u64,
    /// one-based, for display
    page: u32,
    total_pages: u32,
    previous_url: Option<String>,
    next_url: Option<String>,
}

#[derive(Serialize)]
struct FormContext {
    title: &'static str,
    submit_label: &'static str,
    submitting: bool,
    editing: bool,
    values: FormValues,
    errors: BTreeMap<Field, String>,
}

#[derive(Serialize)]
struct DialogContext {
    prompt: String,
    confirm_label: &'static str,
    deleting: bool,
}

#[derive(Serialize)]
struct NotificationContext {
    kind: NotificationKind,
    message: String,
    /// whole seconds until the page hides the banner by itself
    hide_after: i64,
}

/// Everything the page template needs to draw the current state of a shell
#[derive(Serialize)]
pub(crate) struct PageContext {
    view: View,
    notification: Option<NotificationContext>,
    list: Option<ListContext>,
    form: Option<FormContext>,
    dialog: Option<DialogContext>,
    sample_types: Vec<SampleType>,
    home_url: String,
}

impl PageContext {
    pub(crate) fn new(shell: &AppShell) -> Self {
        Self::at(shell, OffsetDateTime::now_utc())
    }

    pub(crate) fn at(shell: &AppShell, now: OffsetDateTime) -> Self {
        let list = match shell.view() {
            View::List => {
                let list = shell.list();
                Some(ListContext {
                    cards: list.cards(),
                    error: list.error().map(str::to_string),
                    empty: list.is_empty(),
                    total: list.total_elements(),
                    page: list.params().page + 1,
                    total_pages: list.page().map(|p| p.total_pages).unwrap_or(0),
                    previous_url: list.previous_params().map(|p| list_url(&p)),
                    next_url: list.next_params().map(|p| list_url(&p)),
                })
            }
            View::Form => None,
        };
        let form = shell.form().map(|f| FormContext {
            title: f.title(),
            submit_label: f.submit_label(),
            submitting: f.is_submitting(),
            editing: f.is_editing(),
            values: f.values().clone(),
            errors: f.errors().clone(),
        });
        let dialog = shell.dialog().prompt().map(|prompt| DialogContext {
            prompt,
            confirm_label: shell.dialog().confirm_label(),
            deleting: shell.dialog().is_deleting(),
        });
        let notification = shell.notification_at(now).map(|n| NotificationContext {
            kind: n.kind,
            message: n.message.clone(),
            hide_after: ceil_seconds(n.remaining(now)),
        });
        Self {
            view: shell.view(),
            notification,
            list,
            form,
            dialog,
            sample_types: SampleType::iter().collect(),
            home_url: app_url("/"),
        }
    }
}

fn ceil_seconds(d: Duration) -> i64 {
    match d.subsec_nanoseconds() > 0 {
        true => d.whole_seconds() + 1,
        false => d.whole_seconds(),
    }
}
