use super::{PageContext, load_shell, persist_shell};
use crate::{APP_PREFIX, error::Error, state::AppState};
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use libsample::{
    empty_string_as_none,
    form::FormValues,
    sample::ListParams,
    shell::{AppShell, View},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{debug, trace};

/// Every action ends by sending the browser back to the page
fn back_to_app() -> Redirect {
    Redirect::to(APP_PREFIX)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    page: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    size: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    sort: Option<String>,
}

impl ListQuery {
    fn is_empty(&self) -> bool {
        self.page.is_none() && self.size.is_none() && self.sort.is_none()
    }

    /// Overlays whatever was given in the query on top of `current`
    fn merge(self, current: &ListParams) -> ListParams {
        ListParams {
            page: self.page.unwrap_or(current.page),
            size: self.size.unwrap_or(current.size),
            sort: self.sort.unwrap_or_else(|| current.sort.clone()),
        }
    }
}

pub(crate) async fn show_app(
    session: Session,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, Error> {
    let mut shell = load_shell(&session).await?;
    shell.prune_notification();
    if !query.is_empty() {
        trace!(?query, "Changing list parameters");
        let params = query.merge(shell.list().params());
        shell.set_list_params(params);
    }
    if shell.view() == View::List {
        // a failure is rendered in place of the list
        let _ = shell.refresh(&*state.api).await;
    }
    persist_shell(&session, &shell).await?;
    Ok(state.render_template("app.html.j2", PageContext::new(&shell)))
}

pub(crate) async fn new_sample(session: Session) -> Result<impl IntoResponse, Error> {
    let mut shell = load_shell(&session).await?;
    shell.create_new();
    persist_shell(&session, &shell).await?;
    Ok(back_to_app())
}

pub(crate) async fn edit_sample(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let mut shell = load_shell(&session).await?;
    shell.edit_by_id(&*state.api, &id).await;
    persist_shell(&session, &shell).await?;
    Ok(back_to_app())
}

pub(crate) async fn cancel_form(session: Session) -> Result<impl IntoResponse, Error> {
    let mut shell = load_shell(&session).await?;
    shell.cancel_form();
    persist_shell(&session, &shell).await?;
    Ok(back_to_app())
}

pub(crate) async fn submit_form(
    session: Session,
    State(state): State<AppState>,
    Form(values): Form<FormValues>,
) -> Result<impl IntoResponse, Error> {
    let mut shell = load_shell(&session).await?;
    let Some(submission) = shell.begin_submit(Some(&values)) else {
        debug!("Nothing to submit");
        // keep any validation errors for the next render
        persist_shell(&session, &shell).await?;
        return Ok(back_to_app());
    };
    // saved before the service is called so the form shows as submitting
    persist_shell(&session, &shell).await?;
    let result = AppShell::send(&*state.api, &submission).await;
    shell.finish_submit(&result);
    persist_shell(&session, &shell).await?;
    Ok(back_to_app())
}

pub(crate) async fn request_delete(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let mut shell = load_shell(&session).await?;
    shell.request_delete_by_id(&*state.api, &id).await;
    persist_shell(&session, &shell).await?;
    Ok(back_to_app())
}

pub(crate) async fn confirm_delete(
    session: Session,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let mut shell = load_shell(&session).await?;
    let Some(id) = shell.begin_delete() else {
        debug!("Nothing to delete");
        return Ok(back_to_app());
    };
    persist_shell(&session, &shell).await?;
    let result = state.api.delete(&id).await;
    shell.finish_delete(&result);
    persist_shell(&session, &shell).await?;
    Ok(back_to_app())
}

pub(crate) async fn cancel_delete(session: Session) -> Result<impl IntoResponse, Error> {
    let mut shell = load_shell(&session).await?;
    shell.cancel_delete();
    persist_shell(&session, &shell).await?;
    Ok(back_to_app())
}

pub(crate) async fn dismiss_notification(session: Session) -> Result<impl IntoResponse, Error> {
    let mut shell = load_shell(&session).await?;
    shell.dismiss_notification();
    persist_shell(&session, &shell).await?;
    Ok(back_to_app())
}
