use axum::extract::{Path, Query, State};
use axum::response::{Html, Redirect};
use axum::Form;
use serde::Deserialize;

use cmdvault_core::catalog::{self, CommandInput};
use cmdvault_core::VaultError;

use crate::error::AppError;
use crate::flash;
use crate::pages;
use crate::state::AppState;

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct IndexQuery {
    pub q: Option<String>,
    pub flash: Option<String>,
}

/// GET / — grouped catalog, optionally filtered by `?q=`.
pub async fn index(
    State(app): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> Result<Html<String>, AppError> {
    let listing = catalog::list(&app.pool, query.q.as_deref()).await?;
    // The full group list backs the move-to-group selector regardless of
    // the search filter.
    let groups = catalog::list_groups(&app.pool).await?;
    Ok(pages::index(
        &listing,
        &groups,
        query.q.as_deref(),
        query.flash.as_deref(),
    ))
}

/// Command form fields. Everything defaults so a missing field reads as
/// empty and fails validation instead of failing extraction.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CommandForm {
    pub group_id: String,
    pub title: String,
    pub content: String,
    pub sort_order: String,
    pub is_execute: Option<String>,
}

impl CommandForm {
    fn into_input(self) -> Result<CommandInput, VaultError> {
        let group_id = self
            .group_id
            .trim()
            .parse()
            .map_err(|_| VaultError::validation("group is required"))?;
        Ok(CommandInput {
            group_id,
            title: self.title,
            content: self.content,
            sort_order: self.sort_order.trim().parse().unwrap_or(0),
            // Checkbox semantics: present means checked.
            is_execute: self.is_execute.is_some(),
        })
    }
}

/// POST /command/add
pub async fn add(
    State(app): State<AppState>,
    Form(form): Form<CommandForm>,
) -> Result<Redirect, AppError> {
    let result = match form.into_input() {
        Ok(input) => catalog::add_command(&app.pool, input).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(_) => Ok(flash::redirect_with("/", "command added")),
        Err(e @ VaultError::Validation(_)) => Ok(flash::redirect_with("/", &e.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// POST /command/edit/{id} — full replace of the mutable fields.
pub async fn edit(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<CommandForm>,
) -> Result<Redirect, AppError> {
    let result = match form.into_input() {
        Ok(input) => catalog::edit_command(&app.pool, id, input).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(_) => Ok(flash::redirect_with("/", "command updated")),
        Err(e @ VaultError::Validation(_)) => Ok(flash::redirect_with("/", &e.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// GET /command/delete/{id} — a second call on the same id is 404.
pub async fn delete(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    catalog::delete_command(&app.pool, id).await?;
    Ok(flash::redirect_with("/", "command deleted"))
}
