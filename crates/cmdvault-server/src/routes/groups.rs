use axum::extract::{Path, Query, State};
use axum::response::{Html, Redirect};
use axum::Form;
use serde::Deserialize;

use cmdvault_core::catalog;
use cmdvault_core::VaultError;

use super::FlashQuery;
use crate::error::AppError;
use crate::flash;
use crate::pages;
use crate::state::AppState;

/// GET /groups — group management page.
pub async fn index(
    State(app): State<AppState>,
    Query(query): Query<FlashQuery>,
) -> Result<Html<String>, AppError> {
    let groups = catalog::list_groups(&app.pool).await?;
    Ok(pages::groups(&groups, query.flash.as_deref()))
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct GroupForm {
    pub name: String,
    pub sort_order: String,
}

impl GroupForm {
    fn sort_order(&self) -> i64 {
        self.sort_order.trim().parse().unwrap_or(0)
    }
}

/// POST /groups/add
pub async fn add(
    State(app): State<AppState>,
    Form(form): Form<GroupForm>,
) -> Result<Redirect, AppError> {
    match catalog::add_group(&app.pool, &form.name, form.sort_order()).await {
        Ok(_) => Ok(flash::redirect_with("/groups", "group added")),
        Err(e @ (VaultError::Validation(_) | VaultError::GroupExists(_))) => {
            Ok(flash::redirect_with("/groups", &e.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /groups/edit/{id}
pub async fn edit(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<GroupForm>,
) -> Result<Redirect, AppError> {
    match catalog::edit_group(&app.pool, id, &form.name, form.sort_order()).await {
        Ok(_) => Ok(flash::redirect_with("/groups", "group updated")),
        Err(e @ (VaultError::Validation(_) | VaultError::GroupExists(_))) => {
            Ok(flash::redirect_with("/groups", &e.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /groups/delete/{id} — deletes the group and all its commands.
///
/// Destructive by contract; the page asks for confirmation before following
/// this link.
pub async fn delete(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    catalog::delete_group(&app.pool, id).await?;
    Ok(flash::redirect_with("/groups", "group and its commands deleted"))
}
