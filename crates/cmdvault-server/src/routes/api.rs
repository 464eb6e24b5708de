use axum::extract::State;
use axum::Json;

use cmdvault_core::catalog;
use cmdvault_core::model::ApiGroup;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/list — the catalog for external script consumption.
///
/// Groups without commands are omitted; ordering matches the HTML view.
pub async fn list(State(app): State<AppState>) -> Result<Json<Vec<ApiGroup>>, AppError> {
    Ok(Json(catalog::api_listing(&app.pool).await?))
}
