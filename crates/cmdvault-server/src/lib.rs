pub mod error;
pub mod flash;
pub mod pages;
pub mod routes;
pub mod session;
pub mod state;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the axum Router with all routes and the session middleware.
/// Used by `serve` and available for integration testing.
pub fn build_router(pool: SqlitePool, secret_key: Option<&str>) -> Router {
    let app_state = AppState::new(pool, secret_key);

    Router::new()
        // Catalog
        .route("/", get(routes::catalog::index))
        .route("/command/add", post(routes::catalog::add))
        .route("/command/edit/{id}", post(routes::catalog::edit))
        .route("/command/delete/{id}", get(routes::catalog::delete))
        // Groups
        .route("/groups", get(routes::groups::index))
        .route("/groups/add", post(routes::groups::add))
        .route("/groups/edit/{id}", post(routes::groups::edit))
        .route("/groups/delete/{id}", get(routes::groups::delete))
        // Auth
        .route(
            "/login",
            get(routes::auth::login_form).post(routes::auth::login),
        )
        .route("/logout", get(routes::auth::logout))
        .route(
            "/change-password",
            get(routes::auth::change_password_form).post(routes::auth::change_password),
        )
        // API
        .route("/api/list", get(routes::api::list))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            session::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the web server on a pre-bound listener.
///
/// Accepting a `TcpListener` lets the caller bind first and read the actual
/// port before starting (useful when the port is 0 and the OS picks one).
pub async fn serve_on(
    pool: SqlitePool,
    secret_key: Option<&str>,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(pool, secret_key);

    tracing::info!("cmdvault listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Bind `addr` and start the web server.
pub async fn serve(pool: SqlitePool, secret_key: Option<&str>, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_on(pool, secret_key, listener).await
}
