use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cmdvault_core::VaultError;

/// Unified error type for HTTP responses.
///
/// API handlers return this directly; HTML handlers convert expected
/// failures into flash redirects and only let unexpected ones fall through
/// here.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<VaultError>() {
            match e {
                VaultError::Validation(_) => StatusCode::BAD_REQUEST,
                VaultError::GroupExists(_) => StatusCode::CONFLICT,
                VaultError::GroupNotFound(_) | VaultError::CommandNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                VaultError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                VaultError::PasswordHash(_) | VaultError::Sqlx(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let err = AppError(VaultError::validation("title must not be empty").into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn group_exists_maps_to_409() {
        let err = AppError(VaultError::GroupExists("git".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = AppError(VaultError::CommandNotFound(7).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
        let err = AppError(VaultError::GroupNotFound(7).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_credentials_maps_to_401() {
        let err = AppError(VaultError::InvalidCredentials.into());
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn unexpected_errors_map_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_body_is_json_with_error_field() {
        let err = AppError(VaultError::GroupNotFound(1).into());
        let response = err.into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
