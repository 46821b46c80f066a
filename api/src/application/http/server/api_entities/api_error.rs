use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use foodwatch_core::domain::common::entities::app_errors::CoreError;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ApiErrorResponse {
    pub code: String,
    pub message: String,
    pub status: u16,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Not a failure of the request itself: the proposal was settled by an
    /// earlier vote.
    #[error("{0}")]
    AlreadyApplied(String),

    #[error("{0}")]
    ReconciliationRequired(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    InternalServerError(String),
}

impl ApiError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "E_BAD_REQUEST"),
            ApiError::ValidationError(_) => (StatusCode::BAD_REQUEST, "E_VALIDATION"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "E_UNAUTHORIZED"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "E_FORBIDDEN"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "E_NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "E_CONFLICT"),
            ApiError::AlreadyApplied(_) => (StatusCode::CONFLICT, "W_ALREADY_APPLIED"),
            ApiError::ReconciliationRequired(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "E_RECONCILIATION_REQUIRED",
            ),
            ApiError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "E_SERVICE_UNAVAILABLE")
            }
            ApiError::InternalServerError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "E_INTERNAL_SERVER_ERROR")
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            CoreError::Forbidden(message) => ApiError::Forbidden(message),
            CoreError::InvalidIngredientReference { .. } | CoreError::Invalid(_) => {
                ApiError::BadRequest(error.to_string())
            }
            CoreError::DuplicateProposal { .. } => ApiError::Conflict(error.to_string()),
            CoreError::Conflict(message) => ApiError::Conflict(message),
            CoreError::AlreadyApplied => ApiError::AlreadyApplied(error.to_string()),
            CoreError::TargetGone { .. } => ApiError::ReconciliationRequired(error.to_string()),
            CoreError::TransactionConflict => ApiError::ServiceUnavailable(
                "The request conflicted with a concurrent update, please retry".to_string(),
            ),
            CoreError::InternalServerError => {
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = ApiErrorResponse {
            code: code.to_string(),
            message: self.to_string(),
            status: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

/// JSON body extractor that also runs `validator` rules.
pub struct ValidateJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidateJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| ApiError::ValidationError(errors.to_string()))?;

        Ok(ValidateJson(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn core_errors_map_to_statuses() {
        let cases = [
            (CoreError::NotFound, StatusCode::NOT_FOUND),
            (CoreError::Forbidden("no".to_string()), StatusCode::FORBIDDEN),
            (
                CoreError::InvalidIngredientReference {
                    ids: vec![Uuid::nil()],
                },
                StatusCode::BAD_REQUEST,
            ),
            (CoreError::Invalid("bad".to_string()), StatusCode::BAD_REQUEST),
            (
                CoreError::DuplicateProposal {
                    existing: Uuid::nil(),
                },
                StatusCode::CONFLICT,
            ),
            (CoreError::Conflict("taken".to_string()), StatusCode::CONFLICT),
            (CoreError::AlreadyApplied, StatusCode::CONFLICT),
            (
                CoreError::TargetGone {
                    proposal_id: Uuid::nil(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (CoreError::TransactionConflict, StatusCode::SERVICE_UNAVAILABLE),
            (CoreError::InternalServerError, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            let (status, _) = ApiError::from(error.clone()).status_and_code();
            assert_eq!(status, expected, "{error:?}");
        }
    }

    #[test]
    fn already_applied_carries_a_warning_code() {
        let (_, code) = ApiError::from(CoreError::AlreadyApplied).status_and_code();
        assert_eq!(code, "W_ALREADY_APPLIED");
    }

    #[test]
    fn unknown_ingredients_are_listed_in_the_message() {
        let missing = Uuid::new_v4();
        let error = ApiError::from(CoreError::InvalidIngredientReference { ids: vec![missing] });

        assert!(error.to_string().contains(&missing.to_string()));
    }

    #[tokio::test]
    async fn error_body_has_code_message_and_status() {
        let response = ApiError::from(CoreError::NotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body: ApiErrorResponse = serde_json::from_slice(&bytes).expect("json body");

        assert_eq!(
            body,
            ApiErrorResponse {
                code: "E_NOT_FOUND".to_string(),
                message: "Resource not found".to_string(),
                status: 404,
            }
        );
    }
}
