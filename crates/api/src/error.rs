//! API error types with HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use store::StoreError;
use thiserror::Error;
use validator::ValidationErrors;

use crate::response::ApiResponse;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or invalid request input.
    #[error("{0}")]
    BadRequest(String),

    /// Missing or unknown bearer token.
    #[error("Authentication required")]
    Unauthorized,

    /// Valid token without the required role.
    #[error("Admin access required")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| match &error.message {
                    Some(message) => format!("{field}: {message}"),
                    None => format!("{field}: invalid value ({})", error.code),
                })
            })
            .collect();
        messages.sort();
        ApiError::BadRequest(messages.join("; "))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Domain(err.into())
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Domain(err) => domain_status(err),
        }
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

fn domain_status(err: &DomainError) -> (StatusCode, String) {
    match err {
        DomainError::Order(_) | DomainError::Discount(_) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        DomainError::Store(StoreError::NotFound { .. }) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        DomainError::Store(StoreError::DuplicateKey { entity, field }) => (
            StatusCode::BAD_REQUEST,
            format!("{entity} with this {field} already exists"),
        ),
        DomainError::Store(StoreError::Overflow { .. }) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        DomainError::Store(_) => internal(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        let mut body = ApiResponse::<()>::error(message);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "internal server error");
            if cfg!(debug_assertions) {
                body = body.with_detail(self.to_string());
            }
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{DiscountError, OrderError};
    use store::OrderStatus;

    fn status(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn maps_taxonomy_to_status_codes() {
        assert_eq!(
            status(DomainError::Order(OrderError::PhoneRequired).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(
                DomainError::Order(OrderError::InvalidStateTransition {
                    current: OrderStatus::Done,
                    target: OrderStatus::Pending,
                })
                .into()
            ),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(DomainError::Discount(DiscountError::NameRequired).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(DomainError::not_found("Order", "x").into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status(ApiError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status(ApiError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status(
                DomainError::Store(StoreError::Overflow {
                    entity: "Customer",
                    field: "totalSpent",
                })
                .into()
            ),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(DomainError::Store(StoreError::Corrupt("bad row".into())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn duplicate_key_reads_already_exists() {
        let err: ApiError = DomainError::Store(StoreError::DuplicateKey {
            entity: "Customer",
            field: "phone",
        })
        .into();
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Customer with this phone already exists");
    }
}
