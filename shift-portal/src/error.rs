//! Service-layer error type
//!
//! `ServiceError` bridges storage errors (`sqlx::Error`, `BoxError`) and the
//! API-layer error (`AppError`), so services can use `?` on both.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::BoxError;

/// - `Db`: storage/infrastructure errors (logged, mapped to an opaque InternalError)
/// - `App`: business-rule errors (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

/// SQLSTATE for a serializable transaction that lost a race
const SERIALIZATION_FAILURE: &str = "40001";

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            let conflicting = db.is_unique_violation()
                || db.code().as_deref() == Some(SERIALIZATION_FAILURE);
            if conflicting {
                tracing::warn!(
                    constraint = db.constraint().unwrap_or("-"),
                    error = %db,
                    "Concurrent write lost"
                );
                return ServiceError::App(AppError::new(ErrorCode::SubmissionConflict));
            }
        }
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        match e.downcast::<sqlx::Error>() {
            Ok(sqlx_err) => (*sqlx_err).into(),
            Err(other) => ServiceError::Db(other),
        }
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service storage error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl ServiceError {
    /// Error code the client will see
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::App(e) => e.code,
            ServiceError::Db(_) => ErrorCode::InternalError,
        }
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;
