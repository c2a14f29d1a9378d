use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

/// MongoDB server code for a unique index violation
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Name, price, and type are required")]
    MissingRequiredFields,

    #[error("Type must be \"weight\" or \"piece\"")]
    InvalidType,

    #[error("Product already exists")]
    AlreadyExists,

    #[error("Product ID is required")]
    MissingId,

    #[error("Product ID required")]
    MissingDeleteId,

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Product not found")]
    NotFound,

    /// Malformed ObjectId; surfaces as a server error with the parser's message
    #[error("{0}")]
    InvalidId(String),

    #[error("{0}")]
    Database(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::MissingRequiredFields
            | ProductError::InvalidType
            | ProductError::AlreadyExists
            | ProductError::MissingId
            | ProductError::MissingDeleteId
            | ProductError::NoFieldsToUpdate => AppError::BadRequest(err.to_string()),
            ProductError::NotFound => AppError::NotFound(err.to_string()),
            ProductError::InvalidId(msg) | ProductError::Database(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            return ProductError::AlreadyExists;
        }
        ProductError::Database(err.to_string())
    }
}

impl From<mongodb::bson::oid::Error> for ProductError {
    fn from(err: mongodb::bson::oid::Error) -> Self {
        ProductError::InvalidId(err.to_string())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}
