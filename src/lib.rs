//! MoneyLens is a web app for tracking your personal finances.
//!
//! This library provides a JSON REST API for recording income and expenses,
//! organising them into categories, planning monthly budgets and summarising
//! the current month on a dashboard. The [client] module talks to that API
//! and holds the view state a frontend needs.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod budget;
mod category;
pub mod client;
mod dashboard;
mod database_id;
mod db;
pub mod endpoints;
mod logging;
mod password;
mod routing;
mod timezone;
mod transaction;
mod user;

pub use app_state::AppState;
pub use auth::{
    CSRF_COOKIE, CSRF_HEADER, Claims, CsrfTokenResponse, LogInForm, LogInResponse, RegisterForm,
};
pub use budget::{Budget, BudgetForm, BudgetId};
pub use category::{Category, CategoryForm, CategoryId, CategoryName};
pub use dashboard::{BudgetVsActual, DashboardSummary, ExpenseBreakdown, Suggestions, TrendPoint};
pub use database_id::DatabaseId;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use transaction::{
    Transaction, TransactionFilterQuery, TransactionForm, TransactionId, TransactionType,
};
pub use user::{User, UserID};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
///
/// The `Display` text of the client-facing variants is sent to the client as
/// the `message` field of the JSON error body.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// One or more required fields were missing from the request body.
    #[error("Missing required fields")]
    MissingFields,

    /// The request body could not be parsed as the expected JSON object.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// The user provided an invalid combination of username and password.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The request did not carry a valid bearer token.
    #[error("Authentication required")]
    Unauthenticated,

    /// The `X-CSRFToken` header or the CSRF cookie was not sent.
    #[error("The CSRF token is missing.")]
    CsrfTokenMissing,

    /// The CSRF header did not match the cookie, or the cookie has expired.
    #[error("The CSRF token is invalid.")]
    CsrfTokenInvalid,

    /// The username is already taken by another user.
    #[error("Username already exists")]
    DuplicateUsername,

    /// The email address is already registered to another user.
    #[error("Email already exists")]
    DuplicateEmail,

    /// The email address is not syntactically valid.
    #[error("Invalid email address")]
    InvalidEmail,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The bearer token could not be created.
    #[error("could not create the authentication token: {0}")]
    TokenCreation(String),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The user already has a category with the same name.
    #[error("Category already exists")]
    DuplicateCategoryName,

    /// The category ID or name does not refer to one of the user's categories.
    #[error("Category not found")]
    CategoryNotFound,

    /// Tried to delete a category that transactions still refer to.
    #[error("Category is used by existing transactions")]
    CategoryInUse,

    /// The transaction ID does not refer to one of the user's transactions.
    #[error("Transaction not found")]
    TransactionNotFound,

    /// The budget ID does not refer to one of the user's budgets.
    #[error("Budget not found")]
    BudgetNotFound,

    /// A transaction amount that is not a finite, positive number.
    #[error("Amount must be a positive number")]
    InvalidAmount,

    /// A budget limit that is not a finite, non-negative number.
    #[error("Monthly limit must be a non-negative number")]
    InvalidLimit,

    /// A transaction type other than "Income" or "Expense".
    #[error("Type must be either \"Income\" or \"Expense\"")]
    InvalidTransactionType,

    /// A date that is not formatted as `YYYY-MM-DD`.
    #[error("Invalid date format")]
    InvalidDate,

    /// A month outside 1-12 or a year that is not a number.
    #[error("Invalid month or year format")]
    InvalidMonthOrYear,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The transactions could not be written as CSV.
    #[error("could not write CSV: {0}")]
    CsvError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidBody(rejection.body_text())
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingFields
            | Error::InvalidBody(_)
            | Error::CsrfTokenMissing
            | Error::CsrfTokenInvalid
            | Error::DuplicateUsername
            | Error::DuplicateEmail
            | Error::InvalidEmail
            | Error::TooWeak(_)
            | Error::EmptyCategoryName
            | Error::DuplicateCategoryName
            | Error::InvalidAmount
            | Error::InvalidLimit
            | Error::InvalidTransactionType
            | Error::InvalidDate
            | Error::InvalidMonthOrYear => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials | Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::CategoryNotFound
            | Error::TransactionNotFound
            | Error::BudgetNotFound
            | Error::NotFound => StatusCode::NOT_FOUND,
            Error::CategoryInUse => StatusCode::CONFLICT,
            Error::HashingError(_)
            | Error::TokenCreation(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::InvalidTimezoneError(_)
            | Error::CsvError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal details are logged, not sent to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// A JSON body extractor that reports malformed bodies as an [Error] so that
/// clients always receive a JSON error with a `message` field.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub(crate) struct ApiJson<T>(pub T);

/// A JSON body for responses that only carry a human readable message.
pub(crate) fn message_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::Error;

    async fn body_json(error: Error) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not read body");

        (
            status,
            serde_json::from_slice(&bytes).expect("Body is not JSON"),
        )
    }

    #[tokio::test]
    async fn client_errors_include_message() {
        let (status, body) = body_json(Error::CategoryNotFound).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Category not found");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, body) = body_json(Error::HashingError("secret detail".to_owned())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["message"].as_str().unwrap().contains("secret detail"));
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }
}
