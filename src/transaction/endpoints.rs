//! HTTP handlers for transaction CRUD.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::Response,
};
use rusqlite::Connection;

use crate::{
    ApiJson, AppState, Claims, Error,
    db::lock_connection,
    message_response,
    transaction::{
        Transaction, TransactionForm, TransactionId, create_transaction, delete_transaction,
        get_transaction, get_transactions, update_transaction,
    },
};

/// The state needed for the transaction endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List all of the user's transactions.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionState>,
    claims: Claims,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_transactions(claims.user_id(), &connection).map(Json)
}

/// A route handler for creating a new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    claims: Claims,
    ApiJson(form): ApiJson<TransactionForm>,
) -> Result<Response, Error> {
    let new_transaction = form.into_new_transaction()?;
    let connection = lock_connection(&state.db_connection)?;

    let transaction = create_transaction(claims.user_id(), new_transaction, &connection)?;
    tracing::debug!("created transaction {} for user {}", transaction.id, claims.sub);

    Ok(message_response(
        StatusCode::CREATED,
        "Transaction added successfully",
    ))
}

/// Get a single transaction.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    claims: Claims,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_transaction(claims.user_id(), transaction_id, &connection).map(Json)
}

/// A route handler for editing any subset of a transaction's fields.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    claims: Claims,
    Path(transaction_id): Path<TransactionId>,
    ApiJson(form): ApiJson<TransactionForm>,
) -> Result<Response, Error> {
    let update = form.into_update()?;
    let connection = lock_connection(&state.db_connection)?;

    update_transaction(claims.user_id(), transaction_id, update, &connection)?;

    Ok(message_response(
        StatusCode::OK,
        "Transaction updated successfully",
    ))
}

/// A route handler for deleting a transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    claims: Claims,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_transaction(claims.user_id(), transaction_id, &connection)?;

    Ok(message_response(
        StatusCode::OK,
        "Transaction deleted successfully",
    ))
}
