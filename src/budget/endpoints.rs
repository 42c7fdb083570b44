//! HTTP handlers for the budget planner.

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
    budget::{
        Budget, BudgetForm, BudgetId, BudgetWrite, NewBudget, delete_budget, get_budgets,
        upsert_budget,
    },
    db::lock_connection,
    message_response,
};

/// The state needed for the budget endpoints.
#[derive(Debug, Clone)]
pub struct BudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List all of the user's budgets.
pub async fn get_budgets_endpoint(
    State(state): State<BudgetState>,
    claims: Claims,
) -> Result<Json<Vec<Budget>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_budgets(claims.user_id(), &connection).map(Json)
}

/// Set the limit for a category and month.
///
/// Responds with 201 when a new budget is created and 200 when an existing
/// budget's limit is replaced.
pub async fn upsert_budget_endpoint(
    State(state): State<BudgetState>,
    claims: Claims,
    ApiJson(form): ApiJson<BudgetForm>,
) -> Result<Response, Error> {
    let new_budget = NewBudget::try_from(form)?;
    let connection = lock_connection(&state.db_connection)?;

    let (_, write) = upsert_budget(claims.user_id(), new_budget, &connection)?;

    Ok(match write {
        BudgetWrite::Created => {
            message_response(StatusCode::CREATED, "Budget added successfully")
        }
        BudgetWrite::Updated => message_response(StatusCode::OK, "Budget updated successfully"),
    })
}

/// A route handler for deleting a budget.
pub async fn delete_budget_endpoint(
    State(state): State<BudgetState>,
    claims: Claims,
    Path(budget_id): Path<BudgetId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_budget(claims.user_id(), budget_id, &connection)?;

    Ok(message_response(StatusCode::OK, "Budget deleted successfully"))
}
