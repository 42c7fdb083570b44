//! Dashboard HTTP handlers.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Claims, Error,
    dashboard::{
        DashboardSummary, Suggestions,
        aggregation::previous_month_range,
        build_suggestions, get_dashboard_summary,
        summary::get_expense_breakdown,
    },
    db::lock_connection,
    timezone::local_today,
};

/// The state needed for the dashboard endpoints.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions and budgets.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

fn get_today(local_timezone: &str) -> Result<Date, Error> {
    local_today(local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", local_timezone);
        Error::InvalidTimezoneError(local_timezone.to_owned())
    })
}

/// Summarise the current month for the user.
pub async fn get_dashboard_endpoint(
    State(state): State<DashboardState>,
    claims: Claims,
) -> Result<Json<DashboardSummary>, Error> {
    let today = get_today(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    get_dashboard_summary(claims.user_id(), today, &connection).map(Json)
}

/// Suggest ways to stay within budget this month.
pub async fn get_suggestions_endpoint(
    State(state): State<DashboardState>,
    claims: Claims,
) -> Result<Json<Suggestions>, Error> {
    let today = get_today(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    let summary = get_dashboard_summary(claims.user_id(), today, &connection)?;
    let previous_month =
        get_expense_breakdown(claims.user_id(), &previous_month_range(today), &connection)?;

    Ok(Json(Suggestions {
        suggestions: build_suggestions(&summary, &previous_month),
    }))
}
