//! A typed client for the MoneyLens REST API.
//!
//! [ApiClient] wraps the HTTP calls. The containers ([CategoryList],
//! [BudgetPlanner], [TransactionBrowser], [DashboardView] and [AuthForm])
//! hold the view state of a frontend on top of it: they re-fetch after every
//! successful change and turn failures into [Alert]s.

mod alert;
mod api;
mod auth;
mod budgets;
mod categories;
mod dashboard;
mod error;
mod list;
mod token;
mod transactions;

pub use alert::{Alert, MutationOutcome};
pub use api::{ApiClient, filter_query_string};
pub use auth::{AuthForm, CSRF_FETCH_FAILED, CSRF_NOT_AVAILABLE};
pub use budgets::{BudgetInput, BudgetPlanner};
pub use categories::CategoryList;
pub use dashboard::{
    DashboardState, DashboardView, NO_BUDGETS_TEXT, NO_EXPENSES_TEXT, NO_TREND_TEXT,
    OVER_BUDGET_MARKER, expense_breakdown_chart, render_dashboard, trend_chart,
};
pub use error::ClientError;
pub use list::{FetchOutcome, FetchTicket, ListState};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use transactions::{
    REQUIRED_FIELDS_ALERT, TransactionBrowser, TransactionEditor, TransactionInput,
    TransactionRow,
};
