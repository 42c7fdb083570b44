//! Dashboard module
//!
//! Summarises the current month: totals, spending per category, the running
//! balance and how spending compares with the month's budgets.

mod aggregation;
mod handlers;
mod suggestions;
mod summary;

pub use handlers::{get_dashboard_endpoint, get_suggestions_endpoint};
pub use suggestions::{Suggestions, build_suggestions};
pub use summary::{
    BudgetVsActual, DashboardSummary, ExpenseBreakdown, TrendPoint, get_dashboard_summary,
};
