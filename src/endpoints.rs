//! The REST API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/categories/{category_id}', use [format_endpoint].

/// The route for fetching a CSRF token before registering or logging in.
pub const CSRF_TOKEN: &str = "/csrf_token";
/// The route for creating a new user.
pub const REGISTER: &str = "/register";
/// The route for exchanging credentials for a bearer token.
pub const LOG_IN: &str = "/login";
/// The route to list and create categories.
pub const CATEGORIES: &str = "/categories";
/// The route to rename or delete a single category.
pub const CATEGORY: &str = "/categories/{category_id}";
/// The route to list and create or update budgets.
pub const BUDGETS: &str = "/budgets";
/// The route to delete a single budget.
pub const BUDGET: &str = "/budgets/{budget_id}";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/transactions/{transaction_id}";
/// The route for querying transactions by month, year, category and search text.
pub const FILTER_TRANSACTIONS: &str = "/transactions/filter";
/// The route for the current month's summary.
pub const DASHBOARD: &str = "/dashboard";
/// The route for downloading all transactions as CSV.
pub const EXPORT: &str = "/export";
/// The route for spending suggestions.
pub const SUGGESTIONS: &str = "/suggestions";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter starts with a left brace and ends with the next right brace,
/// e.g. '{category_id}' in '/categories/{category_id}'.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
