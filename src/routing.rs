//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::{
    AppState, Error,
    auth::{get_csrf_token, log_in, register_user},
    budget::{delete_budget_endpoint, get_budgets_endpoint, upsert_budget_endpoint},
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
        rename_category_endpoint,
    },
    dashboard::{get_dashboard_endpoint, get_suggestions_endpoint},
    endpoints,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, export_transactions_endpoint,
        filter_transactions_endpoint, get_transaction_endpoint, get_transactions_endpoint,
        update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Protected routes reject requests without a valid bearer token.
/// Registration and log-in instead require a CSRF token.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::CSRF_TOKEN, get(get_csrf_token))
        .route(endpoints::REGISTER, post(register_user))
        .route(endpoints::LOG_IN, post(log_in));

    let protected_routes = Router::new()
        .route(
            endpoints::CATEGORIES,
            get(get_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            put(rename_category_endpoint).delete(delete_category_endpoint),
        )
        .route(
            endpoints::BUDGETS,
            get(get_budgets_endpoint).post(upsert_budget_endpoint),
        )
        .route(endpoints::BUDGET, delete(delete_budget_endpoint))
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::FILTER_TRANSACTIONS,
            get(filter_transactions_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(endpoints::DASHBOARD, get(get_dashboard_endpoint))
        .route(endpoints::EXPORT, get(export_transactions_endpoint))
        .route(endpoints::SUGGESTIONS, get(get_suggestions_endpoint));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}
