//! HTTP handlers for listing, creating, renaming and deleting categories.

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
    category::{
        Category, CategoryForm, CategoryId, CategoryName, create_category, delete_category,
        get_all_categories, rename_category,
    },
    db::lock_connection,
    message_response,
};

/// The state needed for the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn parse_name(form: &CategoryForm) -> Result<CategoryName, Error> {
    CategoryName::new(form.name.as_deref().unwrap_or_default())
}

/// List the user's categories in alphabetical order.
pub async fn get_categories_endpoint(
    State(state): State<CategoryState>,
    claims: Claims,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_all_categories(claims.user_id(), &connection).map(Json)
}

/// A route handler for creating a new category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    claims: Claims,
    ApiJson(form): ApiJson<CategoryForm>,
) -> Result<Response, Error> {
    let name = parse_name(&form)?;
    let connection = lock_connection(&state.db_connection)?;

    let category = create_category(claims.user_id(), name, &connection)?;
    tracing::debug!("created category {} for user {}", category.id, claims.sub);

    Ok(message_response(
        StatusCode::CREATED,
        "Category added successfully",
    ))
}

/// A route handler for renaming a category.
///
/// Transactions and budgets refer to the category by ID, so they pick up the new name.
pub async fn rename_category_endpoint(
    State(state): State<CategoryState>,
    claims: Claims,
    Path(category_id): Path<CategoryId>,
    ApiJson(form): ApiJson<CategoryForm>,
) -> Result<Response, Error> {
    let name = parse_name(&form)?;
    let connection = lock_connection(&state.db_connection)?;

    rename_category(claims.user_id(), category_id, name, &connection)?;

    Ok(message_response(
        StatusCode::OK,
        "Category updated successfully",
    ))
}

/// A route handler for deleting a category and its budgets.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    claims: Claims,
    Path(category_id): Path<CategoryId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_category(claims.user_id(), category_id, &connection)?;

    Ok(message_response(
        StatusCode::OK,
        "Category deleted successfully",
    ))
}
