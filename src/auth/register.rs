//! The registration endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::Response,
};
use email_address::EmailAddress;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    ApiJson, AppState, Error, PasswordHash, ValidatedPassword, auth::CsrfVerified,
    db::lock_connection, message_response, user::create_user,
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The bcrypt cost for hashing the new user's password.
    pub password_cost: u32,
    /// The database connection for storing the new user.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            password_cost: state.password_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body of a registration request.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    /// The name the user will log in with.
    pub username: Option<String>,
    /// The user's email address.
    pub email: Option<String>,
    /// The user's chosen password.
    pub password: Option<String>,
}

/// Create a new user.
///
/// Responds with 201 on success. Blank fields count as missing.
pub async fn register_user(
    State(state): State<RegistrationState>,
    _: CsrfVerified,
    ApiJson(form): ApiJson<RegisterForm>,
) -> Result<Response, Error> {
    let username = non_blank(form.username.as_deref()).ok_or(Error::MissingFields)?;
    let email = non_blank(form.email.as_deref()).ok_or(Error::MissingFields)?;
    let password = form
        .password
        .as_deref()
        .filter(|password| !password.is_empty())
        .ok_or(Error::MissingFields)?;

    if !EmailAddress::is_valid(email) {
        return Err(Error::InvalidEmail);
    }

    let password = ValidatedPassword::new(password, &[username, email])?;
    let password_hash = PasswordHash::new(password, state.password_cost)?;

    let connection = lock_connection(&state.db_connection)?;
    let user = create_user(username, email, password_hash, &connection)?;

    tracing::info!("registered user {} ({})", user.username, user.id);

    Ok(message_response(
        StatusCode::CREATED,
        "Registration successful",
    ))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
