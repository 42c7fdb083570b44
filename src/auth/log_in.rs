//! The log-in endpoint, which exchanges a username and password for a bearer token.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    ApiJson, AppState, Error,
    app_state::JwtKeys,
    auth::{CsrfVerified, encode_token},
    db::lock_connection,
    user::get_user_by_username,
};

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The keys for signing bearer tokens.
    pub jwt_keys: JwtKeys,
    /// How long issued tokens are valid for.
    pub token_duration: Duration,
    /// The connection used to look up the user logging in.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            jwt_keys: state.jwt_keys.clone(),
            token_duration: state.token_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body of a log-in request.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LogInForm {
    /// The user's username.
    pub username: Option<String>,
    /// The user's password.
    pub password: Option<String>,
}

/// The JSON body of a successful log-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogInResponse {
    /// The bearer token for authenticating later requests.
    pub token: String,
}

/// Check the user's credentials and issue a bearer token.
///
/// Unknown usernames and wrong passwords get the same response so that
/// clients cannot probe for registered usernames.
pub async fn log_in(
    State(state): State<LogInState>,
    _: CsrfVerified,
    ApiJson(form): ApiJson<LogInForm>,
) -> Result<Json<LogInResponse>, Error> {
    let username = form
        .username
        .as_deref()
        .map(str::trim)
        .filter(|username| !username.is_empty())
        .ok_or(Error::MissingFields)?;
    let password = form
        .password
        .as_deref()
        .filter(|password| !password.is_empty())
        .ok_or(Error::MissingFields)?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        get_user_by_username(username, &connection).map_err(|error| match error {
            Error::NotFound => Error::InvalidCredentials,
            error => error,
        })?
    };

    let is_password_correct = user.password_hash.verify(password).map_err(|error| {
        tracing::error!("Error verifying password for {}: {}", user.username, error);
        Error::HashingError(error.to_string())
    })?;

    if !is_password_correct {
        return Err(Error::InvalidCredentials);
    }

    let token = encode_token(user.id, &state.jwt_keys, state.token_duration)?;

    tracing::info!("user {} logged in", user.id);

    Ok(Json(LogInResponse { token }))
}

#[cfg(test)]
mod log_in_tests {
    use axum::{
        Router,
        http::StatusCode,
        routing::{get, post},
    };
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        AppState, PasswordHash, UserID, ValidatedPassword,
        app_state::test_state::get_test_app_state,
        auth::{
            CSRF_HEADER, LogInResponse, decode_token, get_csrf_token, log_in,
            test_utils::prime_csrf,
        },
        db::lock_connection,
        endpoints,
        user::create_user,
    };

    fn get_test_server() -> (TestServer, AppState, UserID) {
        let state = get_test_app_state();
        let user_id = {
            let connection = lock_connection(&state.db_connection).unwrap();
            let password_hash = PasswordHash::new(
                ValidatedPassword::new_unchecked("ledger-otter-marmalade-42"),
                4,
            )
            .unwrap();
            create_user("alice", "alice@example.com", password_hash, &connection)
                .unwrap()
                .id
        };
        let app = Router::new()
            .route(endpoints::CSRF_TOKEN, get(get_csrf_token))
            .route(endpoints::LOG_IN, post(log_in))
            .with_state(state.clone());

        (
            TestServer::try_new(app).expect("Could not create test server."),
            state,
            user_id,
        )
    }

    async fn post_log_in(server: &TestServer, body: serde_json::Value) -> axum_test::TestResponse {
        let (cookie, token) = prime_csrf(server).await;

        server
            .post(endpoints::LOG_IN)
            .add_cookie(cookie)
            .add_header(CSRF_HEADER, token)
            .json(&body)
            .await
    }

    #[tokio::test]
    async fn log_in_returns_token_for_user() {
        let (server, state, user_id) = get_test_server();

        let response = post_log_in(
            &server,
            json!({ "username": "alice", "password": "ledger-otter-marmalade-42" }),
        )
        .await;

        response.assert_status_ok();
        let token = response.json::<LogInResponse>().token;
        let claims = decode_token(&token, &state.jwt_keys).expect("token should be valid");
        assert_eq!(claims.user_id(), user_id);
    }

    #[tokio::test]
    async fn log_in_with_wrong_password_fails() {
        let (server, _, _) = get_test_server();

        let response = post_log_in(
            &server,
            json!({ "username": "alice", "password": "wrong-password" }),
        )
        .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({ "message": "Invalid username or password" }));
    }

    #[tokio::test]
    async fn log_in_with_unknown_user_fails() {
        let (server, _, _) = get_test_server();

        let response = post_log_in(
            &server,
            json!({ "username": "mallory", "password": "ledger-otter-marmalade-42" }),
        )
        .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn log_in_with_missing_password_fails() {
        let (server, _, _) = get_test_server();

        let response = post_log_in(&server, json!({ "username": "alice" })).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "message": "Missing required fields" }));
    }

    #[tokio::test]
    async fn log_in_without_csrf_token_fails() {
        let (server, _, _) = get_test_server();

        server
            .post(endpoints::LOG_IN)
            .json(&json!({ "username": "alice", "password": "ledger-otter-marmalade-42" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
