//! JSON Web Tokens that identify a logged-in user.

use std::sync::{Arc, Mutex};

use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{Header, Validation, decode, encode};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error, UserID, app_state::JwtKeys, db::lock_connection, user::get_user_by_id,
};

/// How long a bearer token stays valid after logging in.
pub const DEFAULT_TOKEN_DURATION: Duration = Duration::hours(24);

/// The contents of a bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: i64,
    /// The expiry time of the token as a unix timestamp.
    pub exp: i64,
    /// The time the token was issued as a unix timestamp.
    pub iat: i64,
}

impl Claims {
    /// The user the token was issued to.
    pub fn user_id(&self) -> UserID {
        UserID::new(self.sub)
    }
}

/// The state needed to check a bearer token.
#[derive(Debug, Clone)]
pub struct TokenState {
    /// The keys for verifying bearer tokens.
    pub jwt_keys: JwtKeys,
    /// The connection used to check that the token's user still exists.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TokenState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            jwt_keys: state.jwt_keys.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl<S> FromRequestParts<S> for Claims
where
    TokenState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| Error::Unauthenticated)?;

        let state = TokenState::from_ref(state);
        let claims = decode_token(bearer.token(), &state.jwt_keys)?;

        let connection = lock_connection(&state.db_connection)?;
        match get_user_by_id(claims.user_id(), &connection) {
            Ok(_) => Ok(claims),
            Err(Error::NotFound) => {
                tracing::debug!("rejected bearer token for unknown user {}", claims.sub);
                Err(Error::Unauthenticated)
            }
            Err(error) => Err(error),
        }
    }
}

/// Sign a token for `user_id` that expires `duration` from now.
///
/// # Errors
/// Returns [Error::TokenCreation] if the token could not be signed.
pub fn encode_token(user_id: UserID, keys: &JwtKeys, duration: Duration) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        sub: user_id.as_i64(),
        exp: (now + duration).unix_timestamp(),
        iat: now.unix_timestamp(),
    };

    encode(&Header::default(), &claims, &keys.encoding_key)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Check the signature and expiry of `token` and return its claims.
///
/// # Errors
/// Returns [Error::Unauthenticated] for malformed, tampered or expired tokens.
pub fn decode_token(token: &str, keys: &JwtKeys) -> Result<Claims, Error> {
    decode::<Claims>(token, &keys.decoding_key, &Validation::default())
        .map(|token_data| token_data.claims)
        .map_err(|error| {
            tracing::debug!("rejected bearer token: {error}");
            Error::Unauthenticated
        })
}
