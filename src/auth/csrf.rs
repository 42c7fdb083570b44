//! CSRF tokens for the routes that run before a user has a bearer token.
//!
//! `GET /csrf_token` returns a fresh token in the JSON body and stores the
//! same token with its expiry in an encrypted, HTTP-only cookie. Guarded
//! routes extract [CsrfVerified], which requires the `X-CSRFToken` header to
//! match the unexpired cookie.

use axum::{
    Json,
    extract::{FromRef, FromRequestParts, State},
    http::request::Parts,
};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, Key, SameSite},
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{AppState, Error};

/// The name of the cookie that holds the CSRF token.
pub const CSRF_COOKIE: &str = "csrf_token";
/// The request header that must echo the CSRF token.
pub const CSRF_HEADER: &str = "X-CSRFToken";
/// How long a CSRF token is valid for after it is issued.
pub const DEFAULT_CSRF_DURATION: Duration = Duration::hours(1);

/// The JSON body returned by `GET /csrf_token`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrfTokenResponse {
    /// The token to send back in the `X-CSRFToken` header.
    pub csrf_token: String,
}

/// The state needed to issue CSRF tokens.
#[derive(Debug, Clone)]
pub struct CsrfState {
    /// The key for encrypting the CSRF cookie.
    pub cookie_key: Key,
    /// How long issued tokens are valid for.
    pub csrf_duration: Duration,
}

impl FromRef<AppState> for CsrfState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            csrf_duration: state.csrf_duration,
        }
    }
}

/// Issue a new CSRF token.
pub async fn get_csrf_token(
    State(state): State<CsrfState>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Json<CsrfTokenResponse>) {
    let token = Uuid::new_v4().to_string();
    let expiry = OffsetDateTime::now_utc() + state.csrf_duration;

    let jar = jar.add(
        Cookie::build((CSRF_COOKIE, format!("{token}|{}", expiry.unix_timestamp())))
            .path("/")
            .expires(expiry)
            .http_only(true)
            .same_site(SameSite::Strict),
    );

    (jar, Json(CsrfTokenResponse { csrf_token: token }))
}

/// Proof that the request carried a valid CSRF token.
///
/// Add this as an extractor before the body extractor of any handler that
/// must be protected against cross-site request forgery.
#[derive(Debug)]
pub struct CsrfVerified;

impl<S> FromRequestParts<S> for CsrfVerified
where
    Key: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header_token = parts
            .headers
            .get(CSRF_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .ok_or(Error::CsrfTokenMissing)?
            .to_owned();

        let Ok(jar) = PrivateCookieJar::<Key>::from_request_parts(parts, state).await;
        let cookie = jar.get(CSRF_COOKIE).ok_or(Error::CsrfTokenMissing)?;

        verify_csrf_token(&header_token, cookie.value_trimmed(), OffsetDateTime::now_utc())?;

        Ok(CsrfVerified)
    }
}

/// Check `header_token` against the `token|expiry` value of the CSRF cookie.
fn verify_csrf_token(
    header_token: &str,
    cookie_value: &str,
    now: OffsetDateTime,
) -> Result<(), Error> {
    let (cookie_token, raw_expiry) = cookie_value
        .split_once('|')
        .ok_or(Error::CsrfTokenInvalid)?;

    let expiry = raw_expiry
        .parse::<i64>()
        .ok()
        .and_then(|timestamp| OffsetDateTime::from_unix_timestamp(timestamp).ok())
        .ok_or(Error::CsrfTokenInvalid)?;

    if cookie_token != header_token || expiry <= now {
        return Err(Error::CsrfTokenInvalid);
    }

    Ok(())
}
