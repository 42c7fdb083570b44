//! Bearer token and CSRF handling, plus the registration and log-in endpoints.
//!
//! State-changing routes are authenticated with a JSON Web Token sent in the
//! `Authorization: Bearer <token>` header. The two routes that run before a
//! user has a token, registration and log-in, are instead guarded by a CSRF
//! token that the client primes with `GET /csrf_token`.

mod csrf;
mod log_in;
mod register;
mod token;

pub use csrf::{
    CSRF_COOKIE, CSRF_HEADER, CsrfTokenResponse, CsrfVerified, DEFAULT_CSRF_DURATION,
    get_csrf_token,
};
pub use log_in::{LogInForm, LogInResponse, log_in};
pub use register::{RegisterForm, register_user};
pub use token::{Claims, DEFAULT_TOKEN_DURATION, decode_token, encode_token};
