//! Registration and log in forms that fetch a CSRF token before submitting.

use std::sync::Arc;

use crate::{
    LogInForm, RegisterForm,
    client::{Alert, ApiClient},
};

/// Shown when a form is submitted before it has a CSRF token.
pub const CSRF_NOT_AVAILABLE: &str = "CSRF token not available. Please try again.";

/// Shown when the CSRF token could not be fetched.
pub const CSRF_FETCH_FAILED: &str = "Could not fetch CSRF token.";

/// A registration or log in form.
///
/// The form must be primed with [AuthForm::prime] before it can be submitted.
/// If priming fails the form stays unusable until it is primed again.
pub struct AuthForm {
    client: Arc<ApiClient>,
    csrf_token: Option<String>,
}

impl AuthForm {
    /// An unprimed form.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            csrf_token: None,
        }
    }

    /// Fetch a CSRF token. Returns an alert if the token could not be fetched.
    pub async fn prime(&mut self) -> Option<Alert> {
        match self.client.fetch_csrf_token().await {
            Ok(token) => {
                self.csrf_token = Some(token);
                None
            }
            Err(error) => {
                tracing::error!("Error fetching CSRF token: {error:?}");
                self.csrf_token = None;
                Some(Alert::Error(CSRF_FETCH_FAILED.to_owned()))
            }
        }
    }

    /// Whether the form holds a CSRF token.
    pub fn is_primed(&self) -> bool {
        self.csrf_token.is_some()
    }

    /// Submit a registration.
    pub async fn register(&self, form: &RegisterForm) -> Alert {
        let Some(csrf_token) = &self.csrf_token else {
            return Alert::Error(CSRF_NOT_AVAILABLE.to_owned());
        };

        match self.client.register(form, csrf_token).await {
            Ok(_) => Alert::Success("Registration successful! Please log in.".to_owned()),
            Err(error) => {
                tracing::error!("Registration failed: {error:?}");
                Alert::Error(format!("Registration failed: {error}"))
            }
        }
    }

    /// Submit a log in. On success the bearer token is saved by the client.
    pub async fn log_in(&self, form: &LogInForm) -> Alert {
        let Some(csrf_token) = &self.csrf_token else {
            return Alert::Error(CSRF_NOT_AVAILABLE.to_owned());
        };

        match self.client.log_in(form, csrf_token).await {
            Ok(()) => Alert::Success("Login successful!".to_owned()),
            Err(error) => {
                tracing::error!("Login failed: {error:?}");
                Alert::Error(format!("Login failed: {error}"))
            }
        }
    }
}
