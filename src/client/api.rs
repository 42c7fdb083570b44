//! A thin wrapper around `reqwest` that knows the MoneyLens endpoints.

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    Budget, BudgetForm, BudgetId, CSRF_HEADER, Category, CategoryId, CsrfTokenResponse,
    DashboardSummary, LogInForm, LogInResponse, RegisterForm, Suggestions, Transaction,
    TransactionFilterQuery, TransactionForm, TransactionId,
    client::{ClientError, TokenStore},
    endpoints::{self, format_endpoint},
};

/// The body of every mutation response and every error response.
#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

/// An HTTP client for the MoneyLens API.
///
/// Calls that need a bearer token return `Ok(None)` without touching the
/// network when the token store is empty.
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Create a client for the server at `base_url`, e.g. "http://127.0.0.1:3000".
    ///
    /// The client keeps cookies so the CSRF cookie set by `/csrf_token` is
    /// sent back with the following `/register` or `/login` request.
    ///
    /// # Errors
    /// Returns [ClientError::Build] if the TLS backend could not be initialised.
    pub fn new(base_url: &str, tokens: impl TokenStore + 'static) -> Result<Self, ClientError> {
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|error| ClientError::Build(error.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            tokens: Arc::new(tokens),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Whether a bearer token is saved.
    pub fn is_logged_in(&self) -> bool {
        self.tokens.load().is_some()
    }

    fn authorized(&self, method: Method, path: &str) -> Option<RequestBuilder> {
        let Some(token) = self.tokens.load() else {
            tracing::debug!("no bearer token, skipping {method} {path}");
            return None;
        };

        Some(self.http.request(method, self.url(path)).bearer_auth(token))
    }

    /// Ask the server for a CSRF token. The matching cookie is kept by the client.
    pub async fn fetch_csrf_token(&self) -> Result<String, ClientError> {
        let request = self.http.get(self.url(endpoints::CSRF_TOKEN));
        let response: CsrfTokenResponse = send_json(request).await?;

        Ok(response.csrf_token)
    }

    /// Register a new user. Returns the server's confirmation message.
    pub async fn register(
        &self,
        form: &RegisterForm,
        csrf_token: &str,
    ) -> Result<String, ClientError> {
        let request = self
            .http
            .post(self.url(endpoints::REGISTER))
            .header(CSRF_HEADER, csrf_token)
            .json(form);

        send_message(request).await
    }

    /// Log in and save the issued bearer token.
    pub async fn log_in(&self, form: &LogInForm, csrf_token: &str) -> Result<(), ClientError> {
        let request = self
            .http
            .post(self.url(endpoints::LOG_IN))
            .header(CSRF_HEADER, csrf_token)
            .json(form);
        let response: LogInResponse = send_json(request).await?;

        self.tokens.save(&response.token)
    }

    /// Forget the saved bearer token.
    pub fn log_out(&self) -> Result<(), ClientError> {
        self.tokens.clear()
    }

    /// All of the user's categories ordered by name.
    pub async fn get_categories(&self) -> Result<Option<Vec<Category>>, ClientError> {
        send_optional(self.authorized(Method::GET, endpoints::CATEGORIES)).await
    }

    /// Add a category called `name`.
    pub async fn create_category(&self, name: &str) -> Result<Option<String>, ClientError> {
        let request = self
            .authorized(Method::POST, endpoints::CATEGORIES)
            .map(|request| request.json(&serde_json::json!({ "name": name })));

        send_optional_message(request).await
    }

    /// Rename the category `category_id` to `name`.
    pub async fn rename_category(
        &self,
        category_id: CategoryId,
        name: &str,
    ) -> Result<Option<String>, ClientError> {
        let path = format_endpoint(endpoints::CATEGORY, category_id);
        let request = self
            .authorized(Method::PUT, &path)
            .map(|request| request.json(&serde_json::json!({ "name": name })));

        send_optional_message(request).await
    }

    /// Delete the category `category_id`.
    pub async fn delete_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Option<String>, ClientError> {
        let path = format_endpoint(endpoints::CATEGORY, category_id);

        send_optional_message(self.authorized(Method::DELETE, &path)).await
    }

    /// All of the user's budgets, newest month first.
    pub async fn get_budgets(&self) -> Result<Option<Vec<Budget>>, ClientError> {
        send_optional(self.authorized(Method::GET, endpoints::BUDGETS)).await
    }

    /// Create a budget or replace the limit of an existing one.
    pub async fn set_budget(&self, form: &BudgetForm) -> Result<Option<String>, ClientError> {
        let request = self
            .authorized(Method::POST, endpoints::BUDGETS)
            .map(|request| request.json(form));

        send_optional_message(request).await
    }

    /// Delete the budget `budget_id`.
    pub async fn delete_budget(&self, budget_id: BudgetId) -> Result<Option<String>, ClientError> {
        let path = format_endpoint(endpoints::BUDGET, budget_id);

        send_optional_message(self.authorized(Method::DELETE, &path)).await
    }

    /// All of the user's transactions.
    pub async fn get_transactions(&self) -> Result<Option<Vec<Transaction>>, ClientError> {
        send_optional(self.authorized(Method::GET, endpoints::TRANSACTIONS)).await
    }

    /// A single transaction.
    pub async fn get_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<Transaction>, ClientError> {
        let path = format_endpoint(endpoints::TRANSACTION, transaction_id);

        send_optional(self.authorized(Method::GET, &path)).await
    }

    /// Record a new transaction.
    pub async fn create_transaction(
        &self,
        form: &TransactionForm,
    ) -> Result<Option<String>, ClientError> {
        let request = self
            .authorized(Method::POST, endpoints::TRANSACTIONS)
            .map(|request| request.json(form));

        send_optional_message(request).await
    }

    /// Change the fields of `transaction_id` that are set in `form`.
    pub async fn update_transaction(
        &self,
        transaction_id: TransactionId,
        form: &TransactionForm,
    ) -> Result<Option<String>, ClientError> {
        let path = format_endpoint(endpoints::TRANSACTION, transaction_id);
        let request = self
            .authorized(Method::PUT, &path)
            .map(|request| request.json(form));

        send_optional_message(request).await
    }

    /// Delete the transaction `transaction_id`.
    pub async fn delete_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<String>, ClientError> {
        let path = format_endpoint(endpoints::TRANSACTION, transaction_id);

        send_optional_message(self.authorized(Method::DELETE, &path)).await
    }

    /// The transactions matching the non-empty filters in `query`.
    pub async fn filter_transactions(
        &self,
        query: &TransactionFilterQuery,
    ) -> Result<Option<Vec<Transaction>>, ClientError> {
        let query_string = filter_query_string(query)?;
        let path = if query_string.is_empty() {
            endpoints::FILTER_TRANSACTIONS.to_owned()
        } else {
            format!("{}?{}", endpoints::FILTER_TRANSACTIONS, query_string)
        };

        send_optional(self.authorized(Method::GET, &path)).await
    }

    /// The summary of the current month.
    pub async fn get_dashboard(&self) -> Result<Option<DashboardSummary>, ClientError> {
        send_optional(self.authorized(Method::GET, endpoints::DASHBOARD)).await
    }

    /// Spending advice for the current month.
    pub async fn get_suggestions(&self) -> Result<Option<Suggestions>, ClientError> {
        send_optional(self.authorized(Method::GET, endpoints::SUGGESTIONS)).await
    }

    /// All of the user's transactions as CSV text.
    pub async fn export_csv(&self) -> Result<Option<String>, ClientError> {
        let Some(request) = self.authorized(Method::GET, endpoints::EXPORT) else {
            return Ok(None);
        };

        let response = send(request).await?;
        Ok(Some(response.text().await?))
    }
}

/// Encode the filters that have a non-blank value as a URL query string.
///
/// # Errors
/// Returns [ClientError::Query] if the values cannot be URL encoded.
pub fn filter_query_string(query: &TransactionFilterQuery) -> Result<String, ClientError> {
    let pairs: Vec<(&str, &str)> = [
        ("month", &query.month),
        ("year", &query.year),
        ("category", &query.category),
        ("search", &query.search),
    ]
    .into_iter()
    .filter_map(|(key, value)| {
        value
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(|value| (key, value))
    })
    .collect();

    serde_urlencoded::to_string(pairs).map_err(|error| ClientError::Query(error.to_string()))
}

async fn send(request: RequestBuilder) -> Result<Response, ClientError> {
    let response = request
        .send()
        .await
        .map_err(|error| ClientError::Transport(error.to_string()))?;
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<MessageBody>()
        .await
        .ok()
        .map(|body| body.message);

    Err(ClientError::Http { status, message })
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    send(request)
        .await?
        .json::<T>()
        .await
        .map_err(|error| ClientError::Decode(error.to_string()))
}

async fn send_message(request: RequestBuilder) -> Result<String, ClientError> {
    send_json::<MessageBody>(request)
        .await
        .map(|body| body.message)
}

async fn send_optional<T: DeserializeOwned>(
    request: Option<RequestBuilder>,
) -> Result<Option<T>, ClientError> {
    match request {
        Some(request) => send_json(request).await.map(Some),
        None => Ok(None),
    }
}

async fn send_optional_message(
    request: Option<RequestBuilder>,
) -> Result<Option<String>, ClientError> {
    match request {
        Some(request) => send_message(request).await.map(Some),
        None => Ok(None),
    }
}
