//! The transaction browser: filtered list, add form and inline editing.

use std::sync::Arc;

use crate::{
    CategoryId, Transaction, TransactionFilterQuery, TransactionForm, TransactionId,
    client::{Alert, ApiClient, FetchOutcome, ListState, MutationOutcome},
};

/// Shown when the add form is submitted with a required field left blank.
pub const REQUIRED_FIELDS_ALERT: &str = "Please fill in all required fields.";

/// The text fields of the add and edit transaction forms.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionInput {
    /// A short name, e.g. "Weekly shop".
    pub title: String,
    /// The amount as typed, e.g. "42.5".
    pub amount: String,
    /// "Income" or "Expense".
    pub transaction_type: String,
    /// The date as `YYYY-MM-DD`.
    pub date: String,
    /// The selected category.
    pub category_id: Option<CategoryId>,
    /// Optional notes.
    pub description: String,
}

impl Default for TransactionInput {
    fn default() -> Self {
        Self {
            title: String::new(),
            amount: String::new(),
            transaction_type: "Expense".to_owned(),
            date: String::new(),
            category_id: None,
            description: String::new(),
        }
    }
}

impl From<&Transaction> for TransactionInput {
    fn from(transaction: &Transaction) -> Self {
        Self {
            title: transaction.title.clone(),
            amount: transaction.amount.to_string(),
            transaction_type: transaction.transaction_type.to_string(),
            date: transaction.date.to_string(),
            category_id: Some(transaction.category_id),
            description: transaction.description.clone().unwrap_or_default(),
        }
    }
}

impl TransactionInput {
    /// Whether every required field has a value.
    pub fn is_complete(&self) -> bool {
        [&self.title, &self.amount, &self.transaction_type, &self.date]
            .iter()
            .all(|field| !field.trim().is_empty())
            && self.category_id.is_some()
    }

    /// Convert the typed text into the JSON body.
    ///
    /// The amount is sent as a number. An amount that does not parse is sent
    /// as missing, and a blank description is left out.
    pub fn to_form(&self) -> TransactionForm {
        let description = self.description.trim();

        TransactionForm {
            title: Some(self.title.clone()),
            amount: self.amount.trim().parse().ok(),
            transaction_type: Some(self.transaction_type.clone()),
            date: Some(self.date.clone()),
            category_id: self.category_id,
            description: (!description.is_empty()).then(|| description.to_owned()),
        }
    }
}

/// The inline edit form that replaces a row of the list while it is open.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionEditor {
    /// The transaction being edited.
    pub transaction_id: TransactionId,
    /// The form fields, pre-filled from the server.
    pub input: TransactionInput,
}

/// A row of the transaction list.
#[derive(Debug, PartialEq)]
pub enum TransactionRow<'a> {
    /// A transaction shown as text.
    Display(&'a Transaction),
    /// The edit form for the transaction in this position.
    Editing(&'a TransactionEditor),
}

/// The filtered transaction list plus the add, edit and delete actions.
///
/// Changing a filter or adding a transaction triggers one re-fetch.
pub struct TransactionBrowser {
    client: Arc<ApiClient>,
    list: ListState<Transaction>,
    filters: TransactionFilterQuery,
    editor: Option<TransactionEditor>,
    error: Option<String>,
}

impl TransactionBrowser {
    /// An empty browser with no filters. Call [TransactionBrowser::refresh] to load it.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            list: ListState::new(),
            filters: TransactionFilterQuery::default(),
            editor: None,
            error: None,
        }
    }

    /// The transactions from the last successful fetch.
    pub fn transactions(&self) -> &[Transaction] {
        self.list.items()
    }

    /// The current filters.
    pub fn filters(&self) -> &TransactionFilterQuery {
        &self.filters
    }

    /// The error from the last fetch, if it failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The rows to display, with the open editor in place of its transaction.
    pub fn rows(&self) -> Vec<TransactionRow<'_>> {
        self.list
            .items()
            .iter()
            .map(|transaction| match &self.editor {
                Some(editor) if editor.transaction_id == transaction.id => {
                    TransactionRow::Editing(editor)
                }
                _ => TransactionRow::Display(transaction),
            })
            .collect()
    }

    /// Re-fetch the transactions that match the current filters.
    pub async fn refresh(&mut self) -> FetchOutcome {
        let ticket = self.list.begin_fetch();
        let result = self.client.filter_transactions(&self.filters).await;
        let outcome = self.list.complete(ticket, result);

        match &outcome {
            FetchOutcome::Applied => self.error = None,
            FetchOutcome::Failed(error) => self.error = Some(error.clone()),
            FetchOutcome::Stale | FetchOutcome::Skipped => {}
        }

        outcome
    }

    /// Replace the filters and re-fetch.
    pub async fn set_filters(&mut self, filters: TransactionFilterQuery) -> FetchOutcome {
        self.filters = filters;
        self.refresh().await
    }

    /// Re-fetch after a transaction was added somewhere else.
    pub async fn transaction_added(&mut self) -> FetchOutcome {
        self.refresh().await
    }

    /// Submit the add form.
    ///
    /// Nothing is sent if a required field is blank.
    pub async fn add(&mut self, input: &TransactionInput) -> MutationOutcome {
        if !input.is_complete() {
            return MutationOutcome::Failed(Alert::Error(REQUIRED_FIELDS_ALERT.to_owned()));
        }

        let result = self.client.create_transaction(&input.to_form()).await;
        let outcome = MutationOutcome::from_result(
            result,
            "Transaction added successfully!",
            "adding transaction",
        );

        self.refresh_after(outcome).await
    }

    /// Open the inline editor for `transaction_id`, pre-filled from the server.
    ///
    /// Returns an alert if the transaction could not be fetched.
    pub async fn start_edit(&mut self, transaction_id: TransactionId) -> Option<Alert> {
        match self.client.get_transaction(transaction_id).await {
            Ok(Some(transaction)) => {
                self.editor = Some(TransactionEditor {
                    transaction_id,
                    input: TransactionInput::from(&transaction),
                });
                None
            }
            Ok(None) => None,
            Err(error) => {
                tracing::error!("Error fetching transaction: {error:?}");
                self.editor = None;
                Some(Alert::Error(format!("Error fetching transaction: {error}")))
            }
        }
    }

    /// The open editor, if any.
    pub fn editor_mut(&mut self) -> Option<&mut TransactionEditor> {
        self.editor.as_mut()
    }

    /// Close the editor without saving.
    pub fn cancel_edit(&mut self) {
        self.editor = None;
    }

    /// Save the open editor. The editor closes if the server accepts the change.
    pub async fn save_edit(&mut self) -> MutationOutcome {
        let Some(editor) = &self.editor else {
            return MutationOutcome::Skipped;
        };

        let result = self
            .client
            .update_transaction(editor.transaction_id, &editor.input.to_form())
            .await;
        let outcome = MutationOutcome::from_result(
            result,
            "Transaction updated successfully!",
            "updating transaction",
        );

        if outcome.should_refresh() {
            self.editor = None;
        }

        self.refresh_after(outcome).await
    }

    /// Delete the transaction `transaction_id`.
    pub async fn delete(&mut self, transaction_id: TransactionId) -> MutationOutcome {
        let result = self.client.delete_transaction(transaction_id).await;
        let outcome = MutationOutcome::from_result(
            result,
            "Transaction deleted successfully!",
            "deleting transaction",
        );

        self.refresh_after(outcome).await
    }

    async fn refresh_after(&mut self, outcome: MutationOutcome) -> MutationOutcome {
        if outcome.should_refresh() {
            self.refresh().await;
        }

        outcome
    }
}
