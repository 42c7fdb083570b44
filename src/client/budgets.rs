//! The budget planner container.

use std::sync::Arc;

use crate::{
    Budget, BudgetForm, BudgetId, Category, CategoryId,
    client::{ApiClient, FetchOutcome, ListState, MutationOutcome},
};

/// The text fields of the "set budget" form.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BudgetInput {
    /// The selected category.
    pub category_id: Option<CategoryId>,
    /// The limit as typed, e.g. "250".
    pub monthly_limit: String,
    /// The month as typed, e.g. "3".
    pub month: String,
    /// The year as typed, e.g. "2025".
    pub year: String,
}

impl BudgetInput {
    /// Convert the typed text into the JSON body.
    ///
    /// Numbers that do not parse are sent as missing.
    pub fn to_form(&self) -> BudgetForm {
        BudgetForm {
            category_id: self.category_id,
            monthly_limit: self.monthly_limit.trim().parse().ok(),
            month: self.month.trim().parse().ok(),
            year: self.year.trim().parse().ok(),
        }
    }
}

/// The user's budgets and the categories to choose from.
pub struct BudgetPlanner {
    client: Arc<ApiClient>,
    categories: ListState<Category>,
    budgets: ListState<Budget>,
}

impl BudgetPlanner {
    /// An empty planner. Call [BudgetPlanner::refresh] to load it.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            categories: ListState::new(),
            budgets: ListState::new(),
        }
    }

    /// The categories a budget can be set for.
    pub fn categories(&self) -> &[Category] {
        self.categories.items()
    }

    /// The budgets from the last successful fetch.
    pub fn budgets(&self) -> &[Budget] {
        self.budgets.items()
    }

    /// Re-fetch the categories and the budgets.
    ///
    /// Returns the outcome of the budget fetch. Category fetch failures are only logged.
    pub async fn refresh(&mut self) -> FetchOutcome {
        let ticket = self.categories.begin_fetch();
        let result = self.client.get_categories().await;
        if let FetchOutcome::Failed(error) = self.categories.complete(ticket, result) {
            tracing::error!("Error fetching categories: {error}");
        }

        self.refresh_budgets().await
    }

    /// Re-fetch only the budgets.
    pub async fn refresh_budgets(&mut self) -> FetchOutcome {
        let ticket = self.budgets.begin_fetch();
        let result = self.client.get_budgets().await;

        self.budgets.complete(ticket, result)
    }

    /// Set the limit for a category and month.
    pub async fn set_budget(&mut self, input: &BudgetInput) -> MutationOutcome {
        let result = self.client.set_budget(&input.to_form()).await;
        let outcome =
            MutationOutcome::from_result(result, "Budget set successfully!", "setting budget");

        if outcome.should_refresh() {
            self.refresh_budgets().await;
        }

        outcome
    }

    /// Delete the budget `budget_id`.
    pub async fn delete_budget(&mut self, budget_id: BudgetId) -> MutationOutcome {
        let result = self.client.delete_budget(budget_id).await;
        let outcome =
            MutationOutcome::from_result(result, "Budget deleted successfully!", "deleting budget");

        if outcome.should_refresh() {
            self.refresh_budgets().await;
        }

        outcome
    }
}
