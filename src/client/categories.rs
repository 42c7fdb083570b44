//! The category list container.

use std::sync::Arc;

use crate::{
    Category, CategoryId,
    client::{ApiClient, FetchOutcome, ListState, MutationOutcome},
};

/// The user's categories plus the actions that change them.
///
/// Every successful change is followed by one re-fetch of the list.
pub struct CategoryList {
    client: Arc<ApiClient>,
    list: ListState<Category>,
}

impl CategoryList {
    /// An empty list. Call [CategoryList::refresh] to load it.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            list: ListState::new(),
        }
    }

    /// The categories from the last successful fetch.
    pub fn categories(&self) -> &[Category] {
        self.list.items()
    }

    /// Re-fetch the categories from the server.
    pub async fn refresh(&mut self) -> FetchOutcome {
        let ticket = self.list.begin_fetch();
        let result = self.client.get_categories().await;

        self.list.complete(ticket, result)
    }

    /// Add a category called `name`.
    pub async fn add(&mut self, name: &str) -> MutationOutcome {
        let result = self.client.create_category(name).await;
        let outcome =
            MutationOutcome::from_result(result, "Category added successfully!", "adding category");

        self.refresh_after(outcome).await
    }

    /// Rename the category `category_id`.
    pub async fn rename(&mut self, category_id: CategoryId, name: &str) -> MutationOutcome {
        let result = self.client.rename_category(category_id, name).await;
        let outcome = MutationOutcome::from_result(
            result,
            "Category updated successfully!",
            "updating category",
        );

        self.refresh_after(outcome).await
    }

    /// Delete the category `category_id`.
    pub async fn delete(&mut self, category_id: CategoryId) -> MutationOutcome {
        let result = self.client.delete_category(category_id).await;
        let outcome = MutationOutcome::from_result(
            result,
            "Category deleted successfully!",
            "deleting category",
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
