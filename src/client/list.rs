//! List state shared by the category, budget and transaction containers.

use crate::client::ClientError;

/// Identifies one fetch of a list. Later fetches get larger generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// What happened to a list when a fetch completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The list now holds the fetched items.
    Applied,
    /// A newer fetch was started after this one, so the response was dropped.
    Stale,
    /// No bearer token was saved, so no request was sent.
    Skipped,
    /// The fetch failed. The list keeps its previous items.
    Failed(String),
}

/// The items of a list plus the generation of the newest fetch.
#[derive(Debug, Clone)]
pub struct ListState<T> {
    items: Vec<T>,
    latest: u64,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            latest: 0,
        }
    }
}

impl<T> ListState<T> {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// The items from the last applied fetch.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Start a fetch. Responses for older tickets are discarded from now on.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest += 1;
        FetchTicket(self.latest)
    }

    /// Apply the result of the fetch started with `ticket`.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Option<Vec<T>>, ClientError>,
    ) -> FetchOutcome {
        if ticket.0 < self.latest {
            tracing::debug!(
                "discarding stale response for fetch {} (latest is {})",
                ticket.0,
                self.latest
            );
            return FetchOutcome::Stale;
        }

        match result {
            Ok(Some(items)) => {
                self.items = items;
                FetchOutcome::Applied
            }
            Ok(None) => FetchOutcome::Skipped,
            Err(error) => {
                tracing::error!("Error fetching list: {error:?}");
                FetchOutcome::Failed(error.to_string())
            }
        }
    }
}
