//! User-facing alerts and the result of a create, edit or delete.

use crate::client::ClientError;

/// A message to show the user after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// The action worked.
    Success(String),
    /// The action failed. The text names the reason.
    Error(String),
}

impl Alert {
    /// The text to display.
    pub fn text(&self) -> &str {
        match self {
            Alert::Success(text) | Alert::Error(text) => text,
        }
    }
}

/// What happened when a container asked the server to change a record.
///
/// Only [MutationOutcome::Done] means the server's data changed, so it is the
/// only outcome after which a container re-fetches its list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The server accepted the change.
    Done(Alert),
    /// The request failed and nothing changed.
    Failed(Alert),
    /// No bearer token was saved, so no request was sent.
    Skipped,
}

impl MutationOutcome {
    /// Turn the result of an API call into an outcome.
    ///
    /// `success` is shown when the call worked, `action` names the action in
    /// the error alert, e.g. "adding category".
    pub(crate) fn from_result(
        result: Result<Option<String>, ClientError>,
        success: &str,
        action: &str,
    ) -> Self {
        match result {
            Ok(Some(_)) => MutationOutcome::Done(Alert::Success(success.to_owned())),
            Ok(None) => MutationOutcome::Skipped,
            Err(error) => {
                tracing::error!("Error {action}: {error:?}");
                MutationOutcome::Failed(Alert::Error(format!("Error {action}: {error}")))
            }
        }
    }

    /// Whether the owning container should re-fetch its list.
    pub fn should_refresh(&self) -> bool {
        matches!(self, MutationOutcome::Done(_))
    }

    /// The alert to show, if any.
    pub fn alert(&self) -> Option<&Alert> {
        match self {
            MutationOutcome::Done(alert) | MutationOutcome::Failed(alert) => Some(alert),
            MutationOutcome::Skipped => None,
        }
    }
}
