//! Errors returned by the API client.

use reqwest::StatusCode;

/// The ways a call to the MoneyLens API can fail.
///
/// The `Display` text is what an alert shows the user: the server's message
/// when it sent one, otherwise the transport or HTTP error text.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ClientError {
    /// The HTTP client could not be created.
    #[error("could not build the HTTP client: {0}")]
    Build(String),

    /// The request never got a response, e.g. the server is down.
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-success status code.
    #[error("{}", http_error_text(.status, .message))]
    Http {
        /// The status code of the response.
        status: StatusCode,
        /// The `message` field of the JSON error body, if there was one.
        message: Option<String>,
    },

    /// The response body was not what the endpoint promises.
    #[error("could not decode the response: {0}")]
    Decode(String),

    /// The bearer token could not be saved or removed.
    #[error("could not access the token store: {0}")]
    TokenStore(String),

    /// A filter query could not be encoded.
    #[error("could not encode the query: {0}")]
    Query(String),
}

fn http_error_text(status: &StatusCode, message: &Option<String>) -> String {
    match message {
        Some(message) => message.clone(),
        None => format!("Request failed with status code {}", status.as_u16()),
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ClientError::Decode(error.to_string())
        } else {
            ClientError::Transport(error.to_string())
        }
    }
}

#[cfg(test)]
mod client_error_tests {
    use reqwest::StatusCode;

    use super::ClientError;

    #[test]
    fn server_message_is_preferred() {
        let error = ClientError::Http {
            status: StatusCode::BAD_REQUEST,
            message: Some("Category already exists".to_owned()),
        };

        assert_eq!(error.to_string(), "Category already exists");
    }

    #[test]
    fn status_text_without_server_message() {
        let error = ClientError::Http {
            status: StatusCode::BAD_GATEWAY,
            message: None,
        };

        assert_eq!(error.to_string(), "Request failed with status code 502");
    }
}
