//! Middleware for logging requests and responses.

use axum::{
    extract::Request,
    http::{HeaderMap, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::Error;

/// Bodies longer than this many bytes are truncated in `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The JSON fields whose values are never written to the logs.
const REDACTED_FIELDS: [&str; 2] = ["password", "token"];

/// The headers whose values are never written to the logs.
const SENSITIVE_HEADERS: [&str; 4] = ["authorization", "cookie", "set-cookie", "x-csrftoken"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and logged in full at the `debug` level. Passwords and tokens
/// in JSON bodies are replaced with asterisks, and credential headers are
/// logged as `Sensitive`.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => return Error::InvalidBody(error.to_string()).into_response(),
    };
    let body_text = String::from_utf8_lossy(&body_bytes);

    mark_sensitive_headers(&mut parts.headers);
    if is_json(&parts.headers) {
        log_request(&parts, &redact_secrets(&body_text));
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, body_bytes.into());
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("could not read response body: {error}");
            return Response::from_parts(parts, axum::body::Body::empty());
        }
    };
    let body_text = String::from_utf8_lossy(&body_bytes);

    mark_sensitive_headers(&mut parts.headers);
    if is_json(&parts.headers) {
        log_response(&parts, &redact_secrets(&body_text));
    } else {
        log_response(&parts, &body_text);
    }

    Response::from_parts(parts, body_bytes.into())
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

/// Flag credential headers so that their `Debug` output is `Sensitive`.
fn mark_sensitive_headers(headers: &mut HeaderMap) {
    for (name, value) in headers.iter_mut() {
        if SENSITIVE_HEADERS.contains(&name.as_str()) {
            value.set_sensitive(true);
        }
    }
}

/// Replace the values of password and token fields in a JSON object with asterisks.
///
/// Text that is not a JSON object is returned unchanged.
fn redact_secrets(json_text: &str) -> String {
    let Ok(serde_json::Value::Object(mut object)) = serde_json::from_str(json_text) else {
        return json_text.to_owned();
    };

    for field in REDACTED_FIELDS {
        if let Some(value) = object.get_mut(field) {
            *value = serde_json::Value::String("********".to_owned());
        }
    }

    serde_json::Value::Object(object).to_string()
}

/// The longest prefix of `text` that fits in [LOG_BODY_LENGTH_LIMIT] bytes without splitting a character.
fn truncate(text: &str) -> Option<&str> {
    if text.len() <= LOG_BODY_LENGTH_LIMIT {
        return None;
    }

    let end = (0..=LOG_BODY_LENGTH_LIMIT)
        .rev()
        .find(|&index| text.is_char_boundary(index))
        .unwrap_or(0);

    Some(&text[..end])
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    match truncate(body) {
        Some(prefix) => {
            tracing::info!("Received request: {parts:#?}\nbody: {prefix}...");
            tracing::debug!("Full request body: {body:?}");
        }
        None => tracing::info!("Received request: {parts:#?}\nbody: {body:?}"),
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    match truncate(body) {
        Some(prefix) => {
            tracing::info!("Sending response: {parts:#?}\nbody: {prefix}...");
            tracing::debug!("Full response body: {body:?}");
        }
        None => tracing::info!("Sending response: {parts:#?}\nbody: {body:?}"),
    }
}

#[cfg(test)]
mod logging_tests {
    use axum::{
        Router,
        http::{
            Request,
            header::{AUTHORIZATION, CONTENT_TYPE, COOKIE},
        },
        middleware,
        routing::post,
    };
    use axum_test::TestServer;
    use serde_json::json;

    use super::{
        LOG_BODY_LENGTH_LIMIT, logging_middleware, mark_sensitive_headers, redact_secrets,
        truncate,
    };

    #[test]
    fn password_is_redacted() {
        let redacted = redact_secrets(r#"{"username":"alice","password":"hunter2"}"#);

        assert!(!redacted.contains("hunter2"));
        assert!(redacted.contains("alice"));
        assert!(redacted.contains("********"));
    }

    #[test]
    fn body_without_password_is_unchanged() {
        let body = r#"{"name":"Food"}"#;

        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&redact_secrets(body)).unwrap(),
            json!({ "name": "Food" })
        );
    }

    #[test]
    fn non_json_body_is_unchanged() {
        assert_eq!(redact_secrets("password=hunter2"), "password=hunter2");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "é".repeat(LOG_BODY_LENGTH_LIMIT);

        let prefix = truncate(&text).expect("text should be truncated");

        assert!(prefix.len() <= LOG_BODY_LENGTH_LIMIT);
        assert!(prefix.chars().all(|c| c == 'é'));
        assert_eq!(truncate("short"), None);
    }

    #[test]
    fn token_is_redacted() {
        let redacted = redact_secrets(r#"{"token":"SECRET-JWT-VALUE"}"#);

        assert!(!redacted.contains("SECRET-JWT-VALUE"));
    }

    #[test]
    fn credential_headers_are_not_logged() {
        let request = Request::builder()
            .uri("/categories")
            .header(AUTHORIZATION, "Bearer SECRET-JWT-VALUE")
            .header("X-CSRFToken", "SECRET-CSRF-VALUE")
            .header(COOKIE, "csrf=SECRET-COOKIE-VALUE")
            .header(CONTENT_TYPE, "application/json")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        mark_sensitive_headers(&mut parts.headers);
        let logged = format!("{parts:#?}");

        assert!(!logged.contains("SECRET-JWT-VALUE"));
        assert!(!logged.contains("SECRET-CSRF-VALUE"));
        assert!(!logged.contains("SECRET-COOKIE-VALUE"));
        assert!(logged.contains("application/json"));
        assert_eq!(parts.headers[AUTHORIZATION], "Bearer SECRET-JWT-VALUE");
    }

    #[tokio::test]
    async fn middleware_passes_body_through() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .post("/echo")
            .json(&json!({ "password": "hunter2" }))
            .await;

        response.assert_status_ok();
        response.assert_text(r#"{"password":"hunter2"}"#);
    }
}
