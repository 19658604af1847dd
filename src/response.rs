//! Small constructors for the responses the router produces on its own:
//! redirects, `OPTIONS` answers, 404 and 405.

use http::header::{HeaderValue, ALLOW, CONTENT_TYPE, LOCATION};
use http::{Method, StatusCode};
use serde_json::Value;
use tracing::warn;

use crate::router::Response;

/// Canonical reason phrase for `status`.
#[must_use]
pub fn status_reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Unknown")
}

/// Response with no body.
#[must_use]
pub fn empty(status: StatusCode) -> Response {
    let mut res = Response::new(Vec::new());
    *res.status_mut() = status;
    res
}

/// `text/plain` response.
#[must_use]
pub fn text(status: StatusCode, body: impl Into<String>) -> Response {
    bytes(status, "text/plain; charset=utf-8", body.into().into_bytes())
}

/// Response with an explicit content type.
#[must_use]
pub fn bytes(status: StatusCode, content_type: &'static str, body: Vec<u8>) -> Response {
    let mut res = Response::new(body);
    *res.status_mut() = status;
    res.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    res
}

/// `application/json` response.
#[must_use]
pub fn json(status: StatusCode, body: &Value) -> Response {
    bytes(status, "application/json", body.to_string().into_bytes())
}

/// Redirect to `location`.
#[must_use]
pub fn redirect(status: StatusCode, location: &str) -> Response {
    let mut res = empty(status);
    match HeaderValue::from_str(location) {
        Ok(value) => {
            res.headers_mut().insert(LOCATION, value);
        }
        Err(e) => warn!(location = %location, error = %e, "Invalid redirect location"),
    }
    res
}

/// The standard 404 response.
#[must_use]
pub fn not_found() -> Response {
    text(StatusCode::NOT_FOUND, "404 page not found\n")
}

/// The standard 405 response with an `Allow` header.
#[must_use]
pub fn method_not_allowed(methods: &[Method]) -> Response {
    let status = StatusCode::METHOD_NOT_ALLOWED;
    let mut res = text(status, format!("{}\n", status_reason(status)));
    set_allow(&mut res, methods);
    res
}

/// The default `OPTIONS` answer: `Allow` header, empty body, 200.
#[must_use]
pub fn options(methods: &[Method]) -> Response {
    let mut res = empty(StatusCode::OK);
    set_allow(&mut res, methods);
    res
}

/// Set the `Allow` header to the comma separated `methods`.
pub fn set_allow(res: &mut Response, methods: &[Method]) {
    let joined = methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if let Ok(value) = HeaderValue::from_str(&joined) {
        res.headers_mut().insert(ALLOW, value);
    }
}
