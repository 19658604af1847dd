//! Dispatcher core module - hot path for request dispatch.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use http::{Method, StatusCode};
use tracing::{debug, error, warn};

use crate::config::TrailingSlashPolicy;
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::response;
use crate::router::{Params, Request, Response, Router};

/// Human readable message from a panic payload.
///
/// `panic!` payloads are `&'static str` or `String`; anything else is
/// reported as opaque.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Where a trailing-slash policy wants `path` to be redirected, if anywhere.
///
/// `pattern_has_slash` is whether the matched route was registered with a
/// trailing slash. The root path is never redirected.
#[must_use]
pub fn trailing_slash_target(
    policy: TrailingSlashPolicy,
    path: &str,
    pattern_has_slash: bool,
) -> Option<String> {
    if path == "/" {
        return None;
    }
    let has_slash = path.ends_with('/');
    let want_slash = match policy {
        TrailingSlashPolicy::Ignore => return None,
        TrailingSlashPolicy::Append => true,
        TrailingSlashPolicy::Remove => false,
        TrailingSlashPolicy::Strict => pattern_has_slash,
    };

    match (has_slash, want_slash) {
        (false, true) => Some(format!("{path}/")),
        (true, false) => path.strip_suffix('/').map(str::to_string),
        _ => None,
    }
}

/// Redirect status for `method`: 301 for `GET`, 308 (method preserving)
/// otherwise.
#[must_use]
pub fn redirect_status(method: &Method) -> StatusCode {
    if method == Method::GET {
        StatusCode::MOVED_PERMANENTLY
    } else {
        StatusCode::PERMANENT_REDIRECT
    }
}

impl Router {
    /// Serve one request.
    ///
    /// Tags the request with a [`RequestId`] (taken from `x-request-id` when
    /// it parses, generated otherwise), then resolves and runs the matching
    /// route or a fallback. When a panic handler is installed, a panic
    /// anywhere in that process is caught and answered by it.
    ///
    /// Dispatching before [`prepare`](Router::prepare) answers every request
    /// with the not-found fallback.
    pub fn dispatch(&self, mut req: Request) -> Response {
        let request_id = RequestId::from_header_or_new(
            req.headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok()),
        );
        req.extensions_mut().insert(request_id);

        let Some(panic_handler) = &self.panic_handler else {
            return self.serve(&mut req, request_id);
        };

        match catch_unwind(AssertUnwindSafe(|| self.serve(&mut req, request_id))) {
            Ok(res) => res,
            Err(payload) => {
                error!(
                    request_id = %request_id,
                    method = %req.method(),
                    path = %req.uri().path(),
                    panic_message = %panic_message(payload.as_ref()),
                    "Handler panicked"
                );
                panic_handler(&req, payload)
            }
        }
    }

    fn serve(&self, req: &mut Request, request_id: RequestId) -> Response {
        if !self.is_prepared() {
            warn!(request_id = %request_id, "Dispatch before prepare");
        }

        let full_path = req.uri().path().to_string();
        let (node_id, path) = self.resolve(&full_path);
        let node = self.node_ref(node_id);

        if let Some((route, values)) = node
            .tables
            .get(req.method())
            .and_then(|table| table.find(path))
        {
            if let Some(target) = trailing_slash_target(
                self.config.trailing_slashes,
                &full_path,
                route.has_trailing_slash,
            ) {
                let location = match req.uri().query() {
                    Some(query) => format!("{target}?{query}"),
                    None => target,
                };
                let status = redirect_status(req.method());
                debug!(
                    request_id = %request_id,
                    from = %full_path,
                    location = %location,
                    status = status.as_u16(),
                    "Trailing slash redirect"
                );
                return response::redirect(status, &location);
            }

            if let Some(handler) = &route.final_handler {
                debug!(
                    request_id = %request_id,
                    method = %req.method(),
                    pattern = %route.pattern,
                    "Route matched"
                );
                if !values.is_empty() {
                    req.extensions_mut().insert(Params::new(values));
                }
                return handler(&*req);
            }
        }

        let allowed = node.allowed_methods(path);

        if req.method() == Method::OPTIONS {
            return match &self.options_handler {
                Some(handler) => handler(&*req, &allowed),
                None => response::options(&allowed),
            };
        }

        if !allowed.is_empty() {
            debug!(
                request_id = %request_id,
                method = %req.method(),
                path = %full_path,
                allowed = ?allowed,
                "Method not allowed"
            );
            return match &self.method_not_allowed_handler {
                Some(handler) => handler(&*req, &allowed),
                None => response::method_not_allowed(&allowed),
            };
        }

        debug!(request_id = %request_id, path = %full_path, "No route matched");
        match &self.not_found_handler {
            Some(handler) => handler(&*req),
            None => response::not_found(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_target() {
        use TrailingSlashPolicy::*;

        assert_eq!(trailing_slash_target(Ignore, "/users", true), None);
        assert_eq!(trailing_slash_target(Append, "/users", false), Some("/users/".into()));
        assert_eq!(trailing_slash_target(Append, "/users/", false), None);
        assert_eq!(trailing_slash_target(Remove, "/users/", true), Some("/users".into()));
        assert_eq!(trailing_slash_target(Remove, "/users", true), None);
        assert_eq!(trailing_slash_target(Strict, "/users", true), Some("/users/".into()));
        assert_eq!(trailing_slash_target(Strict, "/users/", false), Some("/users".into()));
        assert_eq!(trailing_slash_target(Strict, "/users/", true), None);
        assert_eq!(trailing_slash_target(Remove, "/", false), None);
        assert_eq!(trailing_slash_target(Append, "/", false), None);
    }

    #[test]
    fn test_redirect_status() {
        assert_eq!(redirect_status(&Method::GET), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(redirect_status(&Method::POST), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(redirect_status(&Method::HEAD), StatusCode::PERMANENT_REDIRECT);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7_u32);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
