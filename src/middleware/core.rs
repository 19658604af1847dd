use std::time::Duration;

use crate::router::{Request, Response};

/// A layer wrapped around a route handler.
///
/// `before` runs on the way in; returning `Some` short-circuits every inner
/// layer and the handler itself. `after` runs on the way out with the
/// response produced by the inner layers (or by this layer's own `before`)
/// and the time spent below this layer.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &Request) -> Option<Response> {
        None
    }
    fn after(&self, _req: &Request, _res: &mut Response, _latency: Duration) {}
}
