//! Composition of middleware layers into a single handler.
//!
//! Chains are built once by [`Router::prepare`](crate::Router::prepare) and
//! shared by every request afterwards.

use std::sync::Arc;
use std::time::Instant;

use super::Middleware;
use crate::router::{Handler, Request};

/// Wrap `handler` with `layers`.
///
/// Layers are applied in reverse so that `layers[0]` ends up outermost: for
/// `[m1, m2]` a request runs `m1.before`, `m2.before`, the handler,
/// `m2.after`, `m1.after`.
#[must_use]
pub fn wrap(handler: Handler, layers: &[Arc<dyn Middleware>]) -> Handler {
    layers.iter().rev().fold(handler, |next, layer| {
        let layer = Arc::clone(layer);
        let wrapped: Handler = Arc::new(move |req: &Request| {
            let start = Instant::now();
            let mut res = match layer.before(req) {
                Some(early) => early,
                None => next(req),
            };
            layer.after(req, &mut res, start.elapsed());
            res
        });
        wrapped
    })
}
