use std::time::Duration;

use tracing::{debug, info};

use super::Middleware;
use crate::ids::RequestId;
use crate::router::{params, Request, Response};

/// Logs the start and the outcome of every request passing through it.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, req: &Request) -> Option<Response> {
        debug!(
            request_id = ?req.extensions().get::<RequestId>(),
            method = %req.method(),
            path = %req.uri().path(),
            path_params = ?params(req),
            "Request start"
        );
        None
    }

    fn after(&self, req: &Request, res: &mut Response, latency: Duration) {
        info!(
            request_id = ?req.extensions().get::<RequestId>(),
            method = %req.method(),
            path = %req.uri().path(),
            status = res.status().as_u16(),
            latency_us = latency.as_micros() as u64,
            "Request complete"
        );
    }
}
