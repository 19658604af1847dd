//! # Middleware Module
//!
//! Layers that wrap route handlers. A router node (the root or any group)
//! and every individual route carry their own ordered middleware list; at
//! preparation time they are folded into one handler per route so that a
//! request runs
//!
//! ```text
//! root middleware → …ancestor group middleware… → group middleware → route middleware → handler
//! ```
//!
//! Each layer may short-circuit by returning a response from
//! [`Middleware::before`] and may inspect or rewrite the response in
//! [`Middleware::after`].

mod chain;
mod core;
mod metrics;
mod tracing;

pub use chain::wrap;
pub use core::Middleware;
pub use metrics::MetricsMiddleware;
pub use tracing::TracingMiddleware;
