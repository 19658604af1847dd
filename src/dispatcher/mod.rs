//! # Dispatcher Module
//!
//! Turns a request into a response using a prepared [`Router`](crate::Router).
//!
//! ## Request Flow
//!
//! 1. The request is tagged with a [`RequestId`](crate::ids::RequestId)
//! 2. Its path is walked down the group tree by literal segments
//! 3. The node's combined matcher for the request method selects a route
//! 4. The trailing-slash policy may answer with a redirect instead
//! 5. Captured parameters are bound and the route's middleware chain runs
//!
//! When nothing matched, the fallbacks apply in order:
//!
//! - `OPTIONS` is answered with the `Allow` header listing every method that
//!   would match the path
//! - any other method gets `405 Method Not Allowed` when some method would
//!   match
//! - otherwise `404 Not Found`
//!
//! Each fallback can be replaced on the router.
//!
//! ## Error Handling
//!
//! With a panic handler installed, a panic raised while serving (by a
//! handler, a middleware or a fallback) is caught, logged at `error`, and
//! answered by the panic handler. Without one, the panic propagates to the
//! caller.
//!
//! ## Redirects
//!
//! Trailing-slash redirects use `301` for `GET` and `308` for every other
//! method so that non-idempotent bodies are re-sent. The query string is
//! carried over to the `Location` header.

mod core;

pub use core::{panic_message, redirect_status, trailing_slash_target};
