//! # regexmux
//!
//! **regexmux** is an HTTP request router that merges every route registered
//! for a method into one combined alternation regex, so matching a request
//! costs a single regex evaluation no matter how many routes exist.
//!
//! ## Overview
//!
//! Routes are declared with placeholder patterns such as
//! `/users/<id:\d+>/posts/<title>`. A placeholder without a sub-expression
//! matches one path segment; with one, it matches that regex. Routes can be
//! organised in groups mounted under literal path prefixes, each with its
//! own middleware, and the router applies a configurable trailing-slash
//! policy, `OPTIONS`/405/404 fallbacks and an optional panic barrier.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`pattern`]** - Placeholder pattern compiler (pluggable via [`PatternParser`])
//! - **[`router`]** - Registration, group tree and per-method combined matchers
//! - **[`dispatcher`]** - Request dispatch, trailing-slash redirects and fallbacks
//! - **[`middleware`]** - Middleware trait, chain builder, metrics and tracing
//! - **[`config`]** - Root-level configuration (env and YAML)
//! - **[`response`]** - Helpers for the responses the router produces
//! - **[`static_files`]** - Filesystem backend for [`Router::serve_files`]
//! - **[`otel`]** - Structured logging setup
//!
//! ### Request Handling Flow
//!
//! ```text
//! dispatch(req)
//!   └─ tag RequestId
//!   └─ resolve: walk literal segments down the group tree
//!   └─ node.tables[method].find(rest)   one regex evaluation
//!        ├─ match  → trailing-slash policy → bind Params → middleware chain → handler
//!        └─ miss   → OPTIONS / 405 / 404 fallback
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use http::StatusCode;
//! use regexmux::{params, response, Request, Router, TracingMiddleware};
//!
//! let mut router = Router::new();
//! router.middleware(Arc::new(TracingMiddleware));
//! router.get("/", |_req: &Request| response::text(StatusCode::OK, "home"))?;
//!
//! let mut api = router.group("api")?;
//! api.get("/users/<id:\\d+>", |req: &Request| {
//!     let id = params(req).and_then(|p| p.get("id")).unwrap_or_default();
//!     response::text(StatusCode::OK, format!("user {id}"))
//! })?;
//!
//! router.prepare()?;
//!
//! let req = http::Request::get("/api/users/7").body(Vec::new()).unwrap();
//! assert_eq!(router.dispatch(req).body(), b"user 7");
//! # Ok::<(), regexmux::RouterError>(())
//! ```
//!
//! ## Runtime Considerations
//!
//! The router is transport agnostic: it maps `http::Request<Vec<u8>>` to
//! `http::Response<Vec<u8>>` synchronously. After [`Router::prepare`] it is
//! read-only, so an `Arc<Router>` can be shared by any number of server
//! threads. Registration needs `&mut Router` and therefore cannot race with
//! dispatch.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod middleware;
pub mod otel;
pub mod pattern;
pub mod response;
pub mod router;
pub mod static_files;

pub use config::{RouterConfig, TrailingSlashPolicy};
pub use error::RouterError;
pub use ids::RequestId;
pub use middleware::{MetricsMiddleware, Middleware, TracingMiddleware};
pub use pattern::{DefaultParser, ParsedPattern, PatternParser};
pub use router::{
    params, Body, Group, Handler, MethodsHandler, NodeId, PanicHandler, Params, Request,
    Response, Router,
};
