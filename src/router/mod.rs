//! # Router Module
//!
//! Route registration, the group tree and the per-method combined matchers.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Parsing route patterns into regex fragments at registration time
//! - Organising routes into a tree of literal path-prefix groups
//! - Compiling one combined alternation regex per method and group
//! - Building every route's middleware chain
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Preparation**: after registration, [`Router::prepare`] compiles all
//!    fragments of a method into one `^(?:(r0)|(r1)|…)$` regex and wraps each
//!    handler with its route, group and global middleware.
//!
//! 2. **Matching**: for each request the path is walked down the group tree
//!    by literal segments, then a single regex evaluation against the node's
//!    matcher identifies the route and its parameter values.
//!
//! ## Example
//!
//! ```rust
//! use regexmux::{response, Request, Router};
//! use http::StatusCode;
//!
//! let mut router = Router::new();
//! let mut v1 = router.group("v1")?;
//! v1.get("/users/<id:\\d+>", |_req: &Request| response::text(StatusCode::OK, "user"))?;
//! router.prepare()?;
//!
//! assert_eq!(router.routes()[0].1, "/v1/users/<id:\\d+>");
//! # Ok::<(), regexmux::RouterError>(())
//! ```
//!
//! ## Performance
//!
//! Matching costs one regex evaluation per request regardless of how many
//! routes share the method, plus one hash lookup per group level. Parameter
//! values are collected into a [`ParamVec`] that stays on the stack for up
//! to [`MAX_INLINE_PARAMS`] entries.

mod core;
mod params;
mod table;

pub use core::{
    Body, Group, Handler, MethodsHandler, NodeId, PanicHandler, Request, Response, Router,
    FILEPATH_PARAM,
};
pub use params::{params, ParamVec, Params, MAX_INLINE_PARAMS};
