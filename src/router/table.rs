//! Per-method route table and combined matcher.
//!
//! All routes registered for one method are merged into a single regex
//!
//! ```text
//! ^(?:(frag₀)|(frag₁)|…|(fragₙ))$
//! ```
//!
//! where each fragment is wrapped in its own *selector* group and contains
//! its parameter groups nested inside. Capture group indices are laid out
//! in blocks:
//!
//! ```text
//! index:  0         1        2      3        4      5
//! slot:   sentinel  sel(r0)  sel(r1) id(r1)  sel(r2) id(r2) title(r2) …
//! ```
//!
//! Alternatives are mutually exclusive, so after a successful match exactly
//! one block participates. Scanning upward from index 1, the first group that
//! participated is a selector; `slots` maps it back to its route and the
//! following `params.len()` groups are the parameter values in declaration
//! order. Every block is at least one slot wide, so adjacent routes without
//! parameters can never be confused.

use std::sync::Arc;

use http::Method;
use regex::Regex;
use tracing::debug;

use super::params::ParamVec;
use super::Handler;
use crate::error::RouterError;
use crate::middleware::{wrap, Middleware};

/// A compiled route.
pub(crate) struct Route {
    /// Pattern as registered (relative to its group)
    pub(crate) pattern: String,
    /// Fragment produced by the pattern parser
    pub(crate) regex: String,
    /// Parameter names in declaration order
    pub(crate) params: Vec<Arc<str>>,
    pub(crate) has_trailing_slash: bool,
    pub(crate) handler: Handler,
    pub(crate) middleware: Vec<Arc<dyn Middleware>>,
    /// Handler wrapped with every applicable middleware; set by `prepare`
    pub(crate) final_handler: Option<Handler>,
}

/// The routes of one method on one router node.
#[derive(Default)]
pub(crate) struct MethodTable {
    routes: Vec<Route>,
    /// Capture-group index → route index for selector slots; `None` for the
    /// sentinel at index 0 and for parameter slots.
    slots: Vec<Option<usize>>,
    matcher: Option<Regex>,
}

impl MethodTable {
    /// Append a route. The combined matcher is stale until [`build`](Self::build).
    pub(crate) fn push(&mut self, route: Route) {
        if self.slots.is_empty() {
            self.slots.push(None);
        }
        self.slots.push(Some(self.routes.len()));
        self.slots
            .extend(std::iter::repeat(None).take(route.params.len()));
        self.routes.push(route);
    }

    pub(crate) fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Rebuild the combined matcher from scratch.
    ///
    /// Each fragment is first compiled on its own so that a malformed
    /// sub-expression is reported against its route, and so that fragments
    /// carrying extra capture groups are rejected before they can shift the
    /// slot layout.
    pub(crate) fn build(&mut self, method: &Method) -> Result<(), RouterError> {
        let matcher = self.compile(method)?;
        self.install(matcher);
        Ok(())
    }

    /// Compile the combined matcher without touching the table.
    /// `None` for a table with no routes.
    pub(crate) fn compile(&self, method: &Method) -> Result<Option<Regex>, RouterError> {
        if self.routes.is_empty() {
            return Ok(None);
        }

        let mut alternation = String::new();
        for (i, route) in self.routes.iter().enumerate() {
            let fragment = Regex::new(&format!("^(?:{})$", route.regex)).map_err(|source| {
                RouterError::InvalidRoutePattern {
                    method: method.clone(),
                    pattern: route.pattern.clone(),
                    source,
                }
            })?;
            let groups = fragment.captures_len() - 1;
            if groups != route.params.len() {
                return Err(RouterError::CaptureGroupMismatch {
                    method: method.clone(),
                    pattern: route.pattern.clone(),
                    params: route.params.len(),
                    groups,
                });
            }

            if i > 0 {
                alternation.push('|');
            }
            alternation.push('(');
            alternation.push_str(&route.regex);
            alternation.push(')');
        }

        let matcher = Regex::new(&format!("^(?:{alternation})$")).map_err(|source| {
            RouterError::InvalidCombinedMatcher {
                method: method.clone(),
                source,
            }
        })?;
        debug_assert_eq!(matcher.captures_len(), self.slots.len());

        debug!(
            method = %method,
            routes = self.routes.len(),
            capture_groups = matcher.captures_len(),
            "Combined matcher built"
        );
        Ok(Some(matcher))
    }

    /// Swap in a matcher produced by [`compile`](Self::compile).
    pub(crate) fn install(&mut self, matcher: Option<Regex>) {
        self.matcher = matcher;
    }

    /// Compute every route's final handler: route middleware innermost, then
    /// `outer` (the node's ancestor chain, root first).
    pub(crate) fn finalize(&mut self, outer: &[Arc<dyn Middleware>]) {
        for route in &mut self.routes {
            let handler = wrap(Arc::clone(&route.handler), &route.middleware);
            route.final_handler = Some(wrap(handler, outer));
        }
    }

    /// Whether the combined matcher accepts `path`.
    pub(crate) fn is_match(&self, path: &str) -> bool {
        self.matcher.as_ref().is_some_and(|m| m.is_match(path))
    }

    /// Resolve `path` to the matched route and its parameter values.
    pub(crate) fn find(&self, path: &str) -> Option<(&Route, ParamVec)> {
        let caps = self.matcher.as_ref()?.captures(path)?;

        let mut i = 1;
        while i < caps.len() && caps.get(i).is_none() {
            i += 1;
        }
        let route = self.routes.get(self.slots.get(i).copied().flatten()?)?;

        let params = route
            .params
            .iter()
            .enumerate()
            .map(|(offset, name)| {
                let value = caps.get(i + 1 + offset).map_or("", |m| m.as_str());
                (Arc::clone(name), value.to_string())
            })
            .collect();
        Some((route, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{DefaultParser, PatternParser};
    use crate::router::{Request, Response};

    fn route(pattern: &str) -> Route {
        let parsed = DefaultParser::new().parse(pattern).unwrap();
        Route {
            pattern: pattern.to_string(),
            regex: parsed.regex,
            params: parsed.params.into_iter().map(Arc::from).collect(),
            has_trailing_slash: parsed.has_trailing_slash,
            handler: Arc::new(|_req: &Request| Response::new(Vec::new())),
            middleware: Vec::new(),
            final_handler: None,
        }
    }

    fn table(patterns: &[&str]) -> MethodTable {
        let mut table = MethodTable::default();
        for pattern in patterns {
            table.push(route(pattern));
        }
        table.build(&Method::GET).unwrap();
        table
    }

    fn find<'a>(table: &'a MethodTable, path: &str) -> Option<(&'a str, Vec<(String, String)>)> {
        table.find(path).map(|(route, params)| {
            (
                route.pattern.as_str(),
                params
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            )
        })
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_slot_layout() {
        let table = table(&["/users", "/users/<id:\\d+>", "/users/<id:\\d+>/posts/<title>"]);
        assert_eq!(
            table.slots,
            vec![None, Some(0), Some(1), None, Some(2), None, None]
        );
    }

    #[test]
    fn test_resolves_route_and_params() {
        let table = table(&["/users", "/users/<id:\\d+>", "/users/<id:\\d+>/posts/<title>"]);

        assert_eq!(
            find(&table, "/users/22/posts/hello"),
            Some((
                "/users/<id:\\d+>/posts/<title>",
                pairs(&[("id", "22"), ("title", "hello")])
            ))
        );
        assert_eq!(
            find(&table, "/users/11"),
            Some(("/users/<id:\\d+>", pairs(&[("id", "11")])))
        );
        assert_eq!(find(&table, "/users"), Some(("/users", Vec::new())));
        assert_eq!(find(&table, "/users/abc"), None);
    }

    #[test]
    fn test_adjacent_routes_without_params() {
        let table = table(&["/", "/a", "/b", "/c/<x>", "/d"]);
        assert_eq!(find(&table, "/").map(|(p, _)| p), Some("/"));
        assert_eq!(find(&table, "/a").map(|(p, _)| p), Some("/a"));
        assert_eq!(find(&table, "/b/").map(|(p, _)| p), Some("/b"));
        assert_eq!(find(&table, "/d").map(|(p, _)| p), Some("/d"));
        assert_eq!(
            find(&table, "/c/y"),
            Some(("/c/<x>", pairs(&[("x", "y")])))
        );
    }

    #[test]
    fn test_registration_order_wins() {
        let table = table(&["/files/<name>", "/files/<id:\\d+>"]);
        assert_eq!(
            find(&table, "/files/42"),
            Some(("/files/<name>", pairs(&[("name", "42")])))
        );
    }

    #[test]
    fn test_empty_table_never_matches() {
        let mut table = MethodTable::default();
        table.build(&Method::GET).unwrap();
        assert!(table.find("/").is_none());
        assert!(!table.is_match("/"));
    }

    #[test]
    fn test_unbuilt_table_never_matches() {
        let mut table = MethodTable::default();
        table.push(route("/users"));
        assert!(table.find("/users").is_none());
    }

    #[test]
    fn test_malformed_sub_expression_fails_build() {
        let mut table = MethodTable::default();
        table.push(route("/ok"));
        table.push(route("/bad/<id:[0-9>"));
        assert!(matches!(
            table.build(&Method::GET),
            Err(RouterError::InvalidRoutePattern { .. })
        ));
    }

    #[test]
    fn test_extra_capture_group_fails_build() {
        let mut table = MethodTable::default();
        table.push(route("/colors/<name:(red|blue)>"));
        assert!(matches!(
            table.build(&Method::GET),
            Err(RouterError::CaptureGroupMismatch {
                params: 1,
                groups: 2,
                ..
            })
        ));

        let mut table = MethodTable::default();
        table.push(route("/colors/<name:(?:red|blue)>"));
        assert!(table.build(&Method::GET).is_ok());
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mut table = table(&["/a/<x>", "/b"]);
        let before = table.matcher.as_ref().map(|m| m.as_str().to_string());
        table.build(&Method::GET).unwrap();
        let after = table.matcher.as_ref().map(|m| m.as_str().to_string());
        assert_eq!(before, after);
        assert_eq!(find(&table, "/a/1"), Some(("/a/<x>", pairs(&[("x", "1")]))));
    }
}
