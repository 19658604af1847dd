//! Router core: the group tree, registration and preparation.

use std::any::Any;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use http::{Method, StatusCode};
use tracing::{debug, info};

use super::params::params;
use super::table::{MethodTable, Route};
use crate::config::{RouterConfig, TrailingSlashPolicy};
use crate::error::RouterError;
use crate::middleware::Middleware;
use crate::pattern::{DefaultParser, ParsedPattern, PatternParser};
use crate::response;
use crate::static_files::StaticFiles;

/// Request body type.
pub type Body = Vec<u8>;
/// Request type handed to handlers and middleware.
pub type Request = http::Request<Body>;
/// Response type produced by handlers and middleware.
pub type Response = http::Response<Body>;

/// A route handler.
pub type Handler = Arc<dyn Fn(&Request) -> Response + Send + Sync>;

/// Receives the payload of a handler panic and turns it into a response.
pub type PanicHandler = Arc<dyn Fn(&Request, Box<dyn Any + Send>) -> Response + Send + Sync>;

/// Handles `OPTIONS` or 405 fallbacks; receives the methods allowed for the
/// request path.
pub type MethodsHandler = Arc<dyn Fn(&Request, &[Method]) -> Response + Send + Sync>;

/// Parameter name that [`Group::serve_files`] patterns must declare.
pub const FILEPATH_PARAM: &str = "filepath";

/// Identifies a router node (the root or a group) inside its [`Router`].
///
/// A plain arena index: it never owns the node it points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root router node.
    pub const ROOT: NodeId = NodeId(0);
}

pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    /// Literal segment this node is mounted under (empty for the root)
    pub(crate) prefix: String,
    pub(crate) groups: HashMap<String, NodeId>,
    pub(crate) tables: HashMap<Method, MethodTable>,
    pub(crate) middleware: Vec<Arc<dyn Middleware>>,
    pub(crate) parser: Arc<dyn PatternParser>,
}

impl Node {
    fn new(parent: Option<NodeId>, prefix: String, parser: Arc<dyn PatternParser>) -> Self {
        Self {
            parent,
            prefix,
            groups: HashMap::new(),
            tables: HashMap::new(),
            middleware: Vec::new(),
            parser,
        }
    }

    /// Methods whose combined matcher accepts `path`, sorted by name.
    pub(crate) fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let mut methods: Vec<Method> = self
            .tables
            .iter()
            .filter(|(_, table)| table.is_match(path))
            .map(|(method, _)| method.clone())
            .collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }
}

/// HTTP request router.
///
/// Routes are registered per method with [`handle`](Router::handle) (or the
/// `get`/`post`/… shortcuts), optionally inside path-prefix groups created
/// with [`group`](Router::group). After all registration,
/// [`prepare`](Router::prepare) compiles one combined matcher per method and
/// node and builds every route's middleware chain; the router can then be
/// shared (for example behind an `Arc`) and [`dispatch`](Router::dispatch)ed
/// from any number of threads.
///
/// # Example
///
/// ```rust
/// use regexmux::{params, response, Request, Router};
/// use http::StatusCode;
///
/// let mut router = Router::new();
/// router.get("/users/<id:\\d+>", |req: &Request| {
///     let id = params(req).and_then(|p| p.get("id")).unwrap_or_default();
///     response::text(StatusCode::OK, format!("user {id}"))
/// })?;
/// router.prepare()?;
///
/// let req = http::Request::get("/users/42").body(Vec::new()).unwrap();
/// let res = router.dispatch(req);
/// assert_eq!(res.body(), b"user 42");
/// # Ok::<(), regexmux::RouterError>(())
/// ```
pub struct Router {
    pub(crate) nodes: Vec<Node>,
    pub(crate) config: RouterConfig,
    pub(crate) panic_handler: Option<PanicHandler>,
    pub(crate) options_handler: Option<MethodsHandler>,
    pub(crate) method_not_allowed_handler: Option<MethodsHandler>,
    pub(crate) not_found_handler: Option<Handler>,
    prepared: bool,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create a router using the default pattern parser.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parser(DefaultParser::new())
    }

    /// Create a router using `parser` for every pattern; groups inherit it.
    #[must_use]
    pub fn with_parser<P: PatternParser + 'static>(parser: P) -> Self {
        Self {
            nodes: vec![Node::new(None, String::new(), Arc::new(parser))],
            config: RouterConfig::default(),
            panic_handler: None,
            options_handler: None,
            method_not_allowed_handler: None,
            not_found_handler: None,
            prepared: false,
        }
    }

    /// Apply root-level configuration.
    #[must_use]
    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn set_trailing_slashes(&mut self, policy: TrailingSlashPolicy) -> &mut Self {
        self.config.trailing_slashes = policy;
        self
    }

    /// Install a fault barrier: handler panics are caught and handed to `f`
    /// together with the panic payload. Without one, panics propagate to the
    /// caller of [`dispatch`](Router::dispatch).
    pub fn set_panic_handler<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Request, Box<dyn Any + Send>) -> Response + Send + Sync + 'static,
    {
        self.panic_handler = Some(Arc::new(f));
        self
    }

    /// Replace the default `OPTIONS` answer.
    pub fn set_options_handler<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Request, &[Method]) -> Response + Send + Sync + 'static,
    {
        self.options_handler = Some(Arc::new(f));
        self
    }

    /// Replace the default 405 response.
    pub fn set_method_not_allowed_handler<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Request, &[Method]) -> Response + Send + Sync + 'static,
    {
        self.method_not_allowed_handler = Some(Arc::new(f));
        self
    }

    /// Replace the default 404 response.
    pub fn set_not_found_handler<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.not_found_handler = Some(Arc::new(f));
        self
    }

    /// Registration handle for the root node.
    pub fn root(&mut self) -> Group<'_> {
        Group {
            router: self,
            id: NodeId::ROOT,
        }
    }

    /// Registration handle for a node created earlier.
    pub fn node(&mut self, id: NodeId) -> Result<Group<'_>, RouterError> {
        if id.0 >= self.nodes.len() {
            return Err(RouterError::UnknownNode { id: id.0 });
        }
        Ok(Group { router: self, id })
    }

    /// Create a group under the root. See [`Group::group`].
    pub fn group(&mut self, prefix: &str) -> Result<Group<'_>, RouterError> {
        self.create_group(NodeId::ROOT, prefix)
    }

    /// Register `handler` for `method` and `pattern` on the root.
    pub fn handle<F>(&mut self, method: Method, pattern: &str, handler: F) -> Result<&mut Self, RouterError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.register(NodeId::ROOT, method, pattern, Arc::new(handler), Vec::new())?;
        Ok(self)
    }

    /// Register `handler` with route-specific middleware on the root.
    pub fn handle_with<F, I>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: F,
        middleware: I,
    ) -> Result<&mut Self, RouterError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        self.register(
            NodeId::ROOT,
            method,
            pattern,
            Arc::new(handler),
            middleware.into_iter().collect(),
        )?;
        Ok(self)
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouterError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.handle(Method::GET, pattern, handler)
    }

    pub fn post<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouterError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.handle(Method::POST, pattern, handler)
    }

    pub fn put<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouterError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.handle(Method::PUT, pattern, handler)
    }

    pub fn patch<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouterError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.handle(Method::PATCH, pattern, handler)
    }

    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouterError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.handle(Method::DELETE, pattern, handler)
    }

    /// Append global middleware (runs for every matched route).
    pub fn middleware(&mut self, mw: Arc<dyn Middleware>) -> &mut Self {
        self.nodes[NodeId::ROOT.0].middleware.push(mw);
        self.prepared = false;
        self
    }

    /// Serve files below `root` on the root node. See [`Group::serve_files`].
    pub fn serve_files(&mut self, pattern: &str, root: impl Into<PathBuf>) -> Result<&mut Self, RouterError> {
        self.root().serve_files(pattern, root)?;
        Ok(self)
    }

    /// Whether [`prepare`](Router::prepare) ran since the last registration.
    #[must_use]
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Compile every combined matcher and build every middleware chain.
    ///
    /// Must be called after registration and before serving. Calling it
    /// again rebuilds everything from scratch and yields the same result.
    /// It must not run concurrently with [`dispatch`](Router::dispatch),
    /// which the `&mut self` receiver enforces.
    ///
    /// Every matcher is compiled before any is installed. On error no table
    /// changes: the router keeps serving what the last successful `prepare`
    /// built, and [`is_prepared`](Router::is_prepared) stays `false`.
    pub fn prepare(&mut self) -> Result<(), RouterError> {
        self.prepared = false;

        let mut staged = Vec::new();
        for (idx, node) in self.nodes.iter().enumerate() {
            for (method, table) in &node.tables {
                staged.push((idx, method.clone(), table.compile(method)?));
            }
        }

        let mut route_count = 0;
        for (idx, method, matcher) in staged {
            let chain = self.ancestor_middleware(NodeId(idx));
            if let Some(table) = self.nodes[idx].tables.get_mut(&method) {
                table.install(matcher);
                table.finalize(&chain);
                route_count += table.routes().len();
            }
        }

        self.prepared = true;
        info!(
            routes_count = route_count,
            groups_count = self.nodes.len() - 1,
            trailing_slashes = ?self.config.trailing_slashes,
            "Routing table prepared"
        );
        Ok(())
    }

    /// All registered routes as `(method, full pattern)`, sorted.
    #[must_use]
    pub fn routes(&self) -> Vec<(Method, String)> {
        let mut routes: Vec<(Method, String)> = self
            .nodes
            .iter()
            .enumerate()
            .flat_map(|(idx, node)| {
                let prefix = self.full_prefix(NodeId(idx));
                node.tables.iter().flat_map(move |(method, table)| {
                    let prefix = prefix.clone();
                    table
                        .routes()
                        .iter()
                        .map(move |route| (method.clone(), format!("{prefix}{}", route.pattern)))
                })
            })
            .collect();
        routes.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
        routes
    }

    /// Log every registered route at `info`.
    pub fn dump_routes(&self) {
        let routes = self.routes();
        info!(count = routes.len(), "Registered routes");
        for (method, pattern) in routes {
            info!(method = %method, pattern = %pattern, "Route");
        }
    }

    /// Walk literal path segments down the group tree.
    ///
    /// Returns the deepest node reached and the path remaining below it
    /// (`/` when the whole path was consumed).
    pub(crate) fn resolve<'p>(&self, path: &'p str) -> (NodeId, &'p str) {
        let mut id = NodeId::ROOT;
        let mut rest = path;

        loop {
            let node = &self.nodes[id.0];
            if rest == "/" || node.groups.is_empty() {
                break;
            }
            let Some(tail) = rest.strip_prefix('/') else {
                break;
            };
            let end = tail.find('/').unwrap_or(tail.len());
            let Some(&child) = node.groups.get(&tail[..end]) else {
                break;
            };
            id = child;
            rest = if end < tail.len() { &tail[end..] } else { "/" };
        }

        (id, rest)
    }

    pub(crate) fn node_ref(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn create_group(&mut self, parent: NodeId, prefix: &str) -> Result<Group<'_>, RouterError> {
        if prefix.is_empty() {
            return Err(RouterError::EmptyGroupPrefix);
        }
        if prefix.contains('/') {
            return Err(RouterError::GroupPrefixContainsSlash {
                prefix: prefix.to_string(),
            });
        }
        if self.nodes[parent.0].groups.contains_key(prefix) {
            return Err(RouterError::DuplicateGroupPrefix {
                prefix: prefix.to_string(),
            });
        }

        let id = NodeId(self.nodes.len());
        let parser = Arc::clone(&self.nodes[parent.0].parser);
        self.nodes
            .push(Node::new(Some(parent), prefix.to_string(), parser));
        self.nodes[parent.0].groups.insert(prefix.to_string(), id);
        self.prepared = false;

        debug!(prefix = %self.full_prefix(id), "Group created");
        Ok(Group { router: self, id })
    }

    fn register(
        &mut self,
        node: NodeId,
        method: Method,
        pattern: &str,
        handler: Handler,
        middleware: Vec<Arc<dyn Middleware>>,
    ) -> Result<(), RouterError> {
        let parsed = self.nodes[node.0].parser.parse(pattern)?;
        self.register_parsed(node, method, pattern, parsed, handler, middleware);
        Ok(())
    }

    fn register_parsed(
        &mut self,
        node: NodeId,
        method: Method,
        pattern: &str,
        parsed: ParsedPattern,
        handler: Handler,
        middleware: Vec<Arc<dyn Middleware>>,
    ) {
        debug!(
            method = %method,
            pattern = %pattern,
            regex = %parsed.regex,
            params = ?parsed.params,
            "Route registered"
        );
        let route = Route {
            pattern: pattern.to_string(),
            regex: parsed.regex,
            params: parsed.params.into_iter().map(Arc::from).collect(),
            has_trailing_slash: parsed.has_trailing_slash,
            handler,
            middleware,
            final_handler: None,
        };
        self.nodes[node.0]
            .tables
            .entry(method)
            .or_default()
            .push(route);
        self.prepared = false;
    }

    /// Middleware of `id` and all its ancestors, root first.
    fn ancestor_middleware(&self, id: NodeId) -> Vec<Arc<dyn Middleware>> {
        let mut lineage = vec![id];
        let mut current = id;
        while let Some(parent) = self.nodes[current.0].parent {
            lineage.push(parent);
            current = parent;
        }
        lineage
            .iter()
            .rev()
            .flat_map(|n| self.nodes[n.0].middleware.iter().cloned())
            .collect()
    }

    /// `/v1/admin` style prefix of a node (empty for the root).
    fn full_prefix(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(n) = current {
            let node = &self.nodes[n.0];
            if !node.prefix.is_empty() {
                segments.push(node.prefix.as_str());
            }
            current = node.parent;
        }
        segments
            .iter()
            .rev()
            .map(|s| format!("/{s}"))
            .collect()
    }
}

/// Registration handle for one router node.
///
/// Obtained from [`Router::group`], [`Group::group`], [`Router::root`] or
/// [`Router::node`]. Fallback handlers and the trailing-slash policy are
/// configured on the [`Router`] only.
pub struct Group<'r> {
    router: &'r mut Router,
    id: NodeId,
}

impl Group<'_> {
    /// Identifier to reopen this node later with [`Router::node`].
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Create a child group mounted under the literal segment `prefix`.
    ///
    /// Fails if `prefix` is empty, contains `/`, or is already used by a
    /// sibling. The child shares this node's pattern parser.
    pub fn group(&mut self, prefix: &str) -> Result<Group<'_>, RouterError> {
        self.router.create_group(self.id, prefix)
    }

    /// Use a different pattern parser for routes registered on this node
    /// from now on, and for groups created below it afterwards.
    pub fn set_parser<P: PatternParser + 'static>(&mut self, parser: P) -> &mut Self {
        self.router.nodes[self.id.0].parser = Arc::new(parser);
        self
    }

    /// Append middleware for every route of this node and its descendants.
    pub fn middleware(&mut self, mw: Arc<dyn Middleware>) -> &mut Self {
        self.router.nodes[self.id.0].middleware.push(mw);
        self.router.prepared = false;
        self
    }

    /// Register `handler` for `method` and `pattern`.
    ///
    /// The pattern is parsed immediately, so an invalid pattern fails here.
    /// `method` is compared exactly (case-sensitively) at dispatch.
    pub fn handle<F>(&mut self, method: Method, pattern: &str, handler: F) -> Result<&mut Self, RouterError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.router
            .register(self.id, method, pattern, Arc::new(handler), Vec::new())?;
        Ok(self)
    }

    /// Register `handler` wrapped with route-specific middleware; the first
    /// middleware given runs first.
    pub fn handle_with<F, I>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: F,
        middleware: I,
    ) -> Result<&mut Self, RouterError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        self.router.register(
            self.id,
            method,
            pattern,
            Arc::new(handler),
            middleware.into_iter().collect(),
        )?;
        Ok(self)
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouterError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.handle(Method::GET, pattern, handler)
    }

    pub fn post<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouterError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.handle(Method::POST, pattern, handler)
    }

    pub fn put<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouterError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.handle(Method::PUT, pattern, handler)
    }

    pub fn patch<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouterError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.handle(Method::PATCH, pattern, handler)
    }

    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouterError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.handle(Method::DELETE, pattern, handler)
    }

    /// Serve static files below `root` for `GET` requests matching `pattern`.
    ///
    /// The pattern must declare a `filepath` parameter, e.g.
    /// `/static/<filepath:.*>`; its value is resolved beneath `root` with
    /// traversal outside `root` rejected. Missing files answer 404.
    pub fn serve_files(&mut self, pattern: &str, root: impl Into<PathBuf>) -> Result<&mut Self, RouterError> {
        let parsed = self.router.nodes[self.id.0].parser.parse(pattern)?;
        if !parsed.params.iter().any(|p| p == FILEPATH_PARAM) {
            return Err(RouterError::MissingFilepathParam {
                pattern: pattern.to_string(),
            });
        }

        let files = Arc::new(StaticFiles::new(root));
        let handler: Handler = Arc::new(move |req: &Request| {
            let Some(path) = params(req).and_then(|p| p.get(FILEPATH_PARAM)) else {
                return response::not_found();
            };
            match files.load(path) {
                Ok((bytes, content_type)) => response::bytes(StatusCode::OK, content_type, bytes),
                Err(e) => {
                    debug!(filepath = %path, error = %e, "Static file not served");
                    response::not_found()
                }
            }
        });

        self.router
            .register_parsed(self.id, Method::GET, pattern, parsed, handler, Vec::new());
        Ok(self)
    }
}
