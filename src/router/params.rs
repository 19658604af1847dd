use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;

use super::Request;

/// Maximum number of path parameters before heap allocation.
/// Most routes have ≤4 placeholders (e.g., `/users/<id>/posts/<slug>`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names use `Arc<str>` because they come from the route table built
/// at preparation time; values are per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Path parameters captured for one matched request.
///
/// The dispatcher stores it in the request extensions before invoking the
/// handler; read it back with [`params`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(ParamVec);

impl Params {
    #[must_use]
    pub fn new(params: ParamVec) -> Self {
        Self(params)
    }

    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics when a pattern repeats a name.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Name/value pairs in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    /// Convert to a HashMap
    /// Note: This allocates - use get() in hot paths
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.0
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Path parameters bound to `req` by the dispatcher, if any.
///
/// Routes without placeholders bind nothing, so this returns `None` for them.
#[must_use]
pub fn params(req: &Request) -> Option<&Params> {
    req.extensions().get::<Params>()
}
