use std::fmt;

use http::Method;

/// Configuration error raised while registering routes, creating groups or
/// preparing the router.
///
/// Every variant is a programmer mistake. They surface synchronously at
/// startup and are never produced while dispatching a request.
#[derive(Debug, Clone)]
pub enum RouterError {
    /// The pattern is empty or does not begin with `/`.
    InvalidPattern {
        /// The rejected pattern
        pattern: String,
    },
    /// `group("")` was called.
    EmptyGroupPrefix,
    /// The group prefix contains a `/`.
    GroupPrefixContainsSlash {
        /// The rejected prefix
        prefix: String,
    },
    /// A sibling group with the same prefix already exists.
    DuplicateGroupPrefix {
        /// The duplicated prefix
        prefix: String,
    },
    /// `serve_files` was given a pattern without a `filepath` placeholder.
    MissingFilepathParam {
        /// The rejected pattern
        pattern: String,
    },
    /// A route's compiled fragment is not a valid regular expression.
    InvalidRoutePattern {
        /// Method the route was registered for
        method: Method,
        /// Pattern as registered
        pattern: String,
        /// Underlying regex error
        source: regex::Error,
    },
    /// A route's fragment declares a different number of capture groups than
    /// it has parameters, which would corrupt parameter extraction.
    CaptureGroupMismatch {
        /// Method the route was registered for
        method: Method,
        /// Pattern as registered
        pattern: String,
        /// Number of named parameters
        params: usize,
        /// Number of capture groups found in the fragment
        groups: usize,
    },
    /// The combined matcher for a method failed to compile.
    InvalidCombinedMatcher {
        /// Method whose alternation failed
        method: Method,
        /// Underlying regex error
        source: regex::Error,
    },
    /// A `NodeId` that does not belong to this router.
    UnknownNode {
        /// Raw arena index
        id: usize,
    },
    /// Router configuration could not be parsed.
    InvalidConfig {
        /// Parser message
        message: String,
    },
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::InvalidPattern { pattern } => {
                write!(f, "route pattern {pattern:?} must begin with '/'")
            }
            RouterError::EmptyGroupPrefix => write!(f, "group prefix must not be empty"),
            RouterError::GroupPrefixContainsSlash { prefix } => {
                write!(f, "group prefix {prefix:?} must not contain '/'")
            }
            RouterError::DuplicateGroupPrefix { prefix } => {
                write!(f, "a group with prefix {prefix:?} already exists")
            }
            RouterError::MissingFilepathParam { pattern } => write!(
                f,
                "file serving pattern {pattern:?} has no \"filepath\" parameter"
            ),
            RouterError::InvalidRoutePattern {
                method,
                pattern,
                source,
            } => write!(f, "invalid route {method} {pattern:?}: {source}"),
            RouterError::CaptureGroupMismatch {
                method,
                pattern,
                params,
                groups,
            } => write!(
                f,
                "route {method} {pattern:?} declares {params} parameter(s) but its regex has \
                 {groups} capture group(s); use non-capturing groups (?:...) inside placeholders"
            ),
            RouterError::InvalidCombinedMatcher { method, source } => {
                write!(f, "failed to build combined matcher for {method}: {source}")
            }
            RouterError::UnknownNode { id } => write!(f, "unknown router node #{id}"),
            RouterError::InvalidConfig { message } => {
                write!(f, "invalid router configuration: {message}")
            }
        }
    }
}

impl std::error::Error for RouterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouterError::InvalidRoutePattern { source, .. }
            | RouterError::InvalidCombinedMatcher { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_offending_input() {
        let err = RouterError::InvalidPattern {
            pattern: "users".into(),
        };
        assert!(err.to_string().contains("\"users\""));

        let err = RouterError::DuplicateGroupPrefix {
            prefix: "v1".into(),
        };
        assert!(err.to_string().contains("\"v1\""));
    }

    #[test]
    fn test_source_is_exposed_for_regex_failures() {
        use std::error::Error;

        let source = regex::Regex::new("(").unwrap_err();
        let err = RouterError::InvalidCombinedMatcher {
            method: Method::GET,
            source,
        };
        assert!(err.source().is_some());
        assert!(RouterError::EmptyGroupPrefix.source().is_none());
    }
}
