//! # Pattern Module
//!
//! Turns a route pattern such as `/posts/<year:\d{4}>/<title>` into the regex
//! fragment the combined matcher is built from, plus the ordered list of
//! parameter names and the trailing-slash flag.
//!
//! ## Placeholder grammar
//!
//! | Placeholder     | Converted to |
//! |:----------------|:-------------|
//! | `<name>`        | `([^/]+)`    |
//! | `<name:regexp>` | `(regexp)`   |
//!
//! Literal text between placeholders is copied verbatim: patterns are trusted
//! configuration and may use regex syntax directly.
//!
//! ## Examples
//!
//! | Pattern                                     | Regexp                             | Trailing slash | Params                    |
//! |:--------------------------------------------|:-----------------------------------|:---------------|:--------------------------|
//! | `/`                                         | `//?`                              | no             |                           |
//! | `/hello/<name>`                             | `/hello/([^/]+)/?`                 | no             | `name`                    |
//! | `/users/<name:\w+>/posts/`                  | `/users/(\w+)/posts/?`             | yes            | `name`                    |
//! | `/posts/<year:\d{4}>/<month:\d{2}>/<title>` | `/posts/(\d{4})/(\d{2})/([^/]+)/?` | no             | `year`, `month`, `title`  |
//!
//! The grammar is swappable: implement [`PatternParser`] or build a
//! [`DefaultParser`] around a different placeholder regex.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::RouterError;

/// Capture used for placeholders without an explicit sub-expression.
pub const DEFAULT_PARAM_REGEX: &str = "([^/]+)";

/// Suffix appended to every fragment so that paths match with or without a
/// trailing slash. The trailing-slash policy decides what to do about it.
pub const OPTIONAL_TRAILING_SLASH: &str = "/?";

static DEFAULT_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"<([^/:>]+)(?::([^>]*))?>").expect("default placeholder regex is valid")
});

/// Result of parsing one pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPattern {
    /// Regex fragment without anchors, always ending in `/?`
    pub regex: String,
    /// Parameter names in left-to-right order
    pub params: Vec<String>,
    /// Whether the pattern itself ended in `/` (ignored for `/`)
    pub has_trailing_slash: bool,
}

/// Converts a route pattern into a [`ParsedPattern`].
///
/// Implementations must return exactly one capture group per parameter, in
/// the order of `params`; the router rejects fragments that do not.
pub trait PatternParser: Send + Sync {
    /// Parse `pattern`, failing with [`RouterError::InvalidPattern`] when it
    /// is empty or does not begin with `/`.
    fn parse(&self, pattern: &str) -> Result<ParsedPattern, RouterError>;
}

/// The default placeholder parser.
#[derive(Debug, Clone)]
pub struct DefaultParser {
    placeholder: Regex,
}

impl Default for DefaultParser {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.clone(),
        }
    }
}

impl DefaultParser {
    /// Parser using the `<name>` / `<name:regexp>` grammar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser using a custom placeholder grammar.
    ///
    /// Capture group 1 of `placeholder` must yield the parameter name and
    /// the optional capture group 2 its sub-expression.
    ///
    /// ```
    /// use regex::Regex;
    /// use regexmux::pattern::{DefaultParser, PatternParser};
    ///
    /// let braces = Regex::new(r"\{([^/:}]+)(?::([^}]+))?\}").unwrap();
    /// let parsed = DefaultParser::with_regex(braces).parse("/users/{id}").unwrap();
    /// assert_eq!(parsed.regex, "/users/([^/]+)/?");
    /// ```
    #[must_use]
    pub fn with_regex(placeholder: Regex) -> Self {
        Self { placeholder }
    }
}

impl PatternParser for DefaultParser {
    fn parse(&self, pattern: &str) -> Result<ParsedPattern, RouterError> {
        if !pattern.starts_with('/') {
            return Err(RouterError::InvalidPattern {
                pattern: pattern.to_string(),
            });
        }

        let (body, has_trailing_slash) = match pattern.strip_suffix('/') {
            Some(stripped) if pattern != "/" => (stripped, true),
            _ => (pattern, false),
        };

        let mut regex = String::with_capacity(body.len() + 8);
        let mut params = Vec::new();
        let mut last = 0;

        for caps in self.placeholder.captures_iter(body) {
            let Some(whole) = caps.get(0) else { continue };
            regex.push_str(&body[last..whole.start()]);
            params.push(caps.get(1).map_or("", |m| m.as_str()).to_string());
            match caps.get(2).filter(|expr| !expr.as_str().is_empty()) {
                Some(expr) => {
                    regex.push('(');
                    regex.push_str(expr.as_str());
                    regex.push(')');
                }
                None => regex.push_str(DEFAULT_PARAM_REGEX),
            }
            last = whole.end();
        }
        regex.push_str(&body[last..]);
        regex.push_str(OPTIONAL_TRAILING_SLASH);

        Ok(ParsedPattern {
            regex,
            params,
            has_trailing_slash,
        })
    }
}
