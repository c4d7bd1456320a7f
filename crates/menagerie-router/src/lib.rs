//! Segment-tree router for Menagerie.
//!
//! Routes are registered as an HTTP method plus a path pattern. Patterns are
//! static segments and `:name` placeholders; there is no regex or wildcard
//! support. Each route carries an arbitrary handler value `T`.
//!
//! - Static segments take priority over placeholders.
//! - Registering the same method and pattern twice fails with
//!   [`RouteError::Duplicate`]. Placeholder names do not distinguish
//!   patterns, so `GET /pets/:id` and `GET /pets/:petId` collide, while
//!   `DELETE /pets/:id` beside `GET /pets/:petId` is fine.
//! - Captured values are percent-decoded and named after the matched
//!   route's placeholders.
//!
//! # Example
//!
//! ```rust
//! use menagerie_router::Router;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.insert(Method::GET, "/pets", "getAllPets").unwrap();
//! router.insert(Method::GET, "/pets/:petId", "getPetById").unwrap();
//!
//! let m = router.match_route(&Method::GET, "/pets/7").unwrap();
//! assert_eq!(*m.handler, "getPetById");
//! assert_eq!(m.params.get("petId"), Some("7"));
//!
//! assert!(router.insert(Method::GET, "/pets/:id", "again").is_err());
//! ```
//!
//! # Architecture
//!
//! ```text
//!              (root)
//!            /        \
//!        "books"     "pets" [GET, POST]
//!        [GET]          |
//!          |         ":petId" [GET]
//!      ":bookId" [GET]
//! ```

mod method_router;
mod node;
mod params;
mod router;

use http::Method;
use thiserror::Error;

pub use method_router::MethodRouter;
pub use params::Params;
pub use router::Router;

/// A matched route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    /// The handler registered for the route
    pub handler: &'a T,
    /// The pattern the route was registered with
    pub pattern: &'a str,
    /// Placeholder values, in pattern order
    pub params: Params,
}

/// Errors raised while registering routes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The pattern cannot be parsed.
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A route with the same method and pattern already exists.
    #[error("duplicate route {method} {pattern} (already registered as {existing})")]
    Duplicate {
        /// HTTP method.
        method: Method,
        /// The pattern being registered.
        pattern: String,
        /// The pattern registered first.
        existing: String,
    },
}

/// One parsed pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal text.
    Static(&'a str),
    /// A `:name` placeholder.
    Param(&'a str),
}

/// Parses a pattern into segments.
///
/// Empty segments (repeated or trailing slashes) are ignored.
pub fn parse_pattern(pattern: &str) -> Result<Vec<Segment<'_>>, RouteError> {
    let invalid = |reason| RouteError::InvalidPattern {
        pattern: pattern.to_string(),
        reason,
    };

    if !pattern.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }

    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            if let Some(name) = s.strip_prefix(':') {
                if name.is_empty() {
                    return Err(invalid("placeholder needs a name"));
                }
                if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(invalid("placeholder names are alphanumeric"));
                }
                Ok(Segment::Param(name))
            } else if s.starts_with('*') || s.starts_with('{') {
                Err(invalid("only ':name' placeholders are supported"))
            } else {
                Ok(Segment::Static(s))
            }
        })
        .collect()
}

/// Returns the placeholder names of a pattern, in order.
pub fn placeholders(pattern: &str) -> Result<Vec<&str>, RouteError> {
    Ok(parse_pattern(pattern)?
        .into_iter()
        .filter_map(|s| match s {
            Segment::Param(name) => Some(name),
            Segment::Static(_) => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pattern() {
        let segments = parse_pattern("/pets/:petId").unwrap();
        assert_eq!(segments, vec![Segment::Static("pets"), Segment::Param("petId")]);
    }

    #[test]
    fn test_parse_root_and_trailing_slash() {
        assert!(parse_pattern("/").unwrap().is_empty());
        assert_eq!(parse_pattern("/books/").unwrap(), vec![Segment::Static("books")]);
    }

    #[test]
    fn test_invalid_patterns() {
        for pattern in ["pets", "/pets/:", "/files/*path", "/users/{id}", "/a/:b-c"] {
            assert!(
                matches!(parse_pattern(pattern), Err(RouteError::InvalidPattern { .. })),
                "{pattern} should be rejected"
            );
        }
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(
            placeholders("/orgs/:orgId/pets/:petId").unwrap(),
            vec!["orgId", "petId"]
        );
        assert!(placeholders("/books").unwrap().is_empty());
    }
}
