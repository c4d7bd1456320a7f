//! High-level router API.

use std::borrow::Cow;

use http::Method;

use crate::node::{Endpoint, Node};
use crate::params::Params;
use crate::{parse_pattern, RouteError, RouteMatch, Segment};

/// A route table mapping method and path to handlers.
///
/// # Example
///
/// ```rust
/// use menagerie_router::{RouteError, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router.insert(Method::GET, "/books", 1).unwrap();
/// router.insert(Method::GET, "/books/:bookId", 2).unwrap();
///
/// let m = router.match_route(&Method::GET, "/books/dune").unwrap();
/// assert_eq!(*m.handler, 2);
/// assert_eq!(m.pattern, "/books/:bookId");
///
/// let err = router.insert(Method::GET, "/books/", 3).unwrap_err();
/// assert!(matches!(err, RouteError::Duplicate { .. }));
/// ```
#[derive(Debug, Clone)]
pub struct Router<T> {
    root: Node<T>,
    routes: Vec<(Method, String)>,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            routes: Vec::new(),
        }
    }

    /// Registers a handler for a method and pattern.
    pub fn insert(&mut self, method: Method, pattern: &str, handler: T) -> Result<(), RouteError> {
        let segments = parse_pattern(pattern)?;
        let param_names = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param(name) => Some((*name).to_string()),
                Segment::Static(_) => None,
            })
            .collect();

        self.root.insert(
            &segments,
            method.clone(),
            Endpoint {
                pattern: pattern.to_string(),
                param_names,
                handler,
            },
        )?;
        self.routes.push((method, pattern.to_string()));
        Ok(())
    }

    /// Finds the handler for a request method and path.
    ///
    /// Captured values are percent-decoded and named after the matched
    /// route's own placeholders. A segment that does not decode to UTF-8 is
    /// kept as sent.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut values = Vec::new();
        let endpoint = self.root.find(&segments, method, &mut values)?;

        let params: Params = endpoint
            .param_names
            .iter()
            .zip(values)
            .map(|(name, raw)| {
                let value = urlencoding::decode(raw).map_or_else(|_| raw.to_string(), Cow::into_owned);
                (name.clone(), value)
            })
            .collect();

        Some(RouteMatch {
            handler: &endpoint.handler,
            pattern: &endpoint.pattern,
            params,
        })
    }

    /// Lists registered routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = (&Method, &str)> {
        self.routes.iter().map(|(m, p)| (m, p.as_str()))
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
