//! Per-path method table.

use http::Method;
use smallvec::SmallVec;

/// Maps HTTP methods to handlers for a single path.
///
/// # Example
///
/// ```rust
/// use menagerie_router::MethodRouter;
/// use http::Method;
///
/// let mut methods = MethodRouter::new();
/// assert!(methods.insert(Method::GET, "getAllPets").is_ok());
/// assert!(methods.insert(Method::POST, "createPet").is_ok());
/// assert!(methods.insert(Method::GET, "again").is_err());
///
/// assert_eq!(methods.get(&Method::POST), Some(&"createPet"));
/// assert_eq!(methods.get(&Method::DELETE), None);
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    routes: SmallVec<[(Method, T); 2]>,
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self {
            routes: SmallVec::new(),
        }
    }
}

impl<T> MethodRouter<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a method.
    ///
    /// Returns the handler back if the method is already taken.
    pub fn insert(&mut self, method: Method, handler: T) -> Result<(), T> {
        if self.contains(&method) {
            return Err(handler);
        }
        self.routes.push((method, handler));
        Ok(())
    }

    /// Returns the handler for a method.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&T> {
        self.routes
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, handler)| handler)
    }

    /// Returns `true` if a handler is registered for the method.
    #[must_use]
    pub fn contains(&self, method: &Method) -> bool {
        self.routes.iter().any(|(m, _)| m == method)
    }

    /// Returns `true` if no method is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Lists registered methods in registration order.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        self.routes.iter().map(|(m, _)| m.clone()).collect()
    }
}
