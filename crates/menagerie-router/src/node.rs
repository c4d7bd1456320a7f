//! Segment tree nodes.

use http::Method;

use crate::method_router::MethodRouter;
use crate::{RouteError, Segment};

/// Segment text of placeholder nodes. Names live on the endpoint.
const PARAM_SEGMENT: &str = ":";

/// A registered handler together with its original pattern and the names
/// of its placeholders, in order.
#[derive(Debug, Clone)]
pub(crate) struct Endpoint<T> {
    pub(crate) pattern: String,
    pub(crate) param_names: Vec<String>,
    pub(crate) handler: T,
}

/// A node in the segment tree.
///
/// Static children are kept sorted for binary search; each node has at most
/// one placeholder child, shared by every route whatever it names the
/// placeholder.
#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    segment: String,
    methods: MethodRouter<Endpoint<T>>,
    static_children: Vec<Node<T>>,
    param_child: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    pub(crate) fn root() -> Self {
        Self::new(String::new())
    }

    fn new(segment: String) -> Self {
        Self {
            segment,
            methods: MethodRouter::new(),
            static_children: Vec::new(),
            param_child: None,
        }
    }

    /// Inserts a route below this node.
    pub(crate) fn insert(
        &mut self,
        segments: &[Segment<'_>],
        method: Method,
        endpoint: Endpoint<T>,
    ) -> Result<(), RouteError> {
        let Some((first, rest)) = segments.split_first() else {
            if let Some(existing) = self.methods.get(&method) {
                return Err(RouteError::Duplicate {
                    existing: existing.pattern.clone(),
                    pattern: endpoint.pattern,
                    method,
                });
            }
            // Cannot fail: presence was checked above.
            let _ = self.methods.insert(method, endpoint);
            return Ok(());
        };

        match *first {
            Segment::Static(segment) => {
                let index = match self.find_static(segment) {
                    Ok(index) => index,
                    Err(index) => {
                        self.static_children
                            .insert(index, Node::new(segment.to_string()));
                        index
                    }
                };
                self.static_children[index].insert(rest, method, endpoint)
            }
            Segment::Param(_) => self
                .param_child
                .get_or_insert_with(|| Box::new(Node::new(PARAM_SEGMENT.to_string())))
                .insert(rest, method, endpoint),
        }
    }

    /// Finds the endpoint for a request path split into segments, pushing
    /// the raw segment captured by each placeholder onto `values`.
    pub(crate) fn find<'a, 'p>(
        &'a self,
        segments: &[&'p str],
        method: &Method,
        values: &mut Vec<&'p str>,
    ) -> Option<&'a Endpoint<T>> {
        let Some((first, rest)) = segments.split_first() else {
            return self.methods.get(method);
        };

        if let Ok(index) = self.find_static(first) {
            if let Some(found) = self.static_children[index].find(rest, method, values) {
                return Some(found);
            }
        }

        if let Some(child) = &self.param_child {
            let mark = values.len();
            values.push(*first);
            if let Some(found) = child.find(rest, method, values) {
                return Some(found);
            }
            values.truncate(mark);
        }

        None
    }

    fn find_static(&self, segment: &str) -> Result<usize, usize> {
        self.static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
    }
}
