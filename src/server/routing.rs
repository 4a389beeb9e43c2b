//! Request routing: ordered path-pattern table with first-match-wins lookup.
//!
//! Patterns are split on `/` into segments; a segment starting with `:` binds
//! a named parameter. Lookup scans routes in registration order, so callers
//! must register specific patterns (`/users/active`) before general ones
//! (`/users/:id`) when they overlap.
//!
//! Lookup cost is O(routes × segments). This is fine for the small tables a
//! service like this registers; large tables would want a radix tree.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{ParamMap, Request, Response, Result};

/// Boxed future returned by closure handlers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Route handler.
///
/// Handlers write the response through one of the terminal writers and may
/// fail with any [`crate::core::Error`]; failures go to the exception filters.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, req: &mut Request, res: &mut Response) -> Result<()>;
}

/// Adapter turning a closure into a [`Handler`].
pub struct HandlerFn<F>(F);

/// Wrap a closure as a handler.
///
/// ```rust,ignore
/// router.add_route("GET", "/ping", handler_fn(|_req, res| Box::pin(async move {
///     res.send("pong")
/// })));
/// ```
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, Result<()>> + Send + Sync,
{
    HandlerFn(f)
}

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, Result<()>> + Send + Sync,
{
    async fn call(&self, req: &mut Request, res: &mut Response) -> Result<()> {
        (self.0)(req, res).await
    }
}

/// A group of routes bound together, typically sharing collaborators.
pub trait Controller: Send + Sync {
    fn bind_routes(&self, router: &mut Router);
}

/// One component of a route pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the request segment exactly.
    Literal(String),
    /// Binds the decoded request segment under this name.
    Param(String),
}

impl Segment {
    fn parse(token: &str) -> Self {
        match token.strip_prefix(':') {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Literal(token.to_string()),
        }
    }
}

/// A registered (method, pattern, handler) triple.
pub struct Route {
    method: String,
    pattern: String,
    segments: Vec<Segment>,
    handler: Arc<dyn Handler>,
}

impl Route {
    /// Upper-case method this route answers.
    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Pattern as registered.
    #[inline]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Parsed pattern segments.
    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Try to bind `segments` against this route's pattern.
    fn bind(&self, segments: &[&str]) -> Option<ParamMap> {
        if self.segments.len() != segments.len() {
            return None;
        }

        let mut params = ParamMap::new();
        for (pattern, raw) in self.segments.iter().zip(segments) {
            match pattern {
                Segment::Literal(lit) => {
                    if lit.as_str() != *raw {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = percent_encoding::percent_decode_str(raw)
                        .decode_utf8_lossy()
                        .into_owned();
                    if value.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), value);
                }
            }
        }
        Some(params)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .finish()
    }
}

/// Successful lookup result.
pub struct RouteMatch {
    pub handler: Arc<dyn Handler>,
    pub params: ParamMap,
}

/// Ordered route table.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Create an empty router.
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Append a route. No collision detection: earlier routes win.
    pub fn add_route<H: Handler + 'static>(
        &mut self,
        method: &str,
        pattern: &str,
        handler: H,
    ) -> &mut Self {
        self.add_route_arc(method, pattern, Arc::new(handler))
    }

    /// Append a route with a shared handler.
    pub fn add_route_arc(
        &mut self,
        method: &str,
        pattern: &str,
        handler: Arc<dyn Handler>,
    ) -> &mut Self {
        self.routes.push(Route {
            method: method.to_ascii_uppercase(),
            pattern: pattern.to_string(),
            segments: split_segments(pattern).map(Segment::parse).collect(),
            handler,
        });
        self
    }

    /// Resolve `method` + raw request target to the first matching route.
    pub fn match_route(&self, method: &str, target: &str) -> Option<RouteMatch> {
        let path = strip_query_and_fragment(target);
        let segments: Vec<&str> = split_segments(path).collect();

        self.routes
            .iter()
            .filter(|route| route.method.eq_ignore_ascii_case(method))
            .find_map(|route| {
                route.bind(&segments).map(|params| RouteMatch {
                    handler: Arc::clone(&route.handler),
                    params,
                })
            })
    }

    /// Get the number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check if no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterate routes in precedence order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }
}

/// Split on `/`, dropping empty segments (leading, trailing, repeated slashes).
#[inline]
fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[inline]
fn strip_query_and_fragment(target: &str) -> &str {
    let end = target.find(['?', '#']).unwrap_or(target.len());
    &target[..end]
}
