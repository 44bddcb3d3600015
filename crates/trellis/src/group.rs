//! Route groups.

use std::fmt;

use http::Method;
use trellis_core::{combine, BoxedHandler};

use crate::{Route, RouteError, Router};

/// A registration scope sharing a path prefix and leading handlers.
///
/// Created by [`Router::group`]. Routes registered through the group get the
/// group's prefix in front of their pattern and the group's handlers in
/// front of their own. Groups nest; a nested group starts from its parent's
/// prefix and handlers.
///
/// # Example
///
/// ```
/// use trellis::{handler, Router};
///
/// let mut router = Router::new();
/// let mut api = router.group("/api");
/// api.use_handlers(vec![handler(|ctx| {
///     ctx.set("api", true);
///     Ok(())
/// })]);
///
/// let mut v1 = api.group("/v1");
/// v1.get("/users", vec![]).name("users");
///
/// assert_eq!(router.route("users").unwrap().path(), "/api/v1/users");
/// ```
pub struct RouteGroup<'r> {
    router: &'r mut Router,
    prefix: String,
    handlers: Vec<BoxedHandler>,
}

impl<'r> RouteGroup<'r> {
    pub(crate) fn new(router: &'r mut Router, prefix: String, handlers: Vec<BoxedHandler>) -> Self {
        Self {
            router,
            prefix,
            handlers,
        }
    }

    /// Returns the full prefix, including every enclosing group's.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the handlers prepended to routes registered from now on.
    #[must_use]
    pub fn handlers(&self) -> &[BoxedHandler] {
        &self.handlers
    }

    /// Appends handlers run before every route registered afterwards.
    ///
    /// Routes already registered keep the chain they were built with.
    pub fn use_handlers(&mut self, handlers: Vec<BoxedHandler>) {
        self.handlers.extend(handlers);
    }

    /// Opens a nested group under `prefix`.
    pub fn group(&mut self, prefix: &str) -> RouteGroup<'_> {
        let handlers = self.handlers.clone();
        let prefix = format!("{}{prefix}", self.prefix);
        RouteGroup::new(&mut *self.router, prefix, handlers)
    }

    /// Opens a nested group under `prefix` with extra leading handlers.
    pub fn group_with(&mut self, prefix: &str, handlers: Vec<BoxedHandler>) -> RouteGroup<'_> {
        let mut group = self.group(prefix);
        group.use_handlers(handlers);
        group
    }

    verb_methods! {
        get => GET,
        post => POST,
        put => PUT,
        patch => PATCH,
        delete => DELETE,
        head => HEAD,
        options => OPTIONS,
        connect => CONNECT,
        trace => TRACE,
    }

    /// Registers `handlers` for each of `methods` under the group prefix.
    pub fn try_to(
        &mut self,
        methods: &[Method],
        path: &str,
        handlers: Vec<BoxedHandler>,
    ) -> Result<Route<'_>, RouteError> {
        let chain = combine(&self.handlers, &handlers);
        let full = format!("{}{path}", self.prefix);
        let index = self.router.add(methods, &full, chain)?;
        Ok(Route::new(&mut *self.router, index))
    }
}

impl fmt::Debug for RouteGroup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteGroup")
            .field("prefix", &self.prefix)
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}
