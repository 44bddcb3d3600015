//! The route registry and request dispatcher.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use http::Method;
use trellis_config::RouterConfig;
use trellis_core::{
    combine, handler, BoxedHandler, Chain, Context, Error, Request, Response, UrlResolver,
};
use trellis_router::{Matcher, Params, Pattern};
use trellis_telemetry::{fields, record_dispatch, record_route_count, DispatchOutcome};

use crate::defaults::{default_error_handler, method_not_allowed_handler, not_found_handler};
use crate::normalize::normalize_request_path;
use crate::route::NamedRoutes;
use crate::{Route, RouteError, RouteGroup, RouteInfo};

/// Hook that turns a handler error into a response.
pub type ErrorHandler = Arc<dyn Fn(&mut Context, Error) + Send + Sync>;

/// Route registry and dispatcher.
///
/// Routes are registered through `&mut self` during setup. Once built, the
/// router is read-only: [`Router::handle_request`] takes `&self`, so one
/// router can serve requests from many threads.
///
/// The router is also the root scope: [`Router::use_handlers`] prepends
/// handlers to every route registered afterwards and to the not-found chain.
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use http::{header, Method, StatusCode};
/// use trellis::{handler, Router};
///
/// let mut router = Router::new();
/// let ok = handler(|ctx| {
///     ctx.write("ok");
///     Ok(())
/// });
/// router.get("/users", vec![ok.clone()]);
/// router.post("/users", vec![ok]);
///
/// let request = http::Request::builder()
///     .method(Method::PUT)
///     .uri("/users")
///     .body(Bytes::new())
///     .unwrap();
/// let response = router.handle_request(request);
///
/// assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
/// assert_eq!(response.headers()[header::ALLOW], "GET, OPTIONS, POST");
/// ```
pub struct Router {
    config: RouterConfig,
    matcher: Matcher<Chain>,
    routes: Vec<RouteInfo>,
    names: HashMap<String, usize>,
    urls: Arc<NamedRoutes>,
    handlers: Vec<BoxedHandler>,
    fallback: Vec<BoxedHandler>,
    not_found_chain: Chain,
    error_handler: ErrorHandler,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates a router with default path handling.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&RouterConfig::default())
    }

    /// Creates a router with the given path handling.
    ///
    /// # Example
    ///
    /// ```
    /// use trellis::{Router, RouterConfig};
    ///
    /// let router = Router::with_config(&RouterConfig {
    ///     ignore_trailing_slash: true,
    ///     ..RouterConfig::default()
    /// });
    /// assert!(router.config().ignore_trailing_slash);
    /// ```
    #[must_use]
    pub fn with_config(config: &RouterConfig) -> Self {
        let fallback = vec![
            handler(method_not_allowed_handler),
            handler(not_found_handler),
        ];
        let not_found_chain = combine(&[], &fallback);
        Self {
            config: config.clone(),
            matcher: Matcher::new(),
            routes: Vec::new(),
            names: HashMap::new(),
            urls: Arc::default(),
            handlers: Vec::new(),
            fallback,
            not_found_chain,
            error_handler: Arc::new(default_error_handler),
        }
    }

    /// Returns the path handling options.
    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Returns the path handling options for modification.
    pub fn config_mut(&mut self) -> &mut RouterConfig {
        &mut self.config
    }

    // --- Scope ---

    /// Appends handlers to the root scope.
    ///
    /// They run before the handlers of every route registered afterwards and
    /// before the not-found handlers.
    pub fn use_handlers(&mut self, handlers: Vec<BoxedHandler>) {
        self.handlers.extend(handlers);
        self.rebuild_not_found_chain();
    }

    /// Returns the root scope's handlers.
    #[must_use]
    pub fn handlers(&self) -> &[BoxedHandler] {
        &self.handlers
    }

    /// Replaces the handlers run when no route matches.
    ///
    /// The root scope's handlers still run first.
    pub fn not_found(&mut self, handlers: Vec<BoxedHandler>) {
        self.fallback = handlers;
        self.rebuild_not_found_chain();
    }

    /// Returns the full chain run when no route matches.
    #[must_use]
    pub fn not_found_handlers(&self) -> &Chain {
        &self.not_found_chain
    }

    fn rebuild_not_found_chain(&mut self) {
        self.not_found_chain = combine(&self.handlers, &self.fallback);
    }

    /// Replaces the hook that turns handler errors into responses.
    ///
    /// # Example
    ///
    /// ```
    /// use http::StatusCode;
    /// use trellis::Router;
    ///
    /// let mut router = Router::new();
    /// router.set_error_handler(|ctx, err| {
    ///     ctx.set_status(err.status_code());
    ///     ctx.write(format!("{{\"error\":\"{err}\"}}"));
    /// });
    /// ```
    pub fn set_error_handler<F>(&mut self, f: F)
    where
        F: Fn(&mut Context, Error) + Send + Sync + 'static,
    {
        self.error_handler = Arc::new(f);
    }

    /// Runs the error hook on `ctx`.
    pub fn handle_error(&self, ctx: &mut Context, err: Error) {
        (self.error_handler)(ctx, err);
    }

    /// Opens a group under `prefix` that starts with the root scope's
    /// handlers.
    pub fn group(&mut self, prefix: &str) -> RouteGroup<'_> {
        let handlers = self.handlers.clone();
        RouteGroup::new(self, prefix.to_string(), handlers)
    }

    /// Opens a group under `prefix` with extra leading handlers.
    pub fn group_with(&mut self, prefix: &str, handlers: Vec<BoxedHandler>) -> RouteGroup<'_> {
        let mut group = self.group(prefix);
        group.use_handlers(handlers);
        group
    }

    // --- Registration ---

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

    /// Registers `handlers` for each of `methods`.
    ///
    /// The root scope's handlers are prepended. Registering a method and
    /// pattern that already exist replaces the earlier chain.
    pub fn try_to(
        &mut self,
        methods: &[Method],
        path: &str,
        handlers: Vec<BoxedHandler>,
    ) -> Result<Route<'_>, RouteError> {
        let chain = combine(&self.handlers, &handlers);
        let index = self.add(methods, path, chain)?;
        Ok(Route::new(self, index))
    }

    pub(crate) fn add(
        &mut self,
        methods: &[Method],
        path: &str,
        chain: Chain,
    ) -> Result<usize, RouteError> {
        if methods.is_empty() {
            return Err(RouteError::NoMethods(path.to_string()));
        }
        let pattern = Pattern::parse(path)?;

        for method in methods {
            let replaced = self
                .matcher
                .insert_pattern(method.clone(), &pattern, Arc::clone(&chain));
            if replaced.is_some() {
                tracing::debug!(http.method = %method, route = path, "route replaced");
            }
        }
        tracing::debug!(
            route = path,
            methods = ?methods,
            handlers = chain.len(),
            "route registered"
        );
        record_route_count(self.matcher.len());

        self.routes.push(RouteInfo::new(methods.to_vec(), pattern));
        Ok(self.routes.len() - 1)
    }

    // --- Named routes ---

    pub(crate) fn name_route(&mut self, index: usize, name: String) {
        let urls = Arc::make_mut(&mut self.urls);
        if let Some(old) = self.routes[index].name() {
            if old != name && self.names.get(old) == Some(&index) {
                let old = old.to_string();
                self.names.remove(&old);
                urls.remove(&old);
            }
        }

        if let Some(previous) = self.names.insert(name.clone(), index) {
            if previous != index {
                tracing::warn!(
                    route.name = %name,
                    previous = %self.routes[previous],
                    current = %self.routes[index],
                    "route name reassigned"
                );
                self.routes[previous].set_name(None);
            }
        }
        self.routes[index].set_name(Some(name.clone()));
        urls.insert(name, self.routes[index].clone());
    }

    pub(crate) fn route_at(&self, index: usize) -> &RouteInfo {
        &self.routes[index]
    }

    /// Looks up a route by name.
    #[must_use]
    pub fn route(&self, name: &str) -> Option<&RouteInfo> {
        self.names.get(name).map(|&index| &self.routes[index])
    }

    /// Returns every registration in order.
    #[must_use]
    pub fn routes(&self) -> &[RouteInfo] {
        &self.routes
    }

    /// Builds a URL for the named route.
    ///
    /// Returns an empty string when no route has that name. See
    /// [`RouteInfo::url`] for how parameters are substituted.
    #[must_use]
    pub fn url(&self, name: &str, pairs: &[(&str, &dyn fmt::Display)]) -> String {
        self.route(name)
            .map_or_else(String::new, |route| route.url(pairs))
    }

    // --- Matching ---

    /// Returns the largest parameter count of any registered pattern.
    #[must_use]
    pub fn max_params(&self) -> usize {
        self.matcher.max_params()
    }

    /// Resolves `method` and `path` without running anything.
    ///
    /// `path` is matched as given; no normalization is applied.
    #[must_use]
    pub fn find(&self, method: &Method, path: &str) -> Option<(&Chain, Params)> {
        let mut params = Params::with_capacity(self.matcher.max_params());
        let chain = self.matcher.find(method, path, &mut params)?;
        Some((chain, params))
    }

    /// Methods under which `path` resolves to a route.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        self.matcher.allowed_methods(path)
    }

    // --- Dispatch ---

    /// Runs the chain for `request` and returns the finished context.
    ///
    /// Errors from the chain have already gone through the error hook. The
    /// handlers run inside a `dispatch` span that records the final status.
    pub fn dispatch(&self, request: Request) -> Context {
        let start = Instant::now();
        let method = request.method().clone();
        let path = normalize_request_path(request.uri().path(), &self.config);
        let span = tracing::debug_span!(
            "dispatch",
            http.method = %method,
            http.path = %path,
            http.status_code = tracing::field::Empty
        );
        let _entered = span.enter();
        let mut params = Params::with_capacity(self.matcher.max_params());

        let (mut ctx, mut outcome) = match self.matcher.find(&method, &path, &mut params) {
            Some(chain) => (
                Context::with_params(request, Arc::clone(chain), params),
                DispatchOutcome::Matched,
            ),
            None => {
                tracing::debug!("no route matched");
                let mut ctx =
                    Context::with_params(request, Arc::clone(&self.not_found_chain), params);
                ctx.set_allowed_methods(self.matcher.allowed_methods(&path));
                (ctx, DispatchOutcome::NotFound)
            }
        };
        let urls: Arc<dyn UrlResolver> = Arc::<NamedRoutes>::clone(&self.urls);
        ctx.set_url_resolver(urls);

        if let Err(err) = ctx.next() {
            if outcome == DispatchOutcome::Matched {
                outcome = DispatchOutcome::Error;
            }
            self.handle_error(&mut ctx, err);
        }

        span.record(fields::HTTP_STATUS, ctx.status().as_u16());
        record_dispatch(method.as_str(), outcome, start.elapsed());
        ctx
    }

    /// Runs the chain for `request` and builds the response.
    pub fn handle_request(&self, request: Request) -> Response {
        self.dispatch(request).into_response()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("config", &self.config)
            .field("routes", &self.routes.len())
            .field("names", &self.names.len())
            .field("max_params", &self.matcher.max_params())
            .field("handlers", &self.handlers.len())
            .field("not_found_handlers", &self.not_found_chain.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use trellis_core::HttpError;

    fn request(method: Method, uri: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::new())
            .unwrap()
    }

    #[test]
    fn test_router_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Router>();
    }

    #[test]
    fn test_new_router_not_found_chain() {
        let mut router = Router::new();
        assert_eq!(router.not_found_handlers().len(), 2);

        router.use_handlers(vec![handler(not_found_handler)]);
        assert_eq!(router.not_found_handlers().len(), 3);
    }

    #[test]
    fn test_max_params_tracks_routes() {
        let mut router = Router::new();
        assert_eq!(router.max_params(), 0);
        router.get("/users/<id>", vec![]);
        assert_eq!(router.max_params(), 1);
    }

    #[test]
    fn test_find_returns_chain_and_params() {
        let mut router = Router::new();
        router.get("/users/<id>", vec![handler(not_found_handler)]);

        let (chain, params) = router.find(&Method::GET, "/users/1").unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("id"), Some("1"));
        assert!(router.find(&Method::POST, "/users/1").is_none());
    }

    #[test]
    fn test_named_route_lookup() {
        let mut router = Router::new();
        router.get("/users", vec![]).name("users");
        assert!(router.route("users").is_some());
        assert!(router.route("users2").is_none());
    }

    #[test]
    fn test_duplicate_name_last_wins() {
        let mut router = Router::new();
        router.get("/a", vec![]).name("dup");
        router.get("/b", vec![]).name("dup");

        assert_eq!(router.route("dup").unwrap().path(), "/b");
        assert_eq!(router.routes()[0].name(), None);
        assert_eq!(router.url("dup", &[]), "/b");
    }

    #[test]
    fn test_renaming_route_frees_old_name() {
        let mut router = Router::new();
        router.get("/a", vec![]).name("first").name("second");
        assert!(router.route("first").is_none());
        assert_eq!(router.route("second").unwrap().name(), Some("second"));
    }

    #[test]
    fn test_url_unknown_name_is_empty() {
        let mut router = Router::new();
        router.get(r"/users/<id:\d+>/<action>/*", vec![]).name("users");
        assert_eq!(
            router.url("users", &[("id", &123), ("action", &"address")]),
            "/users/123/address/"
        );
        assert_eq!(router.url("abc", &[("id", &123)]), "");
    }

    #[test]
    fn test_handler_builds_url_from_context() {
        let mut router = Router::new();
        router.get(r"/users/<id:\d+>/<action>/*", vec![]).name("users");
        router.get("/links", vec![handler(|ctx| {
            let users = ctx.url("users", &[("id", &123), ("action", &"address")]);
            let missing = ctx.url("abc", &[("id", &123)]);
            ctx.write(format!("{users}|{missing}"));
            Ok(())
        })]);

        let ctx = router.dispatch(request(Method::GET, "/links"));
        assert_eq!(ctx.body(), b"/users/123/address/|");
    }

    #[test]
    fn test_context_url_sees_renamed_route() {
        let mut router = Router::new();
        router.get("/a", vec![]).name("first").name("second");
        router.get("/b", vec![]).name("dup");
        router.get("/c", vec![]).name("dup");

        let ctx = router.dispatch(request(Method::GET, "/a"));
        assert_eq!(ctx.url("first", &[]), "");
        assert_eq!(ctx.url("second", &[]), "/a");
        assert_eq!(ctx.url("dup", &[]), "/c");
    }

    #[test]
    fn test_try_to_errors() {
        let mut router = Router::new();
        assert!(matches!(
            router.try_to(&[Method::GET], "users", vec![]),
            Err(RouteError::Pattern(_))
        ));
        assert!(matches!(
            router.try_to(&[], "/users", vec![]),
            Err(RouteError::NoMethods(_))
        ));
        assert!(router.routes().is_empty());
    }

    #[test]
    #[should_panic(expected = "cannot register route")]
    fn test_verb_panics_on_bad_pattern() {
        let mut router = Router::new();
        router.get("/files/*/tail", vec![]);
    }

    #[test]
    fn test_any_registers_every_method() {
        let mut router = Router::new();
        router.any("/ping", vec![]);
        assert_eq!(router.allowed_methods("/ping").len(), crate::METHODS.len());
        assert_eq!(router.routes().len(), 1);
    }

    #[test]
    fn test_handle_error_maps_status() {
        let router = Router::new();

        let mut ctx = Context::new(request(Method::GET, "/"), Vec::<BoxedHandler>::new());
        router.handle_error(&mut ctx, Error::internal("abc"));
        assert_eq!(ctx.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let mut ctx = Context::new(request(Method::GET, "/"), Vec::<BoxedHandler>::new());
        router.handle_error(&mut ctx, HttpError::not_found().into());
        assert_eq!(ctx.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_custom_error_handler() {
        let mut router = Router::new();
        router.set_error_handler(|ctx, err| {
            ctx.set_status(StatusCode::IM_A_TEAPOT);
            ctx.write(format!("custom: {err}"));
        });
        router.get("/fail", vec![handler(|_| Err(Error::internal("boom")))]);

        let ctx = router.dispatch(request(Method::GET, "/fail"));
        assert_eq!(ctx.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(ctx.body(), b"custom: Internal error: boom");
    }

    #[test]
    fn test_replaced_route_uses_new_chain() {
        let mut router = Router::new();
        router.get("/x", vec![handler(|ctx| {
            ctx.write("old");
            Ok(())
        })]);
        router.get("/x", vec![handler(|ctx| {
            ctx.write("new");
            Ok(())
        })]);

        let ctx = router.dispatch(request(Method::GET, "/x"));
        assert_eq!(ctx.body(), b"new");
        assert_eq!(router.routes().len(), 2);
    }

    #[test]
    fn test_config_mut_applies_to_later_requests() {
        let mut router = Router::new();
        router.get("/users", vec![]);
        assert_eq!(
            router.dispatch(request(Method::GET, "/users/")).status(),
            StatusCode::NOT_FOUND
        );

        router.config_mut().ignore_trailing_slash = true;
        assert_eq!(
            router.dispatch(request(Method::GET, "/users/")).status(),
            StatusCode::OK
        );
    }
}
