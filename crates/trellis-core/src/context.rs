//! Per-request execution state.
//!
//! A [`Context`] owns the request, the handler chain resolved for it, the
//! bound path parameters, a key/value bag shared by the handlers and the
//! response being built. It also gives handlers read access to the query
//! string, the url-encoded request body and the router's named routes.
//!
//! # Chain execution
//!
//! The context keeps a cursor into the chain that starts at `-1`.
//! [`Context::next`] advances it and runs handlers until the chain is
//! exhausted. Because the cursor lives in the context, a handler may call
//! `next()` itself to wrap the rest of the chain; when it returns, the outer
//! loop sees the advanced cursor and does not run anything twice.
//!
//! ```
//! use trellis_core::{handler, Context};
//! # use bytes::Bytes;
//!
//! let outer = handler(|ctx| {
//!     ctx.write("<a>");
//!     ctx.next()?;
//!     ctx.write("</a>");
//!     Ok(())
//! });
//! let inner = handler(|ctx| {
//!     ctx.write("<b/>");
//!     Ok(())
//! });
//!
//! let request = http::Request::new(Bytes::new());
//! let mut ctx = Context::new(request, vec![outer, inner]);
//! ctx.next().unwrap();
//! assert_eq!(ctx.body(), b"<a><b/></a>");
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::BytesMut;
use http::header::{self, HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode, Uri};
use http_body_util::Full;
use trellis_router::Params;

use crate::handler::Chain;
use crate::types::{Request, Response};
use crate::urls::UrlResolver;
use crate::TrellisResult;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Per-request state that flows through a handler chain.
pub struct Context {
    request: Request,
    handlers: Chain,
    index: isize,
    params: Params,
    data: HashMap<String, Box<dyn Any + Send + Sync>>,
    allowed_methods: Vec<Method>,
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    urls: Option<Arc<dyn UrlResolver>>,
}

impl Context {
    /// Creates a context over `handlers` with no bound parameters.
    pub fn new(request: Request, handlers: impl Into<Chain>) -> Self {
        Self::with_params(request, handlers.into(), Params::new())
    }

    /// Creates a context with parameters already bound by the matcher.
    #[must_use]
    pub fn with_params(request: Request, handlers: Chain, params: Params) -> Self {
        Self {
            request,
            handlers,
            index: -1,
            params,
            data: HashMap::new(),
            allowed_methods: Vec::new(),
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
            urls: None,
        }
    }

    /// Runs the remaining handlers in order.
    ///
    /// Stops at the first error and returns it. Calling this from inside a
    /// handler runs the rest of the chain before the caller resumes.
    pub fn next(&mut self) -> TrellisResult<()> {
        let handlers = Arc::clone(&self.handlers);
        self.index += 1;
        while let Some(handler) = usize::try_from(self.index)
            .ok()
            .and_then(|i| handlers.get(i))
        {
            handler.handle(self)?;
            self.index += 1;
        }
        Ok(())
    }

    /// Skips every handler that has not run yet.
    ///
    /// Handlers already on the call stack still finish their own code.
    pub fn abort(&mut self) {
        self.index = isize::try_from(self.handlers.len()).unwrap_or(isize::MAX);
    }

    /// Returns true once the cursor has moved past the last handler.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        usize::try_from(self.index).is_ok_and(|i| i >= self.handlers.len())
    }

    /// Returns the cursor position; `-1` before the first `next()`.
    #[must_use]
    pub fn index(&self) -> isize {
        self.index
    }

    /// Returns the chain this context executes.
    #[must_use]
    pub fn handlers(&self) -> &Chain {
        &self.handlers
    }

    // --- Path parameters ---

    /// Returns the value of a path parameter, or `""` when absent.
    #[must_use]
    pub fn param(&self, name: &str) -> &str {
        self.params.get(name).unwrap_or("")
    }

    /// Overwrites a path parameter, or adds it when absent.
    pub fn set_param(&mut self, name: &str, value: impl Into<String>) {
        self.params.set(name, value);
    }

    /// Returns every bound path parameter.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    // --- Request-scoped data ---

    /// Stores a value under `key`, replacing any previous one.
    ///
    /// # Example
    ///
    /// ```
    /// use trellis_core::{BoxedHandler, Context};
    /// # use bytes::Bytes;
    ///
    /// let mut ctx = Context::new(http::Request::new(Bytes::new()), Vec::<BoxedHandler>::new());
    /// ctx.set("user", String::from("alice"));
    /// assert_eq!(ctx.get::<String>("user").map(String::as_str), Some("alice"));
    /// assert!(ctx.get::<u32>("user").is_none());
    /// ```
    pub fn set<T: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.data.insert(key.into(), Box::new(value));
    }

    /// Returns the value under `key` if it exists and has type `T`.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self, key: &str) -> Option<&T> {
        self.data.get(key).and_then(|v| v.downcast_ref())
    }

    /// Returns the untyped value under `key`.
    #[must_use]
    pub fn get_any(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.data.get(key).map(AsRef::as_ref)
    }

    /// Removes and returns the value under `key` if it has type `T`.
    pub fn remove<T: Send + Sync + 'static>(&mut self, key: &str) -> Option<T> {
        let value = self.data.remove(key)?;
        value.downcast().ok().map(|b| *b)
    }

    // --- Routing results ---

    /// Methods that would have matched this path under another verb.
    ///
    /// Only populated when the request fell through to the not-found chain.
    #[must_use]
    pub fn allowed_methods(&self) -> &[Method] {
        &self.allowed_methods
    }

    /// Records the methods allowed for the request path.
    pub fn set_allowed_methods(&mut self, methods: Vec<Method>) {
        self.allowed_methods = methods;
    }

    /// Installs the table [`Context::url`] resolves names against.
    pub fn set_url_resolver(&mut self, resolver: Arc<dyn UrlResolver>) {
        self.urls = Some(resolver);
    }

    /// Builds the URL of a named route.
    ///
    /// Returns an empty string when the name is unknown or when the context
    /// was not created by a router.
    #[must_use]
    pub fn url(&self, name: &str, pairs: &[(&str, &dyn fmt::Display)]) -> String {
        self.urls
            .as_ref()
            .and_then(|urls| urls.resolve(name, pairs))
            .unwrap_or_default()
    }

    // --- Request ---

    /// Returns the request.
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Returns the request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        self.request.method()
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    /// Returns the request path as received.
    #[must_use]
    pub fn path(&self) -> &str {
        self.request.uri().path()
    }

    /// Returns the first query string value for `name`.
    ///
    /// A key present with an empty value yields `Some("")`.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<String> {
        first_value(self.uri().query()?.as_bytes(), name)
    }

    /// Returns the first url-encoded body value for `name`.
    ///
    /// Only `POST`, `PUT` and `PATCH` requests whose content type is
    /// `application/x-www-form-urlencoded` carry a form; everything else
    /// yields `None`.
    #[must_use]
    pub fn post_form(&self, name: &str) -> Option<String> {
        if !self.has_form_body() {
            return None;
        }
        first_value(self.request.body(), name)
    }

    /// Returns the first value for `name`, body form before query string.
    ///
    /// # Example
    ///
    /// ```
    /// use http::header::CONTENT_TYPE;
    /// use trellis_core::{BoxedHandler, Context};
    /// # use bytes::Bytes;
    ///
    /// let request = http::Request::post("/search?q=rust&page=2")
    ///     .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
    ///     .body(Bytes::from_static(b"q=router"))
    ///     .unwrap();
    /// let ctx = Context::new(request, Vec::<BoxedHandler>::new());
    ///
    /// assert_eq!(ctx.form("q").as_deref(), Some("router"));
    /// assert_eq!(ctx.form("page").as_deref(), Some("2"));
    /// assert_eq!(ctx.query("q").as_deref(), Some("rust"));
    /// ```
    #[must_use]
    pub fn form(&self, name: &str) -> Option<String> {
        self.post_form(name).or_else(|| self.query(name))
    }

    fn has_form_body(&self) -> bool {
        let method = self.method();
        if *method != Method::POST && *method != Method::PUT && *method != Method::PATCH {
            return false;
        }
        self.request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_URLENCODED))
    }

    // --- Response ---

    /// Returns the response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets the response status.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Sets a response header, replacing existing values.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Returns the response headers.
    #[must_use]
    pub fn response_headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the response headers for modification.
    pub fn response_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Appends bytes to the response body.
    pub fn write(&mut self, data: impl AsRef<[u8]>) {
        self.body.extend_from_slice(data.as_ref());
    }

    /// Returns the response body written so far.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Discards the response body written so far.
    pub fn clear_body(&mut self) {
        self.body.clear();
    }

    /// Consumes the context and builds the response.
    #[must_use]
    pub fn into_response(self) -> Response {
        let mut response = http::Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("method", self.request.method())
            .field("uri", self.request.uri())
            .field("index", &self.index)
            .field("handlers", &self.handlers.len())
            .field("params", &self.params)
            .field("data_keys", &self.data.keys().collect::<Vec<_>>())
            .field("status", &self.status)
            .field("url_resolver", &self.urls.is_some())
            .finish_non_exhaustive()
    }
}

fn first_value(encoded: &[u8], name: &str) -> Option<String> {
    serde_urlencoded::from_bytes::<Vec<(String, String)>>(encoded)
        .ok()?
        .into_iter()
        .find_map(|(key, value)| (key == name).then_some(value))
}
