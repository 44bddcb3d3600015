//! Reverse URL lookup for handlers.

use std::fmt;

/// Builds URLs for named routes.
///
/// The router installs its named-route table on every context it dispatches,
/// which is what [`Context::url`](crate::Context::url) reads.
///
/// # Example
///
/// ```
/// use std::fmt::Display;
/// use std::sync::Arc;
/// use trellis_core::{BoxedHandler, Context, UrlResolver};
/// # use bytes::Bytes;
///
/// struct Home;
///
/// impl UrlResolver for Home {
///     fn resolve(&self, name: &str, _pairs: &[(&str, &dyn Display)]) -> Option<String> {
///         (name == "home").then(|| "/".to_string())
///     }
/// }
///
/// let mut ctx = Context::new(http::Request::new(Bytes::new()), Vec::<BoxedHandler>::new());
/// ctx.set_url_resolver(Arc::new(Home));
/// assert_eq!(ctx.url("home", &[]), "/");
/// assert_eq!(ctx.url("away", &[]), "");
/// ```
pub trait UrlResolver: Send + Sync {
    /// Returns the URL of the route called `name` with `pairs` substituted
    /// for its parameters, or `None` when no route has that name.
    fn resolve(&self, name: &str, pairs: &[(&str, &dyn fmt::Display)]) -> Option<String>;
}
