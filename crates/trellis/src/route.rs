//! Registered routes and reverse URL building.

use std::collections::HashMap;
use std::fmt::{self, Display, Write as _};

use http::Method;
use trellis_core::UrlResolver;
use trellis_router::{Pattern, Segment};

use crate::Router;

/// A registered route as recorded by the router.
///
/// One entry exists per registration call, so a route registered for several
/// methods at once is a single entry.
#[derive(Debug, Clone)]
pub struct RouteInfo {
    methods: Vec<Method>,
    pattern: Pattern,
    name: Option<String>,
}

impl RouteInfo {
    pub(crate) fn new(methods: Vec<Method>, pattern: Pattern) -> Self {
        Self {
            methods,
            pattern,
            name: None,
        }
    }

    /// Methods this route answers.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Full pattern, group prefixes included.
    #[must_use]
    pub fn path(&self) -> &str {
        self.pattern.as_str()
    }

    /// Parsed pattern.
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Route name, if one was given.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Builds a URL from this route's pattern.
    ///
    /// Each parameter is replaced by the percent-encoded value paired with its
    /// name in `pairs`, or by nothing when `pairs` has no such name. The
    /// wildcard is always replaced by nothing.
    ///
    /// # Example
    ///
    /// ```
    /// use trellis::Router;
    ///
    /// let mut router = Router::new();
    /// let route = router.get(r"/users/<id:\d+>/<action>/*", vec![]);
    ///
    /// let url = route.info().url(&[("id", &123), ("action", &"address")]);
    /// assert_eq!(url, "/users/123/address/");
    /// ```
    #[must_use]
    pub fn url(&self, pairs: &[(&str, &dyn Display)]) -> String {
        let segments = self.pattern.segments();
        if segments.is_empty() {
            return "/".to_string();
        }

        let mut url = String::with_capacity(self.pattern.as_str().len());
        for segment in segments {
            url.push('/');
            match segment {
                Segment::Static(text) => url.push_str(text),
                Segment::Param(name) | Segment::Regex { name, .. } => {
                    let pair = pairs.iter().find(|(key, _)| *key == name.as_str());
                    if let Some((_, value)) = pair {
                        url.push_str(&urlencoding::encode(&value.to_string()));
                    }
                }
                Segment::Wildcard => {}
            }
        }
        url
    }
}

impl Display for RouteInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, method) in self.methods.iter().enumerate() {
            if i > 0 {
                f.write_char(',')?;
            }
            f.write_str(method.as_str())?;
        }
        write!(f, " {}", self.pattern)
    }
}

/// Handle to a route that was just registered.
///
/// Returned by the registration methods so the route can be named:
///
/// ```
/// use trellis::Router;
///
/// let mut router = Router::new();
/// router.get("/users", vec![]).name("users");
/// assert!(router.route("users").is_some());
/// ```
#[derive(Debug)]
pub struct Route<'r> {
    router: &'r mut Router,
    index: usize,
}

impl<'r> Route<'r> {
    pub(crate) fn new(router: &'r mut Router, index: usize) -> Self {
        Self { router, index }
    }

    /// Names the route so it can be looked up and used for URL building.
    ///
    /// A name already taken by another route moves to this one.
    pub fn name(self, name: impl Into<String>) -> Self {
        self.router.name_route(self.index, name.into());
        self
    }

    /// Returns what was registered.
    #[must_use]
    pub fn info(&self) -> &RouteInfo {
        self.router.route_at(self.index)
    }
}

/// Snapshot of the named routes shared with dispatched contexts.
#[derive(Debug, Clone, Default)]
pub(crate) struct NamedRoutes(HashMap<String, RouteInfo>);

impl NamedRoutes {
    pub(crate) fn insert(&mut self, name: String, route: RouteInfo) {
        self.0.insert(name, route);
    }

    pub(crate) fn remove(&mut self, name: &str) {
        self.0.remove(name);
    }
}

impl UrlResolver for NamedRoutes {
    fn resolve(&self, name: &str, pairs: &[(&str, &dyn Display)]) -> Option<String> {
        self.0.get(name).map(|route| route.url(pairs))
    }
}
