//! Per-method matcher.
//!
//! [`Matcher`] keeps one trie per HTTP method and is the entry point for
//! registering patterns and resolving request paths.

use std::sync::Arc;

use http::Method;

use crate::node::{Captures, Leaf, Node};
use crate::params::Params;
use crate::pattern::{Pattern, PatternError};

/// Maps `(method, path)` to a registered value plus bound parameters.
///
/// Registration takes `&mut self`; lookups take `&self` and never lock, so a
/// built matcher can be shared freely between threads.
///
/// # Example
///
/// ```rust
/// use trellis_router::{Matcher, Params};
/// use http::Method;
///
/// let mut matcher = Matcher::new();
/// matcher.insert(Method::GET, "/users", "listUsers").unwrap();
/// matcher.insert(Method::GET, r"/users/<id:\d+>", "getUser").unwrap();
///
/// let mut params = Params::new();
/// assert_eq!(matcher.find(&Method::GET, "/users/42", &mut params), Some(&"getUser"));
/// assert_eq!(params.get("id"), Some("42"));
/// assert!(matcher.find(&Method::GET, "/users/abc", &mut params).is_none());
/// ```
///
/// # Route Priority
///
/// At each depth the candidates are tried in this order, backtracking to the
/// next candidate whenever a branch dead-ends:
///
/// 1. **Static segments** (`/users/me`)
/// 2. **Regex parameters** in registration order (`/users/<id:\d+>`)
/// 3. **Plain parameters** in registration order (`/users/<name>`)
/// 4. **Wildcard** (`/users/*`)
#[derive(Debug, Clone)]
pub struct Matcher<T> {
    trees: Vec<(Method, Node<T>)>,
    max_params: usize,
    route_count: usize,
}

impl<T> Default for Matcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Matcher<T> {
    /// Creates an empty matcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            trees: Vec::new(),
            max_params: 0,
            route_count: 0,
        }
    }

    /// Parses `pattern` and registers `value` under `method`.
    ///
    /// Returns the number of parameters the pattern declares.
    pub fn insert(&mut self, method: Method, pattern: &str, value: T) -> Result<usize, PatternError> {
        let pattern = Pattern::parse(pattern)?;
        self.insert_pattern(method, &pattern, value);
        Ok(pattern.param_count())
    }

    /// Registers `value` under an already parsed pattern.
    ///
    /// Registering the same method and pattern twice replaces the earlier
    /// value, which is returned.
    pub fn insert_pattern(&mut self, method: Method, pattern: &Pattern, value: T) -> Option<T> {
        let leaf = Leaf {
            value,
            names: Arc::clone(pattern.param_names()),
        };
        let replaced = self.tree_mut(method).insert(pattern.segments(), leaf);
        if replaced.is_none() {
            self.route_count += 1;
        }
        self.max_params = self.max_params.max(pattern.param_count());
        replaced
    }

    /// Resolves `path` for `method`.
    ///
    /// On success `params` holds the declared names paired with the captured
    /// values; on failure its contents are unspecified.
    pub fn find(&self, method: &Method, path: &str, params: &mut Params) -> Option<&T> {
        let tree = self.tree(method)?;
        let mut captures = Captures::new();
        let leaf = lookup(tree, path, &mut captures)?;
        params.fill(&leaf.names, &captures);
        Some(&leaf.value)
    }

    /// Returns every method whose tree resolves `path`, in registration order.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let mut captures = Captures::new();
        self.trees
            .iter()
            .filter(|(_, tree)| {
                captures.clear();
                lookup(tree, path, &mut captures).is_some()
            })
            .map(|(method, _)| method.clone())
            .collect()
    }

    /// Returns the methods that have at least one route.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.trees.iter().map(|(method, _)| method)
    }

    /// Visits every registered value.
    pub fn for_each(&self, mut f: impl FnMut(&Method, &T)) {
        for (method, tree) in &self.trees {
            tree.for_each_leaf(&mut |leaf| f(method, &leaf.value));
        }
    }

    /// Returns the largest parameter count of any registered pattern.
    #[must_use]
    pub fn max_params(&self) -> usize {
        self.max_params
    }

    /// Returns the number of distinct `(method, pattern)` registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }

    fn tree(&self, method: &Method) -> Option<&Node<T>> {
        self.trees
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, tree)| tree)
    }

    fn tree_mut(&mut self, method: Method) -> &mut Node<T> {
        let i = match self.trees.iter().position(|(m, _)| *m == method) {
            Some(i) => i,
            None => {
                self.trees.push((method, Node::root()));
                self.trees.len() - 1
            }
        };
        &mut self.trees[i].1
    }
}

/// `/` resolves to the root leaf first, then to anything that accepts a
/// single empty segment (a root wildcard, for instance).
fn lookup<'n, 'p, T>(
    tree: &'n Node<T>,
    path: &'p str,
    captures: &mut Captures<'p>,
) -> Option<&'n Leaf<T>> {
    let body = path.strip_prefix('/').unwrap_or(path);
    if body.is_empty() {
        return tree.find(None, captures).or_else(|| tree.find(Some(""), captures));
    }
    tree.find(Some(body), captures)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(routes: &[(Method, &str, &'static str)]) -> Matcher<&'static str> {
        let mut matcher = Matcher::new();
        for (method, pattern, value) in routes {
            matcher.insert(method.clone(), pattern, *value).unwrap();
        }
        matcher
    }

    #[test]
    fn test_new_is_empty() {
        let matcher: Matcher<()> = Matcher::new();
        assert!(matcher.is_empty());
        assert_eq!(matcher.len(), 0);
        assert_eq!(matcher.max_params(), 0);
    }

    #[test]
    fn test_max_params_tracks_largest() {
        let mut matcher = Matcher::new();
        matcher.insert(Method::GET, "/users", ()).unwrap();
        assert_eq!(matcher.max_params(), 0);

        assert_eq!(matcher.insert(Method::GET, "/users/<id>", ()).unwrap(), 1);
        assert_eq!(matcher.max_params(), 1);

        matcher.insert(Method::GET, "/a/<x>/<y>/*", ()).unwrap();
        assert_eq!(matcher.max_params(), 3);

        matcher.insert(Method::POST, "/b/<x>", ()).unwrap();
        assert_eq!(matcher.max_params(), 3);
    }

    #[test]
    fn test_len_counts_distinct_registrations() {
        let mut matcher = Matcher::new();
        matcher.insert(Method::GET, "/a", 1).unwrap();
        matcher.insert(Method::POST, "/a", 2).unwrap();
        matcher.insert(Method::GET, "/a", 3).unwrap();

        assert_eq!(matcher.len(), 2);
        let mut params = Params::new();
        assert_eq!(matcher.find(&Method::GET, "/a", &mut params), Some(&3));
    }

    #[test]
    fn test_precedence_order() {
        let m = matcher(&[
            (Method::GET, "/users/*", "wildcard"),
            (Method::GET, "/users/<name>", "plain"),
            (Method::GET, r"/users/<id:\d+>", "regex"),
            (Method::GET, "/users/me", "static"),
        ]);
        let mut params = Params::new();

        assert_eq!(m.find(&Method::GET, "/users/me", &mut params), Some(&"static"));
        assert!(params.is_empty());

        assert_eq!(m.find(&Method::GET, "/users/42", &mut params), Some(&"regex"));
        assert_eq!(params.get("id"), Some("42"));

        assert_eq!(m.find(&Method::GET, "/users/bob", &mut params), Some(&"plain"));
        assert_eq!(params.get("name"), Some("bob"));
        assert_eq!(params.get("id"), None);

        assert_eq!(m.find(&Method::GET, "/users/a/b", &mut params), Some(&"wildcard"));
        assert_eq!(params.get("*"), Some("a/b"));
    }

    #[test]
    fn test_regex_children_in_registration_order() {
        let m = matcher(&[
            (Method::GET, r"/v/<num:\d+>", "digits"),
            (Method::GET, r"/v/<hex:[0-9a-f]+>", "hex"),
        ]);
        let mut params = Params::new();

        assert_eq!(m.find(&Method::GET, "/v/123", &mut params), Some(&"digits"));
        assert_eq!(m.find(&Method::GET, "/v/beef", &mut params), Some(&"hex"));
        assert!(m.find(&Method::GET, "/v/xyz", &mut params).is_none());
    }

    #[test]
    fn test_regex_must_match_whole_segment() {
        let m = matcher(&[(Method::GET, r"/n/<id:\d+>", "n")]);
        let mut params = Params::new();
        assert!(m.find(&Method::GET, "/n/12a", &mut params).is_none());
        assert!(m.find(&Method::GET, "/n/a12", &mut params).is_none());
    }

    #[test]
    fn test_plain_param_rejects_empty_segment() {
        let m = matcher(&[(Method::GET, "/users/<id>", "get")]);
        let mut params = Params::new();
        assert!(m.find(&Method::GET, "/users/", &mut params).is_none());
    }

    #[test]
    fn test_backtracking_across_classes() {
        let m = matcher(&[
            (Method::GET, "/a/b/c", "static"),
            (Method::GET, "/a/<x>/d", "param"),
        ]);
        let mut params = Params::new();

        assert_eq!(m.find(&Method::GET, "/a/b/d", &mut params), Some(&"param"));
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("x"), Some("b"));
    }

    #[test]
    fn test_root_and_root_wildcard() {
        let m = matcher(&[(Method::GET, "/", "root"), (Method::POST, "/*", "any")]);
        let mut params = Params::new();

        assert_eq!(m.find(&Method::GET, "/", &mut params), Some(&"root"));
        assert_eq!(m.find(&Method::POST, "/", &mut params), Some(&"any"));
        assert_eq!(params.get("*"), Some(""));
        assert_eq!(m.find(&Method::POST, "/x/y", &mut params), Some(&"any"));
        assert_eq!(params.get("*"), Some("x/y"));
    }

    #[test]
    fn test_unknown_method() {
        let m = matcher(&[(Method::GET, "/a", "a")]);
        let mut params = Params::new();
        assert!(m.find(&Method::DELETE, "/a", &mut params).is_none());
    }

    #[test]
    fn test_allowed_methods() {
        let m = matcher(&[
            (Method::GET, "/users", "list"),
            (Method::POST, "/users", "create"),
            (Method::DELETE, "/users/<id>", "delete"),
        ]);

        assert_eq!(m.allowed_methods("/users"), vec![Method::GET, Method::POST]);
        assert_eq!(m.allowed_methods("/users/1"), vec![Method::DELETE]);
        assert!(m.allowed_methods("/nothing").is_empty());
    }

    #[test]
    fn test_duplicate_param_name_first_wins() {
        let m = matcher(&[(Method::GET, "/<id>/<id>", "dup")]);
        let mut params = Params::new();

        assert_eq!(m.find(&Method::GET, "/1/2", &mut params), Some(&"dup"));
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("id"), Some("1"));
    }

    #[test]
    fn test_for_each_visits_every_method() {
        let m = matcher(&[
            (Method::GET, "/a", "get-a"),
            (Method::PUT, "/a/<id>", "put-a"),
        ]);

        let mut seen = Vec::new();
        m.for_each(|method, value| seen.push((method.clone(), *value)));
        assert_eq!(seen, vec![(Method::GET, "get-a"), (Method::PUT, "put-a")]);
        assert_eq!(m.methods().count(), 2);
    }
}
