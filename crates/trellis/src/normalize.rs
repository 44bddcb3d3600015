//! Request path normalization.
//!
//! Runs on every request path before matching. The result is only used for
//! the lookup; handlers still see the path as received.

use std::borrow::Cow;

use trellis_config::RouterConfig;

/// Normalizes a request path according to `config`.
///
/// 1. Percent-decodes the path unless `use_escaped_path` is set. A path that
///    does not decode to UTF-8 is kept as received.
/// 2. Collapses every run of `/` into a single `/`.
/// 3. With `ignore_trailing_slash`, drops the trailing `/` of any path other
///    than `/` itself.
///
/// # Example
///
/// ```
/// use trellis::normalize_request_path;
/// use trellis_config::RouterConfig;
///
/// let config = RouterConfig {
///     ignore_trailing_slash: true,
///     ..RouterConfig::default()
/// };
/// assert_eq!(normalize_request_path("/users//", &config), "/users");
/// assert_eq!(normalize_request_path("///", &config), "/");
/// assert_eq!(normalize_request_path("/caf%C3%A9", &config), "/café");
/// ```
#[must_use]
pub fn normalize_request_path(path: &str, config: &RouterConfig) -> String {
    let decoded = if config.use_escaped_path {
        Cow::Borrowed(path)
    } else {
        urlencoding::decode(path).unwrap_or(Cow::Borrowed(path))
    };

    let mut normalized = collapse_slashes(&decoded);
    if config.ignore_trailing_slash && normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut previous_slash = false;
    for ch in path.chars() {
        if ch == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn trailing() -> RouterConfig {
        RouterConfig {
            ignore_trailing_slash: true,
            use_escaped_path: false,
        }
    }

    #[test]
    fn test_normalize_with_ignore_trailing_slash() {
        let cases = [
            ("/", "/"),
            ("/users", "/users"),
            ("/users/", "/users"),
            ("/users//", "/users"),
            ("///", "/"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_request_path(input, &trailing()), expected, "{input}");
        }
    }

    #[test]
    fn test_normalize_keeps_trailing_slash_by_default() {
        let config = RouterConfig::default();
        assert_eq!(normalize_request_path("/users/", &config), "/users/");
        assert_eq!(normalize_request_path("//users//", &config), "/users/");
        assert_eq!(normalize_request_path("/", &config), "/");
    }

    #[test]
    fn test_normalize_decodes_unless_escaped() {
        let decoded = RouterConfig::default();
        assert_eq!(normalize_request_path("/a%20b", &decoded), "/a b");
        assert_eq!(normalize_request_path("/a%2Fb", &decoded), "/a/b");

        let escaped = RouterConfig {
            use_escaped_path: true,
            ..RouterConfig::default()
        };
        assert_eq!(normalize_request_path("/a%20b", &escaped), "/a%20b");
        assert_eq!(normalize_request_path("/a%2Fb", &escaped), "/a%2Fb");
    }

    #[test]
    fn test_normalize_undecodable_path_kept_raw() {
        let config = RouterConfig::default();
        assert_eq!(normalize_request_path("/bad%FF", &config), "/bad%FF");
    }

    proptest! {
        #[test]
        fn prop_no_double_slashes(path in "/[a-z/]{0,24}") {
            let normalized = normalize_request_path(&path, &RouterConfig::default());
            prop_assert!(!normalized.contains("//"));
            prop_assert!(normalized.starts_with('/'));
        }

        #[test]
        fn prop_idempotent(path in "/[a-z/%0-9]{0,24}") {
            let config = RouterConfig { ignore_trailing_slash: true, use_escaped_path: true };
            let once = normalize_request_path(&path, &config);
            let twice = normalize_request_path(&once, &config);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_trailing_slash_stripped(path in "/[a-z/]{0,24}") {
            let normalized = normalize_request_path(&path, &trailing());
            prop_assert!(normalized == "/" || !normalized.ends_with('/'));
        }
    }
}
