//! Trailing-slash redirects.
//!
//! [`remover`] is the redirecting alternative to
//! [`RouterConfig::ignore_trailing_slash`](trellis_config::RouterConfig):
//! instead of matching `/users/` as `/users`, it sends the client to
//! `/users`.

use http::header::{HeaderValue, LOCATION};
use http::{Method, StatusCode};
use trellis_core::{handler, BoxedHandler, Error};

/// Returns a handler that redirects paths ending in `/` to the same path
/// without trailing slashes.
///
/// `status` is used for `GET` requests and should be 301 or 302; every other
/// method gets 307 so the client repeats the same request. The path `/` and
/// paths without a trailing slash pass through untouched.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use trellis::{slash, Router};
///
/// let mut router = Router::new();
/// router.use_handlers(vec![slash::remover(StatusCode::MOVED_PERMANENTLY)]);
/// ```
pub fn remover(status: StatusCode) -> BoxedHandler {
    handler(move |ctx| {
        let path = ctx.path();
        if path == "/" || !path.ends_with('/') {
            return Ok(());
        }

        let trimmed = path.trim_end_matches('/');
        let location = if trimmed.is_empty() { "/" } else { trimmed };
        let location = HeaderValue::from_str(location)
            .map_err(|e| Error::internal_with_source("invalid redirect location", e))?;
        let status = if ctx.method() == Method::GET {
            status
        } else {
            StatusCode::TEMPORARY_REDIRECT
        };

        ctx.set_header(LOCATION, location);
        ctx.set_status(status);
        ctx.abort();
        Ok(())
    })
}
