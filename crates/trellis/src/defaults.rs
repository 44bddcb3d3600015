//! Default not-found handlers and error hook.
//!
//! A new [`Router`](crate::Router) falls back to
//! `[method_not_allowed_handler, not_found_handler]` when no route matches.

use http::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use http::{Method, StatusCode};
use trellis_core::{Context, Error, HttpError, TrellisResult};

/// Answers requests whose path matches under some other method.
///
/// Sets `Allow` to the sorted list of those methods plus `OPTIONS`, then
/// aborts the chain with status 405, or 200 when the request itself is an
/// `OPTIONS` request. Does nothing if no method matches the path.
pub fn method_not_allowed_handler(ctx: &mut Context) -> TrellisResult<()> {
    if ctx.allowed_methods().is_empty() {
        return Ok(());
    }

    let allow = allow_header(ctx.allowed_methods());
    let value = HeaderValue::from_str(&allow)
        .map_err(|e| Error::internal_with_source("invalid Allow header", e))?;
    ctx.set_header(ALLOW, value);

    if ctx.method() != Method::OPTIONS {
        ctx.set_status(StatusCode::METHOD_NOT_ALLOWED);
    }
    ctx.abort();
    Ok(())
}

/// Fails the request with a 404.
pub fn not_found_handler(_ctx: &mut Context) -> TrellisResult<()> {
    Err(HttpError::not_found().into())
}

/// Writes an error into the response.
///
/// The status comes from [`Error::status_code`]; the body is replaced by the
/// error message as plain text.
pub fn default_error_handler(ctx: &mut Context, err: Error) {
    let status = err.status_code();
    if status.is_server_error() {
        tracing::error!(
            http.method = %ctx.method(),
            http.path = ctx.path(),
            http.status_code = status.as_u16(),
            error = %err,
            "handler failed"
        );
    } else {
        tracing::debug!(
            http.method = %ctx.method(),
            http.path = ctx.path(),
            http.status_code = status.as_u16(),
            error = %err,
            "request rejected"
        );
    }

    ctx.clear_body();
    ctx.set_status(status);
    ctx.set_header(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    ctx.write(err.to_string());
}

/// Builds the `Allow` value: sorted, deduplicated, always with `OPTIONS`.
pub(crate) fn allow_header(methods: &[Method]) -> String {
    let mut names: Vec<&str> = methods.iter().map(Method::as_str).collect();
    names.push(Method::OPTIONS.as_str());
    names.sort_unstable();
    names.dedup();
    names.join(", ")
}
