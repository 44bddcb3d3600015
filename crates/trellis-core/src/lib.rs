//! # Trellis Core
//!
//! Handler chain execution for the Trellis router.
//!
//! - [`Context`] - Per-request state: cursor, path parameters, data bag, response
//! - [`Handler`] - The one trait every middleware and endpoint implements
//! - [`Error`] / [`HttpError`] - Handler errors and their status mapping
//! - [`UrlResolver`] - Named-route lookup behind [`Context::url`]

#![doc(html_root_url = "https://docs.rs/trellis-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod handler;
mod types;
mod urls;

pub use context::Context;
pub use error::{Error, HttpError, TrellisResult};
pub use handler::{combine, handler, BoxedHandler, Chain, Handler};
pub use types::{Request, Response};
pub use urls::UrlResolver;

#[cfg(test)]
pub(crate) fn test_request(uri: &str) -> Request {
    http::Request::builder()
        .uri(uri)
        .body(bytes::Bytes::new())
        .unwrap()
}
